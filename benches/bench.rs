// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Benchmarks for the table builders and the DAS kernel.

use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::Array3;

use bmode::{
    apodization::{build_apodization_table, ApertureMode, ApodizationSpec, Window},
    beamform, beamform_streaming,
    delays::build_delay_table,
    geometry::{GeometryConfig, Medium, Transducer},
};

fn bench_config() -> GeometryConfig {
    GeometryConfig {
        centre_frequency: 5e6,
        adc_ratio: 4.0,
        num_elements: 64,
        element_pitch: 3e-4,
        focus_number: Some(1.7),
        num_angles: 1,
        angle_interval_deg: (0.0, 0.0),
        axial_cutoff_wavelengths: 5.0,
        speed_of_sound: 1540.0,
        max_depth_wavelengths: 60.0,
        ..Default::default()
    }
}

fn beamforming(c: &mut Criterion) {
    let config = bench_config();
    let transducer = Transducer::new(&config).unwrap();
    let medium = Medium::new(&config).unwrap();
    let spec = ApodizationSpec {
        window: Window::Hann,
        mode: ApertureMode::DepthAdaptive,
    };

    c.bench_function("build_delay_table", |b| {
        b.iter(|| build_delay_table(&transducer, &medium))
    });
    c.bench_function("build_apodization_table", |b| {
        b.iter(|| build_apodization_table(&transducer, &medium, &spec))
    });

    let delays = build_delay_table(&transducer, &medium);
    let apodization = build_apodization_table(&transducer, &medium, &spec);
    let signals = Array3::<f32>::from_shape_fn(
        (medium.num_samples, transducer.num_elements, 1),
        |(t, e, _)| ((t + 7 * e) as f32 * 0.01).sin(),
    );

    c.bench_function("das_kernel", |b| {
        b.iter(|| beamform(signals.view(), delays.view(), apodization.view()).unwrap())
    });
    c.bench_function("das_kernel_streaming_64_rows", |b| {
        b.iter(|| {
            beamform_streaming(signals.view(), &transducer, &medium, &spec, 64).unwrap()
        })
    });
}

criterion_group!(benches, beamforming);
criterion_main!(benches);
