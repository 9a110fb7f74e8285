// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Image assembly tests.

use approx::assert_abs_diff_eq;
use ndarray::prelude::*;
use num_complex::Complex;

use super::*;
use crate::geometry::GeometryConfig;

fn small_config() -> GeometryConfig {
    GeometryConfig {
        centre_frequency: 5e6,
        adc_ratio: 4.0,
        num_elements: 8,
        element_pitch: 3e-4,
        num_angles: 1,
        angle_interval_deg: (0.0, 0.0),
        axial_cutoff_wavelengths: 5.0,
        speed_of_sound: 1540.0,
        max_depth_wavelengths: 40.0,
        ..Default::default()
    }
}

#[test]
fn envelope_is_the_complex_magnitude() {
    let frame = array![
        [Complex::new(3.0f32, 4.0), Complex::new(0.0, 0.0)],
        [Complex::new(-1.0, 0.0), Complex::new(0.0, 2.0)],
    ];
    let magnitude = envelope(frame.view());
    assert_eq!(magnitude, array![[5.0f32, 0.0], [1.0, 2.0]]);
}

#[test]
fn log_compression_maps_the_display_range() {
    let image = array![[1.0f32, 0.1], [0.01, 0.0001]];
    let compressed = log_compress(image.view(), 40.0).unwrap();
    // 0 dB -> 255, -20 dB -> half scale, -40 dB -> 0, below range clamps.
    assert_eq!(compressed[[0, 0]], 255.0);
    assert!(compressed[[0, 1]] == 127.0 || compressed[[0, 1]] == 128.0);
    assert_eq!(compressed[[1, 0]], 0.0);
    assert_eq!(compressed[[1, 1]], 0.0);

    // All-zero images stay zero rather than dividing by zero.
    let dark = Array2::<f32>::zeros((3, 3));
    assert_eq!(log_compress(dark.view(), 40.0).unwrap(), dark);

    assert_eq!(
        log_compress(image.view(), 0.0),
        Err(ImageError::DisplayRange(0.0))
    );
}

#[test]
fn unit_factors_leave_the_image_untouched() {
    let image = Array2::<f32>::from_shape_fn((5, 4), |(k, i)| (3 * k + i) as f32);
    let same = upsample_bicubic(image.view(), 1, 1).unwrap();
    assert_eq!(same, image);
    assert_eq!(
        upsample_bicubic(image.view(), 0, 2),
        Err(ImageError::ScaleFactorZero)
    );
}

#[test]
fn upsampling_reproduces_source_pixels_on_the_grid() {
    let image = Array2::<f32>::from_shape_fn((6, 5), |(k, i)| (k * k + 2 * i) as f32);
    let up = upsample_bicubic(image.view(), 2, 3).unwrap();
    assert_eq!(up.dim(), (12, 15));
    for k in 0..6 {
        for i in 0..5 {
            assert_abs_diff_eq!(up[[2 * k, 3 * i]], image[[k, i]], epsilon = 1e-5);
        }
    }
}

#[test]
fn upsampling_preserves_flat_regions() {
    let image = Array2::<f32>::from_elem((4, 4), 7.5);
    let up = upsample_bicubic(image.view(), 3, 2).unwrap();
    assert_eq!(up.dim(), (12, 8));
    for &v in &up {
        assert_abs_diff_eq!(v, 7.5, epsilon = 1e-5);
    }
}

#[test]
fn axial_clip_keeps_the_physical_window() {
    let m = Medium::new(&small_config()).unwrap();
    let image = Array2::<f32>::from_shape_fn((m.num_depths, 8), |(k, _)| k as f32);

    let start = m.axial_z[10];
    // Stop halfway between two grid depths so round-off cannot move the
    // boundary row.
    let top_clip = m.max_depth_m - (m.axial_z[99] + m.axial_z[100]) / 2.0;
    let (clipped, rows) = clip_axial(image.view(), &m, start, top_clip).unwrap();
    assert_eq!(rows, 10..100);
    assert_eq!(clipped.dim(), (90, 8));
    assert_eq!(clipped[[0, 0]], 10.0);
    assert_eq!(clipped[[89, 0]], 99.0);

    // A window past the recording depth is empty.
    assert!(matches!(
        clip_axial(image.view(), &m, 2.0 * m.max_depth_m, 0.0),
        Err(ImageError::EmptyClipWindow { .. })
    ));
}

#[test]
fn millimetre_axes_span_the_aperture_and_depth() {
    let t = Transducer::new(&small_config()).unwrap();
    let m = Medium::new(&small_config()).unwrap();
    let (axial, lateral) = physical_extent_mm(&t, &m, (m.num_depths, t.num_elements));
    assert_eq!(axial.len(), m.num_depths);
    assert_eq!(lateral.len(), t.num_elements);
    assert_eq!(axial[0], 0.0);
    assert_eq!(lateral[0], 0.0);
    let step = axial[1] - axial[0];
    assert_abs_diff_eq!(
        axial[m.num_depths - 1],
        (m.num_depths - 1) as f64 * step,
        epsilon = 1e-9
    );
    assert_abs_diff_eq!(
        lateral[t.num_elements - 1],
        t.aperture * 1000.0 * 7.0 / 8.0,
        epsilon = 1e-9
    );
}
