// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Geometry derivation tests.

use approx::assert_abs_diff_eq;

use super::*;

fn small_config() -> GeometryConfig {
    GeometryConfig {
        centre_frequency: 5e6,
        bandwidth: (2e6, 8e6),
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
fn derived_transducer_quantities() {
    let t = Transducer::new(&small_config()).unwrap();
    assert_abs_diff_eq!(t.sampling_frequency, 2e7);
    assert_abs_diff_eq!(t.wavelength, 1540.0 / 5e6);
    assert_abs_diff_eq!(t.aperture, 8.0 * 3e-4);
    // 2 * 5 wavelengths of one-way depth is 10 * R samples round trip.
    assert_eq!(t.start_depth_samples, 40);
    // Element positions are centred on the origin and symmetric.
    assert_abs_diff_eq!(t.element_x[0], -1.05e-3, epsilon = 1e-12);
    assert_abs_diff_eq!(t.element_x[7], 1.05e-3, epsilon = 1e-12);
    for e in 0..8 {
        assert_abs_diff_eq!(t.element_x[e], -t.element_x[7 - e], epsilon = 1e-15);
    }
}

#[test]
fn derived_medium_grid() {
    let m = Medium::new(&small_config()).unwrap();
    assert_eq!(m.num_samples, 320);
    assert_eq!(m.num_depths, 160);
    assert_eq!(m.axial_z.len(), 160);
    assert_eq!(m.axial_z[0], 0.0);
    for k in 1..m.num_depths {
        assert!(m.axial_z[k] > m.axial_z[k - 1]);
    }
    assert_abs_diff_eq!(
        m.axial_z[159],
        159.0 * m.max_depth_m / 160.0,
        epsilon = 1e-12
    );
}

#[test]
fn f_number_resolution_order() {
    let mut config = small_config();

    config.focus_number = Some(0.5);
    config.elevation_focus = Some(0.028);
    assert_abs_diff_eq!(config.resolved_f_number(), 0.5);

    config.focus_number = None;
    // elevation focus over the full aperture
    assert_abs_diff_eq!(config.resolved_f_number(), 0.028 / (8.0 * 3e-4));

    config.elevation_focus = None;
    assert_abs_diff_eq!(config.resolved_f_number(), 1.7);
}

#[test]
fn angle_vector() {
    let mut config = small_config();
    config.num_angles = 1;
    config.angle_interval_deg = (-10.0, 10.0);
    let t = Transducer::new(&config).unwrap();
    // A single angle sits at the interval start.
    assert_eq!(t.angles_rad.len(), 1);
    assert_abs_diff_eq!(t.angles_rad[0], (-10.0f64).to_radians());

    config.num_angles = 5;
    let t = Transducer::new(&config).unwrap();
    assert_eq!(t.angles_rad.len(), 5);
    assert_abs_diff_eq!(t.angles_rad[0], (-10.0f64).to_radians());
    assert_abs_diff_eq!(t.angles_rad[2], 0.0);
    assert_abs_diff_eq!(t.angles_rad[4], 10.0f64.to_radians());
}

#[test]
fn invalid_fields_are_named() {
    let mut config = small_config();
    config.centre_frequency = 0.0;
    assert_eq!(
        config.validate(),
        Err(GeometryError::CentreFrequency(0.0))
    );

    let mut config = small_config();
    config.num_elements = 0;
    assert_eq!(config.validate(), Err(GeometryError::NoElements));

    let mut config = small_config();
    config.element_pitch = -3e-4;
    assert_eq!(config.validate(), Err(GeometryError::ElementPitch(-3e-4)));

    let mut config = small_config();
    config.focus_number = Some(-1.0);
    assert_eq!(config.validate(), Err(GeometryError::FNumber(-1.0)));

    let mut config = small_config();
    config.num_angles = 0;
    assert_eq!(config.validate(), Err(GeometryError::NoAngles));

    let mut config = small_config();
    config.angle_interval_deg = (5.0, -5.0);
    assert_eq!(
        config.validate(),
        Err(GeometryError::AngleInterval(5.0, -5.0))
    );

    let mut config = small_config();
    config.max_depth_wavelengths = 4.0;
    assert_eq!(
        config.validate(),
        Err(GeometryError::DepthRange {
            max: 4.0,
            cutoff: 5.0
        })
    );
}

#[test]
fn pinmap_validation() {
    let mut config = small_config();

    // One-based pinmap becomes zero-based.
    config.pinmap = Some(vec![8, 7, 6, 5, 4, 3, 2, 1]);
    config.pinmap_base = 1;
    let t = Transducer::new(&config).unwrap();
    assert_eq!(t.pinmap, vec![7, 6, 5, 4, 3, 2, 1, 0]);

    // Zero-based passes through.
    config.pinmap = Some(vec![3, 1, 4, 0, 5, 7, 2, 6]);
    config.pinmap_base = 0;
    let t = Transducer::new(&config).unwrap();
    assert_eq!(t.pinmap, vec![3, 1, 4, 0, 5, 7, 2, 6]);

    config.pinmap = Some(vec![0, 1, 2]);
    assert_eq!(
        config.validate(),
        Err(GeometryError::PinmapLength {
            got: 3,
            expected: 8
        })
    );

    config.pinmap = Some(vec![1, 2, 3, 4, 5, 6, 7, 8]);
    config.pinmap_base = 0;
    assert_eq!(
        config.validate(),
        Err(GeometryError::PinmapNotPermutation(1))
    );

    config.pinmap = Some(vec![0, 1, 2, 3, 4, 5, 6, 7]);
    config.pinmap_base = 1;
    assert_eq!(
        config.validate(),
        Err(GeometryError::PinmapBase { entry: 0, base: 1 })
    );

    // No pinmap means identity.
    config.pinmap = None;
    let t = Transducer::new(&config).unwrap();
    assert_eq!(t.pinmap, (0..8).collect::<Vec<_>>());
}
