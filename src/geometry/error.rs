// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Error type for invalid acquisition geometry. Every variant names the
offending field.
 */

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum GeometryError {
    #[error("centre_frequency must be positive, got {0} Hz")]
    CentreFrequency(f64),

    #[error("adc_ratio must be positive, got {0}")]
    AdcRatio(f64),

    #[error("num_elements must be at least 1")]
    NoElements,

    #[error("element_pitch must be positive, got {0} m")]
    ElementPitch(f64),

    #[error("speed_of_sound must be positive, got {0} m/s")]
    SpeedOfSound(f64),

    #[error("resolved f-number must be positive, got {0}")]
    FNumber(f64),

    #[error("num_angles must be at least 1")]
    NoAngles,

    #[error("angle_interval must be ordered, got [{0}, {1}] degrees")]
    AngleInterval(f64, f64),

    #[error(
        "max_depth_wavelengths ({max}) must exceed axial_cutoff_wavelengths ({cutoff})"
    )]
    DepthRange { max: f64, cutoff: f64 },

    #[error("geometry yields no echo samples; increase max_depth_wavelengths or adc_ratio")]
    NoEchoSamples,

    #[error("pinmap has {got} entries; expected one per element ({expected})")]
    PinmapLength { got: usize, expected: usize },

    #[error("pinmap entry {entry} is below the pinmap base {base}")]
    PinmapBase { entry: usize, base: usize },

    #[error("pinmap is not a permutation: channel {0} is repeated or out of range")]
    PinmapNotPermutation(usize),
}
