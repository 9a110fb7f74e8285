// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Acquisition geometry: the transducer and the imaged medium.
//!
//! A single immutable [`GeometryConfig`] carries every user-supplied scalar;
//! [`Transducer`] and [`Medium`] are derived from it by pure computation.
//! Nothing here performs I/O, and all derived quantities are `f64`.

mod error;
pub use error::GeometryError;
#[cfg(test)]
mod tests;

use itertools::Itertools;
use ndarray::prelude::*;

use crate::constants::DEFAULT_F_NUMBER;

/// User-supplied acquisition parameters, in SI units unless noted.
///
/// The angle interval is given in degrees and converted to radians exactly
/// once, when the [`Transducer`] is derived.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryConfig {
    /// Transducer centre frequency \[Hz\].
    pub centre_frequency: f64,
    /// Low and high -6 dB band edges \[Hz\]. Consumed by the band-pass
    /// filter, not by the beamformer itself.
    pub bandwidth: (f64, f64),
    /// ADC oversampling ratio: samples per wavelength.
    pub adc_ratio: f64,
    /// Number of transducer elements.
    pub num_elements: usize,
    /// Element pitch \[m\].
    pub element_pitch: f64,
    /// Optional permutation mapping element order to physical channel
    /// order. `None` means identity.
    pub pinmap: Option<Vec<usize>>,
    /// Base of the pinmap values: 0 or 1.
    pub pinmap_base: usize,
    /// Elevation focus \[m\], used to resolve the f-number when no explicit
    /// focus number is given.
    pub elevation_focus: Option<f64>,
    /// Explicit receive f-number. Takes precedence over `elevation_focus`.
    pub focus_number: Option<f64>,
    /// Number of plane-wave transmit angles.
    pub num_angles: usize,
    /// First and last plane-wave tilt \[degrees\], inclusive.
    pub angle_interval_deg: (f64, f64),
    /// Recording starts this many wavelengths below the surface; earlier
    /// samples carry no echo and are masked to zero.
    pub axial_cutoff_wavelengths: f64,
    /// Speed of sound in the medium \[m/s\].
    pub speed_of_sound: f64,
    /// Maximum imaging depth \[wavelengths\].
    pub max_depth_wavelengths: f64,
    /// Attenuation coefficient \[dB/(MHz^power cm)\], for attenuation-law
    /// time-gain compensation.
    pub attenuation_coefficient: Option<f64>,
    /// Frequency power of the attenuation law.
    pub attenuation_power: Option<f64>,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            centre_frequency: 5.3e6,
            bandwidth: (2e6, 9e6),
            adc_ratio: 4.0,
            num_elements: 192,
            element_pitch: 2.3e-4,
            pinmap: None,
            pinmap_base: 1,
            elevation_focus: None,
            focus_number: None,
            num_angles: 1,
            angle_interval_deg: (0.0, 0.0),
            axial_cutoff_wavelengths: 5.0,
            speed_of_sound: 1540.0,
            max_depth_wavelengths: 176.0,
            attenuation_coefficient: None,
            attenuation_power: None,
        }
    }
}

impl GeometryConfig {
    /// Check every field the derivations depend on. Derivation entry points
    /// call this, so a bad field is reported before any table is built.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.centre_frequency <= 0.0 {
            return Err(GeometryError::CentreFrequency(self.centre_frequency));
        }
        if self.adc_ratio <= 0.0 {
            return Err(GeometryError::AdcRatio(self.adc_ratio));
        }
        if self.num_elements == 0 {
            return Err(GeometryError::NoElements);
        }
        if self.element_pitch <= 0.0 {
            return Err(GeometryError::ElementPitch(self.element_pitch));
        }
        if self.speed_of_sound <= 0.0 {
            return Err(GeometryError::SpeedOfSound(self.speed_of_sound));
        }
        let f = self.resolved_f_number();
        if f <= 0.0 {
            return Err(GeometryError::FNumber(f));
        }
        if self.num_angles < 1 {
            return Err(GeometryError::NoAngles);
        }
        let (lo, hi) = self.angle_interval_deg;
        if hi < lo {
            return Err(GeometryError::AngleInterval(lo, hi));
        }
        if self.max_depth_wavelengths <= self.axial_cutoff_wavelengths {
            return Err(GeometryError::DepthRange {
                max: self.max_depth_wavelengths,
                cutoff: self.axial_cutoff_wavelengths,
            });
        }
        self.resolved_pinmap()?;
        Ok(())
    }

    /// Resolution order: explicit focus number, then elevation focus over
    /// the full aperture, then the 1.7 default.
    pub fn resolved_f_number(&self) -> f64 {
        if let Some(f) = self.focus_number {
            f
        } else if let Some(focus) = self.elevation_focus {
            let aperture = self.num_elements as f64 * self.element_pitch;
            focus / aperture
        } else {
            DEFAULT_F_NUMBER
        }
    }

    /// The zero-based pinmap, identity when none was supplied.
    fn resolved_pinmap(&self) -> Result<Vec<usize>, GeometryError> {
        let e = self.num_elements;
        let pinmap = match &self.pinmap {
            None => return Ok((0..e).collect()),
            Some(p) => p,
        };
        if pinmap.len() != e {
            return Err(GeometryError::PinmapLength {
                got: pinmap.len(),
                expected: e,
            });
        }
        let mut zero_based = Vec::with_capacity(e);
        for &entry in pinmap {
            if entry < self.pinmap_base {
                return Err(GeometryError::PinmapBase {
                    entry,
                    base: self.pinmap_base,
                });
            }
            zero_based.push(entry - self.pinmap_base);
        }
        // A permutation of 0..E hits every channel exactly once.
        if let Some(&bad) = zero_based
            .iter()
            .sorted()
            .zip(0..e)
            .find(|&(&ch, expected)| ch != expected)
            .map(|(ch, _)| ch)
        {
            return Err(GeometryError::PinmapNotPermutation(bad));
        }
        Ok(zero_based)
    }
}

/// Transducer-side derived geometry. Immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Transducer {
    /// Centre frequency \[Hz\].
    pub centre_frequency: f64,
    /// -6 dB band edges \[Hz\].
    pub bandwidth: (f64, f64),
    /// Sampling frequency, `adc_ratio * centre_frequency` \[Hz\].
    pub sampling_frequency: f64,
    /// `speed_of_sound / centre_frequency` \[m\].
    pub wavelength: f64,
    pub num_elements: usize,
    /// Element pitch \[m\].
    pub element_pitch: f64,
    /// Lateral element positions, centred on the array origin \[m\].
    pub element_x: Array1<f64>,
    /// Full physical aperture, `num_elements * element_pitch` \[m\].
    pub aperture: f64,
    /// Resolved receive f-number.
    pub f_number: f64,
    /// Plane-wave tilt angles \[radians\].
    pub angles_rad: Array1<f64>,
    /// Zero-based element-to-channel permutation.
    pub pinmap: Vec<usize>,
    /// First sample carrying a real echo.
    pub start_depth_samples: usize,
    /// The same cutoff expressed as a depth \[m\].
    pub start_depth_m: f64,
    /// Speed of sound \[m/s\].
    pub speed_of_sound: f64,
}

impl Transducer {
    pub fn new(config: &GeometryConfig) -> Result<Transducer, GeometryError> {
        config.validate()?;

        let fc = config.centre_frequency;
        let c = config.speed_of_sound;
        let e = config.num_elements;
        let p = config.element_pitch;
        let fs = config.adc_ratio * fc;
        let wavelength = c / fc;

        // x_e = (e - (E-1)/2) * p puts the array centre on the origin.
        let half = (e as f64 - 1.0) / 2.0;
        let element_x = Array1::from_iter((0..e).map(|i| (i as f64 - half) * p));

        let (lo, hi) = config.angle_interval_deg;
        let a = config.num_angles;
        let angles_rad = Array1::from_iter((0..a).map(|j| {
            let deg = if a == 1 {
                lo
            } else {
                lo + (hi - lo) * j as f64 / (a as f64 - 1.0)
            };
            deg.to_radians()
        }));

        let start_depth_m = 2.0 * config.axial_cutoff_wavelengths * wavelength;
        let start_depth_samples = (start_depth_m / c * fs).round() as usize;

        Ok(Transducer {
            centre_frequency: fc,
            bandwidth: config.bandwidth,
            sampling_frequency: fs,
            wavelength,
            num_elements: e,
            element_pitch: p,
            element_x,
            aperture: e as f64 * p,
            f_number: config.resolved_f_number(),
            angles_rad,
            pinmap: config.resolved_pinmap()?,
            start_depth_samples,
            start_depth_m,
            speed_of_sound: c,
        })
    }
}

/// Medium-side derived geometry: the reconstruction pixel grid. The lateral
/// grid is shared with the transducer element positions; only the axial
/// grid lives here.
#[derive(Debug, Clone, PartialEq)]
pub struct Medium {
    pub speed_of_sound: f64,
    pub sampling_frequency: f64,
    /// Round-trip echo recording length T \[samples\].
    pub num_samples: usize,
    /// Axial pixel count Z, half the recording length.
    pub num_depths: usize,
    /// Axial pixel depths, z_0 = 0, strictly increasing \[m\].
    pub axial_z: Array1<f64>,
    /// Maximum imaging depth \[m\].
    pub max_depth_m: f64,
    pub max_depth_wavelengths: f64,
    /// Attenuation coefficient \[dB/(MHz^power cm)\], if known.
    pub attenuation_coefficient: Option<f64>,
    pub attenuation_power: Option<f64>,
}

impl Medium {
    pub fn new(config: &GeometryConfig) -> Result<Medium, GeometryError> {
        config.validate()?;

        let c = config.speed_of_sound;
        let fs = config.adc_ratio * config.centre_frequency;
        let wavelength = c / config.centre_frequency;
        let depth = config.max_depth_wavelengths;

        let max_depth_m = wavelength * depth;
        // Echoes travel there and back.
        let num_samples = (2.0 * max_depth_m / c * fs).round() as usize;
        let num_depths = (num_samples as f64 / 2.0).round() as usize;
        if num_samples == 0 || num_depths == 0 {
            return Err(GeometryError::NoEchoSamples);
        }

        let step = max_depth_m / num_depths as f64;
        let axial_z = Array1::from_iter((0..num_depths).map(|k| k as f64 * step));

        Ok(Medium {
            speed_of_sound: c,
            sampling_frequency: fs,
            num_samples,
            num_depths,
            axial_z,
            max_depth_m,
            max_depth_wavelengths: depth,
            attenuation_coefficient: config.attenuation_coefficient,
            attenuation_power: config.attenuation_power,
        })
    }
}
