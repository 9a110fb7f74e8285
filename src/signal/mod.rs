// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! RF signal conditioning ahead of the beamformer.
//!
//! The kernel expects a cube `[T, E, A]` that has been depth-clipped,
//! pinmap-sorted and near-field masked; the helpers here do that, plus
//! time-gain compensation, band-pass filtering and the analytic-signal
//! (Hilbert) transform. All of it operates on in-memory arrays; loading
//! the acquisition container is the caller's business.

mod error;
pub use error::SignalError;

use std::str::FromStr;

use ndarray::{parallel::prelude::*, prelude::*};
use num_complex::Complex;
use num_traits::Zero;
use rustfft::FftPlanner;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    constants::{CM_PER_M, DB_PER_NEPER, FIR_GAUSSIAN_STD},
    geometry::{Medium, Transducer},
    math::{lcm, lerp, sinc},
};

/// Zero every sample before the first real echo. Establishes the
/// near-field invariant the delay-table clamp relies on: sample 0 carries
/// no signal.
pub fn mask_near_field<S: Copy + Zero>(signals: &mut Array3<S>, start_sample: usize) {
    let cut = start_sample.min(signals.dim().0);
    signals.slice_mut(s![..cut, .., ..]).fill(S::zero());
}

/// Truncate the recording to the first `num_samples` round-trip samples.
/// Recordings shorter than that are returned unchanged.
pub fn clip_to_depth<S: Copy>(signals: ArrayView3<S>, num_samples: usize) -> Array3<S> {
    let cut = num_samples.min(signals.dim().0);
    signals.slice(s![..cut, .., ..]).to_owned()
}

/// Reorder the channel axis so element `e` holds channel `pinmap[e]`.
pub fn apply_pinmap<S: Copy>(
    signals: ArrayView3<S>,
    pinmap: &[usize],
) -> Result<Array3<S>, SignalError> {
    let num_channels = signals.dim().1;
    if pinmap.len() != num_channels {
        return Err(SignalError::PinmapLength {
            got: pinmap.len(),
            expected: num_channels,
        });
    }
    if let Some(&entry) = pinmap.iter().find(|&&entry| entry >= num_channels) {
        return Err(SignalError::PinmapEntry {
            entry,
            num_channels,
        });
    }
    Ok(signals.select(Axis(1), pinmap))
}

/// How the time-gain curve is specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum TgcMode {
    /// Interpolate digital control points, the research-system convention.
    Points,
    /// Derive the curve from the medium's attenuation power law.
    Alpha,
}

impl TgcMode {
    pub fn parse(name: &str) -> Result<TgcMode, SignalError> {
        TgcMode::from_str(name).map_err(|_| SignalError::UnknownTgcMode(name.to_string()))
    }
}

/// A time-gain compensation curve source.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeGain {
    /// Control-point amplitudes of arbitrary length, resampled to the
    /// recording length.
    ControlPoints(Vec<f64>),
    /// `exp(alpha_np/m * distance)` with
    /// `alpha_dB/cm = coefficient * (fc in MHz)^power`.
    Attenuation { coefficient: f64, power: f64 },
}

impl TimeGain {
    /// The attenuation-law curve with the coefficient and power recorded
    /// in the medium.
    pub fn from_medium(medium: &Medium) -> Result<TimeGain, SignalError> {
        match (medium.attenuation_coefficient, medium.attenuation_power) {
            (Some(coefficient), Some(power)) => Ok(TimeGain::Attenuation { coefficient, power }),
            _ => Err(SignalError::MissingAttenuation),
        }
    }

    /// The per-sample gain waveform of length `medium.num_samples`.
    pub fn waveform(
        &self,
        transducer: &Transducer,
        medium: &Medium,
    ) -> Result<Array1<f64>, SignalError> {
        match self {
            TimeGain::ControlPoints(points) => {
                control_point_waveform(points, medium.num_samples)
            }
            TimeGain::Attenuation { coefficient, power } => Ok(attenuation_waveform(
                *coefficient,
                *power,
                transducer.centre_frequency,
                medium.speed_of_sound,
                medium.sampling_frequency,
                medium.num_samples,
            )),
        }
    }
}

/// Resample `points` to `num_samples` by piecewise-linear interpolation on
/// the common index grid `0..lcm(num_samples, points.len())`, holding the
/// last control point beyond its position.
fn control_point_waveform(points: &[f64], num_samples: usize) -> Result<Array1<f64>, SignalError> {
    if points.is_empty() {
        return Err(SignalError::EmptyControlPoints);
    }
    let num_points = points.len();
    let grid = lcm(num_samples, num_points);
    let sample_step = grid / num_samples;
    let point_step = grid / num_points;
    let waveform = Array1::from_iter((0..num_samples).map(|k| {
        let position = k * sample_step;
        let segment = position / point_step;
        if segment >= num_points - 1 {
            points[num_points - 1]
        } else {
            let frac = (position % point_step) as f64 / point_step as f64;
            lerp(points[segment], points[segment + 1], frac)
        }
    }));
    Ok(waveform)
}

/// The exponential attenuation-compensation curve.
fn attenuation_waveform(
    coefficient: f64,
    power: f64,
    centre_frequency: f64,
    speed_of_sound: f64,
    sampling_frequency: f64,
    num_samples: usize,
) -> Array1<f64> {
    let alpha_db_cm = coefficient * (centre_frequency * 1e-6).powf(power);
    let alpha_np_m = alpha_db_cm / DB_PER_NEPER * CM_PER_M;
    let metres_per_sample = speed_of_sound / sampling_frequency;
    Array1::from_iter(
        (0..num_samples).map(|k| (alpha_np_m * k as f64 * metres_per_sample).exp()),
    )
}

/// Multiply every channel by the per-sample gain waveform.
pub fn apply_tgc(
    signals: &mut Array3<f32>,
    waveform: ArrayView1<f64>,
) -> Result<(), SignalError> {
    let num_samples = signals.dim().0;
    if waveform.len() != num_samples {
        return Err(SignalError::WaveformLength {
            got: waveform.len(),
            expected: num_samples,
        });
    }
    signals
        .outer_iter_mut()
        .into_par_iter()
        .enumerate()
        .for_each(|(t, mut plane)| {
            let gain = waveform[t] as f32;
            plane.mapv_inplace(|v| v * gain);
        });
    Ok(())
}

/// Gaussian-windowed sinc band-pass coefficients.
///
/// Matches a `firwin(order, band, window=('gaussian', 2.5),
/// pass_zero=False, scale=False)` design: the difference of two low-pass
/// sincs under a Gaussian taper, no passband renormalisation.
pub fn bandpass_fir(
    order: usize,
    band: (f64, f64),
    sampling_frequency: f64,
) -> Result<Array1<f64>, SignalError> {
    if order < 2 {
        return Err(SignalError::FilterOrder(order));
    }
    let (low, high) = band;
    let nyquist = sampling_frequency / 2.0;
    if !(low > 0.0 && low < high && high < nyquist) {
        return Err(SignalError::BandEdges { low, high, nyquist });
    }

    let centre = (order - 1) as f64 / 2.0;
    let low_cut = 2.0 * low / sampling_frequency;
    let high_cut = 2.0 * high / sampling_frequency;
    let coefficients = Array1::from_iter((0..order).map(|n| {
        let offset = n as f64 - centre;
        let taper = (-0.5 * (offset / FIR_GAUSSIAN_STD).powi(2)).exp();
        (high_cut * sinc(high_cut * offset) - low_cut * sinc(low_cut * offset)) * taper
    }));
    Ok(coefficients)
}

/// Convolve every channel with the FIR coefficients along the sample axis,
/// same-mode (output length equals input length).
pub fn filter_signals(signals: ArrayView3<f32>, coefficients: ArrayView1<f64>) -> Array3<f32> {
    let (num_samples, _, num_angles) = signals.dim();
    let order = coefficients.len();
    let offset = (order - 1) / 2;

    let mut filtered = Array3::<f32>::zeros(signals.raw_dim());
    filtered
        .axis_iter_mut(Axis(1))
        .into_par_iter()
        .zip(signals.axis_iter(Axis(1)).into_par_iter())
        .for_each(|(mut out_ta, in_ta)| {
            for a in 0..num_angles {
                for t in 0..num_samples {
                    let mut acc = 0.0f64;
                    for (j, &c) in coefficients.iter().enumerate() {
                        let src = t as i64 + offset as i64 - j as i64;
                        if (0..num_samples as i64).contains(&src) {
                            acc += c * f64::from(in_ta[[src as usize, a]]);
                        }
                    }
                    out_ta[[t, a]] = acc as f32;
                }
            }
        });
    filtered
}

/// The analytic signal of every channel: FFT along the sample axis,
/// one-sided spectrum doubling, inverse FFT. The magnitude of the result
/// is the envelope of the RF signal.
pub fn analytic_signal(signals: ArrayView3<f32>) -> Array3<Complex<f32>> {
    let (num_samples, _, num_angles) = signals.dim();
    let mut planner = FftPlanner::<f32>::new();
    let forward = planner.plan_fft_forward(num_samples);
    let inverse = planner.plan_fft_inverse(num_samples);

    // Doubling coefficients for the one-sided spectrum.
    let mut doubling = vec![0.0f32; num_samples];
    doubling[0] = 1.0;
    if num_samples % 2 == 0 {
        doubling[num_samples / 2] = 1.0;
        for h in doubling.iter_mut().take(num_samples / 2).skip(1) {
            *h = 2.0;
        }
    } else {
        for h in doubling.iter_mut().take((num_samples + 1) / 2).skip(1) {
            *h = 2.0;
        }
    }

    let scale = 1.0 / num_samples as f32;
    let mut analytic = Array3::<Complex<f32>>::zeros(signals.raw_dim());
    analytic
        .axis_iter_mut(Axis(1))
        .into_par_iter()
        .zip(signals.axis_iter(Axis(1)).into_par_iter())
        .for_each(|(mut out_ta, in_ta)| {
            let mut buffer = vec![Complex::<f32>::zero(); num_samples];
            for a in 0..num_angles {
                for (b, &v) in buffer.iter_mut().zip(in_ta.slice(s![.., a]).iter()) {
                    *b = Complex::new(v, 0.0);
                }
                forward.process(&mut buffer);
                for (b, &h) in buffer.iter_mut().zip(doubling.iter()) {
                    *b = *b * h;
                }
                inverse.process(&mut buffer);
                for (o, &b) in out_ta.slice_mut(s![.., a]).iter_mut().zip(buffer.iter()) {
                    *o = b * scale;
                }
            }
        });
    analytic
}
