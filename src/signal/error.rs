// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Error type for signal conditioning.
 */

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SignalError {
    #[error("unknown TGC mode '{0}'; expected points or alpha")]
    UnknownTgcMode(String),

    #[error("TGC needs at least one control point")]
    EmptyControlPoints,

    #[error("TGC waveform has {got} samples but the signal cube has {expected}")]
    WaveformLength { got: usize, expected: usize },

    #[error("attenuation TGC needs attenuation_coefficient and attenuation_power in the geometry")]
    MissingAttenuation,

    #[error("FIR order must be at least 2, got {0}")]
    FilterOrder(usize),

    #[error(
        "band edges ({low} Hz, {high} Hz) must satisfy 0 < low < high < Nyquist ({nyquist} Hz)"
    )]
    BandEdges { low: f64, high: f64, nyquist: f64 },

    #[error("pinmap has {got} entries; the signal cube has {expected} channels")]
    PinmapLength { got: usize, expected: usize },

    #[error("pinmap entry {entry} is outside the {num_channels} signal channels")]
    PinmapEntry { entry: usize, num_channels: usize },
}
