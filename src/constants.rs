// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. `bmode` should do as many
calculations as possible in double precision before converting to a lower
precision, if it is ever required.
 */

pub use std::f64::consts::{PI, TAU};

/// The receive f-number used when neither an explicit focus number nor an
/// elevation focus is supplied.
pub const DEFAULT_F_NUMBER: f64 = 1.7;

/// Decibels per neper, used to convert attenuation coefficients into the
/// exponential gain law.
pub const DB_PER_NEPER: f64 = 8.686;

/// Attenuation coefficients are conventionally quoted per centimetre.
pub const CM_PER_M: f64 = 100.0;

/// Image axes are displayed in millimetres.
pub const MM_PER_M: f64 = 1000.0;

/// The Gaussian-window standard deviation (in samples) used for band-pass
/// FIR design. MATLAB convention.
pub const FIR_GAUSSIAN_STD: f64 = 2.5;
