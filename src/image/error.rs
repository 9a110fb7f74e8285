// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Error type for image assembly.
 */

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ImageError {
    #[error("interpolation factors must be at least 1")]
    ScaleFactorZero,

    #[error(
        "axial clip window [{start_m} m, {stop_m} m] leaves no pixel rows"
    )]
    EmptyClipWindow { start_m: f64, stop_m: f64 },

    #[error("display range must be positive, got {0} dB")]
    DisplayRange(f64),
}
