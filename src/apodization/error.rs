// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Error type for apodization options.
 */

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ApodizationError {
    #[error("unknown window '{0}'; expected one of rect, hann, blackman")]
    UnknownWindow(String),

    #[error("unknown rounding parity '{0}'; expected odd or even")]
    UnknownParity(String),
}
