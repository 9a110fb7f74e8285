// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all bmode-related errors. This should be the *only*
//! error enum callers outside the crate need to match on.

use thiserror::Error;

use crate::{
    apodization::ApodizationError, das::DasError, geometry::GeometryError, image::ImageError,
    signal::SignalError,
};

#[derive(Error, Debug)]
pub enum BmodeError {
    #[error("{0}")]
    Geometry(#[from] GeometryError),

    #[error("{0}")]
    Apodization(#[from] ApodizationError),

    #[error("{0}")]
    Das(#[from] DasError),

    #[error("{0}")]
    Signal(#[from] SignalError),

    #[error("{0}")]
    Image(#[from] ImageError),
}
