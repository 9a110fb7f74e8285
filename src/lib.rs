// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Plane-wave ultrasound receive beamformer.
//!
//! Reconstructs two-dimensional B-mode images from raw radio-frequency
//! channel data acquired with a linear-array transducer driven by one or
//! more plane-wave transmissions. The geometry derives per-pixel,
//! per-element delay and apodization tables once; a delay-and-sum kernel
//! then folds each incoming signal cube into an envelope-ready frame.

pub mod apodization;
pub mod constants;
pub mod das;
pub mod delays;
mod error;
pub mod geometry;
pub mod image;
pub(crate) mod math;
pub mod signal;

// Re-exports.
pub use apodization::{
    build_apodization_table, ApertureMode, ApodizationSpec, RoundingParity, Window,
};
pub use das::{beamform, beamform_streaming, BeamformTables, PlanewaveBeamformer, Sample};
pub use delays::build_delay_table;
pub use error::BmodeError;
pub use geometry::{GeometryConfig, Medium, Transducer};
