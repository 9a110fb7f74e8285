// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Receive apodization tables.
//!
//! The receive aperture grows with depth to hold the f-number constant:
//! `N(z) = round_odd(z / (2 F p))` elements are active around the pixel
//! column, optionally tapered by a window. This preserves lateral
//! resolution near the surface and signal-to-noise at depth.
//!
//! The builder evaluates one dense window row per depth and slides it
//! along the element axis so its centre follows the pixel column;
//! apertures are truncated at the array edges, never wrapped. Weights are
//! angle-invariant and broadcast across the angle axis so the table
//! indexes exactly like the delay table.

mod error;
pub use error::ApodizationError;

use std::ops::Range;
use std::str::FromStr;
use std::time::Instant;

use log::debug;
use ndarray::{parallel::prelude::*, prelude::*};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    constants::TAU,
    geometry::{Medium, Transducer},
};

/// Receive window shape across the active aperture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Window {
    /// All-ones weights; the aperture is still depth-adaptive.
    #[default]
    Rect,
    Hann,
    Blackman,
}

impl Window {
    /// Parse a window name, reporting the rejected string on failure.
    pub fn parse(name: &str) -> Result<Window, ApodizationError> {
        Window::from_str(name).map_err(|_| ApodizationError::UnknownWindow(name.to_string()))
    }
}

/// Parity the aperture element count is rounded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum RoundingParity {
    /// Always odd, at least 1; the aperture centres exactly on an element.
    Odd,
    /// Always even, at least 2.
    Even,
}

impl RoundingParity {
    pub fn parse(name: &str) -> Result<RoundingParity, ApodizationError> {
        RoundingParity::from_str(name).map_err(|_| ApodizationError::UnknownParity(name.to_string()))
    }
}

/// How aperture masks are placed along the array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApertureMode {
    /// The aperture centre follows the pixel column (odd parity). This is
    /// the depth-adaptive form and the default.
    #[default]
    DepthAdaptive,
    /// A rectangular aperture centred on the array median, identical for
    /// every pixel column (even parity). The window selection is ignored.
    CentredMask,
}

/// Window and placement choices for the apodization builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApodizationSpec {
    pub window: Window,
    pub mode: ApertureMode,
}

/// The number of active elements at depth `z` for the given f-number and
/// element pitch, rounded to the requested parity.
pub fn active_elements(z: f64, f_number: f64, pitch: f64, parity: RoundingParity) -> usize {
    // Active aperture a(z) = z / (2 F) metres, in units of the pitch.
    let count = z / (2.0 * f_number * pitch);
    match parity {
        RoundingParity::Odd => (count.ceil() as usize / 2) * 2 + 1,
        RoundingParity::Even => ((count.ceil() as usize / 2) * 2).max(2),
    }
}

/// Build the full apodization table for this geometry, shape
/// `Z x X x E x A`, matching [`crate::delays::build_delay_table`].
pub fn build_apodization_table(
    transducer: &Transducer,
    medium: &Medium,
    spec: &ApodizationSpec,
) -> Array4<f32> {
    let start = Instant::now();
    let table = apodization_slab(transducer, medium, spec, 0..medium.num_depths);
    debug!(
        "built {}x{}x{}x{} apodization table ({spec:?}) in {:?}",
        table.dim().0,
        table.dim().1,
        table.dim().2,
        table.dim().3,
        start.elapsed()
    );
    table
}

/// Build apodization rows for the axial range `rows` only.
pub(crate) fn apodization_slab(
    transducer: &Transducer,
    medium: &Medium,
    spec: &ApodizationSpec,
    rows: Range<usize>,
) -> Array4<f32> {
    let num_elements = transducer.num_elements;
    let num_angles = transducer.angles_rad.len();
    let f_number = transducer.f_number;
    let pitch = transducer.element_pitch;

    let parity = match spec.mode {
        ApertureMode::DepthAdaptive => RoundingParity::Odd,
        ApertureMode::CentredMask => RoundingParity::Even,
    };
    let widths: Vec<usize> = rows
        .clone()
        .map(|k| active_elements(medium.axial_z[k], f_number, pitch, parity))
        .collect();

    let mut table = Array4::<f32>::zeros((rows.len(), num_elements, num_elements, num_angles));
    table
        .outer_iter_mut()
        .into_par_iter()
        .enumerate()
        .for_each(|(rel_k, mut plane)| {
            let width = widths[rel_k];
            match spec.mode {
                ApertureMode::DepthAdaptive => {
                    let samples = window_samples(spec.window, width);
                    let half = (width - 1) / 2;
                    for (i, mut columns) in plane.outer_iter_mut().enumerate() {
                        // Aperture centred on the co-located element,
                        // truncated at the array edges.
                        let first = i.saturating_sub(half);
                        let last = (i + half).min(num_elements - 1);
                        for e in first..=last {
                            let weight = samples[e + half - i];
                            columns.slice_mut(s![e, ..]).fill(weight);
                        }
                    }
                }
                ApertureMode::CentredMask => {
                    let width = width.min(num_elements);
                    let first = (num_elements - width) / 2;
                    for mut columns in plane.outer_iter_mut() {
                        for e in first..first + width {
                            columns.slice_mut(s![e, ..]).fill(1.0);
                        }
                    }
                }
            }
        });
    table
}

/// Window samples for an aperture of `n` elements.
///
/// The cosine windows are evaluated on `n + 2` points and the interior `n`
/// kept, so every in-aperture element carries a strictly positive weight
/// and the nonzero support is exactly the active element count.
pub(crate) fn window_samples(window: Window, n: usize) -> Vec<f32> {
    match window {
        Window::Rect => vec![1.0; n],
        Window::Hann => (1..=n)
            .map(|j| {
                let phase = TAU * j as f64 / (n + 1) as f64;
                (0.5 - 0.5 * phase.cos()) as f32
            })
            .collect(),
        Window::Blackman => (1..=n)
            .map(|j| {
                let phase = TAU * j as f64 / (n + 1) as f64;
                (0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos()) as f32
            })
            .collect(),
    }
}
