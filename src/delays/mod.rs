// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Plane-wave delay tables.
//!
//! For every pixel `(k, i)`, receive element `e` and transmit angle `a`,
//! the table holds the integer sample index into the channel data where the
//! echo from that pixel is expected: the round trip of a tilted plane
//! wave to the pixel and back to the element, rounded to samples.
//!
//! The table is `Z x X x E x A`, `i32`, built once per geometry and reused
//! for every frame. Entries whose round trip falls outside the recording
//! are stored as 0; the near-field mask guarantees sample 0 carries no
//! echo, so such entries contribute nothing to the sum.


use std::ops::Range;
use std::time::Instant;

use log::debug;
use ndarray::{parallel::prelude::*, prelude::*};

use crate::{
    geometry::{Medium, Transducer},
    math::sign,
};

/// Build the full delay table for this geometry.
///
/// Deterministic: identical inputs yield bit-identical tables.
pub fn build_delay_table(transducer: &Transducer, medium: &Medium) -> Array4<i32> {
    let start = Instant::now();
    let table = delay_slab(transducer, medium, 0..medium.num_depths);
    debug!(
        "built {}x{}x{}x{} delay table in {:?}",
        table.dim().0,
        table.dim().1,
        table.dim().2,
        table.dim().3,
        start.elapsed()
    );
    table
}

/// Build delay rows for the axial range `rows` only. The streaming kernel
/// uses this to trade recompute for memory.
pub(crate) fn delay_slab(
    transducer: &Transducer,
    medium: &Medium,
    rows: Range<usize>,
) -> Array4<i32> {
    let num_elements = transducer.num_elements;
    let num_angles = transducer.angles_rad.len();
    let element_x = &transducer.element_x;
    let samples_per_metre = transducer.sampling_frequency / transducer.speed_of_sound;
    let max_sample = medium.num_samples as i64 - 1;

    // The plane-wave reference element sits at the transducer edge the
    // wavefront leaves last: the right edge for positive tilt, the left
    // for negative, the origin for a parallel wave.
    let x_edge = element_x[num_elements - 1];
    let per_angle: Vec<(f64, f64, f64)> = transducer
        .angles_rad
        .iter()
        .map(|&alpha| (alpha.cos(), alpha.sin(), sign(alpha) * x_edge))
        .collect();

    let row_start = rows.start;
    let mut table = Array4::<i32>::zeros((rows.len(), num_elements, num_elements, num_angles));
    table
        .outer_iter_mut()
        .into_par_iter()
        .enumerate()
        .for_each(|(rel_k, mut plane)| {
            let z = medium.axial_z[row_start + rel_k];
            for (i, mut columns) in plane.outer_iter_mut().enumerate() {
                let x_pixel = element_x[i];
                for (e, mut angles_out) in columns.outer_iter_mut().enumerate() {
                    let dx = x_pixel - element_x[e];
                    let rx_dist = (z * z + dx * dx).sqrt();
                    for (a, out) in angles_out.iter_mut().enumerate() {
                        let (cos_a, sin_a, x_tx0) = per_angle[a];
                        let tx_dist = z * cos_a + (x_pixel - x_tx0) * sin_a;
                        let sample = ((tx_dist + rx_dist) * samples_per_metre).round() as i64;
                        *out = if (0..=max_sample).contains(&sample) {
                            sample as i32
                        } else {
                            0
                        };
                    }
                }
            }
        });
    table
}
