// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Error type for the delay-and-sum kernel. Shape mismatches are fatal and
name the offending array.
 */

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum DasError {
    #[error(
        "delay table is {delays:?} but apodization table is {apodization:?}; \
         the tables must share one Z x X x E x A shape"
    )]
    TableShapeMismatch {
        delays: (usize, usize, usize, usize),
        apodization: (usize, usize, usize, usize),
    },

    #[error(
        "signal cube is {signals:?} (T x E x A) but the tables expect \
         E = {expected_elements}, A = {expected_angles}"
    )]
    SignalShapeMismatch {
        signals: (usize, usize, usize),
        expected_elements: usize,
        expected_angles: usize,
    },

    #[error(
        "delay {value} at [{k}, {i}, {e}, {a}] is outside the recording \
         (T = {num_samples})"
    )]
    DelayOutOfRange {
        k: usize,
        i: usize,
        e: usize,
        a: usize,
        value: i32,
        num_samples: usize,
    },

    #[error("streaming slab size must be at least 1 axial row")]
    EmptySlab,
}
