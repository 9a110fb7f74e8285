// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! B-mode image assembly.
//!
//! Thin glue after the beamformer: envelope magnitude, optional separable
//! bicubic upsampling, axial clipping to the physical depth window, and
//! log compression onto the 0-255 display scale.

mod error;
pub use error::ImageError;
#[cfg(test)]
mod tests;

use std::ops::Range;

use ndarray::prelude::*;
use num_complex::Complex;

use crate::{constants::MM_PER_M, geometry::Medium, geometry::Transducer};

/// The envelope of a beamformed analytic frame.
pub fn envelope(frame: ArrayView2<Complex<f32>>) -> Array2<f32> {
    frame.mapv(|v| v.norm())
}

/// Log-compress an envelope image onto the display scale.
///
/// `L = 20 log10(|B| / max |B|)` clamped to `[-range_db, 0]`, then mapped
/// to `[0, 255]`. An all-zero image maps to all zeros.
pub fn log_compress(image: ArrayView2<f32>, range_db: f64) -> Result<Array2<f32>, ImageError> {
    if range_db <= 0.0 {
        return Err(ImageError::DisplayRange(range_db));
    }
    let range = range_db as f32;
    let peak = image.iter().fold(0.0f32, |acc, &v| acc.max(v));
    if peak <= 0.0 {
        return Ok(Array2::zeros(image.raw_dim()));
    }
    Ok(image.mapv(|v| {
        let db = (20.0 * (v / peak).log10()).clamp(-range, 0.0);
        (255.0 * (db + range) / range).round()
    }))
}

/// Upsample by integer factors with separable cubic convolution
/// (Catmull-Rom). A factor of 1 leaves that axis untouched; source pixels
/// are reproduced exactly at multiples of the factor.
pub fn upsample_bicubic(
    image: ArrayView2<f32>,
    axial_factor: usize,
    lateral_factor: usize,
) -> Result<Array2<f32>, ImageError> {
    if axial_factor == 0 || lateral_factor == 0 {
        return Err(ImageError::ScaleFactorZero);
    }
    let axial = upsample_axis(image, axial_factor, Axis(0));
    Ok(upsample_axis(axial.view(), lateral_factor, Axis(1)))
}

fn upsample_axis(image: ArrayView2<f32>, factor: usize, axis: Axis) -> Array2<f32> {
    if factor == 1 {
        return image.to_owned();
    }
    let src_len = image.len_of(axis);
    let dst_len = src_len * factor;
    let other_len = image.len_of(Axis(1 - axis.0));

    let mut out = match axis.0 {
        0 => Array2::zeros((dst_len, other_len)),
        _ => Array2::zeros((other_len, dst_len)),
    };
    for lane in 0..other_len {
        for j in 0..dst_len {
            let u = j as f64 / factor as f64;
            let base = u.floor() as i64;
            let frac = u - base as f64;
            let mut acc = 0.0f64;
            for m in -1..=2i64 {
                let src = (base + m).clamp(0, src_len as i64 - 1) as usize;
                let value = match axis.0 {
                    0 => image[[src, lane]],
                    _ => image[[lane, src]],
                };
                acc += cubic_kernel(m as f64 - frac) * f64::from(value);
            }
            match axis.0 {
                0 => out[[j, lane]] = acc as f32,
                _ => out[[lane, j]] = acc as f32,
            }
        }
    }
    out
}

/// Catmull-Rom cubic convolution kernel (a = -1/2). Weights over any unit
/// offset sum to 1, so flat regions stay flat.
fn cubic_kernel(x: f64) -> f64 {
    const A: f64 = -0.5;
    let x = x.abs();
    if x <= 1.0 {
        (A + 2.0) * x.powi(3) - (A + 3.0) * x.powi(2) + 1.0
    } else if x < 2.0 {
        A * (x.powi(3) - 5.0 * x.powi(2) + 8.0 * x - 4.0)
    } else {
        0.0
    }
}

/// Keep the pixel rows whose depth lies in
/// `[start_depth_m, max_depth - top_clip_m]`. Returns the clipped image
/// and the surviving row range of the original grid.
pub fn clip_axial(
    image: ArrayView2<f32>,
    medium: &Medium,
    start_depth_m: f64,
    top_clip_m: f64,
) -> Result<(Array2<f32>, Range<usize>), ImageError> {
    let stop_m = medium.max_depth_m - top_clip_m;
    let rows: Vec<usize> = (0..medium.num_depths.min(image.dim().0))
        .filter(|&k| medium.axial_z[k] >= start_depth_m && medium.axial_z[k] <= stop_m)
        .collect();
    match (rows.first(), rows.last()) {
        (Some(&first), Some(&last)) => Ok((
            image.slice(s![first..=last, ..]).to_owned(),
            first..last + 1,
        )),
        _ => Err(ImageError::EmptyClipWindow {
            start_m: start_depth_m,
            stop_m,
        }),
    }
}

/// Millimetre axis vectors for an image of the given shape: axial depths
/// and lateral positions across the aperture, both starting at zero.
pub fn physical_extent_mm(
    transducer: &Transducer,
    medium: &Medium,
    shape: (usize, usize),
) -> (Array1<f64>, Array1<f64>) {
    let (rows, columns) = shape;
    let depth_mm = medium.max_depth_m * MM_PER_M;
    let aperture_mm = transducer.aperture * MM_PER_M;
    let axial = Array1::from_iter((0..rows).map(|k| k as f64 * depth_mm / rows as f64));
    let lateral = Array1::from_iter((0..columns).map(|i| i as f64 * aperture_mm / columns as f64));
    (axial, lateral)
}
