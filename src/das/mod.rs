// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The delay-and-sum (DAS) receive beamformer.
//!
//! For every pixel, gather one sample from every channel at the
//! precomputed delay, weight it by the matching apodization entry and sum
//! across receive elements and transmit angles:
//!
//! `B[k, i] = sum_a sum_e S[delay[k,i,e,a], e, a] * W[k,i,e,a]`
//!
//! The gather element is the inner sum index `e`, never the pixel column.
//! Summation happens in the numeric domain of the signals: real RF data
//! yields a real frame, analytic (IQ) data a complex one. Axial rows are
//! independent and run data-parallel; the tables are read-only during the
//! kernel, so no locking is involved.

mod error;
pub use error::DasError;

use std::ops::Add;
use std::time::Instant;

use log::debug;
use ndarray::{parallel::prelude::*, prelude::*};
use num_complex::Complex;
use num_traits::Zero;

use crate::{
    apodization::{apodization_slab, build_apodization_table, ApodizationSpec},
    delays::{build_delay_table, delay_slab},
    geometry::{GeometryConfig, GeometryError, Medium, Transducer},
};

/// The numeric domain the kernel sums in: real RF samples or complex
/// analytic samples, weighted by real nonnegative apodization.
pub trait Sample: Copy + Send + Sync + Zero + Add<Output = Self> {
    /// Multiply by an apodization weight.
    fn scale(self, weight: f32) -> Self;
}

impl Sample for f32 {
    fn scale(self, weight: f32) -> Self {
        self * weight
    }
}

impl Sample for f64 {
    fn scale(self, weight: f32) -> Self {
        self * f64::from(weight)
    }
}

impl Sample for Complex<f32> {
    fn scale(self, weight: f32) -> Self {
        self * weight
    }
}

impl Sample for Complex<f64> {
    fn scale(self, weight: f32) -> Self {
        self * f64::from(weight)
    }
}

/// Beamform one frame with prebuilt tables.
///
/// `signals`: the conditioned channel data `[T, E, A]` (pinmap applied,
/// near field masked).
///
/// `delays`, `apodization`: matching `[Z, X, E, A]` tables from
/// [`build_delay_table`] and [`build_apodization_table`].
///
/// Shape mismatches are fatal. Delay entries are trusted in release
/// builds (the builder clamps them into the recording); debug builds
/// verify them and report the first offender.
pub fn beamform<S: Sample>(
    signals: ArrayView3<S>,
    delays: ArrayView4<i32>,
    apodization: ArrayView4<f32>,
) -> Result<Array2<S>, DasError> {
    check_table_shapes(delays.dim(), apodization.dim())?;
    check_signal_shape(signals.dim(), delays.dim().2, delays.dim().3)?;
    #[cfg(debug_assertions)]
    validate_delays(delays, signals.dim().0)?;

    let (num_depths, num_columns, _, _) = delays.dim();
    let mut frame = Array2::<S>::zeros((num_depths, num_columns));
    let start = Instant::now();
    das_accumulate(signals, delays, apodization, frame.view_mut());
    debug!(
        "beamformed a {num_depths}x{num_columns} frame in {:?}",
        start.elapsed()
    );
    Ok(frame)
}

/// Beamform one frame while building delay and apodization rows on the
/// fly, `slab_rows` axial rows at a time.
///
/// Produces the same frame as [`beamform`] with full tables, trading
/// recompute for memory: only `slab_rows * X * E * A` table entries are
/// alive at once.
pub fn beamform_streaming<S: Sample>(
    signals: ArrayView3<S>,
    transducer: &Transducer,
    medium: &Medium,
    spec: &ApodizationSpec,
    slab_rows: usize,
) -> Result<Array2<S>, DasError> {
    if slab_rows == 0 {
        return Err(DasError::EmptySlab);
    }
    let num_angles = transducer.angles_rad.len();
    check_signal_shape(signals.dim(), transducer.num_elements, num_angles)?;

    let num_depths = medium.num_depths;
    let mut frame = Array2::<S>::zeros((num_depths, transducer.num_elements));
    let mut row = 0;
    while row < num_depths {
        let end = (row + slab_rows).min(num_depths);
        let delays = delay_slab(transducer, medium, row..end);
        let apodization = apodization_slab(transducer, medium, spec, row..end);
        #[cfg(debug_assertions)]
        validate_delays(delays.view(), signals.dim().0)?;
        das_accumulate(
            signals,
            delays.view(),
            apodization.view(),
            frame.slice_mut(s![row..end, ..]),
        );
        row = end;
    }
    Ok(frame)
}

/// The gather-multiply-accumulate core. Reference order: angle outer,
/// then data-parallel axial rows, pixel columns, elements inner.
fn das_accumulate<S: Sample>(
    signals: ArrayView3<S>,
    delays: ArrayView4<i32>,
    apodization: ArrayView4<f32>,
    mut frame: ArrayViewMut2<S>,
) {
    let (num_depths, num_columns, num_elements, num_angles) = delays.dim();
    debug_assert_eq!(frame.dim(), (num_depths, num_columns));
    debug_assert_eq!(apodization.dim(), delays.dim());

    for a in 0..num_angles {
        let signals_a = signals.index_axis(Axis(2), a);
        let delays_a = delays.index_axis(Axis(3), a);
        let apodization_a = apodization.index_axis(Axis(3), a);
        frame
            .outer_iter_mut()
            .into_par_iter()
            .enumerate()
            .for_each(|(k, mut frame_row)| {
                let delay_row = delays_a.index_axis(Axis(0), k);
                let weight_row = apodization_a.index_axis(Axis(0), k);
                for (i, out) in frame_row.iter_mut().enumerate() {
                    let mut acc = S::zero();
                    for e in 0..num_elements {
                        let weight = weight_row[[i, e]];
                        // Zero weight marks an element outside the
                        // aperture; skip the gather entirely.
                        if weight == 0.0 {
                            continue;
                        }
                        let t = delay_row[[i, e]] as usize;
                        acc = acc + signals_a[[t, e]].scale(weight);
                    }
                    *out = *out + acc;
                }
            });
    }
}

/// Verify the builder invariant `0 <= delay < T`, reporting the first
/// offender. [`beamform`] runs this in debug builds only.
pub fn validate_delays(delays: ArrayView4<i32>, num_samples: usize) -> Result<(), DasError> {
    for ((k, i, e, a), &value) in delays.indexed_iter() {
        if value < 0 || value as usize >= num_samples {
            return Err(DasError::DelayOutOfRange {
                k,
                i,
                e,
                a,
                value,
                num_samples,
            });
        }
    }
    Ok(())
}

fn check_table_shapes(
    delays: (usize, usize, usize, usize),
    apodization: (usize, usize, usize, usize),
) -> Result<(), DasError> {
    if delays != apodization {
        return Err(DasError::TableShapeMismatch {
            delays,
            apodization,
        });
    }
    Ok(())
}

fn check_signal_shape(
    signals: (usize, usize, usize),
    expected_elements: usize,
    expected_angles: usize,
) -> Result<(), DasError> {
    if signals.1 != expected_elements || signals.2 != expected_angles {
        return Err(DasError::SignalShapeMismatch {
            signals,
            expected_elements,
            expected_angles,
        });
    }
    Ok(())
}

/// A beamformer bound to one acquisition geometry.
///
/// The delay and apodization tables are built lazily on the first frame
/// and cached for every subsequent frame with the same geometry; dropping
/// the beamformer frees them. For a typical probe the pair of tables runs
/// to hundreds of megabytes, which is why they are not rebuilt per frame.
pub struct PlanewaveBeamformer {
    transducer: Transducer,
    medium: Medium,
    spec: ApodizationSpec,
    tables: Option<BeamformTables>,
}

/// The cached table pair.
pub struct BeamformTables {
    pub delays: Array4<i32>,
    pub apodization: Array4<f32>,
}

impl PlanewaveBeamformer {
    pub fn new(
        config: &GeometryConfig,
        spec: ApodizationSpec,
    ) -> Result<PlanewaveBeamformer, GeometryError> {
        Ok(PlanewaveBeamformer {
            transducer: Transducer::new(config)?,
            medium: Medium::new(config)?,
            spec,
            tables: None,
        })
    }

    pub fn transducer(&self) -> &Transducer {
        &self.transducer
    }

    pub fn medium(&self) -> &Medium {
        &self.medium
    }

    /// The table pair, building it on first use.
    pub fn tables(&mut self) -> &BeamformTables {
        let transducer = &self.transducer;
        let medium = &self.medium;
        let spec = &self.spec;
        self.tables.get_or_insert_with(|| BeamformTables {
            delays: build_delay_table(transducer, medium),
            apodization: build_apodization_table(transducer, medium, spec),
        })
    }

    /// Beamform one frame of conditioned channel data.
    pub fn frame<S: Sample>(&mut self, signals: ArrayView3<S>) -> Result<Array2<S>, DasError> {
        let tables = self.tables();
        beamform(signals, tables.delays.view(), tables.apodization.view())
    }
}
