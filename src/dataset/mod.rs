//! Datasets
//!
//! This module implements the dataset struct and various helper traits to extend its
//! functionality.
use ndarray::{Array2, ArrayBase, ArrayView1, ArrayView2, Axis, Ix2, OwnedRepr, ScalarOperand};

use num_traits::{AsPrimitive, FromPrimitive, NumAssignOps, NumCast, Signed};

use std::fmt;
use std::iter::Sum;

use crate::error::{Error, Result};

mod folding;
mod impl_dataset;
mod impl_records;
mod impl_targets;
mod stratify;

pub use folding::{Fold, StratifiedKFold, StratifiedKFoldParams, StratifiedKFoldValidParams};
pub use stratify::{active_count_strata, active_counts};

/// Floating point numbers
///
/// This trait bound multiplexes to the most common assumption of floating point number and
/// implement them for 32bit and 64bit floating points. They are used in kernel matrices and
/// decision values.
pub trait Float:
    FromPrimitive
    + num_traits::Float
    + PartialOrd
    + Sync
    + Send
    + Default
    + fmt::Display
    + fmt::Debug
    + Signed
    + Sum
    + NumAssignOps
    + AsPrimitive<usize>
    + ScalarOperand
    + approx::AbsDiffEq
{
    fn cast<T: NumCast>(x: T) -> Self {
        NumCast::from(x).unwrap()
    }
}

impl Float for f32 {}

impl Float for f64 {}

/// DatasetBase
///
/// This is the fundamental structure of a dataset. It contains a number of records about the data
/// and the targets belonging to each sample, optionally with a name per target.
///
/// # Fields
///
/// * `records`: a two-dimensional matrix with dimensionality (nsamples, nfeatures), in case of
/// kernel methods a quadratic matrix with dimensionality (nsamples, nsamples)
/// * `targets`: a one- or two-dimensional matrix with dimensionality (nsamples, ntargets)
/// * `target_names`: optional descriptive names with dimensionality (ntargets)
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetBase<R, T>
where
    R: Records,
{
    pub records: R,
    pub targets: T,

    target_names: Vec<String>,
}

/// Dataset
///
/// The most commonly used typed of dataset. It contains a number of records stored as an
/// `Array2` and each record may correspond to multiple targets, stored as an `Array2`.
pub type Dataset<D, T> = DatasetBase<ArrayBase<OwnedRepr<D>, Ix2>, ArrayBase<OwnedRepr<T>, Ix2>>;

/// Record trait
pub trait Records: Sized {
    type Elem;

    fn nsamples(&self) -> usize;
    fn nfeatures(&self) -> usize;
}

/// Restrict records to a subset of samples
///
/// Cross-validation needs two views of the records for every fold. The training records only
/// contain the training samples, the cross records relate validation samples to the training
/// samples. For a plain feature matrix both are row selections; for a precomputed kernel the
/// training records are the block `K[train, train]` and the cross records are `K[valid, train]`.
pub trait SelectSamples: Records {
    type Train: Records;
    type Cross: Records;

    /// Select the records of `indices`, relative to each other
    fn select_train(&self, indices: &[usize]) -> Self::Train;

    /// Select the records of `rows`, relative to the samples `cols`
    fn select_cross(&self, rows: &[usize], cols: &[usize]) -> Self::Cross;
}

/// Return a reference to single or multiple target variables
pub trait AsTargets {
    type Elem;

    /// Returns a view on targets as two-dimensional array
    fn as_multi_targets(&self) -> ArrayView2<Self::Elem>;

    /// Convert to single target, fails for more than one target
    ///
    /// # Returns
    ///
    /// May return a single target with the same label type, but returns an
    /// `Error::MultipleTargets` in case that there are more than a single target.
    fn try_single_target(&self) -> Result<ArrayView1<Self::Elem>> {
        let multi_targets = self.as_multi_targets();

        if multi_targets.len_of(Axis(1)) > 1 {
            return Err(Error::MultipleTargets);
        }

        Ok(multi_targets.index_axis_move(Axis(1), 0))
    }
}

impl<F: Float> SelectSamples for Array2<F> {
    type Train = Array2<F>;
    type Cross = Array2<F>;

    fn select_train(&self, indices: &[usize]) -> Array2<F> {
        self.select(Axis(0), indices)
    }

    fn select_cross(&self, rows: &[usize], _cols: &[usize]) -> Array2<F> {
        self.select(Axis(0), rows)
    }
}
