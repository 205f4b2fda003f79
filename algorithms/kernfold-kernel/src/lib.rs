//! ## Precomputed kernels
//!
//! Kernel methods only access their samples through pairwise similarities. When the similarity
//! is expensive or domain specific, for example a graph kernel between molecules, the full Gram
//! matrix is computed once and reused for every model.
//!
//! `kernfold-kernel` wraps such a matrix. A [`PrecomputedKernel`] is square, finite and can be
//! checked for symmetry. Cross-validation restricts it to the training block `K[train, train]`
//! and to the [`KernelBlock`] `K[valid, train]` used for prediction, both through the
//! [`SelectSamples`](kernfold::dataset::SelectSamples) trait.
//!
//! The [`CosineNormalization`] transformer rescales a kernel to unit self-similarity.

mod block;
mod error;
mod normalize;

pub use block::KernelBlock;
pub use error::{KernelError, Result};
pub use normalize::CosineNormalization;

use kernfold::dataset::{Records, SelectSamples};
use kernfold::Float;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// A square similarity matrix over samples
///
/// Row and column `i` both belong to sample `i`, in the same order as the target rows of the
/// dataset the kernel is used with.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct PrecomputedKernel<F> {
    matrix: Array2<F>,
}

impl<F: Float> PrecomputedKernel<F> {
    /// Wrap a Gram matrix
    ///
    /// # Errors
    ///
    /// * `KernelError::Empty` for a matrix without samples
    /// * `KernelError::NotSquare` if rows and columns differ
    /// * `KernelError::NonFinite` at the first `NaN` or infinite entry
    pub fn new(matrix: Array2<F>) -> Result<PrecomputedKernel<F>> {
        let (rows, cols) = matrix.dim();
        if rows != cols {
            return Err(KernelError::NotSquare { rows, cols });
        }
        if rows == 0 {
            return Err(KernelError::Empty);
        }

        if let Some(((row, col), _)) = matrix.indexed_iter().find(|(_, x)| !x.is_finite()) {
            return Err(KernelError::NonFinite { row, col });
        }

        Ok(PrecomputedKernel { matrix })
    }

    pub(crate) fn from_checked(matrix: Array2<F>) -> PrecomputedKernel<F> {
        PrecomputedKernel { matrix }
    }

    /// Check that `|k(i, j) - k(j, i)| <= tolerance` for all pairs
    ///
    /// Returns the first offending pair in row-major order of the upper triangle.
    pub fn check_symmetric(&self, tolerance: F) -> Result<()> {
        let n = self.size();

        for i in 0..n {
            for j in (i + 1)..n {
                let delta = (self.matrix[(i, j)] - self.matrix[(j, i)]).abs();
                if delta > tolerance {
                    return Err(KernelError::NotSymmetric {
                        row: i,
                        col: j,
                        delta: delta.to_f64().unwrap_or(f64::NAN),
                    });
                }
            }
        }

        Ok(())
    }

    /// Number of entries below zero
    pub fn negative_entries(&self) -> usize {
        self.matrix.iter().filter(|x| **x < F::zero()).count()
    }

    /// Largest absolute entry
    pub fn max_abs(&self) -> F {
        self.matrix
            .iter()
            .fold(F::zero(), |acc, x| if x.abs() > acc { x.abs() } else { acc })
    }

    /// Gives the size of the side of the square kernel matrix
    pub fn size(&self) -> usize {
        self.matrix.nrows()
    }

    /// Self-similarities of all samples
    pub fn diagonal(&self) -> Array1<F> {
        self.matrix.diag().to_owned()
    }

    /// Getter for a column of the kernel matrix
    ///
    /// # Panics
    ///
    /// If `i` is out of bounds
    pub fn column(&self, i: usize) -> ArrayView1<F> {
        self.matrix.column(i)
    }

    /// # Panics
    ///
    /// If `i` or `j` is out of bounds
    pub fn get(&self, i: usize, j: usize) -> F {
        self.matrix[(i, j)]
    }

    pub fn view(&self) -> ArrayView2<F> {
        self.matrix.view()
    }

    pub fn into_inner(self) -> Array2<F> {
        self.matrix
    }

    /// Square sub-kernel of the samples `indices`, in the given order
    ///
    /// # Panics
    ///
    /// If an index is out of bounds
    pub fn select(&self, indices: &[usize]) -> PrecomputedKernel<F> {
        let matrix = self
            .matrix
            .select(Axis(0), indices)
            .select(Axis(1), indices);

        PrecomputedKernel { matrix }
    }

    /// Similarities of the query samples `rows` to the reference samples `cols`
    ///
    /// # Panics
    ///
    /// If an index is out of bounds
    pub fn cross(&self, rows: &[usize], cols: &[usize]) -> KernelBlock<F> {
        KernelBlock::new(self.matrix.select(Axis(0), rows).select(Axis(1), cols))
    }
}

impl<F: Float> Records for PrecomputedKernel<F> {
    type Elem = F;

    fn nsamples(&self) -> usize {
        self.size()
    }

    fn nfeatures(&self) -> usize {
        self.size()
    }
}

impl<F: Float> SelectSamples for PrecomputedKernel<F> {
    type Train = PrecomputedKernel<F>;
    type Cross = KernelBlock<F>;

    fn select_train(&self, indices: &[usize]) -> PrecomputedKernel<F> {
        self.select(indices)
    }

    fn select_cross(&self, rows: &[usize], cols: &[usize]) -> KernelBlock<F> {
        self.cross(rows, cols)
    }
}
