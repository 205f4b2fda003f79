use kernfold::dataset::Records;
use ndarray::{Array2, ArrayView1, ArrayView2};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Rectangular slice of a kernel matrix
///
/// Rows correspond to query samples, columns to reference samples. A block `K[valid, train]`
/// relates the held-out samples of a fold to the samples a model was trained on.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct KernelBlock<F> {
    matrix: Array2<F>,
}

impl<F> KernelBlock<F> {
    /// Wrap a (query, reference) similarity matrix
    pub fn new(matrix: Array2<F>) -> KernelBlock<F> {
        KernelBlock { matrix }
    }

    /// Number of query samples
    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of reference samples
    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    /// Similarities of query sample `i` to all reference samples
    ///
    /// # Panics
    ///
    /// If `i` is out of bounds
    pub fn row(&self, i: usize) -> ArrayView1<F> {
        self.matrix.row(i)
    }

    pub fn view(&self) -> ArrayView2<F> {
        self.matrix.view()
    }

    pub fn into_inner(self) -> Array2<F> {
        self.matrix
    }
}

impl<F> Records for KernelBlock<F> {
    type Elem = F;

    fn nsamples(&self) -> usize {
        self.nrows()
    }

    fn nfeatures(&self) -> usize {
        self.ncols()
    }
}
