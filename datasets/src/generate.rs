//! Utility functions for randomly generating kernel datasets

use kernfold::DatasetBase;
use kernfold_kernel::{PrecomputedKernel, Result};
use ndarray::{Array, Array2, ArrayBase, Data, Ix2};
use ndarray_rand::{rand::Rng, rand_distr::StandardNormal, RandomExt};

/// Gaussian kernel `exp(-|x_i - x_j|^2 / (2 * width))` between the rows of `features`
pub fn gaussian_kernel(features: &ArrayBase<impl Data<Elem = f64>, Ix2>, width: f64) -> Array2<f64> {
    let n = features.nrows();

    Array2::from_shape_fn((n, n), |(i, j)| {
        let dist = features
            .row(i)
            .iter()
            .zip(features.row(j).iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>();

        (-dist / (2.0 * width)).exp()
    })
}

/// Generates a random multi-target dataset on a precomputed kernel
///
/// Samples are drawn from a standard normal distribution in `nfeatures` dimensions. Each target
/// has a random normal weight vector `w` and marks a sample active if `x w > 0`. The records are
/// the Gaussian kernel of the samples with width `nfeatures`, the features themselves are
/// discarded.
///
/// Fails with `KernelError::Empty` if `nsamples` is zero.
///
/// # Example
/// ```
/// use kernfold_datasets::generate::kernel_dataset;
/// use rand::{rngs::SmallRng, SeedableRng};
///
/// let dataset = kernel_dataset(50, 3, 4, &mut SmallRng::seed_from_u64(42)).unwrap();
/// assert_eq!(dataset.targets().dim(), (50, 3));
/// ```
pub fn kernel_dataset(
    nsamples: usize,
    ntargets: usize,
    nfeatures: usize,
    rng: &mut impl Rng,
) -> Result<DatasetBase<PrecomputedKernel<f64>, Array2<bool>>> {
    let features: Array2<f64> = Array::random_using((nsamples, nfeatures), StandardNormal, rng);
    let weights: Array2<f64> = Array::random_using((nfeatures, ntargets), StandardNormal, rng);

    let targets = features.dot(&weights).mapv(|x| x > 0.0);
    let matrix = gaussian_kernel(&features, nfeatures.max(1) as f64);

    let kernel = PrecomputedKernel::new(matrix)?;

    Ok(DatasetBase::new(kernel, targets))
}
