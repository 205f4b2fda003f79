//! Cosine normalization of kernel matrices
//!
use kernfold::{traits::Transformer, DatasetBase, Float};
use ndarray::Array2;

use crate::PrecomputedKernel;

/// Scale a kernel to unit self-similarity
///
/// Every entry is divided by the geometric mean of the corresponding diagonal entries,
/// `k'(a, b) = k(a, b) / sqrt(k(a, a) k(b, b))`. Samples without positive self-similarity are
/// mapped to a zero row and column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CosineNormalization;

impl<F: Float> Transformer<&PrecomputedKernel<F>, PrecomputedKernel<F>> for CosineNormalization {
    fn transform(&self, kernel: &PrecomputedKernel<F>) -> PrecomputedKernel<F> {
        let scale = kernel.diagonal().mapv(|d| {
            if d > F::zero() {
                F::one() / d.sqrt()
            } else {
                F::zero()
            }
        });

        let n = kernel.size();
        let matrix = Array2::from_shape_fn((n, n), |(i, j)| kernel.get(i, j) * scale[i] * scale[j]);

        PrecomputedKernel::from_checked(matrix)
    }
}

impl<F: Float> Transformer<PrecomputedKernel<F>, PrecomputedKernel<F>> for CosineNormalization {
    fn transform(&self, kernel: PrecomputedKernel<F>) -> PrecomputedKernel<F> {
        self.transform(&kernel)
    }
}

impl<F: Float, T> Transformer<DatasetBase<PrecomputedKernel<F>, T>, DatasetBase<PrecomputedKernel<F>, T>>
    for CosineNormalization
{
    /// Normalize the kernel records and keep targets and target names
    fn transform(
        &self,
        dataset: DatasetBase<PrecomputedKernel<F>, T>,
    ) -> DatasetBase<PrecomputedKernel<F>, T> {
        let normalized = self.transform(dataset.records());
        dataset.with_records(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::CosineNormalization;
    use crate::PrecomputedKernel;
    use approx::assert_abs_diff_eq;
    use kernfold::{traits::Transformer, DatasetBase};
    use ndarray::{array, Array1};

    #[test]
    fn unit_diagonal() {
        let kernel = PrecomputedKernel::new(array![[4., 2., 0.], [2., 1., 0.5], [0., 0.5, 9.]]).unwrap();
        let normalized = CosineNormalization.transform(&kernel);

        assert_abs_diff_eq!(normalized.diagonal(), Array1::ones(3));
        assert_abs_diff_eq!(normalized.get(0, 1), 1.0);
        assert_abs_diff_eq!(normalized.get(1, 2), 0.5 / 3.0);
        assert_abs_diff_eq!(normalized.get(2, 1), 0.5 / 3.0);
        assert!(normalized.check_symmetric(1e-12).is_ok());
    }

    #[test]
    fn zero_self_similarity_is_zeroed() {
        let kernel = PrecomputedKernel::new(array![[1., 0.3], [0.3, 0.]]).unwrap();
        let normalized = CosineNormalization.transform(kernel);

        let expected = array![[1., 0.], [0., 0.]];
        assert_abs_diff_eq!(normalized.view(), expected.view());
    }

    #[test]
    fn dataset_keeps_targets() {
        let kernel = PrecomputedKernel::new(array![[2., 1.], [1., 2.]]).unwrap();
        let dataset = DatasetBase::new(kernel, array![[true], [false]]).with_target_names(vec!["A549"]);

        let normalized = CosineNormalization.transform(dataset);
        assert_eq!(normalized.target_names(), &["A549"]);
        assert_eq!(normalized.targets(), &array![[true], [false]]);
        assert_abs_diff_eq!(normalized.records().get(0, 1), 0.5);
    }
}
