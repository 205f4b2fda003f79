use kernfold::Float;
use kernfold_kernel::PrecomputedKernel;
use ndarray::Array1;

/// Kernel matrix with permutable columns
///
/// This struct wraps a kernel matrix with access indices. The working set can shrink during the
/// optimization and it is therefore necessary to reorder entries. Entries are returned as
/// `Q_ij = y_i y_j K_ij`.
pub struct PermutableKernel<'a, F: Float> {
    kernel: &'a PrecomputedKernel<F>,
    kernel_diag: Array1<F>,
    kernel_indices: Vec<usize>,
    targets: Vec<bool>,
}

impl<'a, F: Float> PermutableKernel<'a, F> {
    pub fn new(kernel: &'a PrecomputedKernel<F>, targets: Vec<bool>) -> PermutableKernel<'a, F> {
        let kernel_diag = kernel.diagonal();
        let kernel_indices = (0..kernel.size()).collect::<Vec<_>>();

        PermutableKernel {
            kernel,
            kernel_diag,
            kernel_indices,
            targets,
        }
    }

    /// Swap two indices
    pub fn swap_indices(&mut self, i: usize, j: usize) {
        self.kernel_indices.swap(i, j);
    }

    /// Return signed similarities from position `idx` to the first `length` positions
    pub fn distances(&self, idx: usize, length: usize) -> Vec<F> {
        let idx = self.kernel_indices[idx];

        let kernel = self.kernel.column(idx);
        let target_i = self.targets[idx];

        // reorder entries
        self.kernel_indices[..length]
            .iter()
            .map(|j| {
                let val = kernel[*j];

                if self.targets[*j] != target_i {
                    -val
                } else {
                    val
                }
            })
            .collect()
    }

    /// Return distance to itself
    pub fn self_distance(&self, idx: usize) -> F {
        self.kernel_diag[self.kernel_indices[idx]]
    }
}

#[cfg(test)]
mod tests {
    use super::PermutableKernel;
    use kernfold_kernel::PrecomputedKernel;
    use ndarray::array;

    #[test]
    fn signed_and_permuted() {
        let kernel = PrecomputedKernel::new(array![
            [1.0, 0.2, 0.3],
            [0.2, 2.0, 0.4],
            [0.3, 0.4, 3.0]
        ])
        .unwrap();
        let mut permutable = PermutableKernel::new(&kernel, vec![true, false, true]);

        assert_eq!(permutable.distances(0, 3), vec![1.0, -0.2, 0.3]);
        assert_eq!(permutable.distances(1, 2), vec![-0.2, 2.0]);
        assert_eq!(permutable.self_distance(2), 3.0);

        permutable.swap_indices(0, 2);
        assert_eq!(permutable.self_distance(0), 3.0);
        assert_eq!(permutable.distances(0, 3), vec![3.0, -0.4, 0.3]);
        assert_eq!(permutable.distances(1, 3), vec![-0.4, 2.0, -0.2]);
    }
}
