use kernfold::{
    dataset::{AsTargets, DatasetBase},
    traits::{Fit, PredictInplace},
};
use kernfold_kernel::{KernelBlock, PrecomputedKernel};
use ndarray::Array1;
use tracing::{debug, warn};

use super::error::{Result, SvmError};
use super::permutable_kernel::PermutableKernel;
use super::solver_smo::SolverState;
use super::{Float, SolverParams, Svm, SvmValidParams};

/// Support Vector Classification with C-penalizing parameter
///
/// This methods solves a binary SVC problem with a penalizing parameter C between (0, inf). The
/// dual problem has the form
/// ```ignore
/// min_a 1/2*a^tQ a - e^T a s.t. y^t = 0, 0 <= a_i <= C_i
/// ```
/// with `Q_ij = y_i y_j K(x_i, x_j)` the kernel matrix.
///
/// # Parameters
///
/// * `params` - Solver parameters (threshold etc.)
/// * `kernel` - the kernel matrix `K`
/// * `targets` - the ground truth targets `y_i`
/// * `cpos` - C for positive targets
/// * `cneg` - C for negative targets
pub fn fit_c<F: Float>(
    params: SolverParams<F>,
    kernel: &PrecomputedKernel<F>,
    targets: &[bool],
    cpos: F,
    cneg: F,
) -> Svm<F, bool> {
    let bounds = targets
        .iter()
        .map(|x| if *x { cpos } else { cneg })
        .collect::<Vec<_>>();

    let solver = SolverState::new(
        vec![F::zero(); targets.len()],
        vec![-F::one(); targets.len()],
        targets.to_vec(),
        PermutableKernel::new(kernel, targets.to_vec()),
        bounds,
        params,
    );

    let solution = solver.solve();

    Svm::from_solution(solution, targets)
}

/// Fit a C-support vector classifier on a precomputed kernel
///
/// The records are the training block of the kernel, the targets a single boolean column.
/// Training columns containing only one class have no separating function, in this case a
/// constant model predicting the present class is returned.
impl<F: Float, T: AsTargets<Elem = bool>> Fit<PrecomputedKernel<F>, T, SvmError>
    for SvmValidParams<F, bool>
{
    type Object = Svm<F, bool>;

    fn fit(&self, dataset: &DatasetBase<PrecomputedKernel<F>, T>) -> Result<Self::Object> {
        let kernel = dataset.records();
        let targets = dataset.try_single_target()?;

        if kernel.size() != targets.len() {
            return Err(kernfold::Error::MismatchedShapes(format!(
                "kernel of size {} for {} targets",
                kernel.size(),
                targets.len()
            ))
            .into());
        }

        let npositive = targets.iter().filter(|x| **x).count();
        if npositive == 0 || npositive == targets.len() {
            let class = npositive > 0;
            warn!(
                samples = targets.len(),
                class, "training targets contain a single class, predicting a constant"
            );

            return Ok(Svm::constant(class, targets.len()));
        }

        let (cpos, cneg) = self.c();
        let model = fit_c(
            self.solver_params().clone(),
            kernel,
            &targets.to_vec(),
            cpos,
            cneg,
        );

        debug!(
            samples = targets.len(),
            positives = npositive,
            "{}",
            model
        );

        Ok(model)
    }
}

/// Predict activity of the query samples of a kernel block
///
/// The block has to hold the similarities of the query samples to the training samples of the
/// model, in training order. A query is active if its decision value is not negative.
impl<F: Float> PredictInplace<KernelBlock<F>, Array1<bool>> for Svm<F, bool> {
    fn predict_inplace(&self, block: &KernelBlock<F>, targets: &mut Array1<bool>) {
        assert_eq!(
            block.nrows(),
            targets.len(),
            "The number of data points must match the number of output targets."
        );

        for (target, value) in targets.iter_mut().zip(self.decision_function(block)) {
            *target = value >= F::zero();
        }
    }

    fn default_target(&self, block: &KernelBlock<F>) -> Array1<bool> {
        Array1::from_elem(block.nrows(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::fit_c;
    use crate::{ExitReason, SolverParams, Svm, SvmError};
    use approx::assert_abs_diff_eq;
    use kernfold::prelude::*;
    use kernfold_datasets::generate;
    use kernfold_kernel::{KernelBlock, PrecomputedKernel};
    use ndarray::{array, Array1, Array2, Axis};
    use rand::{rngs::SmallRng, SeedableRng};

    fn linear_kernel(x: &Array1<f64>) -> PrecomputedKernel<f64> {
        let n = x.len();
        PrecomputedKernel::new(Array2::from_shape_fn((n, n), |(i, j)| x[i] * x[j])).unwrap()
    }

    #[test]
    fn separates_points_on_a_line() {
        let x = array![-3.0, -2.0, -1.0, 1.0, 2.0, 3.0];
        let kernel = linear_kernel(&x);
        let targets = array![false, false, false, true, true, true];

        let model = Svm::<_, bool>::params()
            .c(100.0)
            .eps(1e-6)
            .fit(&DatasetBase::new(kernel.clone(), targets.clone()))
            .unwrap();

        assert_eq!(model.exit_reason(), ExitReason::ReachedThreshold);
        assert_eq!(model.support, vec![2, 3]);
        assert_abs_diff_eq!(model.dual_coef, array![-0.5, 0.5], epsilon = 1e-4);

        let all = (0..6).collect::<Vec<_>>();
        let block = kernel.select_cross(&all, &all);
        assert_abs_diff_eq!(model.decision_function(&block), x, epsilon = 1e-3);
        assert_eq!(model.predict(&block), targets);
    }

    #[test]
    fn predicts_queries_from_cross_block() {
        let x = array![-2.0, -1.0, 1.0, 2.0];
        let model = fit_c(
            SolverParams {
                eps: 1e-6,
                shrinking: false,
                max_iterations: None,
            },
            &linear_kernel(&x),
            &[false, false, true, true],
            10.0,
            10.0,
        );

        // queries at -0.5, 0.1 and 4.0 against the training points
        let queries = array![-0.5, 0.1, 4.0];
        let block = KernelBlock::new(Array2::from_shape_fn((3, 4), |(i, j)| queries[i] * x[j]));

        let prediction = model.predict(&block);
        assert_eq!(prediction, array![false, true, true]);
    }

    #[test]
    fn single_class_is_constant() {
        let kernel = PrecomputedKernel::new(Array2::<f64>::eye(3)).unwrap();

        let model = Svm::<f64, bool>::params()
            .fit(&DatasetBase::new(kernel.clone(), array![true, true, true]))
            .unwrap();
        assert_eq!(model.exit_reason(), ExitReason::SingleClass);
        assert_eq!(model.nsupport(), 0);

        let block = KernelBlock::new(Array2::<f64>::zeros((2, 3)));
        assert_eq!(model.predict(&block), array![true, true]);

        let model = Svm::<f64, bool>::params()
            .fit(&DatasetBase::new(kernel, array![false, false, false]))
            .unwrap();
        assert_eq!(model.predict(&block), array![false, false]);
    }

    #[test]
    fn rejects_mismatched_targets() {
        let kernel = PrecomputedKernel::new(Array2::<f64>::eye(3)).unwrap();

        let err = Svm::<f64, bool>::params()
            .fit(&DatasetBase::new(kernel.clone(), array![true, false]))
            .unwrap_err();
        assert!(matches!(
            err,
            SvmError::BaseCrate(kernfold::Error::MismatchedShapes(_))
        ));

        let err = Svm::<f64, bool>::params()
            .fit(&DatasetBase::new(kernel, array![[true, false], [false, true], [true, true]]))
            .unwrap_err();
        assert!(matches!(err, SvmError::BaseCrate(kernfold::Error::MultipleTargets)));
    }

    #[test]
    fn invalid_params_fail_fit() {
        let kernel = PrecomputedKernel::new(Array2::<f64>::eye(2)).unwrap();
        let err = Svm::<f64, bool>::params()
            .c(-1.0)
            .fit(&DatasetBase::new(kernel, array![true, false]))
            .unwrap_err();

        assert!(matches!(err, SvmError::InvalidC(_)));
    }

    #[test]
    fn generalizes_on_gaussian_kernel() {
        let mut rng = SmallRng::seed_from_u64(42);
        let dataset = generate::kernel_dataset(120, 1, 4, &mut rng).unwrap();
        let targets = dataset.targets().column(0).to_owned();

        let train = (0..80).collect::<Vec<_>>();
        let valid = (80..120).collect::<Vec<_>>();

        let train_set = DatasetBase::new(
            dataset.records().select_train(&train),
            targets.select(Axis(0), &train),
        );

        for shrinking in &[false, true] {
            let model = Svm::<_, bool>::params()
                .c(10.0)
                .shrinking(*shrinking)
                .fit(&train_set)
                .unwrap();

            assert!(model.nsupport() > 0);
            assert!(model.nsupport() <= 80);

            let prediction = model.predict(&dataset.records().select_cross(&valid, &train));
            let cm = prediction
                .confusion_matrix(&targets.select(Axis(0), &valid))
                .unwrap();

            assert!(cm.accuracy() > 0.7, "accuracy {}", cm.accuracy());
        }
    }
}
