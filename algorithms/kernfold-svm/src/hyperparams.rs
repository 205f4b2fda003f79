use crate::{SolverParams, Svm, SvmError};
use kernfold::{Float, ParamGuard};
use std::marker::PhantomData;

/// SVM Hyperparameters
///
/// The SVM fitting process can be controlled in different ways. The C values penalize
/// misclassified training samples, separately for positive and negative samples, eps controls
/// the required precision. After setting the desired parameters a model can be fitted by calling
/// `fit` on a dataset with a precomputed kernel as records.
///
/// You can specify the expected return type with the turbofish syntax:
/// ```no_run
/// use kernfold_svm::Svm;
/// let model = Svm::<f64, bool>::params();
/// ```
///
/// ## Example
///
/// ```ignore
/// use kernfold_svm::Svm;
/// let model = Svm::<_, bool>::params()
///     .eps(1e-4)
///     .shrinking(true)
///     .pos_neg_weights(10.0, 1.0)
///     .fit(&dataset)?;
/// ```
///
#[derive(Debug, Clone, PartialEq)]
pub struct SvmValidParams<F: Float, T> {
    c: (F, F),
    solver_params: SolverParams<F>,
    phantom: PhantomData<T>,
}

impl<F: Float, T> SvmValidParams<F, T> {
    /// C values of positive and negative samples
    pub fn c(&self) -> (F, F) {
        self.c
    }

    pub fn solver_params(&self) -> &SolverParams<F> {
        &self.solver_params
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SvmParams<F: Float, T>(SvmValidParams<F, T>);

impl<F: Float, T> SvmParams<F, T> {
    /// Create hyper parameter set
    ///
    /// This creates a `SvmParams` and sets it to the default values:
    ///  * C values of (1, 1)
    ///  * Eps of 1e-3
    ///  * No shrinking
    ///  * At most `max(10^7, 100 n)` iterations for `n` training samples
    pub fn new() -> Self {
        Self(SvmValidParams {
            c: (F::one(), F::one()),
            solver_params: SolverParams {
                eps: F::cast(1e-3),
                shrinking: false,
                max_iterations: None,
            },
            phantom: PhantomData,
        })
    }

    /// Set the C value for positive and negative samples
    pub fn c(mut self, c: F) -> Self {
        self.0.c = (c, c);
        self
    }

    /// Set the C value for positive and negative samples separately
    pub fn pos_neg_weights(mut self, c_pos: F, c_neg: F) -> Self {
        self.0.c = (c_pos, c_neg);
        self
    }

    /// Set stopping condition
    ///
    /// This parameter controls the stopping condition. It checks whether the sum of gradients of
    /// the max violating pair is below this threshold and then stops the optimization proces.
    pub fn eps(mut self, new_eps: F) -> Self {
        self.0.solver_params.eps = new_eps;
        self
    }

    /// Shrink active variable set
    ///
    /// This parameter controls whether the active variable set is shrinked or not. This can speed
    /// up the optimization process, but may degredade the solution performance.
    pub fn shrinking(mut self, shrinking: bool) -> Self {
        self.0.solver_params.shrinking = shrinking;
        self
    }

    /// Limit the number of optimization steps
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.0.solver_params.max_iterations = Some(max_iterations);
        self
    }
}

impl<F: Float, L> Default for SvmParams<F, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float, L> Svm<F, L> {
    pub fn params() -> SvmParams<F, L> {
        SvmParams::new()
    }
}

impl<F: Float, L> ParamGuard for SvmParams<F, L> {
    type Checked = SvmValidParams<F, L>;
    type Error = SvmError;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        let eps = self.0.solver_params.eps;
        if eps <= F::zero() || !eps.is_finite() {
            return Err(SvmError::InvalidEps(eps.to_f32().unwrap_or(f32::NAN)));
        }

        let (c1, c2) = self.0.c;
        if c1 <= F::zero() || c2 <= F::zero() || !c1.is_finite() || !c2.is_finite() {
            return Err(SvmError::InvalidC((
                c1.to_f32().unwrap_or(f32::NAN),
                c2.to_f32().unwrap_or(f32::NAN),
            )));
        }

        if let Some(max_iterations) = self.0.solver_params.max_iterations {
            if max_iterations == 0 {
                return Err(SvmError::InvalidIterations(max_iterations));
            }
        }

        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Svm, SvmError};
    use kernfold::ParamGuard;

    #[test]
    fn defaults() {
        let params = Svm::<f64, bool>::params().check().unwrap();

        assert_eq!(params.c(), (1.0, 1.0));
        assert_eq!(params.solver_params().eps, 1e-3);
        assert!(!params.solver_params().shrinking);
        assert_eq!(params.solver_params().max_iterations, None);
    }

    #[test]
    fn setters() {
        let params = Svm::<f64, bool>::params()
            .c(10.0)
            .eps(1e-5)
            .shrinking(true)
            .max_iterations(500)
            .check()
            .unwrap();

        assert_eq!(params.c(), (10.0, 10.0));
        assert_eq!(params.solver_params().eps, 1e-5);
        assert!(params.solver_params().shrinking);
        assert_eq!(params.solver_params().max_iterations, Some(500));

        let params = Svm::<f64, bool>::params()
            .pos_neg_weights(7.0, 0.5)
            .check()
            .unwrap();
        assert_eq!(params.c(), (7.0, 0.5));
    }

    #[test]
    fn invalid_parameters() {
        let err = Svm::<f64, bool>::params().c(0.0).check().unwrap_err();
        assert!(matches!(err, SvmError::InvalidC(_)));

        let err = Svm::<f64, bool>::params()
            .pos_neg_weights(1.0, f64::INFINITY)
            .check()
            .unwrap_err();
        assert!(matches!(err, SvmError::InvalidC(_)));

        let err = Svm::<f64, bool>::params().eps(-1.0).check().unwrap_err();
        assert!(matches!(err, SvmError::InvalidEps(_)));

        let err = Svm::<f64, bool>::params().eps(f64::NAN).check().unwrap_err();
        assert!(matches!(err, SvmError::InvalidEps(_)));

        let err = Svm::<f64, bool>::params()
            .max_iterations(0)
            .check()
            .unwrap_err();
        assert!(matches!(err, SvmError::InvalidIterations(0)));
    }
}
