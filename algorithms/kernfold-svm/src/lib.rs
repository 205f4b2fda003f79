//! # Support Vector Machines on precomputed kernels
//!
//! Support Vector Machines seek a discriminant, which separates the data in an optimal way, e.g.
//! have the fewest numbers of miss-classifications and maximizes the margin between positive and
//! negative classes. A support vector contributes to the discriminant and is therefore important
//! for the classification task. The balance between the number of support vectors and model
//! performance is controlled with the C value, penalizing misclassified samples, and should be in
//! the interval (0, inf).
//!
//! More details can be found [here](https://en.wikipedia.org/wiki/Support_vector_machine)
//!
//! ## Precomputed kernels
//! The classifier never sees features. It is trained on the block `K[train, train]` of a
//! [`PrecomputedKernel`](kernfold_kernel::PrecomputedKernel) and predicts from the block
//! `K[query, train]` of similarities between query and training samples:
//! ```rust, ignore
//! let train = kernel.select_train(&train_idx);
//! let model = Svm::<_, bool>::params().c(10.0).fit(&DatasetBase::new(train, labels))?;
//!
//! let cross = kernel.select_cross(&valid_idx, &train_idx);
//! let prediction = model.predict(&cross);
//! ```
//!
//! # The solver
//! This implementation uses Sequential Minimal Optimization, a widely used optimization tool for
//! convex problems. It selects in each optimization step two variables and updates the variables.
//! In each step it performs:
//!
//! 1. Find a variable, which violates the KKT conditions for the optimization problem
//! 2. Pick a second variables and crate a pair (a1, a2)
//! 3. Optimize the pair (a1, a2)
//!
//! After a couple of iterations the solution may be optimal.
use kernfold::Float;
use kernfold_kernel::KernelBlock;
use ndarray::{Array1, ArrayView1};

use std::fmt;
use std::marker::PhantomData;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

mod classification;
pub mod error;
pub mod hyperparams;
mod permutable_kernel;
pub mod solver_smo;

pub use classification::fit_c;
pub use error::{Result, SvmError};
pub use hyperparams::{SvmParams, SvmValidParams};
pub use solver_smo::{SolverParams, Solution};

/// Reason for stopping
///
/// SMO can either exit because a threshold is reached or the iterations are maxed out. To
/// differentiate between both this flag is passed with the solution. Training sets with a single
/// class skip the solver altogether.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    ReachedThreshold,
    ReachedIterations,
    SingleClass,
}

/// Fitted Support Vector Machines model
///
/// This is the result of the SMO optimizer and contains the support vectors, given as positions
/// in the training set, and the quality of solution. The decision value of a query sample `x` is
/// `sum_s dual_coef_s * K(x, support_s) - rho`.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Svm<F: Float, T> {
    /// Training positions of the support vectors
    pub support: Vec<usize>,
    /// `y_s * alpha_s` of every support vector
    pub dual_coef: Array1<F>,
    pub rho: F,
    ntrain: usize,
    exit_reason: ExitReason,
    iterations: usize,
    obj: F,
    phantom: PhantomData<T>,
}

impl<F: Float, T> Svm<F, T> {
    pub(crate) fn from_solution(solution: Solution<F>, targets: &[bool]) -> Svm<F, T> {
        let (support, dual_coef): (Vec<_>, Vec<_>) = solution
            .alpha
            .iter()
            .zip(targets.iter())
            .enumerate()
            // around 1e-5 for f32 and 2e-14 for f64
            .filter(|(_, (a, _))| a.abs() > F::cast(100.) * F::epsilon())
            .map(|(i, (a, y))| (i, if *y { *a } else { -*a }))
            .unzip();

        Svm {
            support,
            dual_coef: Array1::from(dual_coef),
            rho: solution.rho,
            ntrain: targets.len(),
            exit_reason: solution.exit_reason,
            iterations: solution.iterations,
            obj: solution.obj,
            phantom: PhantomData,
        }
    }

    /// Model without support vectors, with decision value `+1` if `class` else `-1`
    pub(crate) fn constant(class: bool, ntrain: usize) -> Svm<F, T> {
        Svm {
            support: Vec::new(),
            dual_coef: Array1::zeros(0),
            rho: if class { -F::one() } else { F::one() },
            ntrain,
            exit_reason: ExitReason::SingleClass,
            iterations: 0,
            obj: F::zero(),
            phantom: PhantomData,
        }
    }

    /// Returns the number of support vectors
    pub fn nsupport(&self) -> usize {
        self.support.len()
    }

    /// Number of samples the model was trained on
    pub fn ntrain(&self) -> usize {
        self.ntrain
    }

    pub fn exit_reason(&self) -> ExitReason {
        self.exit_reason
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Value of the dual objective
    pub fn obj(&self) -> F {
        self.obj
    }

    /// Sums the similarities of a sample to the support vectors, scaled by their weight.
    ///
    /// ## Panics
    ///
    /// If `similarities` has fewer entries than training samples
    pub fn weighted_sum(&self, similarities: ArrayView1<F>) -> F {
        self.support
            .iter()
            .zip(self.dual_coef.iter())
            .map(|(s, a)| similarities[*s] * *a)
            .sum()
    }

    /// Decision values of all query samples in `block`
    ///
    /// ## Panics
    ///
    /// If the block has not one column per training sample
    pub fn decision_function(&self, block: &KernelBlock<F>) -> Array1<F> {
        assert_eq!(
            block.ncols(),
            self.ntrain,
            "The kernel block must have one column per training sample."
        );

        (0..block.nrows())
            .map(|i| self.weighted_sum(block.row(i)) - self.rho)
            .collect()
    }
}

/// Display solution
///
/// In order to understand the solution of the SMO solver the objective, number of iterations and
/// required support vectors are printed here.
impl<F: Float, T> fmt::Display for Svm<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_reason {
            ExitReason::ReachedThreshold => write!(
                f,
                "Exited after {} iterations with obj = {} and {} support vectors",
                self.iterations,
                self.obj,
                self.nsupport()
            ),
            ExitReason::ReachedIterations => write!(
                f,
                "Reached maximal iterations {} with obj = {} and {} support vectors",
                self.iterations,
                self.obj,
                self.nsupport()
            ),
            ExitReason::SingleClass => write!(
                f,
                "Constant model predicting {} for {} training samples of a single class",
                self.rho < F::zero(),
                self.ntrain
            ),
        }
    }
}
