use super::permutable_kernel::PermutableKernel;
use super::{ExitReason, Float};

/// Parameters of the solver routine
#[derive(Clone, Debug, PartialEq)]
pub struct SolverParams<F: Float> {
    /// Stopping condition
    pub eps: F,
    /// Should we shrink, e.g. ignore bounded alphas
    pub shrinking: bool,
    /// Upper limit of optimization steps, `max(10^7, 100 n)` if unset
    pub max_iterations: Option<usize>,
}

/// Status of alpha variables of the solver
#[derive(Clone, Debug, PartialEq)]
struct Alpha<F: Float> {
    value: F,
    upper_bound: F,
}

impl<F: Float> Alpha<F> {
    pub fn from(value: F, upper_bound: F) -> Alpha<F> {
        Alpha { value, upper_bound }
    }

    pub fn reached_upper(&self) -> bool {
        self.value >= self.upper_bound
    }

    pub fn free_floating(&self) -> bool {
        self.value < self.upper_bound && self.value > F::zero()
    }

    pub fn reached_lower(&self) -> bool {
        self.value <= F::zero()
    }

    pub fn val(&self) -> F {
        self.value
    }
}

/// Result of the optimization, alphas are in the order of the training samples
#[derive(Clone, Debug, PartialEq)]
pub struct Solution<F> {
    pub alpha: Vec<F>,
    pub rho: F,
    pub obj: F,
    pub iterations: usize,
    pub exit_reason: ExitReason,
}

/// Current state of the SMO solver
///
/// We are solving the dual problem with linear constraints
/// min_a f(a), s.t. y^Ta = 0, 0 <= a_t <= C_t, t = 1, ..., l
/// where f(a) = a^T Q a / 2 + p^T a
pub struct SolverState<'a, F: Float> {
    /// Gradient of each variable
    gradient: Vec<F>,
    /// Cached gradient contribution of the variables at their upper bound
    gradient_fixed: Vec<F>,
    /// Current value of each variable and in respect to bounds
    alpha: Vec<Alpha<F>>,
    /// Original position of each variable
    active_set: Vec<usize>,
    /// Number of active variables
    nactive: usize,
    unshrink: bool,

    /// Quadratic term of the problem
    kernel: PermutableKernel<'a, F>,
    /// Linear term of the problem
    p: Vec<F>,
    /// Targets we want to predict
    targets: Vec<bool>,
    /// Bounds per alpha
    bounds: Vec<F>,

    /// Parameters, e.g. stopping condition etc.
    params: SolverParams<F>,
}

#[allow(clippy::needless_range_loop)]
impl<'a, F: Float> SolverState<'a, F> {
    /// Initialize a solver state
    ///
    /// This is bounded by the lifetime of the kernel matrix, because it can quite large
    pub fn new(
        alpha: Vec<F>,
        p: Vec<F>,
        targets: Vec<bool>,
        kernel: PermutableKernel<'a, F>,
        bounds: Vec<F>,
        params: SolverParams<F>,
    ) -> SolverState<'a, F> {
        // initialize alpha status according to bound
        let alpha = alpha
            .into_iter()
            .zip(bounds.iter())
            .map(|(alpha, bound)| Alpha::from(alpha, *bound))
            .collect::<Vec<_>>();

        // initialize full active set
        let active_set = (0..alpha.len()).collect::<Vec<_>>();

        // initialize gradient
        let mut gradient = p.clone();
        let mut gradient_fixed = vec![F::zero(); alpha.len()];

        for i in 0..alpha.len() {
            // when we have reached alpha = F::zero(), then d(a) = p
            if !alpha[i].reached_lower() {
                let dist_i = kernel.distances(i, alpha.len());
                let alpha_i = alpha[i].val();

                // update gradient as d(a) = p + Q a
                for j in 0..alpha.len() {
                    gradient[j] += alpha_i * dist_i[j];
                }

                // Cache gradient when we reached the upper bound for a variable
                if alpha[i].reached_upper() {
                    for j in 0..alpha.len() {
                        gradient_fixed[j] += bounds[i] * dist_i[j];
                    }
                }
            }
        }

        SolverState {
            gradient,
            gradient_fixed,
            alpha,
            p,
            nactive: active_set.len(),
            unshrink: false,
            active_set,
            kernel,
            targets,
            bounds,
            params,
        }
    }

    /// Return number of active variables
    pub fn nactive(&self) -> usize {
        self.nactive
    }

    /// Return number of total variables
    pub fn ntotal(&self) -> usize {
        self.alpha.len()
    }

    /// Return target as positive/negative indicator
    pub fn target(&self, idx: usize) -> F {
        if self.targets[idx] {
            F::one()
        } else {
            -F::one()
        }
    }

    /// Return the k-th bound
    pub fn bound(&self, idx: usize) -> F {
        self.bounds[idx]
    }

    /// Swap two variables
    pub fn swap(&mut self, i: usize, j: usize) {
        self.gradient.swap(i, j);
        self.gradient_fixed.swap(i, j);
        self.alpha.swap(i, j);
        self.p.swap(i, j);
        self.active_set.swap(i, j);
        self.kernel.swap_indices(i, j);
        self.targets.swap(i, j);
        self.bounds.swap(i, j);
    }

    /// Reconstruct the gradients of inactive variables
    ///
    /// Shrinking stops the gradient updates of inactive variables, they are rebuilt from the
    /// cached contribution of bounded variables and the current free variables.
    fn reconstruct_gradient(&mut self) {
        let (nactive, ntotal) = (self.nactive(), self.ntotal());

        // if no variable is inactive, skip
        if nactive == ntotal {
            return;
        }

        // d(a_i) = G^_i + p_i + ...
        for j in nactive..ntotal {
            self.gradient[j] = self.gradient_fixed[j] + self.p[j];
        }

        let nfree: usize = (0..nactive)
            .filter(|x| self.alpha[*x].free_floating())
            .count();

        if nfree * ntotal > 2 * nactive * (ntotal - nactive) {
            for i in nactive..ntotal {
                let dist_i = self.kernel.distances(i, nactive);
                for j in 0..nactive {
                    if self.alpha[j].free_floating() {
                        self.gradient[i] += self.alpha[j].val() * dist_i[j];
                    }
                }
            }
        } else {
            for i in 0..nactive {
                if self.alpha[i].free_floating() {
                    let dist_i = self.kernel.distances(i, ntotal);
                    let alpha_i = self.alpha[i].val();
                    for j in nactive..ntotal {
                        self.gradient[j] += alpha_i * dist_i[j];
                    }
                }
            }
        }
    }

    /// Optimize the pair `(i, j)` analytically and update the gradients
    pub fn update(&mut self, working_set: (usize, usize)) {
        // working set indices are called i, j here
        let (i, j) = working_set;

        let dist_i = self.kernel.distances(i, self.nactive());
        let dist_j = self.kernel.distances(j, self.nactive());

        let bound_i = self.bound(i);
        let bound_j = self.bound(j);

        let old_alpha_i = self.alpha[i].val();
        let old_alpha_j = self.alpha[j].val();

        if self.targets[i] != self.targets[j] {
            let mut quad_coef = self.kernel.self_distance(i)
                + self.kernel.self_distance(j)
                + F::cast(2.0) * dist_i[j];
            if quad_coef <= F::zero() {
                quad_coef = F::cast(1e-10);
            }

            let delta = -(self.gradient[i] + self.gradient[j]) / quad_coef;
            let diff = old_alpha_i - old_alpha_j;

            // update parameters
            self.alpha[i].value += delta;
            self.alpha[j].value += delta;

            // bound to feasible solution
            if diff > F::zero() {
                if self.alpha[j].val() < F::zero() {
                    self.alpha[j].value = F::zero();
                    self.alpha[i].value = diff;
                }
            } else if self.alpha[i].val() < F::zero() {
                self.alpha[i].value = F::zero();
                self.alpha[j].value = -diff;
            }

            if diff > bound_i - bound_j {
                if self.alpha[i].val() > bound_i {
                    self.alpha[i].value = bound_i;
                    self.alpha[j].value = bound_i - diff;
                }
            } else if self.alpha[j].val() > bound_j {
                self.alpha[j].value = bound_j;
                self.alpha[i].value = bound_j + diff;
            }
        } else {
            let mut quad_coef = self.kernel.self_distance(i) + self.kernel.self_distance(j)
                - F::cast(2.0) * dist_i[j];
            if quad_coef <= F::zero() {
                quad_coef = F::cast(1e-10);
            }

            let delta = (self.gradient[i] - self.gradient[j]) / quad_coef;
            let sum = old_alpha_i + old_alpha_j;

            // update parameters
            self.alpha[i].value -= delta;
            self.alpha[j].value += delta;

            // bound to feasible solution
            if sum > bound_i {
                if self.alpha[i].val() > bound_i {
                    self.alpha[i].value = bound_i;
                    self.alpha[j].value = sum - bound_i;
                }
            } else if self.alpha[j].val() < F::zero() {
                self.alpha[j].value = F::zero();
                self.alpha[i].value = sum;
            }
            if sum > bound_j {
                if self.alpha[j].val() > bound_j {
                    self.alpha[j].value = bound_j;
                    self.alpha[i].value = sum - bound_j;
                }
            } else if self.alpha[i].val() < F::zero() {
                self.alpha[i].value = F::zero();
                self.alpha[j].value = sum;
            }
        }

        // update gradient
        let delta_alpha_i = self.alpha[i].val() - old_alpha_i;
        let delta_alpha_j = self.alpha[j].val() - old_alpha_j;

        for k in 0..self.nactive() {
            self.gradient[k] += dist_i[k] * delta_alpha_i + dist_j[k] * delta_alpha_j;
        }

        // update alpha status and gradient bar
        let ui = Alpha::from(old_alpha_i, bound_i).reached_upper();
        let uj = Alpha::from(old_alpha_j, bound_j).reached_upper();

        self.update_fixed_gradient(i, ui);
        self.update_fixed_gradient(j, uj);
    }

    /// Add or remove the cached contribution of `idx` if it entered or left its upper bound
    fn update_fixed_gradient(&mut self, idx: usize, was_upper: bool) {
        if was_upper == self.alpha[idx].reached_upper() {
            return;
        }

        let dist = self.kernel.distances(idx, self.ntotal());
        let bound = self.bound(idx);

        for k in 0..self.ntotal() {
            if was_upper {
                self.gradient_fixed[k] -= bound * dist[k];
            } else {
                self.gradient_fixed[k] += bound * dist[k];
            }
        }
    }

    /// Return max and min gradients of free variables
    pub fn max_violating_pair(&self) -> ((F, isize), (F, isize)) {
        // max { -y_i * grad(f)_i \i in I_up(\alpha) }
        let mut gmax1 = (-F::infinity(), -1);
        // max { y_i * grad(f)_i \i in U_low(\alpha) }
        let mut gmax2 = (-F::infinity(), -1);

        for i in 0..self.nactive() {
            if self.targets[i] {
                if !self.alpha[i].reached_upper() && -self.gradient[i] >= gmax1.0 {
                    gmax1 = (-self.gradient[i], i as isize);
                }
                if !self.alpha[i].reached_lower() && self.gradient[i] >= gmax2.0 {
                    gmax2 = (self.gradient[i], i as isize);
                }
            } else {
                if !self.alpha[i].reached_upper() && -self.gradient[i] >= gmax2.0 {
                    gmax2 = (-self.gradient[i], i as isize);
                }
                if !self.alpha[i].reached_lower() && self.gradient[i] >= gmax1.0 {
                    gmax1 = (self.gradient[i], i as isize);
                }
            }
        }

        (gmax1, gmax2)
    }

    /// Select optimal working set
    ///
    /// In each optimization step two variables are selected and then optimized. The indices are
    /// selected such that:
    ///  * i: maximizes -y_i * grad(f)_i, i in I_up(\alpha)
    ///  * j: minimizes the decrease of the objective value
    ///
    /// Returns `None` if the maximal violation is below the stopping threshold.
    pub fn select_working_set(&self) -> Option<(usize, usize)> {
        let (gmax, gmax2) = self.max_violating_pair();

        let i = if gmax.1 >= 0 {
            gmax.1 as usize
        } else {
            return None;
        };

        let mut obj_diff_min = (F::infinity(), None);
        let dist_i = self.kernel.distances(i, self.nactive());

        for (j, dist_ij) in dist_i.into_iter().enumerate() {
            let (feasible, grad_diff, sign) = if self.targets[j] {
                (
                    !self.alpha[j].reached_lower(),
                    gmax.0 + self.gradient[j],
                    -F::one(),
                )
            } else {
                (
                    !self.alpha[j].reached_upper(),
                    gmax.0 - self.gradient[j],
                    F::one(),
                )
            };

            if !feasible || grad_diff <= F::zero() {
                continue;
            }

            let quad_coef = self.kernel.self_distance(i)
                + self.kernel.self_distance(j)
                + sign * F::cast(2.0) * self.target(i) * dist_ij;

            let obj_diff = if quad_coef > F::zero() {
                -(grad_diff * grad_diff) / quad_coef
            } else {
                -(grad_diff * grad_diff) / F::cast(1e-10)
            };

            if obj_diff <= obj_diff_min.0 {
                obj_diff_min = (obj_diff, Some(j));
            }
        }

        match obj_diff_min.1 {
            Some(j) if gmax.0 + gmax2.0 >= self.params.eps => Some((i, j)),
            _ => None,
        }
    }

    pub fn should_shrunk(&self, i: usize, gmax1: F, gmax2: F) -> bool {
        if self.alpha[i].reached_upper() {
            if self.targets[i] {
                -self.gradient[i] > gmax1
            } else {
                -self.gradient[i] > gmax2
            }
        } else if self.alpha[i].reached_lower() {
            if self.targets[i] {
                self.gradient[i] > gmax2
            } else {
                self.gradient[i] > gmax1
            }
        } else {
            false
        }
    }

    pub fn do_shrinking(&mut self) {
        let (gmax1, gmax2) = self.max_violating_pair();
        let (gmax1, gmax2) = (gmax1.0, gmax2.0);

        // work on all variables when 10*eps is reached
        if !self.unshrink && gmax1 + gmax2 <= self.params.eps * F::cast(10.0) {
            self.unshrink = true;
            self.reconstruct_gradient();
            self.nactive = self.ntotal();
        }

        // swap items until working set is homogeneous
        let mut i = 0;
        while i < self.nactive() {
            if self.should_shrunk(i, gmax1, gmax2) {
                self.nactive -= 1;
                // only consider items behind this one
                while self.nactive > i {
                    if !self.should_shrunk(self.nactive(), gmax1, gmax2) {
                        self.swap(i, self.nactive());
                        break;
                    }
                    self.nactive -= 1;
                }
            }
            i += 1;
        }
    }

    pub fn calculate_rho(&self) -> F {
        let mut nfree = 0;
        let mut sum_free = F::zero();
        let mut ub = F::infinity();
        let mut lb = -F::infinity();

        for i in 0..self.nactive() {
            let yg = self.target(i) * self.gradient[i];

            if self.alpha[i].reached_upper() {
                if self.targets[i] {
                    lb = F::max(lb, yg);
                } else {
                    ub = F::min(ub, yg);
                }
            } else if self.alpha[i].reached_lower() {
                if self.targets[i] {
                    ub = F::min(ub, yg);
                } else {
                    lb = F::max(lb, yg);
                }
            } else {
                nfree += 1;
                sum_free += yg;
            }
        }

        if nfree > 0 {
            sum_free / F::cast(nfree)
        } else {
            (ub + lb) / F::cast(2.0)
        }
    }

    pub fn solve(mut self) -> Solution<F> {
        let ntotal = self.ntotal();
        let max_iter = self
            .params
            .max_iterations
            .unwrap_or_else(|| usize::max(10_000_000, ntotal.saturating_mul(100)));

        let mut iter = 0;
        let mut counter = usize::min(ntotal, 1000) + 1;

        while iter < max_iter {
            counter -= 1;
            if counter == 0 {
                counter = usize::min(ntotal, 1000);
                if self.params.shrinking {
                    self.do_shrinking();
                }
            }

            let working_set = match self.select_working_set() {
                Some(working_set) => working_set,
                None => {
                    // check optimality on the whole problem
                    self.reconstruct_gradient();
                    self.nactive = ntotal;

                    match self.select_working_set() {
                        // do shrinking next iteration
                        Some(working_set) => {
                            counter = 1;
                            working_set
                        }
                        None => break,
                    }
                }
            };

            iter += 1;

            // update alpha[i] and alpha[j]
            self.update(working_set);
        }

        if iter >= max_iter && self.nactive() < ntotal {
            self.reconstruct_gradient();
            self.nactive = ntotal;
        }

        let rho = self.calculate_rho();

        // calculate object function
        let mut v = F::zero();
        for i in 0..ntotal {
            v += self.alpha[i].val() * (self.gradient[i] + self.p[i]);
        }
        let obj = v / F::cast(2.0);

        let exit_reason = if iter >= max_iter {
            ExitReason::ReachedIterations
        } else {
            ExitReason::ReachedThreshold
        };

        // put back the solution
        let mut alpha = vec![F::zero(); ntotal];
        for (position, original) in self.active_set.iter().enumerate() {
            alpha[*original] = self.alpha[position].val();
        }

        Solution {
            alpha,
            rho,
            obj,
            iterations: iter,
            exit_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SolverParams, SolverState};
    use crate::permutable_kernel::PermutableKernel;
    use crate::ExitReason;
    use approx::assert_abs_diff_eq;
    use kernfold_kernel::PrecomputedKernel;
    use ndarray::{array, Array2};

    #[test]
    fn autotraits() {
        fn has_autotraits<T: Send + Sync + Sized + Unpin>() {}
        has_autotraits::<SolverState<f64>>();
        has_autotraits::<SolverParams<f64>>();
    }

    fn solve(
        kernel: &PrecomputedKernel<f64>,
        targets: &[bool],
        c: f64,
        shrinking: bool,
    ) -> super::Solution<f64> {
        let n = targets.len();
        let params = SolverParams {
            eps: 1e-6,
            shrinking,
            max_iterations: None,
        };

        SolverState::new(
            vec![0.0; n],
            vec![-1.0; n],
            targets.to_vec(),
            PermutableKernel::new(kernel, targets.to_vec()),
            vec![c; n],
            params,
        )
        .solve()
    }

    #[test]
    fn orthogonal_pair() {
        let kernel = PrecomputedKernel::new(array![[1.0, 0.0], [0.0, 1.0]]).unwrap();
        let solution = solve(&kernel, &[true, false], 10.0, false);

        assert_eq!(solution.exit_reason, ExitReason::ReachedThreshold);
        assert_eq!(solution.iterations, 1);
        assert_abs_diff_eq!(solution.alpha.as_slice(), &[1.0, 1.0][..]);
        assert_abs_diff_eq!(solution.rho, 0.0);
        assert_abs_diff_eq!(solution.obj, -1.0);
    }

    #[test]
    fn bounded_pair() {
        let kernel = PrecomputedKernel::new(array![[1.0, 0.0], [0.0, 1.0]]).unwrap();
        let solution = solve(&kernel, &[true, false], 0.5, false);

        // both variables end at the upper bound
        assert_abs_diff_eq!(solution.alpha.as_slice(), &[0.5, 0.5][..]);
        assert_abs_diff_eq!(solution.obj, -0.75);
    }

    #[test]
    fn linear_kernel_margin() {
        // one-dimensional points -2, -1, 1, 2 with a linear kernel
        let x = array![-2.0, -1.0, 1.0, 2.0];
        let kernel = PrecomputedKernel::new(Array2::from_shape_fn((4, 4), |(i, j)| x[i] * x[j]))
            .unwrap();
        let targets = [false, false, true, true];

        for shrinking in &[false, true] {
            let solution = solve(&kernel, &targets, 100.0, *shrinking);

            // w = sum_i a_i y_i x_i has unit length for the margin [-1, 1]
            let w: f64 = solution
                .alpha
                .iter()
                .zip(targets.iter())
                .zip(x.iter())
                .map(|((a, y), x)| if *y { a * x } else { -a * x })
                .sum();
            let balance: f64 = solution
                .alpha
                .iter()
                .zip(targets.iter())
                .map(|(a, y)| if *y { *a } else { -*a })
                .sum();

            assert_abs_diff_eq!(w, 1.0, epsilon = 1e-3);
            assert_abs_diff_eq!(balance, 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(solution.rho, 0.0, epsilon = 1e-3);
            assert_abs_diff_eq!(solution.obj, -0.5, epsilon = 1e-3);
        }
    }

    #[test]
    fn iteration_limit() {
        let kernel = PrecomputedKernel::new(array![
            [1.0, 0.5, 0.2, 0.1],
            [0.5, 1.0, 0.3, 0.2],
            [0.2, 0.3, 1.0, 0.6],
            [0.1, 0.2, 0.6, 1.0]
        ])
        .unwrap();
        let targets = vec![true, true, false, false];
        let params = SolverParams {
            eps: 1e-12,
            shrinking: false,
            max_iterations: Some(1),
        };

        let solution = SolverState::new(
            vec![0.0; 4],
            vec![-1.0; 4],
            targets.clone(),
            PermutableKernel::new(&kernel, targets),
            vec![1.0; 4],
            params,
        )
        .solve();

        assert_eq!(solution.iterations, 1);
        assert_eq!(solution.exit_reason, ExitReason::ReachedIterations);
    }
}
