//! Globally convergent Newton driver for systems of nonlinear equations.

use crate::config::NewtonConfig;
use crate::error::SolverError;
use crate::function::{euclidean_norm, max_abs, Merit, VectorFunction};
use crate::jacobian::forward_jacobian;
use crate::linalg::{LinearSolver, PartialPivLu};
use crate::line_search::{line_search, LineSearchOutcome};

use num_traits::Float;

/// How a solve attempt terminated.
///
/// Only [`Converged`](Termination::Converged) certifies a root. The two
/// stall variants replace the single overloaded boolean flag of the classic
/// formulation, which could not distinguish a genuine spurious minimum from
/// a line search that merely failed to progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// The residual max-norm fell below the residual tolerance.
    Converged,

    /// The relative step in `x` fell below the step tolerance: the iterates
    /// have stopped moving. Usually this is convergence to a root that the
    /// residual test will confirm on inspection.
    NoProgress,

    /// The line search stalled at a point where the merit-function gradient
    /// is near zero but the residual is not: a local minimum of `‖F‖` that
    /// is not a root. The returned `x` is not a solution; retry from a
    /// different initial guess.
    StalledMinimum,

    /// The line search stalled at a point that is not a merit minimum.
    /// Retry from a different initial guess.
    LineSearchStalled,
}

/// Result of a Newton solve attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct NewtonResult<T> {
    /// The final estimate of the root.
    pub x: Vec<T>,
    /// The residual `F(x)` at the final estimate, consistent with `x`.
    pub residual: Vec<T>,
    /// The merit value `½·‖F(x)‖²` at the final estimate.
    pub merit: T,
    /// Number of outer iterations performed (0 when the initial guess
    /// already satisfied the convergence threshold).
    pub iterations: usize,
    /// How the solve terminated.
    pub termination: Termination,
}

impl<T> NewtonResult<T> {
    /// Whether the returned `x` should be treated with suspicion.
    ///
    /// True when the solver stopped at a stationary point of the residual
    /// norm that it could not certify as a root; callers should inspect
    /// [`residual`](NewtonResult::residual) independently before using `x`.
    pub fn is_root_suspect(&self) -> bool {
        matches!(
            self.termination,
            Termination::StalledMinimum | Termination::LineSearchStalled
        )
    }
}

/// Globally convergent Newton root finder for `F: R^n -> R^n`.
///
/// Combines the Newton step (finite-difference Jacobian plus a dense linear
/// solve) with a backtracking line search on the merit function `½·‖F‖²`.
/// The line search guarantees monotone merit decrease on every accepted
/// iteration, which is what keeps the method from diverging where a plain
/// Newton iteration would.
///
/// # Cost per iteration
///
/// `n + 1` evaluations of `F` (one at the base point, `n` for the Jacobian
/// columns), one `O(n³)` dense solve, plus one evaluation of `F` per
/// line-search trial.
///
/// # Example
///
/// ```
/// use multiroot::NewtonSolver;
///
/// // Solve x² - 2 = 0 starting far from the root
/// let solver = NewtonSolver::with_defaults();
/// let f = |x: &[f64]| vec![x[0] * x[0] - 2.0];
///
/// let result = solver.solve(f, vec![6.0]).unwrap();
/// assert!((result.x[0] - std::f64::consts::SQRT_2).abs() < 1e-8);
/// assert!(!result.is_root_suspect());
/// ```
#[derive(Debug, Clone)]
pub struct NewtonSolver<T: Float> {
    /// Solver configuration
    config: NewtonConfig<T>,
}

impl<T: Float> NewtonSolver<T> {
    /// Create a new solver with the given configuration.
    pub fn new(config: NewtonConfig<T>) -> Self {
        Self { config }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: NewtonConfig::default(),
        }
    }

    /// Returns a reference to the solver configuration.
    pub fn config(&self) -> &NewtonConfig<T> {
        &self.config
    }

    /// Find a root of `func` starting from `x0`, using the built-in
    /// LU solver for the Newton systems.
    ///
    /// # Arguments
    ///
    /// * `func` - The system `F`, as a closure or [`VectorFunction`] value
    /// * `x0` - Initial guess; convergence is local to its basin
    ///
    /// # Returns
    ///
    /// * `Ok(NewtonResult)` - Terminated at a point; check
    ///   [`NewtonResult::termination`] before trusting `x`
    /// * `Err(SolverError)` - Fatal condition, see [`SolverError`]
    ///
    /// # Example
    ///
    /// ```
    /// use multiroot::NewtonSolver;
    ///
    /// // Intersection of the circle x² + y² = 2 with the line y = x
    /// let f = |x: &[f64]| vec![x[0] * x[0] + x[1] * x[1] - 2.0, x[0] - x[1]];
    ///
    /// let result = NewtonSolver::with_defaults().solve(f, vec![2.0, 1.0]).unwrap();
    /// assert!((result.x[0] - 1.0).abs() < 1e-8);
    /// assert!((result.x[1] - 1.0).abs() < 1e-8);
    /// ```
    pub fn solve<F>(&self, func: F, x0: Vec<T>) -> Result<NewtonResult<T>, SolverError>
    where
        F: VectorFunction<T>,
    {
        self.solve_with(func, x0, &PartialPivLu)
    }

    /// Find a root of `func` using a caller-supplied linear solver for the
    /// Newton systems.
    ///
    /// The driver never inspects the Jacobian after handing it to the
    /// solver, so any [`LinearSolver`] implementation (pivoted LU, QR, an
    /// external library) can be substituted.
    pub fn solve_with<F, S>(
        &self,
        func: F,
        x0: Vec<T>,
        solver: &S,
    ) -> Result<NewtonResult<T>, SolverError>
    where
        F: VectorFunction<T>,
        S: LinearSolver<T>,
    {
        let mut x = x0;
        let n = x.len();
        if n == 0 {
            return Err(SolverError::EmptyProblem);
        }

        let merit = Merit::new(&func);
        let (mut f, mut fvec) = merit.evaluate(&x);
        if fvec.len() != n {
            return Err(SolverError::DimensionMismatch {
                expected: n,
                got: fvec.len(),
            });
        }

        // The initial guess may already be a root; test against a threshold
        // stricter than the convergence one.
        let init_tolerance = T::from(0.01).unwrap() * self.config.residual_tolerance;
        if max_abs(&fvec) < init_tolerance {
            return Ok(NewtonResult {
                x,
                residual: fvec,
                merit: f,
                iterations: 0,
                termination: Termination::Converged,
            });
        }

        let step_max =
            self.config.max_step_scale * euclidean_norm(&x).max(T::from(n).unwrap());

        for iteration in 0..self.config.max_iterations {
            let mut jac = forward_jacobian(&func, &x, &fvec);

            // Gradient of the merit function: g = Jᵀ·F
            let mut g = vec![T::zero(); n];
            for i in 0..n {
                let mut sum = T::zero();
                for j in 0..n {
                    sum = sum + jac[(j, i)] * fvec[j];
                }
                g[i] = sum;
            }

            let x_old = x;
            let f_old = f;

            // Newton step: solve J·p = -F, overwriting the right-hand side.
            let mut p: Vec<T> = fvec.iter().map(|&v| -v).collect();
            solver
                .solve_in_place(&mut jac, &mut p)
                .map_err(|_| SolverError::SingularJacobian { iteration })?;

            let step = line_search(
                &merit,
                &x_old,
                f_old,
                &fvec,
                &g,
                p,
                step_max,
                self.config.step_tolerance,
            )?;
            x = step.x;
            f = step.merit;
            fvec = step.residual;

            if max_abs(&fvec) < self.config.residual_tolerance {
                return Ok(NewtonResult {
                    x,
                    residual: fvec,
                    merit: f,
                    iterations: iteration + 1,
                    termination: Termination::Converged,
                });
            }

            if step.outcome == LineSearchOutcome::NoProgress {
                let termination =
                    if merit_gradient_vanishes(&g, &x, f, self.config.gradient_tolerance) {
                        Termination::StalledMinimum
                    } else {
                        Termination::LineSearchStalled
                    };
                return Ok(NewtonResult {
                    x,
                    residual: fvec,
                    merit: f,
                    iterations: iteration + 1,
                    termination,
                });
            }

            // Relative step in x
            let mut test = T::zero();
            for i in 0..n {
                let temp = (x[i] - x_old[i]).abs() / x[i].abs().max(T::one());
                if temp > test {
                    test = temp;
                }
            }
            if test < self.config.step_tolerance {
                return Ok(NewtonResult {
                    x,
                    residual: fvec,
                    merit: f,
                    iterations: iteration + 1,
                    termination: Termination::NoProgress,
                });
            }
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
            residual_norm: max_abs(&fvec).to_f64().unwrap_or(f64::NAN),
        })
    }
}

/// Scale-normalised test for a vanishing merit-function gradient.
///
/// Distinguishes a genuine local minimum of `‖F‖` (gradient near zero
/// relative to the scales of `x` and the merit value) from a line search
/// that stalled elsewhere.
fn merit_gradient_vanishes<T: Float>(g: &[T], x: &[T], f: T, tolerance: T) -> bool {
    let n = g.len();
    let half = T::from(0.5).unwrap();
    let den = f.max(half * T::from(n).unwrap());
    let mut test = T::zero();
    for i in 0..n {
        let temp = g[i].abs() * x[i].abs().max(T::one()) / den;
        if temp > test {
            test = temp;
        }
    }
    test < tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // Driver behaviour
    // ========================================

    #[test]
    fn test_sqrt_two_from_far_guess() {
        let solver = NewtonSolver::with_defaults();
        let f = |x: &[f64]| vec![x[0] * x[0] - 2.0];

        let result = solver.solve(f, vec![6.0]).unwrap();
        assert_eq!(result.termination, Termination::Converged);
        assert!((result.x[0] - std::f64::consts::SQRT_2).abs() < 1e-8);
        assert!(!result.is_root_suspect());
    }

    #[test]
    fn test_atan_where_plain_newton_diverges() {
        // Newton's method without safeguards diverges for atan from |x| > ~1.39;
        // the line search must rescue it.
        let solver = NewtonSolver::with_defaults();
        let f = |x: &[f64]| vec![x[0].atan()];

        let result = solver.solve(f, vec![3.0]).unwrap();
        assert_eq!(result.termination, Termination::Converged);
        assert!(result.x[0].abs() < 1e-8);
    }

    #[test]
    fn test_already_converged_guess_returns_unchanged() {
        let solver = NewtonSolver::with_defaults();
        let f = |x: &[f64]| vec![x[0] - 1.0, x[1] - 2.0];

        let result = solver.solve(f, vec![1.0, 2.0]).unwrap();
        assert_eq!(result.iterations, 0);
        assert_eq!(result.termination, Termination::Converged);
        assert_eq!(result.x, vec![1.0, 2.0]);
        assert_eq!(result.merit, 0.0);
    }

    #[test]
    fn test_empty_initial_guess() {
        let solver: NewtonSolver<f64> = NewtonSolver::with_defaults();
        let f = |_: &[f64]| -> Vec<f64> { Vec::new() };
        let result = solver.solve(f, Vec::new());
        assert_eq!(result.unwrap_err(), SolverError::EmptyProblem);
    }

    #[test]
    fn test_dimension_mismatch() {
        let solver = NewtonSolver::with_defaults();
        let f = |x: &[f64]| vec![x[0], x[1], 0.0];
        let result = solver.solve(f, vec![1.0, 1.0]);
        assert_eq!(
            result.unwrap_err(),
            SolverError::DimensionMismatch {
                expected: 2,
                got: 3
            }
        );
    }

    #[test]
    fn test_iteration_budget_exhausted() {
        let solver = NewtonSolver::new(NewtonConfig::new(1e-8, 1));
        let f = |x: &[f64]| vec![x[0] * x[0] - 2.0];

        // One iteration from x = 6 cannot reach the root.
        let result = solver.solve(f, vec![6.0]);
        match result.unwrap_err() {
            SolverError::MaxIterationsExceeded {
                iterations,
                residual_norm,
            } => {
                assert_eq!(iterations, 1);
                assert!(residual_norm > 0.0);
            }
            other => panic!("expected MaxIterationsExceeded, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_linear_solver_is_used() {
        // A solver that always reports singularity: the driver must surface
        // SingularJacobian even for a perfectly regular system.
        struct AlwaysSingular;
        impl LinearSolver<f64> for AlwaysSingular {
            fn solve_in_place(
                &self,
                _a: &mut crate::SquareMatrix<f64>,
                _b: &mut [f64],
            ) -> Result<(), crate::LinearSolveError> {
                Err(crate::LinearSolveError::Singular)
            }
        }

        let solver = NewtonSolver::with_defaults();
        let f = |x: &[f64]| vec![x[0] - 1.0];
        let result = solver.solve_with(f, vec![5.0], &AlwaysSingular);
        assert_eq!(
            result.unwrap_err(),
            SolverError::SingularJacobian { iteration: 0 }
        );
    }

    // ========================================
    // Spurious-minimum classification
    // ========================================

    #[test]
    fn test_gradient_test_detects_merit_minimum() {
        // Tiny gradient relative to x and the merit value: a stalled
        // minimum of ‖F‖.
        let g = [1e-14, -2e-14];
        let x = [1.0, 1.0];
        assert!(merit_gradient_vanishes(&g, &x, 0.5, 1e-12));
    }

    #[test]
    fn test_gradient_test_rejects_live_gradient() {
        let g = [1e-3, 0.0];
        let x = [1.0, 1.0];
        assert!(!merit_gradient_vanishes(&g, &x, 0.5, 1e-12));
    }

    #[test]
    fn test_gradient_test_normalises_by_merit_value() {
        // The same gradient counts as vanishing when the merit value is
        // large enough to swamp it.
        let g = [1e-3, 0.0];
        let x = [1.0, 1.0];
        assert!(merit_gradient_vanishes(&g, &x, 1e12, 1e-12));
    }
}
