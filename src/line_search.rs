//! Backtracking line search with Armijo sufficient decrease.

use crate::error::SolverError;
use crate::function::{dot, euclidean_norm, Merit, VectorFunction};

use num_traits::Float;

/// Sufficient-decrease parameter of the Armijo condition.
const ALPHA: f64 = 1e-4;

/// How the line search terminated.
///
/// The classic formulation reports both cases through one boolean `check`
/// flag; they are distinct situations and are kept distinct here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LineSearchOutcome {
    /// A step satisfying the sufficient-decrease condition was accepted.
    Accepted,
    /// No step above the minimum representable scale decreased the merit
    /// function; the returned point is `x_old` unchanged. The driver must
    /// decide whether this is a genuine merit minimum or a mere stall.
    NoProgress,
}

/// Accepted point of a line search, with the merit value and residual at
/// that point.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSearchStep<T> {
    /// The new point (equal to `x_old` when the outcome is
    /// [`LineSearchOutcome::NoProgress`]).
    pub x: Vec<T>,
    /// Merit value `½·‖F(x)‖²` at `x`.
    pub merit: T,
    /// Residual `F(x)` at `x`, consistent with `x`.
    pub residual: Vec<T>,
    /// How the search terminated.
    pub outcome: LineSearchOutcome,
}

/// Find a step along `direction` from `x_old` that sufficiently decreases
/// the merit function.
///
/// Starts from the full step (λ = 1) and backtracks: the first rejection
/// fits a quadratic model of the merit along the ray, later rejections fit
/// a cubic through the two most recent trials; each new λ is clamped to
/// `[0.1, 0.5]` of the previous one. A step is accepted when
/// `f(λ) <= f_old + 1e-4·λ·slope` (sufficient decrease), which guarantees
/// monotone merit decrease across accepted steps.
///
/// `direction` is scaled down first if its Euclidean norm exceeds
/// `step_max`. `residual_old` must be the residual at `x_old`; it is
/// returned unchanged when no progress is possible. `step_tolerance` floors
/// the smallest step scale attempted, relative to the magnitudes of `x_old`.
///
/// # Errors
///
/// [`SolverError::InvalidDescentDirection`] if `gradient · direction >= 0`;
/// the Jacobian/gradient/direction triple is inconsistent and the solve
/// attempt cannot continue.
///
/// # Example
///
/// ```
/// use multiroot::{line_search, LineSearchOutcome, Merit};
///
/// let f = |x: &[f64]| vec![x[0] - 2.0];
/// let merit = Merit::new(&f);
///
/// let x_old = [0.0];
/// let (f_old, residual_old) = merit.evaluate(&x_old);
/// let gradient = [-2.0]; // Jᵀ·F at x_old
/// let direction = vec![2.0]; // the Newton step
///
/// let step = line_search(
///     &merit, &x_old, f_old, &residual_old, &gradient, direction, 100.0, 1e-30,
/// )
/// .unwrap();
///
/// assert_eq!(step.outcome, LineSearchOutcome::Accepted);
/// assert!(step.merit < f_old);
/// assert!((step.x[0] - 2.0).abs() < 1e-12);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn line_search<T, F>(
    merit: &Merit<'_, F>,
    x_old: &[T],
    f_old: T,
    residual_old: &[T],
    gradient: &[T],
    mut direction: Vec<T>,
    step_max: T,
    step_tolerance: T,
) -> Result<LineSearchStep<T>, SolverError>
where
    T: Float,
    F: VectorFunction<T>,
{
    let n = x_old.len();
    let alpha = T::from(ALPHA).unwrap();
    let half = T::from(0.5).unwrap();
    let tenth = T::from(0.1).unwrap();
    let two = T::from(2.0).unwrap();
    let three = T::from(3.0).unwrap();

    // Cap the step length so a wild Newton step cannot leave the region of
    // interest in one jump.
    let norm = euclidean_norm(&direction);
    if norm > step_max {
        let scale = step_max / norm;
        for d in direction.iter_mut() {
            *d = *d * scale;
        }
    }

    let slope = dot(gradient, &direction);
    if slope >= T::zero() {
        return Err(SolverError::InvalidDescentDirection {
            slope: slope.to_f64().unwrap_or(f64::NAN),
        });
    }

    // Smallest step scale worth attempting, relative to the scale of x.
    let mut test = T::zero();
    for i in 0..n {
        let temp = direction[i].abs() / x_old[i].abs().max(T::one());
        if temp > test {
            test = temp;
        }
    }
    let lambda_min = step_tolerance / test;

    let mut lambda = T::one();
    let mut lambda_prev = T::zero();
    let mut f_prev = T::zero();
    let mut x = vec![T::zero(); n];

    loop {
        for i in 0..n {
            x[i] = x_old[i] + lambda * direction[i];
        }
        let (f, residual) = merit.evaluate(&x);

        if lambda < lambda_min {
            // The step has shrunk below the representable scale of x
            // without finding a decrease.
            return Ok(LineSearchStep {
                x: x_old.to_vec(),
                merit: f_old,
                residual: residual_old.to_vec(),
                outcome: LineSearchOutcome::NoProgress,
            });
        }

        if f <= f_old + alpha * lambda * slope {
            return Ok(LineSearchStep {
                x,
                merit: f,
                residual,
                outcome: LineSearchOutcome::Accepted,
            });
        }

        // Rejected: model the merit along the ray and pick the minimiser.
        let lambda_next = if lambda == T::one() {
            // First backtrack: quadratic through f_old, slope and f(1).
            -slope / (two * (f - f_old - slope))
        } else {
            // Later backtracks: cubic through the last two trials.
            let rhs1 = f - f_old - lambda * slope;
            let rhs2 = f_prev - f_old - lambda_prev * slope;
            let a = (rhs1 / (lambda * lambda) - rhs2 / (lambda_prev * lambda_prev))
                / (lambda - lambda_prev);
            let b = (-lambda_prev * rhs1 / (lambda * lambda)
                + lambda * rhs2 / (lambda_prev * lambda_prev))
                / (lambda - lambda_prev);
            let candidate = if a == T::zero() {
                -slope / (two * b)
            } else {
                let disc = b * b - three * a * slope;
                if disc < T::zero() {
                    half * lambda
                } else if b <= T::zero() {
                    (-b + disc.sqrt()) / (three * a)
                } else {
                    -slope / (b + disc.sqrt())
                }
            };
            candidate.min(half * lambda)
        };

        lambda_prev = lambda;
        f_prev = f;
        lambda = lambda_next.max(tenth * lambda);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run<F>(
        func: &F,
        x_old: &[f64],
        gradient: &[f64],
        direction: Vec<f64>,
        step_max: f64,
    ) -> Result<LineSearchStep<f64>, SolverError>
    where
        F: VectorFunction<f64>,
    {
        let merit = Merit::new(func);
        let (f_old, residual_old) = merit.evaluate(x_old);
        line_search(
            &merit,
            x_old,
            f_old,
            &residual_old,
            gradient,
            direction,
            step_max,
            1e-30,
        )
    }

    #[test]
    fn test_full_newton_step_accepted() {
        // F(x) = x - c: the full Newton step lands on the root exactly.
        let f = |x: &[f64]| vec![x[0] - 4.0, x[1] + 1.0];
        let x_old = [1.0, 1.0];
        // gradient = JᵀF = F here (J = I), direction = -F
        let step = run(&f, &x_old, &[-3.0, 2.0], vec![3.0, -2.0], 1e6).unwrap();

        assert_eq!(step.outcome, LineSearchOutcome::Accepted);
        assert!((step.x[0] - 4.0).abs() < 1e-12);
        assert!((step.x[1] + 1.0).abs() < 1e-12);
        assert_eq!(step.merit, 0.0);
    }

    #[test]
    fn test_overshooting_step_is_backtracked() {
        // The raw Newton step for atan from x = 3 overshoots badly; the
        // search must shorten it rather than accept a merit increase.
        let f = |x: &[f64]| vec![x[0].atan()];
        let x_old = [3.0_f64];
        let fv = 3.0_f64.atan();
        let deriv = 1.0 / 10.0;
        let gradient = [deriv * fv];
        let newton = vec![-fv / deriv];
        let full_step_x = x_old[0] + newton[0];

        let merit = Merit::new(&f);
        let (f_old, _) = merit.evaluate(&x_old);
        let step = run(&f, &x_old, &gradient, newton, 1e6).unwrap();

        assert_eq!(step.outcome, LineSearchOutcome::Accepted);
        assert!(step.merit < f_old, "accepted step must decrease the merit");
        assert!(
            (step.x[0] - x_old[0]).abs() < (full_step_x - x_old[0]).abs() * 0.999,
            "step should have been shortened from the full Newton step"
        );
    }

    #[test]
    fn test_direction_capped_to_step_max() {
        let f = |x: &[f64]| vec![x[0] - 1000.0];
        let x_old = [0.0];
        // Huge direction, small cap: the trial points stay within step_max.
        let step = run(&f, &x_old, &[-1000.0], vec![1000.0], 1.0).unwrap();
        assert!(step.x[0] <= 1.0 + 1e-12);
    }

    #[test]
    fn test_non_descent_direction_is_fatal() {
        let f = |x: &[f64]| vec![x[0]];
        let result = run(&f, &[1.0], &[1.0], vec![1.0], 1e6);
        assert!(matches!(
            result,
            Err(SolverError::InvalidDescentDirection { .. })
        ));
    }

    #[test]
    fn test_no_progress_returns_x_old_unchanged() {
        // At x = 1e20 the merit is exactly zero and every representable
        // trial along the (synthetic) direction fails the decrease test, so
        // the search must give up and report no progress.
        let f = |x: &[f64]| vec![x[0] - 1e20];
        let x_old = [1e20];
        let step = run(&f, &x_old, &[-1.0], vec![1.0], 1e6).unwrap();

        assert_eq!(step.outcome, LineSearchOutcome::NoProgress);
        assert_eq!(step.x, vec![1e20]);
        assert_eq!(step.merit, 0.0);
        assert_eq!(step.residual, vec![0.0]);
    }

    #[test]
    fn test_armijo_law_on_accepted_full_steps() {
        use proptest::prelude::*;

        fn coordinate() -> impl Strategy<Value = f64> {
            prop_oneof![-1e3..-1e-3, 1e-3..1e3]
        }

        proptest!(ProptestConfig::with_cases(500), |(
            x0 in coordinate(),
            x1 in coordinate(),
            c0 in coordinate(),
            c1 in coordinate(),
        )| {
            prop_assume!((x0 - c0).abs() > 1e-6 || (x1 - c1).abs() > 1e-6);

            // F(x) = x - c with identity Jacobian: gradient = F(x_old),
            // Newton direction = -F(x_old), slope = -‖F‖².
            let f = move |x: &[f64]| vec![x[0] - c0, x[1] - c1];
            let merit = Merit::new(&f);
            let x_old = [x0, x1];
            let (f_old, residual_old) = merit.evaluate(&x_old);
            let gradient = [x0 - c0, x1 - c1];
            let direction = vec![c0 - x0, c1 - x1];
            let slope = -(gradient[0] * gradient[0] + gradient[1] * gradient[1]);

            let step = line_search(
                &merit, &x_old, f_old, &residual_old, &gradient, direction, 1e9, 1e-30,
            ).unwrap();

            prop_assert_eq!(step.outcome, LineSearchOutcome::Accepted);
            // Sufficient decrease at the accepted (full) step, and strict
            // monotonicity of the merit.
            prop_assert!(step.merit <= f_old + 1e-4 * slope);
            prop_assert!(step.merit < f_old);
        });
    }
}
