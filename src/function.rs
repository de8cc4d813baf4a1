//! The problem-function capability and the merit-function wrapper.

use num_traits::Float;

/// A vector-valued function `F: R^n -> R^n` whose root is sought.
///
/// The solver treats the function as a pure mathematical mapping: it may
/// cache internally, but the value returned for a given `x` must not depend
/// on call history, or the convergence guarantees no longer hold.
///
/// A blanket implementation covers plain closures, so most callers never
/// implement this trait by hand:
///
/// ```
/// use multiroot::VectorFunction;
///
/// let f = |x: &[f64]| vec![x[0] * x[0] - 2.0];
/// assert_eq!(f.evaluate(&[2.0]), vec![2.0]);
/// ```
///
/// Implementing the trait directly is useful when the function carries
/// state such as model parameters:
///
/// ```
/// use multiroot::{NewtonSolver, VectorFunction};
///
/// /// Intersection of a circle of radius r with the line y = x.
/// struct CircleLine {
///     r_squared: f64,
/// }
///
/// impl VectorFunction<f64> for CircleLine {
///     fn evaluate(&self, x: &[f64]) -> Vec<f64> {
///         vec![x[0] * x[0] + x[1] * x[1] - self.r_squared, x[0] - x[1]]
///     }
/// }
///
/// let problem = CircleLine { r_squared: 2.0 };
/// let result = NewtonSolver::with_defaults()
///     .solve(problem, vec![2.0, 1.0])
///     .unwrap();
/// assert!((result.x[0] - 1.0).abs() < 1e-8);
/// assert!((result.x[1] - 1.0).abs() < 1e-8);
/// ```
pub trait VectorFunction<T> {
    /// Evaluate `F` at `x`, returning a vector of the same length as `x`.
    fn evaluate(&self, x: &[T]) -> Vec<T>;
}

impl<T, F> VectorFunction<T> for F
where
    F: Fn(&[T]) -> Vec<T>,
{
    fn evaluate(&self, x: &[T]) -> Vec<T> {
        self(x)
    }
}

/// Merit-function wrapper around a [`VectorFunction`].
///
/// Turns the n-dimensional root-finding problem into a scalar minimisation
/// problem: the merit value is `½·‖F(x)‖²`, which is zero exactly at a root.
/// Both the Newton driver and the line search judge progress by this scalar.
///
/// [`evaluate`](Merit::evaluate) returns the residual alongside the scalar as
/// an explicit pair, so there is no hidden residual state and no ordering
/// dependency between calls.
///
/// # Example
///
/// ```
/// use multiroot::Merit;
///
/// let f = |x: &[f64]| vec![x[0] - 3.0, x[1] + 1.0];
/// let merit = Merit::new(&f);
///
/// let (value, residual) = merit.evaluate(&[4.0, 1.0]);
/// assert_eq!(residual, vec![1.0, 2.0]);
/// assert_eq!(value, 0.5 * (1.0 + 4.0));
/// ```
#[derive(Debug)]
pub struct Merit<'a, F> {
    func: &'a F,
}

impl<'a, F> Merit<'a, F> {
    /// Wrap a vector function.
    pub fn new(func: &'a F) -> Self {
        Self { func }
    }

    /// Evaluate the merit function at `x`.
    ///
    /// Returns `(½·‖F(x)‖², F(x))`. Costs exactly one evaluation of the
    /// underlying function.
    pub fn evaluate<T>(&self, x: &[T]) -> (T, Vec<T>)
    where
        T: Float,
        F: VectorFunction<T>,
    {
        let fvec = self.func.evaluate(x);
        let half = T::from(0.5).unwrap();
        (half * sum_of_squares(&fvec), fvec)
    }
}

/// Compute the sum of squares of a vector.
#[inline]
pub(crate) fn sum_of_squares<T: Float>(v: &[T]) -> T {
    v.iter().fold(T::zero(), |acc, &x| acc + x * x)
}

/// Compute the Euclidean norm of a vector.
#[inline]
pub(crate) fn euclidean_norm<T: Float>(v: &[T]) -> T {
    sum_of_squares(v).sqrt()
}

/// Compute the dot product of two equal-length vectors.
#[inline]
pub(crate) fn dot<T: Float>(a: &[T], b: &[T]) -> T {
    a.iter()
        .zip(b)
        .fold(T::zero(), |acc, (&x, &y)| acc + x * y)
}

/// Maximum absolute component of a vector.
#[inline]
pub(crate) fn max_abs<T: Float>(v: &[T]) -> T {
    v.iter().fold(T::zero(), |acc, &x| acc.max(x.abs()))
}
