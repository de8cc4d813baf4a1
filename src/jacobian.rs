//! Forward finite-difference Jacobian estimation.

use crate::function::VectorFunction;
use crate::linalg::SquareMatrix;
use num_traits::Float;

/// Relative perturbation for the forward differences.
const EPS: f64 = 1e-8;

/// Estimate the Jacobian of `func` at `x` by forward finite differences.
///
/// `fvec` must be `func.evaluate(x)`, passed in so the base point is not
/// re-evaluated. Each coordinate `j` is perturbed by `h = 1e-8·|x_j|`
/// (or `1e-8` when `x_j` is zero); the perturbation is added to `x_j` and
/// then recovered by subtraction, so the divisor is the perturbation that
/// was actually representable rather than the one requested.
///
/// # Cost
///
/// `n` extra evaluations of `func`, the dominant cost of a Newton iteration
/// when evaluations are expensive, plus `O(n²)` floating-point work for the
/// difference quotients.
///
/// # Example
///
/// ```
/// use multiroot::forward_jacobian;
///
/// let f = |x: &[f64]| vec![x[0] * x[0], x[0] * x[1]];
/// let x = [3.0, 2.0];
/// let fvec = f(&x);
///
/// let jac = forward_jacobian(&f, &x, &fvec);
/// assert!((jac[(0, 0)] - 6.0).abs() < 1e-6); // d(x²)/dx = 2x
/// assert!((jac[(1, 0)] - 2.0).abs() < 1e-6); // d(xy)/dx = y
/// assert!((jac[(1, 1)] - 3.0).abs() < 1e-6); // d(xy)/dy = x
/// ```
pub fn forward_jacobian<T, F>(func: &F, x: &[T], fvec: &[T]) -> SquareMatrix<T>
where
    T: Float,
    F: VectorFunction<T>,
{
    let n = x.len();
    let eps = T::from(EPS).unwrap();
    let mut jac = SquareMatrix::zeros(n);
    let mut xh = x.to_vec();

    for j in 0..n {
        let temp = xh[j];
        let mut h = eps * temp.abs();
        if h == T::zero() {
            h = eps;
        }
        xh[j] = temp + h;
        // The perturbation that was actually applied after rounding.
        h = xh[j] - temp;
        let fh = func.evaluate(&xh);
        xh[j] = temp;
        for i in 0..n {
            jac[(i, j)] = (fh[i] - fvec[i]) / h;
        }
    }

    jac
}
