//! Dense square matrices and the linear-solve seam.
//!
//! The Newton driver only needs one linear-algebra capability: solve
//! `A·x = b` for a dense square `A`, overwriting the right-hand side with
//! the solution. That contract is the [`LinearSolver`] trait; the shipped
//! implementation is [`PartialPivLu`], and alternatives (QR, external
//! libraries) can be substituted without touching the driver.

use crate::error::LinearSolveError;
use num_traits::Float;
use std::ops::{Index, IndexMut};

/// Dense square matrix stored in row-major order.
///
/// # Example
///
/// ```
/// use multiroot::SquareMatrix;
///
/// let mut m = SquareMatrix::zeros(2);
/// m[(0, 0)] = 2.0;
/// m[(1, 1)] = 3.0;
/// assert_eq!(m[(0, 0)], 2.0);
/// assert_eq!(m[(0, 1)], 0.0);
/// assert_eq!(m.dim(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix<T> {
    n: usize,
    data: Vec<T>,
}

impl<T: Float> SquareMatrix<T> {
    /// Create an `n x n` matrix of zeros.
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![T::zero(); n * n],
        }
    }

    /// Create the `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n);
        for i in 0..n {
            m[(i, i)] = T::one();
        }
        m
    }

    /// Build a matrix from rows.
    ///
    /// # Panics
    ///
    /// Panics if the rows do not form a square matrix.
    pub fn from_rows(rows: &[Vec<T>]) -> Self {
        let n = rows.len();
        let mut m = Self::zeros(n);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), n, "row {} has length {}, expected {}", i, row.len(), n);
            for (j, &v) in row.iter().enumerate() {
                m[(i, j)] = v;
            }
        }
        m
    }

    /// Matrix dimension `n`.
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Swap two rows in place.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.n {
            self.data.swap(a * self.n + j, b * self.n + j);
        }
    }
}

impl<T> Index<(usize, usize)> for SquareMatrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.data[row * self.n + col]
    }
}

impl<T> IndexMut<(usize, usize)> for SquareMatrix<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        &mut self.data[row * self.n + col]
    }
}

/// In-place dense linear solve: overwrite `b` with the solution of `A·x = b`.
///
/// Implementations may destroy `a` (it is consumed as workspace); the Newton
/// driver rebuilds the Jacobian every iteration and never reuses it after the
/// solve.
pub trait LinearSolver<T> {
    /// Solve `a · x = b`, writing the solution over `b`.
    ///
    /// # Errors
    ///
    /// [`LinearSolveError::Singular`] if `a` is numerically singular.
    fn solve_in_place(&self, a: &mut SquareMatrix<T>, b: &mut [T]) -> Result<(), LinearSolveError>;
}

/// LU decomposition with partial (row) pivoting.
///
/// The default linear solver for the Newton driver. A pivot smaller in
/// magnitude than 1e-30 is treated as singular.
///
/// # Example
///
/// ```
/// use multiroot::{LinearSolver, PartialPivLu, SquareMatrix};
///
/// let mut a = SquareMatrix::from_rows(&[vec![3.0, 1.0], vec![1.0, 2.0]]);
/// let mut b: Vec<f64> = vec![9.0, 8.0];
///
/// PartialPivLu.solve_in_place(&mut a, &mut b).unwrap();
/// assert!((b[0] - 2.0).abs() < 1e-12);
/// assert!((b[1] - 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialPivLu;

impl<T: Float> LinearSolver<T> for PartialPivLu {
    fn solve_in_place(&self, a: &mut SquareMatrix<T>, b: &mut [T]) -> Result<(), LinearSolveError> {
        let n = a.dim();
        assert_eq!(b.len(), n, "right-hand side length must match matrix dimension");
        let tiny = T::from(1e-30).unwrap();

        // Forward elimination with row pivoting, applied to b as we go.
        for k in 0..n {
            let mut pivot_row = k;
            let mut pivot = a[(k, k)].abs();
            for i in (k + 1)..n {
                let candidate = a[(i, k)].abs();
                if candidate > pivot {
                    pivot = candidate;
                    pivot_row = i;
                }
            }
            if pivot < tiny {
                return Err(LinearSolveError::Singular);
            }
            if pivot_row != k {
                a.swap_rows(pivot_row, k);
                b.swap(pivot_row, k);
            }
            for i in (k + 1)..n {
                let factor = a[(i, k)] / a[(k, k)];
                a[(i, k)] = factor;
                for j in (k + 1)..n {
                    let akj = a[(k, j)];
                    a[(i, j)] = a[(i, j)] - factor * akj;
                }
                b[i] = b[i] - factor * b[k];
            }
        }

        // Back substitution.
        for i in (0..n).rev() {
            let mut sum = b[i];
            for j in (i + 1)..n {
                sum = sum - a[(i, j)] * b[j];
            }
            b[i] = sum / a[(i, i)];
        }

        Ok(())
    }
}
