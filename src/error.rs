//! Error types for the root-finding solver.

use thiserror::Error;

/// Root-finding solver errors.
///
/// A closed set of the fatal conditions that abort a solve attempt, each
/// carrying structured context instead of free text. Non-fatal outcomes
/// (converging to a stationary point that is not a root, or the step in `x`
/// falling below tolerance) are reported through
/// [`Termination`](crate::Termination), not through this type.
///
/// # Examples
///
/// ```
/// use multiroot::SolverError;
///
/// let err = SolverError::MaxIterationsExceeded {
///     iterations: 200,
///     residual_norm: 3.2e-5,
/// };
/// assert!(format!("{}", err).contains("200 iterations"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverError {
    /// The Newton direction is not a descent direction for the merit
    /// function (`gradient · direction >= 0`).
    ///
    /// This indicates an inconsistent Jacobian/gradient/direction triple
    /// from roundoff or an upstream bug, not a data problem.
    #[error("not a descent direction: gradient . direction = {slope} >= 0")]
    InvalidDescentDirection {
        /// The offending directional derivative.
        slope: f64,
    },

    /// The linear solve of the Newton system failed on a (near-)singular
    /// Jacobian estimate.
    #[error("singular Jacobian at iteration {iteration}")]
    SingularJacobian {
        /// Outer iteration (0-based) at which the factorisation failed.
        iteration: usize,
    },

    /// The solver exhausted its iteration budget without meeting any
    /// termination test.
    #[error("failed to converge after {iterations} iterations (residual max-norm {residual_norm})")]
    MaxIterationsExceeded {
        /// Number of iterations attempted.
        iterations: usize,
        /// Maximum absolute residual component at the final iterate.
        residual_norm: f64,
    },

    /// The function returned a vector whose length does not match the
    /// number of unknowns.
    #[error("dimension mismatch: function returned {got} components for {expected} unknowns")]
    DimensionMismatch {
        /// Number of unknowns, from the initial guess.
        expected: usize,
        /// Length of the vector the function returned.
        got: usize,
    },

    /// The initial guess was empty.
    #[error("initial guess is empty")]
    EmptyProblem,
}

/// Errors from the dense linear-solve primitive.
///
/// Kept separate from [`SolverError`] so that
/// [`LinearSolver`](crate::LinearSolver) implementations stay ignorant of
/// root-finding vocabulary; the Newton driver maps this into
/// [`SolverError::SingularJacobian`] with iteration context.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LinearSolveError {
    /// A pivot fell below the singularity floor during factorisation.
    #[error("matrix is numerically singular")]
    Singular,
}
