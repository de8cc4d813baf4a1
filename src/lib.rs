//! # multiroot: globally convergent Newton root finding for nonlinear systems
//!
//! Given a vector-valued function `F: R^n -> R^n` and an initial guess, find
//! `x` such that `F(x) ≈ 0`. The solver combines a Newton step (a forward
//! finite-difference Jacobian estimate and a dense linear solve) with a
//! backtracking line search on the merit function `½·‖F(x)‖²`. The line
//! search enforces monotone merit decrease on every accepted step, which is
//! what lets the method converge from initial guesses where a raw Newton
//! iteration would diverge.
//!
//! ## Components
//!
//! - [`NewtonSolver`]: the driver loop (linearise, solve, line-search, test)
//! - [`line_search`]: backtracking Armijo search, usable on its own
//! - [`forward_jacobian`]: finite-difference Jacobian estimation
//! - [`Merit`]: the merit-function wrapper over a [`VectorFunction`]
//! - [`LinearSolver`] / [`PartialPivLu`]: the dense-solve seam and its
//!   default LU implementation
//!
//! ## Usage
//!
//! ```
//! use multiroot::{NewtonSolver, Termination};
//!
//! // Solve x² - 2 = 0 from a poor initial guess
//! let solver = NewtonSolver::with_defaults();
//! let f = |x: &[f64]| vec![x[0] * x[0] - 2.0];
//!
//! let result = solver.solve(f, vec![6.0]).unwrap();
//! assert_eq!(result.termination, Termination::Converged);
//! assert!((result.x[0] - std::f64::consts::SQRT_2).abs() < 1e-8);
//! ```
//!
//! ## Convergence and failure modes
//!
//! Convergence is local to the basin of the initial guess; there is no
//! multi-start search. A solve attempt ends in one of the
//! [`Termination`] states, or fails hard with a [`SolverError`]. Note that
//! the minimisation view of the problem admits local minima of `‖F‖` that
//! are not roots: when the solver stops at one, it says so
//! ([`Termination::StalledMinimum`]) and the caller should inspect the
//! returned residual before trusting `x`.
//!
//! ## Scope
//!
//! Dense systems only, derivative-free from the caller's point of view
//! (only `F` itself is required), single-threaded and synchronous. Distinct
//! solver invocations share no state, so solving on multiple threads with
//! separate buffers is safe.
//!
//! ## Feature Flags
//!
//! - `serde`: enable serialisation for the status and error types

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod config;
pub mod error;
pub mod function;
pub mod jacobian;
pub mod linalg;
pub mod line_search;
pub mod newton;

// Re-export public types at crate level
pub use config::NewtonConfig;
pub use error::{LinearSolveError, SolverError};
pub use function::{Merit, VectorFunction};
pub use jacobian::forward_jacobian;
pub use linalg::{LinearSolver, PartialPivLu, SquareMatrix};
pub use line_search::{line_search, LineSearchOutcome, LineSearchStep};
pub use newton::{NewtonResult, NewtonSolver, Termination};
