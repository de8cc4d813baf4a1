//! Solver configuration types.

use num_traits::Float;

/// Configuration for the globally convergent Newton solver.
///
/// Collects the tolerance thresholds and iteration limits that control
/// termination of [`NewtonSolver`](crate::NewtonSolver).
///
/// # Type Parameters
///
/// * `T` - Floating-point type for tolerances (e.g., `f64`)
///
/// # Example
///
/// ```
/// use multiroot::NewtonConfig;
///
/// // Use default configuration
/// let config: NewtonConfig<f64> = NewtonConfig::default();
/// assert_eq!(config.max_iterations, 200);
///
/// // Custom configuration
/// let custom = NewtonConfig {
///     residual_tolerance: 1e-10,
///     ..NewtonConfig::default()
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonConfig<T: Float> {
    /// Convergence tolerance on the residual.
    ///
    /// The solver reports [`Termination::Converged`](crate::Termination::Converged)
    /// when `max_i |F_i(x)| < residual_tolerance`.
    pub residual_tolerance: T,

    /// Tolerance for the scale-normalised merit-function gradient.
    ///
    /// Used only when the line search stalls, to decide whether the solver
    /// has landed in a local minimum of `‖F‖` that is not a root.
    pub gradient_tolerance: T,

    /// Tolerance on the relative step in `x`.
    ///
    /// Also the floor used by the line search for the smallest step scale it
    /// will attempt relative to the magnitude of `x`.
    pub step_tolerance: T,

    /// Maximum number of outer Newton iterations before giving up.
    ///
    /// Exhausting this limit is a hard failure,
    /// [`SolverError::MaxIterationsExceeded`](crate::SolverError::MaxIterationsExceeded).
    pub max_iterations: usize,

    /// Scale factor for the global step-length cap.
    ///
    /// The Newton step is never longer than
    /// `max_step_scale * max(‖x0‖, n)`, preventing wild excursions from
    /// poor initial guesses.
    pub max_step_scale: T,
}

impl<T: Float> Default for NewtonConfig<T> {
    /// Create a default configuration with the classic thresholds.
    ///
    /// Default values:
    /// - `residual_tolerance`: 1e-8
    /// - `gradient_tolerance`: 1e-12
    /// - `step_tolerance`: 1e-30
    /// - `max_iterations`: 200
    /// - `max_step_scale`: 100
    fn default() -> Self {
        Self {
            residual_tolerance: T::from(1e-8).unwrap(),
            gradient_tolerance: T::from(1e-12).unwrap(),
            step_tolerance: T::from(1e-30).unwrap(),
            max_iterations: 200,
            max_step_scale: T::from(100.0).unwrap(),
        }
    }
}

impl<T: Float> NewtonConfig<T> {
    /// Create a new configuration with specified convergence settings.
    ///
    /// Remaining fields take their default values.
    ///
    /// # Arguments
    ///
    /// * `residual_tolerance` - Convergence tolerance (must be positive)
    /// * `max_iterations` - Maximum iteration count (must be > 0)
    ///
    /// # Panics
    ///
    /// Panics if `residual_tolerance <= 0` or `max_iterations == 0`.
    ///
    /// # Example
    ///
    /// ```
    /// use multiroot::NewtonConfig;
    ///
    /// let config = NewtonConfig::new(1e-12, 400);
    /// assert_eq!(config.max_iterations, 400);
    /// ```
    pub fn new(residual_tolerance: T, max_iterations: usize) -> Self {
        assert!(
            residual_tolerance > T::zero(),
            "residual_tolerance must be positive"
        );
        assert!(max_iterations > 0, "max_iterations must be > 0");
        Self {
            residual_tolerance,
            max_iterations,
            ..Default::default()
        }
    }

    /// Create a configuration with high precision settings.
    ///
    /// Uses tighter residual tolerance (1e-10) and more iterations (500).
    pub fn high_precision() -> Self {
        Self {
            residual_tolerance: T::from(1e-10).unwrap(),
            max_iterations: 500,
            ..Default::default()
        }
    }

    /// Create a configuration optimised for fast convergence.
    ///
    /// Uses relaxed residual tolerance (1e-6) and fewer iterations (50)
    /// for cases where speed matters more than precision.
    pub fn fast() -> Self {
        Self {
            residual_tolerance: T::from(1e-6).unwrap(),
            max_iterations: 50,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config: NewtonConfig<f64> = NewtonConfig::default();
        assert!((config.residual_tolerance - 1e-8).abs() < 1e-15);
        assert!((config.gradient_tolerance - 1e-12).abs() < 1e-18);
        assert_eq!(config.max_iterations, 200);
        assert!((config.max_step_scale - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_new_config() {
        let config: NewtonConfig<f64> = NewtonConfig::new(1e-12, 400);
        assert!((config.residual_tolerance - 1e-12).abs() < 1e-17);
        assert_eq!(config.max_iterations, 400);
        // Untouched fields keep defaults
        assert!((config.max_step_scale - 100.0).abs() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "residual_tolerance must be positive")]
    fn test_new_config_zero_tolerance_panics() {
        let _: NewtonConfig<f64> = NewtonConfig::new(0.0, 100);
    }

    #[test]
    #[should_panic(expected = "max_iterations must be > 0")]
    fn test_new_config_zero_iterations_panics() {
        let _: NewtonConfig<f64> = NewtonConfig::new(1e-8, 0);
    }

    #[test]
    fn test_high_precision_config() {
        let config: NewtonConfig<f64> = NewtonConfig::high_precision();
        assert!(config.residual_tolerance < 1e-8);
        assert!(config.max_iterations >= 500);
    }

    #[test]
    fn test_fast_config() {
        let config: NewtonConfig<f64> = NewtonConfig::fast();
        assert!(config.residual_tolerance > 1e-8);
        assert!(config.max_iterations <= 50);
    }

    #[test]
    fn test_config_copy() {
        let config1: NewtonConfig<f64> = NewtonConfig::default();
        let config2 = config1; // Copy semantics
        assert_eq!(config1, config2);
    }

    #[test]
    fn test_config_with_f32() {
        let config: NewtonConfig<f32> = NewtonConfig::default();
        assert!(config.residual_tolerance > 0.0);
        assert_eq!(config.max_iterations, 200);
    }
}
