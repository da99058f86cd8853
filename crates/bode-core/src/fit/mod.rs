//! Weighted nonlinear least-squares fitting
//!
//! A Levenberg-Marquardt minimiser of
//!
//! ```text
//! chi2(p) = sum_i (y_i - f(x_i; p))^2 / (ey_i^2 + (f'(x_i; p) ex_i)^2)
//! ```
//!
//! over one-dimensional error-bar data, with standard errors taken from the
//! inverse of the curvature matrix at the minimum.

mod levenberg;
mod result;

pub use levenberg::fit_curve;
pub use result::{CurveData, FitOptions, FitRange, FitResult};

/// A fittable one-dimensional model `y = f(x; p)`
pub trait Model {
    /// Length of the parameter vector
    fn n_params(&self) -> usize;

    fn value(&self, x: f64, params: &[f64]) -> f64;

    /// Partial derivatives with respect to every parameter
    fn gradient(&self, x: f64, params: &[f64]) -> Vec<f64>;

    /// Derivative with respect to `x`, used to fold x errors into the weights
    fn slope(&self, x: f64, params: &[f64]) -> f64;

    /// Whether parameter `index` enters the formula at all. Parameters that
    /// do not are held at their initial value.
    fn is_free(&self, _index: usize) -> bool {
        true
    }
}
