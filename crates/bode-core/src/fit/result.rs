//! Fit inputs, options and results

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{BodeError, Result};

/// Optimiser configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    /// Maximum number of accepted Levenberg-Marquardt steps
    pub max_iterations: usize,
    /// Relative tolerance on chi2 decrease and on parameter steps
    pub tolerance: f64,
    /// Starting damping factor
    pub initial_lambda: f64,
    /// Fold x errors into the weights (effective variance)
    pub use_x_errors: bool,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-12,
            initial_lambda: 1e-3,
            use_x_errors: true,
        }
    }
}

/// Inclusive x range restricting which points enter a fit
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FitRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl FitRange {
    /// The whole data set
    pub fn full() -> Self {
        Self::default()
    }

    pub fn new(min: Option<f64>, max: Option<f64>) -> Result<Self> {
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(BodeError::InvalidParameters(format!(
                    "fit range minimum {} exceeds maximum {}",
                    lo, hi
                )));
            }
        }
        Ok(Self { min, max })
    }

    #[inline]
    pub fn contains(&self, x: f64) -> bool {
        self.min.map_or(true, |lo| x >= lo) && self.max.map_or(true, |hi| x <= hi)
    }
}

/// Borrowed error-bar data for one curve
#[derive(Debug, Clone, Copy)]
pub struct CurveData<'a> {
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub ex: &'a [f64],
    pub ey: &'a [f64],
}

impl<'a> CurveData<'a> {
    pub fn new(x: &'a [f64], y: &'a [f64], ex: &'a [f64], ey: &'a [f64]) -> Result<Self> {
        for (series, len) in [("y", y.len()), ("x error", ex.len()), ("y error", ey.len())] {
            if len != x.len() {
                return Err(BodeError::LengthMismatch {
                    series,
                    expected: x.len(),
                    found: len,
                });
            }
        }
        Ok(Self { x, y, ex, ey })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Outcome of a converged fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Best-fit parameters
    pub params: Array1<f64>,
    /// Standard errors (zero for parameters held fixed)
    pub errors: Array1<f64>,
    /// Parameter covariance matrix
    pub covariance: Array2<f64>,
    pub chi2: f64,
    /// Degrees of freedom: points used minus free parameters
    pub ndf: usize,
    /// Accepted optimiser steps
    pub iterations: usize,
    /// Points inside the fit range that carried weight
    pub n_points: usize,
}

impl FitResult {
    /// chi2 / ndf, NaN when there are no degrees of freedom
    pub fn reduced_chi2(&self) -> f64 {
        if self.ndf == 0 {
            f64::NAN
        } else {
            self.chi2 / self.ndf as f64
        }
    }

    /// Covariance between two parameters
    pub fn covariance_of(&self, i: usize, j: usize) -> f64 {
        self.covariance[[i, j]]
    }

    /// Replace parameter `i` by its negation, keeping the covariance consistent.
    pub(crate) fn negate_param(&mut self, i: usize) {
        self.params[i] = -self.params[i];
        let n = self.params.len();
        for k in 0..n {
            if k != i {
                self.covariance[[i, k]] = -self.covariance[[i, k]];
                self.covariance[[k, i]] = -self.covariance[[k, i]];
            }
        }
    }
}
