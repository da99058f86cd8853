//! Levenberg-Marquardt core

use ndarray::{Array1, Array2};

use super::result::{CurveData, FitOptions, FitRange, FitResult};
use super::Model;
use crate::constants::{MAX_LAMBDA, VARIANCE_FLOOR};
use crate::error::{BodeError, Result};
use crate::math::linalg::{inv_real, solve_spd};

/// Points that take part in the fit
struct Selection {
    x: Vec<f64>,
    y: Vec<f64>,
    ex: Vec<f64>,
    ey: Vec<f64>,
    /// All errors zero: every point gets unit weight
    unit_weights: bool,
}

impl Selection {
    fn new(data: &CurveData<'_>, range: &FitRange, use_x_errors: bool) -> Self {
        let in_range: Vec<usize> = (0..data.len())
            .filter(|&i| data.x[i].is_finite() && data.y[i].is_finite() && range.contains(data.x[i]))
            .collect();

        let has_error = |i: usize| data.ey[i] != 0.0 || (use_x_errors && data.ex[i] != 0.0);
        let unit_weights = in_range.iter().all(|&i| !has_error(i));

        let mut sel = Selection {
            x: Vec::with_capacity(in_range.len()),
            y: Vec::with_capacity(in_range.len()),
            ex: Vec::with_capacity(in_range.len()),
            ey: Vec::with_capacity(in_range.len()),
            unit_weights,
        };

        for i in in_range {
            // points without any error carry no weight next to measured ones
            if !unit_weights && !has_error(i) {
                log::debug!("skipping point at x = {} without error", data.x[i]);
                continue;
            }
            sel.x.push(data.x[i]);
            sel.y.push(data.y[i]);
            sel.ex.push(if use_x_errors { data.ex[i] } else { 0.0 });
            sel.ey.push(data.ey[i]);
        }
        sel
    }

    fn len(&self) -> usize {
        self.x.len()
    }

    /// Per-point weights `1 / sigma_eff^2` at the given parameters
    fn weights<M: Model>(&self, model: &M, params: &[f64]) -> Vec<f64> {
        if self.unit_weights {
            return vec![1.0; self.len()];
        }
        (0..self.len())
            .map(|i| {
                let slope = if self.ex[i] != 0.0 {
                    model.slope(self.x[i], params)
                } else {
                    0.0
                };
                let var = self.ey[i].powi(2) + (slope * self.ex[i]).powi(2);
                1.0 / var.max(VARIANCE_FLOOR)
            })
            .collect()
    }

    fn chi2<M: Model>(&self, model: &M, params: &[f64]) -> f64 {
        let w = self.weights(model, params);
        (0..self.len())
            .map(|i| w[i] * (self.y[i] - model.value(self.x[i], params)).powi(2))
            .sum()
    }

    /// Curvature matrix `J^T W J` and gradient `J^T W r` over the free parameters
    fn normal_equations<M: Model>(
        &self,
        model: &M,
        params: &[f64],
        free: &[usize],
    ) -> (Array2<f64>, Array1<f64>) {
        let n = free.len();
        let w = self.weights(model, params);
        let mut alpha = Array2::<f64>::zeros((n, n));
        let mut beta = Array1::<f64>::zeros(n);

        for i in 0..self.len() {
            let grad = model.gradient(self.x[i], params);
            let r = self.y[i] - model.value(self.x[i], params);
            for (a, &pa) in free.iter().enumerate() {
                beta[a] += w[i] * grad[pa] * r;
                for (b, &pb) in free.iter().enumerate().take(a + 1) {
                    alpha[[a, b]] += w[i] * grad[pa] * grad[pb];
                }
            }
        }
        for a in 0..n {
            for b in 0..a {
                alpha[[b, a]] = alpha[[a, b]];
            }
        }
        (alpha, beta)
    }
}

/// Fit `model` to `data`, starting from `initial`
///
/// Points outside `range`, with non-finite coordinates, or without any error
/// while other points have one, are ignored. When no point carries an error
/// every point gets unit weight and the parameter errors are scaled by
/// `sqrt(chi2 / ndf)`.
///
/// Fails with [`BodeError::InsufficientPoints`] when fewer points than free
/// parameters remain, and with [`BodeError::FitConvergence`] when the model
/// is not finite at the start, the curvature matrix is singular, or the
/// iteration limit is reached.
pub fn fit_curve<M: Model>(
    model: &M,
    data: &CurveData<'_>,
    initial: &[f64],
    range: &FitRange,
    options: &FitOptions,
) -> Result<FitResult> {
    let n_params = model.n_params();
    if initial.len() != n_params {
        return Err(BodeError::InvalidParameters(format!(
            "expected {} initial parameters, got {}",
            n_params,
            initial.len()
        )));
    }

    let free: Vec<usize> = (0..n_params).filter(|&i| model.is_free(i)).collect();
    let sel = Selection::new(data, range, options.use_x_errors);
    if sel.len() < free.len() || sel.len() == 0 {
        return Err(BodeError::InsufficientPoints {
            needed: free.len().max(1),
            found: sel.len(),
        });
    }

    let mut params = initial.to_vec();
    let mut chi2 = sel.chi2(model, &params);
    if !chi2.is_finite() {
        return Err(BodeError::FitConvergence(format!(
            "model is not finite at initial parameters {:?}",
            params
        )));
    }

    let mut lambda = options.initial_lambda;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < options.max_iterations {
        let (alpha, beta) = sel.normal_equations(model, &params, &free);

        // Damped step; reject and raise lambda until chi2 decreases
        let mut accepted = None;
        while lambda <= MAX_LAMBDA {
            let mut damped = alpha.clone();
            for a in 0..free.len() {
                damped[[a, a]] += lambda * alpha[[a, a]].max(f64::MIN_POSITIVE);
            }

            if let Some(delta) = solve_spd(&damped, &beta) {
                let mut trial = params.clone();
                for (a, &pa) in free.iter().enumerate() {
                    trial[pa] += delta[a];
                }
                let trial_chi2 = sel.chi2(model, &trial);
                if trial_chi2.is_finite() && trial_chi2 < chi2 {
                    accepted = Some((trial, trial_chi2, delta));
                    break;
                }
            }
            lambda *= 10.0;
        }

        let Some((trial, trial_chi2, delta)) = accepted else {
            // no descent direction left within numerical precision
            converged = true;
            break;
        };

        iterations += 1;
        let decrease = chi2 - trial_chi2;
        let small_step = free
            .iter()
            .enumerate()
            .all(|(a, &pa)| delta[a].abs() <= options.tolerance * (trial[pa].abs() + options.tolerance));

        params = trial;
        chi2 = trial_chi2;
        lambda = (lambda / 10.0).max(f64::MIN_POSITIVE);

        log::trace!("iteration {}: chi2 = {:e}, lambda = {:e}", iterations, chi2, lambda);

        if decrease <= options.tolerance * chi2 || small_step {
            converged = true;
            break;
        }
    }

    if !converged {
        return Err(BodeError::FitConvergence(format!(
            "no convergence after {} iterations (chi2 = {:e})",
            options.max_iterations, chi2
        )));
    }

    let (alpha, _) = sel.normal_equations(model, &params, &free);
    let inv = inv_real(&alpha)
        .ok_or_else(|| BodeError::FitConvergence("singular curvature matrix at the minimum".to_string()))?;

    let ndf = sel.len() - free.len();
    let scale = if sel.unit_weights && ndf > 0 {
        chi2 / ndf as f64
    } else {
        1.0
    };

    let mut covariance = Array2::<f64>::zeros((n_params, n_params));
    for (a, &pa) in free.iter().enumerate() {
        for (b, &pb) in free.iter().enumerate() {
            covariance[[pa, pb]] = inv[[a, b]] * scale;
        }
    }
    let errors = Array1::from_iter((0..n_params).map(|i| covariance[[i, i]].max(0.0).sqrt()));

    Ok(FitResult {
        params: Array1::from_vec(params),
        errors,
        covariance,
        chi2,
        ndf,
        iterations,
        n_points: sel.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// y = a + b x
    struct Line;

    impl Model for Line {
        fn n_params(&self) -> usize {
            2
        }
        fn value(&self, x: f64, p: &[f64]) -> f64 {
            p[0] + p[1] * x
        }
        fn gradient(&self, x: f64, _p: &[f64]) -> Vec<f64> {
            vec![1.0, x]
        }
        fn slope(&self, _x: f64, p: &[f64]) -> f64 {
            p[1]
        }
    }

    /// y = a exp(-x / t)
    struct Decay;

    impl Model for Decay {
        fn n_params(&self) -> usize {
            2
        }
        fn value(&self, x: f64, p: &[f64]) -> f64 {
            p[0] * (-x / p[1]).exp()
        }
        fn gradient(&self, x: f64, p: &[f64]) -> Vec<f64> {
            let e = (-x / p[1]).exp();
            vec![e, p[0] * e * x / (p[1] * p[1])]
        }
        fn slope(&self, x: f64, p: &[f64]) -> f64 {
            -p[0] * (-x / p[1]).exp() / p[1]
        }
    }

    #[test]
    fn test_weighted_line_matches_closed_form() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [1.1, 2.9, 5.2, 6.8, 9.1];
        let ex = [0.0; 5];
        let ey = [0.1, 0.2, 0.1, 0.2, 0.1];
        let data = CurveData::new(&x, &y, &ex, &ey).unwrap();

        let result = fit_curve(&Line, &data, &[0.0, 1.0], &FitRange::full(), &FitOptions::default()).unwrap();

        // closed-form weighted linear regression
        let w: Vec<f64> = ey.iter().map(|e| 1.0 / (e * e)).collect();
        let s: f64 = w.iter().sum();
        let sx: f64 = (0..5).map(|i| w[i] * x[i]).sum();
        let sy: f64 = (0..5).map(|i| w[i] * y[i]).sum();
        let sxx: f64 = (0..5).map(|i| w[i] * x[i] * x[i]).sum();
        let sxy: f64 = (0..5).map(|i| w[i] * x[i] * y[i]).sum();
        let d = s * sxx - sx * sx;
        let a = (sxx * sy - sx * sxy) / d;
        let b = (s * sxy - sx * sy) / d;

        assert_relative_eq!(result.params[0], a, max_relative = 1e-9);
        assert_relative_eq!(result.params[1], b, max_relative = 1e-9);
        assert_relative_eq!(result.errors[0], (sxx / d).sqrt(), max_relative = 1e-9);
        assert_relative_eq!(result.errors[1], (s / d).sqrt(), max_relative = 1e-9);
        assert_eq!(result.ndf, 3);
        assert_eq!(result.n_points, 5);
    }

    #[test]
    fn test_nonlinear_recovers_parameters() {
        let x: Vec<f64> = (0..20).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|&xi| 3.0 * (-xi / 2.5).exp()).collect();
        let zeros = vec![0.0; x.len()];
        let data = CurveData::new(&x, &y, &zeros, &zeros).unwrap();

        let result = fit_curve(&Decay, &data, &[1.0, 1.0], &FitRange::full(), &FitOptions::default()).unwrap();
        assert_relative_eq!(result.params[0], 3.0, max_relative = 1e-8);
        assert_relative_eq!(result.params[1], 2.5, max_relative = 1e-8);
    }

    #[test]
    fn test_range_restricts_points() {
        let x = [0.0, 1.0, 2.0, 3.0, 100.0];
        let y = [0.0, 1.0, 2.0, 3.0, -50.0];
        let zeros = [0.0; 5];
        let data = CurveData::new(&x, &y, &zeros, &zeros).unwrap();
        let range = FitRange::new(None, Some(10.0)).unwrap();

        let result = fit_curve(&Line, &data, &[0.5, 0.5], &range, &FitOptions::default()).unwrap();
        assert_eq!(result.n_points, 4);
        assert_relative_eq!(result.params[1], 1.0, max_relative = 1e-9);
    }

    #[test]
    fn test_insufficient_points() {
        let x = [1.0];
        let data = CurveData::new(&x, &x, &x, &x).unwrap();
        let err = fit_curve(&Line, &data, &[0.0, 1.0], &FitRange::full(), &FitOptions::default()).unwrap_err();
        assert!(matches!(err, BodeError::InsufficientPoints { needed: 2, found: 1 }));
    }

    #[test]
    fn test_wrong_initial_length() {
        let x = [1.0, 2.0, 3.0];
        let data = CurveData::new(&x, &x, &x, &x).unwrap();
        let err = fit_curve(&Line, &data, &[0.0], &FitRange::full(), &FitOptions::default()).unwrap_err();
        assert!(matches!(err, BodeError::InvalidParameters(_)));
    }

    #[test]
    fn test_degenerate_data_fails() {
        // every x identical: slope and intercept are not separable
        let x = [2.0, 2.0, 2.0];
        let y = [1.0, 1.5, 2.0];
        let zeros = [0.0; 3];
        let data = CurveData::new(&x, &y, &zeros, &zeros).unwrap();
        let err = fit_curve(&Line, &data, &[0.0, 0.0], &FitRange::full(), &FitOptions::default()).unwrap_err();
        assert!(matches!(err, BodeError::FitConvergence(_)));
    }

    #[test]
    fn test_x_errors_inflate_parameter_errors() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.1, 2.1, 3.9, 6.1];
        let ey = [0.1; 4];
        let ex = [0.1; 4];
        let data = CurveData::new(&x, &y, &ex, &ey).unwrap();

        let with_x = fit_curve(&Line, &data, &[0.0, 1.0], &FitRange::full(), &FitOptions::default()).unwrap();
        let options = FitOptions {
            use_x_errors: false,
            ..FitOptions::default()
        };
        let without_x = fit_curve(&Line, &data, &[0.0, 1.0], &FitRange::full(), &options).unwrap();

        assert!(with_x.errors[1] > without_x.errors[1]);
        assert!(with_x.chi2 < without_x.chi2);
    }
}
