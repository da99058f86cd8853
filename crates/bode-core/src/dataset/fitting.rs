//! Gain and phase fits and the parameters published from them

use serde::{Deserialize, Serialize};

use super::core::{BodeDataset, ErrorCurve};
use crate::error::{BodeError, Result};
use crate::fit::{fit_curve, CurveData, FitRange, FitResult};
use crate::model::{guess, ParamLayout};

/// A value with its standard error
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub value: f64,
    pub error: f64,
}

impl Measurement {
    pub fn new(value: f64, error: f64) -> Self {
        Self { value, error }
    }
}

/// Physical parameters published by a gain fit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainSummary {
    /// Cutoff (lowpass/highpass) or peak (bandpass) frequency
    pub cutoff: Measurement,
    pub gain: Measurement,
    /// Gain-bandwidth product, `gain * cutoff`
    pub gain_bandwidth: Measurement,
    /// Quality factor, bandpass only
    pub q: Option<Measurement>,
    /// Bandwidth `peak / Q`, bandpass only
    pub bandwidth: Option<Measurement>,
}

impl GainSummary {
    /// Read the published parameters off a gain fit, propagating errors to
    /// first order with the fitted covariance.
    pub fn from_fit(fit: &FitResult, layout: &ParamLayout) -> Self {
        let (gi, ci) = (layout.gain, layout.cutoff);
        let g = fit.params[gi];
        let c = fit.params[ci];

        let gbw_var = (c * fit.errors[gi]).powi(2)
            + (g * fit.errors[ci]).powi(2)
            + 2.0 * g * c * fit.covariance_of(gi, ci);

        let q = layout.q.map(|qi| Measurement::new(fit.params[qi], fit.errors[qi]));

        let bandwidth = layout.q.and_then(|qi| {
            let q = fit.params[qi];
            if q == 0.0 {
                return None;
            }
            let var = (fit.errors[ci] / q).powi(2) + (c * fit.errors[qi] / (q * q)).powi(2)
                - 2.0 * c / (q * q * q) * fit.covariance_of(ci, qi);
            Some(Measurement::new(c / q, var.max(0.0).sqrt()))
        });

        Self {
            cutoff: Measurement::new(c, fit.errors[ci]),
            gain: Measurement::new(g, fit.errors[gi]),
            gain_bandwidth: Measurement::new(g * c, gbw_var.max(0.0).sqrt()),
            q,
            bandwidth,
        }
    }
}

fn curve_data(curve: &ErrorCurve) -> Result<CurveData<'_>> {
    CurveData::new(&curve.x, &curve.y, &curve.ex, &curve.ey)
}

impl BodeDataset {
    /// Fit the gain formula to the gain series, optionally restricted to
    /// `[min, max]` in frequency
    ///
    /// Starts from the parameters given to [`BodeDataset::set_gain_params`],
    /// or from a guess read off the data. On success the fit replaces the
    /// previous gain fit and cutoff, gain, gain-bandwidth (and for the
    /// bandpass Q and bandwidth) are published. On failure the previous fit is
    /// kept.
    pub fn fit_gain(&mut self, min: Option<f64>, max: Option<f64>) -> Result<FitResult> {
        let curves = self
            .curves
            .as_ref()
            .ok_or(BodeError::NotReady("functions not bound; call set_functions first"))?;
        let range = FitRange::new(min, max)?;
        let data = curve_data(&curves.gain)?;

        let initial = match &self.gain_init {
            Some(p) => p.clone(),
            None => {
                let p = guess::gain_params(self.kind, data.x, data.y);
                log::debug!("gain fit starting from guess {:?}", p);
                p
            }
        };

        let curve = self.kind.gain_curve();
        let mut result = fit_curve(&curve, &data, &initial, &range, &self.options).map_err(|e| {
            log::warn!("{} gain fit failed: {}", self.kind, e);
            e
        })?;

        // cutoff and Q only enter squared
        let canonical = self.kind.layout();
        for index in std::iter::once(canonical.cutoff).chain(canonical.q) {
            if result.params[index] < 0.0 {
                result.negate_param(index);
            }
        }

        let summary = GainSummary::from_fit(&result, &self.layout);
        log::info!(
            "{} gain fit: cutoff = {:.6e} +/- {:.2e}, gain = {:.6e} +/- {:.2e}, chi2/ndf = {:.3}/{}",
            self.kind,
            summary.cutoff.value,
            summary.cutoff.error,
            summary.gain.value,
            summary.gain.error,
            result.chi2,
            result.ndf
        );

        self.summary = Some(summary);
        self.gain_fit = Some(result.clone());
        Ok(result)
    }

    /// Fit the phase formula to the phase series
    ///
    /// Only the bandpass model defines a phase response; lowpass and highpass
    /// fail with [`BodeError::PhaseModelUnavailable`]. The phase fit publishes
    /// nothing besides its own result.
    pub fn fit_phase(&mut self, min: Option<f64>, max: Option<f64>) -> Result<FitResult> {
        let curve = self
            .kind
            .phase_curve()
            .ok_or(BodeError::PhaseModelUnavailable(self.kind))?;
        let curves = self
            .curves
            .as_ref()
            .ok_or(BodeError::NotReady("functions not bound; call set_functions first"))?;
        let range = FitRange::new(min, max)?;
        let data = curve_data(&curves.phase)?;

        let initial = match &self.phase_init {
            Some(p) => p.clone(),
            None => {
                let p = guess::phase_params(self.kind, data.x, data.y);
                log::debug!("phase fit starting from guess {:?}", p);
                p
            }
        };

        let result = fit_curve(&curve, &data, &initial, &range, &self.options).map_err(|e| {
            log::warn!("{} phase fit failed: {}", self.kind, e);
            e
        })?;

        log::info!(
            "{} phase fit: peak = {:.6e} +/- {:.2e}, chi2/ndf = {:.3}/{}",
            self.kind,
            result.params[self.kind.layout().cutoff],
            result.errors[self.kind.layout().cutoff],
            result.chi2,
            result.ndf
        );

        self.phase_fit = Some(result.clone());
        Ok(result)
    }

    /// Everything published by the last gain fit
    pub fn gain_summary(&self) -> Option<&GainSummary> {
        self.summary.as_ref()
    }

    pub fn cutoff(&self) -> Option<Measurement> {
        self.summary.map(|s| s.cutoff)
    }

    pub fn gain(&self) -> Option<Measurement> {
        self.summary.map(|s| s.gain)
    }

    pub fn gain_bandwidth(&self) -> Option<Measurement> {
        self.summary.map(|s| s.gain_bandwidth)
    }

    pub fn quality_factor(&self) -> Option<Measurement> {
        self.summary.and_then(|s| s.q)
    }

    pub fn bandwidth(&self) -> Option<Measurement> {
        self.summary.and_then(|s| s.bandwidth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FilterKind;
    use approx::assert_relative_eq;
    use ndarray::{Array1, Array2};

    fn fit(params: Vec<f64>, errors: Vec<f64>, cov: Vec<f64>) -> FitResult {
        let n = params.len();
        FitResult {
            params: Array1::from_vec(params),
            errors: Array1::from_vec(errors),
            covariance: Array2::from_shape_vec((n, n), cov).unwrap(),
            chi2: 0.0,
            ndf: 1,
            iterations: 1,
            n_points: n + 1,
        }
    }

    #[test]
    fn test_summary_lowpass() {
        // gain 2 +/- 0.1, cutoff 1000 +/- 10, uncorrelated
        let r = fit(vec![2.0, 1000.0], vec![0.1, 10.0], vec![0.01, 0.0, 0.0, 100.0]);
        let s = GainSummary::from_fit(&r, &FilterKind::Lowpass.layout());
        assert_eq!(s.cutoff, Measurement::new(1000.0, 10.0));
        assert_eq!(s.gain, Measurement::new(2.0, 0.1));
        assert_relative_eq!(s.gain_bandwidth.value, 2000.0);
        assert_relative_eq!(s.gain_bandwidth.error, (100.0f64 * 100.0 + 20.0 * 20.0).sqrt(), epsilon = 1e-9);
        assert!(s.q.is_none());
        assert!(s.bandwidth.is_none());
    }

    #[test]
    fn test_summary_bandpass_bandwidth() {
        let r = fit(
            vec![1.0, 1000.0, 4.0],
            vec![0.0, 10.0, 0.2],
            vec![0.0, 0.0, 0.0, 0.0, 100.0, 0.0, 0.0, 0.0, 0.04],
        );
        let s = GainSummary::from_fit(&r, &FilterKind::Bandpass.layout());
        let q = s.q.unwrap();
        let bw = s.bandwidth.unwrap();
        assert_eq!(q, Measurement::new(4.0, 0.2));
        assert_relative_eq!(bw.value, 250.0);
        // sqrt((10/4)^2 + (1000 * 0.2 / 16)^2)
        assert_relative_eq!(bw.error, (2.5f64.powi(2) + 12.5f64.powi(2)).sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_summary_correlated_errors() {
        // cov(g, c) = 0.5: sqrt(100^2 + 20^2 + 2 * 2 * 1000 * 0.5)
        let r = fit(vec![2.0, 1000.0], vec![0.1, 10.0], vec![0.01, 0.5, 0.5, 100.0]);
        let s = GainSummary::from_fit(&r, &FilterKind::Lowpass.layout());
        assert_relative_eq!(s.gain_bandwidth.error, 12400f64.sqrt(), epsilon = 1e-9);

        // cov(c, q) = 1: sqrt(2.5^2 + 12.5^2 - 2 * 1000 / 64 * 1)
        let r = fit(
            vec![1.0, 1000.0, 4.0],
            vec![0.0, 10.0, 0.2],
            vec![0.0, 0.0, 0.0, 0.0, 100.0, 1.0, 0.0, 1.0, 0.04],
        );
        let s = GainSummary::from_fit(&r, &FilterKind::Bandpass.layout());
        assert_relative_eq!(s.bandwidth.unwrap().error, 131.25f64.sqrt(), epsilon = 1e-9);
        // gain error is zero, only the cutoff term remains
        assert_relative_eq!(s.gain_bandwidth.error, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_summary_respects_layout_override() {
        let r = fit(vec![2.0, 1000.0], vec![0.1, 10.0], vec![0.01, 0.0, 0.0, 100.0]);
        let layout = ParamLayout { gain: 1, cutoff: 0, q: None };
        let s = GainSummary::from_fit(&r, &layout);
        assert_eq!(s.cutoff.value, 2.0);
        assert_eq!(s.gain.value, 1000.0);
    }
}
