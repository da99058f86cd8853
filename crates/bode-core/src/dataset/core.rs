//! Core BodeDataset struct, series setters and model selection

use ndarray::Array1;

use super::fitting::GainSummary;
use super::series::Series;
use crate::constants::DEFAULT_LABEL;
use crate::error::{BodeError, Result};
use crate::fit::{FitOptions, FitResult};
use crate::model::{FilterKind, ParamLayout};

/// Owned error-bar curve bound for fitting
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorCurve {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub ex: Vec<f64>,
    pub ey: Vec<f64>,
}

impl ErrorCurve {
    fn from_series(x: &Series, y: &Series) -> Self {
        Self {
            x: x.values.clone(),
            y: y.values.clone(),
            ex: x.errors.clone(),
            ey: y.errors.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub(super) struct BoundCurves {
    pub gain: ErrorCurve,
    pub phase: ErrorCurve,
}

/// Frequency-response measurements of one circuit and their fits
///
/// A dataset is created for a filter type, receives its three series (either
/// through the setters or by reading a record file), binds them with
/// [`BodeDataset::set_functions`], and can then be fitted any number of times.
///
/// # Example
/// ```
/// use bode_core::BodeDataset;
/// let mut ds = BodeDataset::with_system("lowpass").unwrap();
/// let f = vec![10.0, 100.0, 1000.0, 10000.0];
/// let g: Vec<f64> = f.iter().map(|x: &f64| 2.0 / (1.0 + (x / 1000.0).powi(2)).sqrt()).collect();
/// ds.set_frequency_series(f, vec![0.0; 4]).unwrap();
/// ds.set_phase_series(vec![0.0; 4], vec![0.0; 4]).unwrap();
/// ds.set_gain_series(g, vec![0.0; 4]).unwrap();
/// ds.set_functions().unwrap();
/// ds.set_gain_params(2.0, 1000.0, None).unwrap();
/// ds.fit_gain(None, None).unwrap();
/// let cutoff = ds.cutoff().unwrap();
/// assert!((cutoff.value - 1000.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct BodeDataset {
    pub(super) kind: FilterKind,
    pub(super) layout: ParamLayout,

    frequency: Option<Series>,
    gain: Option<Series>,
    phase: Option<Series>,
    /// Series length, fixed by the first successful setter
    n_points: Option<usize>,

    pub(super) curves: Option<BoundCurves>,

    pub(super) gain_init: Option<Vec<f64>>,
    pub(super) phase_init: Option<Vec<f64>>,

    pub(super) gain_fit: Option<FitResult>,
    pub(super) phase_fit: Option<FitResult>,
    pub(super) summary: Option<GainSummary>,

    /// Optimiser configuration used by the fits
    pub options: FitOptions,
    label: String,
}

impl BodeDataset {
    /// Create an empty dataset for a filter type
    pub fn new(kind: FilterKind) -> Self {
        Self {
            kind,
            layout: kind.layout(),
            frequency: None,
            gain: None,
            phase: None,
            n_points: None,
            curves: None,
            gain_init: None,
            phase_init: None,
            gain_fit: None,
            phase_fit: None,
            summary: None,
            options: FitOptions::default(),
            label: DEFAULT_LABEL.to_string(),
        }
    }

    /// Create an empty dataset from a system name
    pub fn with_system(system: &str) -> Result<Self> {
        Ok(Self::new(system.parse()?))
    }

    // ========================================================================
    // Model selection
    // ========================================================================

    /// Select the filter model by name
    ///
    /// An unknown name fails with [`BodeError::UnknownSystem`] and leaves the
    /// current selection untouched. A successful selection discards both fits,
    /// the initial parameters and any parameter-index override.
    pub fn set_system(&mut self, system: &str) -> Result<()> {
        let kind: FilterKind = system.parse()?;
        self.set_kind(kind);
        Ok(())
    }

    /// Select the filter model
    pub fn set_kind(&mut self, kind: FilterKind) {
        self.kind = kind;
        self.layout = kind.layout();
        self.gain_init = None;
        self.phase_init = None;
        self.gain_fit = None;
        self.phase_fit = None;
        self.summary = None;
        log::debug!("selected {} model", kind);
    }

    #[inline]
    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    #[inline]
    pub fn layout(&self) -> ParamLayout {
        self.layout
    }

    /// Publish parameter `index` of the gain fit as the cutoff
    pub fn set_cutoff_index(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.layout.cutoff = index;
        Ok(())
    }

    /// Publish parameter `index` of the gain fit as the gain
    pub fn set_gain_index(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.layout.gain = index;
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        let n = self.kind.n_params();
        if index >= n {
            return Err(BodeError::InvalidParameters(format!(
                "parameter index {} out of range for the {} model ({} parameters)",
                index, self.kind, n
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Series
    // ========================================================================

    /// Set the frequency series and its errors
    pub fn set_frequency_series(&mut self, values: Vec<f64>, errors: Vec<f64>) -> Result<()> {
        let series = self.checked_series("frequency", values, errors)?;
        self.frequency = Some(series);
        Ok(())
    }

    /// Set the gain series and its errors
    pub fn set_gain_series(&mut self, values: Vec<f64>, errors: Vec<f64>) -> Result<()> {
        let series = self.checked_series("gain", values, errors)?;
        self.gain = Some(series);
        Ok(())
    }

    /// Set the phase series (radians) and its errors
    pub fn set_phase_series(&mut self, values: Vec<f64>, errors: Vec<f64>) -> Result<()> {
        let series = self.checked_series("phase", values, errors)?;
        self.phase = Some(series);
        Ok(())
    }

    /// Validate lengths and fix N on the first successful call.
    fn checked_series(
        &mut self,
        name: &'static str,
        values: Vec<f64>,
        errors: Vec<f64>,
    ) -> Result<Series> {
        if values.len() != errors.len() {
            log::warn!("{} values and errors differ in length", name);
            return Err(BodeError::LengthMismatch {
                series: name,
                expected: values.len(),
                found: errors.len(),
            });
        }

        match self.n_points {
            Some(n) if n != values.len() => {
                log::warn!("{} series length does not match previous series", name);
                return Err(BodeError::LengthMismatch {
                    series: name,
                    expected: n,
                    found: values.len(),
                });
            }
            Some(_) => {}
            None => self.n_points = Some(values.len()),
        }

        if self.curves.take().is_some() {
            log::debug!("{} series replaced; functions unbound", name);
        }
        log::debug!("set {} series ({} points)", name, values.len());
        Ok(Series::new(values, errors))
    }

    /// Series length, once fixed
    #[inline]
    pub fn n_points(&self) -> Option<usize> {
        self.n_points
    }

    pub fn frequency_series(&self) -> Option<&Series> {
        self.frequency.as_ref()
    }

    pub fn gain_series(&self) -> Option<&Series> {
        self.gain.as_ref()
    }

    pub fn phase_series(&self) -> Option<&Series> {
        self.phase.as_ref()
    }

    /// Bind the series to the model's fittable curves
    ///
    /// Requires all three series. Setting any series afterwards unbinds them.
    pub fn set_functions(&mut self) -> Result<()> {
        let freq = self
            .frequency
            .as_ref()
            .ok_or(BodeError::NotReady("frequency series not set"))?;
        let gain = self.gain.as_ref().ok_or(BodeError::NotReady("gain series not set"))?;
        let phase = self.phase.as_ref().ok_or(BodeError::NotReady("phase series not set"))?;

        self.curves = Some(BoundCurves {
            gain: ErrorCurve::from_series(freq, gain),
            phase: ErrorCurve::from_series(freq, phase),
        });
        log::debug!("bound {} model to {} points", self.kind, freq.len());
        Ok(())
    }

    /// Whether `set_functions` has bound the current series
    #[inline]
    pub fn is_bound(&self) -> bool {
        self.curves.is_some()
    }

    /// Bound gain curve
    pub fn gain_curve(&self) -> Option<&ErrorCurve> {
        self.curves.as_ref().map(|c| &c.gain)
    }

    /// Bound phase curve
    pub fn phase_curve(&self) -> Option<&ErrorCurve> {
        self.curves.as_ref().map(|c| &c.phase)
    }

    // ========================================================================
    // Initial parameters
    // ========================================================================

    /// Initial parameters for the gain fit
    ///
    /// `q` is required for the bandpass and ignored for lowpass/highpass.
    pub fn set_gain_params(&mut self, gain: f64, cutoff: f64, q: Option<f64>) -> Result<()> {
        self.gain_init = Some(self.initial_params(gain, cutoff, q)?);
        Ok(())
    }

    /// Initial parameters for the phase fit, same layout as the gain fit
    pub fn set_phase_params(&mut self, gain: f64, cutoff: f64, q: Option<f64>) -> Result<()> {
        self.phase_init = Some(self.initial_params(gain, cutoff, q)?);
        Ok(())
    }

    fn initial_params(&self, gain: f64, cutoff: f64, q: Option<f64>) -> Result<Vec<f64>> {
        match (self.kind.is_low_high_pass(), q) {
            (true, Some(q)) => {
                log::warn!("Q = {} ignored: the {} model has no quality factor", q, self.kind);
                Ok(vec![gain, cutoff])
            }
            (true, None) => Ok(vec![gain, cutoff]),
            (false, Some(q)) => Ok(vec![gain, cutoff, q]),
            (false, None) => Err(BodeError::InvalidParameters(format!(
                "the {} model needs gain, cutoff and Q",
                self.kind
            ))),
        }
    }

    pub fn gain_params(&self) -> Option<&[f64]> {
        self.gain_init.as_deref()
    }

    pub fn phase_params(&self) -> Option<&[f64]> {
        self.phase_init.as_deref()
    }

    // ========================================================================
    // Fit state
    // ========================================================================

    #[inline]
    pub fn has_fitted_gain(&self) -> bool {
        self.gain_fit.is_some()
    }

    #[inline]
    pub fn has_fitted_phase(&self) -> bool {
        self.phase_fit.is_some()
    }

    pub fn gain_fit(&self) -> Option<&FitResult> {
        self.gain_fit.as_ref()
    }

    pub fn phase_fit(&self) -> Option<&FitResult> {
        self.phase_fit.as_ref()
    }

    /// Fitted gain-curve parameters
    pub fn gain_fit_params(&self) -> Option<&Array1<f64>> {
        self.gain_fit.as_ref().map(|r| &r.params)
    }

    /// Fitted phase-curve parameters
    pub fn phase_fit_params(&self) -> Option<&Array1<f64>> {
        self.phase_fit.as_ref().map(|r| &r.params)
    }

    // ========================================================================
    // Presentation
    // ========================================================================

    /// Display label for plots
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }
}
