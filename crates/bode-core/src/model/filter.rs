//! Filter kinds and their response formulas
//!
//! | kind     | gain(f)                               | phase(f)              |
//! |----------|---------------------------------------|-----------------------|
//! | lowpass  | `p0 / sqrt(1 + (f/p1)^2)`             | -                     |
//! | highpass | `p0 / sqrt(1 + (p1/f)^2)`             | -                     |
//! | bandpass | `p0 / sqrt(1 + p2^2 (f/p1 - p1/f)^2)` | `-atan(f/p1 - p1/f)`  |
//!
//! `p0` is the gain, `p1` the cutoff (peak) frequency and `p2` the quality
//! factor. No phase response is defined for lowpass and highpass.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BodeError, Result};
use crate::fit::Model;

/// Supported system types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Lowpass,
    Highpass,
    Bandpass,
}

impl FilterKind {
    pub const ALL: [FilterKind; 3] = [FilterKind::Lowpass, FilterKind::Highpass, FilterKind::Bandpass];

    /// Canonical name, as accepted by [`select_model`]
    pub fn name(&self) -> &'static str {
        match self {
            FilterKind::Lowpass => "lowpass",
            FilterKind::Highpass => "highpass",
            FilterKind::Bandpass => "bandpass",
        }
    }

    /// Number of parameters of the gain (and phase) formula
    pub fn n_params(&self) -> usize {
        match self {
            FilterKind::Lowpass | FilterKind::Highpass => 2,
            FilterKind::Bandpass => 3,
        }
    }

    /// True for the first-order lowpass/highpass models
    pub fn is_low_high_pass(&self) -> bool {
        !matches!(self, FilterKind::Bandpass)
    }

    /// Default parameter layout
    pub fn layout(&self) -> ParamLayout {
        ParamLayout {
            gain: 0,
            cutoff: 1,
            q: if self.is_low_high_pass() { None } else { Some(2) },
        }
    }

    /// Parameter names in vector order
    pub fn param_names(&self) -> &'static [&'static str] {
        match self {
            FilterKind::Lowpass | FilterKind::Highpass => &["gain", "cutoff"],
            FilterKind::Bandpass => &["gain", "peak", "q"],
        }
    }

    pub fn has_phase(&self) -> bool {
        matches!(self, FilterKind::Bandpass)
    }

    /// Gain response curve
    pub fn gain_curve(&self) -> ResponseCurve {
        ResponseCurve {
            kind: *self,
            quantity: Quantity::Gain,
        }
    }

    /// Phase response curve, if the model defines one
    pub fn phase_curve(&self) -> Option<ResponseCurve> {
        self.has_phase().then_some(ResponseCurve {
            kind: *self,
            quantity: Quantity::Phase,
        })
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = BodeError;

    /// Case-sensitive lookup of a system name
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lowpass" => Ok(FilterKind::Lowpass),
            "highpass" => Ok(FilterKind::Highpass),
            "bandpass" => Ok(FilterKind::Bandpass),
            _ => Err(BodeError::UnknownSystem(s.to_string())),
        }
    }
}

/// Look up a filter model by name
pub fn select_model(name: &str) -> Result<FilterKind> {
    name.parse()
}

/// Positions of the physical parameters in a parameter vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamLayout {
    pub gain: usize,
    pub cutoff: usize,
    pub q: Option<usize>,
}

/// Which response of a model is being evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantity {
    Gain,
    Phase,
}

/// One response formula of a filter model, in the frequency variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseCurve {
    pub kind: FilterKind,
    pub quantity: Quantity,
}

impl ResponseCurve {
    /// `f/p1 - p1/f`, the detuning of a bandpass
    #[inline]
    fn detuning(f: f64, p1: f64) -> f64 {
        f / p1 - p1 / f
    }

    /// Evaluate the response at frequency `f`
    pub fn eval(&self, f: f64, p: &[f64]) -> f64 {
        match (self.kind, self.quantity) {
            (FilterKind::Lowpass, Quantity::Gain) => p[0] / (1.0 + (f / p[1]).powi(2)).sqrt(),
            (FilterKind::Highpass, Quantity::Gain) => p[0] / (1.0 + (p[1] / f).powi(2)).sqrt(),
            (FilterKind::Bandpass, Quantity::Gain) => {
                let v = Self::detuning(f, p[1]);
                p[0] / (1.0 + p[2].powi(2) * v.powi(2)).sqrt()
            }
            (FilterKind::Bandpass, Quantity::Phase) => -Self::detuning(f, p[1]).atan(),
            (_, Quantity::Phase) => f64::NAN,
        }
    }

    /// Partial derivatives with respect to each parameter
    pub fn param_gradient(&self, f: f64, p: &[f64]) -> Vec<f64> {
        match (self.kind, self.quantity) {
            (FilterKind::Lowpass, Quantity::Gain) => {
                let u = f / p[1];
                let s = 1.0 + u * u;
                vec![1.0 / s.sqrt(), p[0] * u * u / (p[1] * s.powf(1.5))]
            }
            (FilterKind::Highpass, Quantity::Gain) => {
                let u = p[1] / f;
                let s = 1.0 + u * u;
                vec![1.0 / s.sqrt(), -p[0] * u * u / (p[1] * s.powf(1.5))]
            }
            (FilterKind::Bandpass, Quantity::Gain) => {
                let v = Self::detuning(f, p[1]);
                let s = 1.0 + p[2] * p[2] * v * v;
                let s32 = s.powf(1.5);
                let dv_dp1 = -f / (p[1] * p[1]) - 1.0 / f;
                vec![
                    1.0 / s.sqrt(),
                    -p[0] * p[2] * p[2] * v * dv_dp1 / s32,
                    -p[0] * p[2] * v * v / s32,
                ]
            }
            (FilterKind::Bandpass, Quantity::Phase) => {
                let v = Self::detuning(f, p[1]);
                let dv_dp1 = -f / (p[1] * p[1]) - 1.0 / f;
                vec![0.0, -dv_dp1 / (1.0 + v * v), 0.0]
            }
            (kind, Quantity::Phase) => vec![f64::NAN; kind.n_params()],
        }
    }

    /// Derivative with respect to frequency
    pub fn freq_derivative(&self, f: f64, p: &[f64]) -> f64 {
        match (self.kind, self.quantity) {
            (FilterKind::Lowpass, Quantity::Gain) => {
                let u = f / p[1];
                -p[0] * u / (p[1] * (1.0 + u * u).powf(1.5))
            }
            (FilterKind::Highpass, Quantity::Gain) => {
                let u = p[1] / f;
                p[0] * u * u / (f * (1.0 + u * u).powf(1.5))
            }
            (FilterKind::Bandpass, Quantity::Gain) => {
                let v = Self::detuning(f, p[1]);
                let s = 1.0 + p[2] * p[2] * v * v;
                let dv_df = 1.0 / p[1] + p[1] / (f * f);
                -p[0] * p[2] * p[2] * v * dv_df / s.powf(1.5)
            }
            (FilterKind::Bandpass, Quantity::Phase) => {
                let v = Self::detuning(f, p[1]);
                -(1.0 / p[1] + p[1] / (f * f)) / (1.0 + v * v)
            }
            (_, Quantity::Phase) => f64::NAN,
        }
    }
}

impl Model for ResponseCurve {
    fn n_params(&self) -> usize {
        self.kind.n_params()
    }

    fn value(&self, x: f64, params: &[f64]) -> f64 {
        self.eval(x, params)
    }

    fn gradient(&self, x: f64, params: &[f64]) -> Vec<f64> {
        self.param_gradient(x, params)
    }

    fn slope(&self, x: f64, params: &[f64]) -> f64 {
        self.freq_derivative(x, params)
    }

    /// The bandpass phase only depends on the peak frequency.
    fn is_free(&self, index: usize) -> bool {
        match self.quantity {
            Quantity::Gain => true,
            Quantity::Phase => index == self.kind.layout().cutoff,
        }
    }
}
