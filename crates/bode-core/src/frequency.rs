//! Frequency sweeps
//!
//! Linear and logarithmic frequency grids for simulated measurements.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Frequency unit enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FrequencyUnit {
    #[default]
    Hz,
    KHz,
    MHz,
}

impl FrequencyUnit {
    /// Get the multiplier to convert to Hz
    pub fn multiplier(&self) -> f64 {
        match self {
            FrequencyUnit::Hz => 1.0,
            FrequencyUnit::KHz => 1e3,
            FrequencyUnit::MHz => 1e6,
        }
    }
}

impl FromStr for FrequencyUnit {
    type Err = String;

    /// Parse from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hz" => Ok(FrequencyUnit::Hz),
            "khz" => Ok(FrequencyUnit::KHz),
            "mhz" => Ok(FrequencyUnit::MHz),
            _ => Err(format!("unknown frequency unit '{}'", s)),
        }
    }
}

/// Sweep type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SweepType {
    Linear,
    #[default]
    Log,
}

/// A sweep of frequency points, stored in Hz
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencySweep {
    f: Vec<f64>,
    unit: FrequencyUnit,
    sweep_type: SweepType,
}

impl FrequencySweep {
    /// Create a sweep from start/stop/npoints
    ///
    /// # Arguments
    /// * `start` - Start frequency in the specified unit
    /// * `stop` - Stop frequency in the specified unit
    /// * `npoints` - Number of frequency points
    /// * `unit` - Frequency unit
    /// * `sweep_type` - Linear or logarithmic sweep
    ///
    /// # Example
    /// ```
    /// use bode_core::frequency::{FrequencySweep, FrequencyUnit, SweepType};
    /// let sweep = FrequencySweep::new(10.0, 100.0, 3, FrequencyUnit::KHz, SweepType::Log);
    /// assert_eq!(sweep.npoints(), 3);
    /// ```
    pub fn new(
        start: f64,
        stop: f64,
        npoints: usize,
        unit: FrequencyUnit,
        sweep_type: SweepType,
    ) -> Self {
        let mult = unit.multiplier();
        let start_hz = start * mult;
        let stop_hz = stop * mult;

        let f = match (npoints, sweep_type) {
            (0, _) => Vec::new(),
            (1, _) => vec![start_hz],
            (_, SweepType::Linear) => {
                let step = (stop_hz - start_hz) / (npoints - 1) as f64;
                (0..npoints).map(|i| start_hz + i as f64 * step).collect()
            }
            (_, SweepType::Log) => {
                let log_start = start_hz.ln();
                let log_step = (stop_hz.ln() - log_start) / (npoints - 1) as f64;
                (0..npoints)
                    .map(|i| (log_start + i as f64 * log_step).exp())
                    .collect()
            }
        };

        Self {
            f,
            unit,
            sweep_type,
        }
    }

    /// Create from explicit frequencies in the given unit
    pub fn from_f(f: Vec<f64>, unit: FrequencyUnit) -> Self {
        let mult = unit.multiplier();
        Self {
            f: f.iter().map(|&x| x * mult).collect(),
            unit,
            sweep_type: SweepType::Linear,
        }
    }

    /// Frequencies in Hz
    #[inline]
    pub fn f(&self) -> &[f64] {
        &self.f
    }

    /// Frequencies in the sweep's unit
    pub fn f_scaled(&self) -> Vec<f64> {
        let mult = self.unit.multiplier();
        self.f.iter().map(|&x| x / mult).collect()
    }

    #[inline]
    pub fn npoints(&self) -> usize {
        self.f.len()
    }

    #[inline]
    pub fn start(&self) -> f64 {
        *self.f.first().unwrap_or(&0.0)
    }

    #[inline]
    pub fn stop(&self) -> f64 {
        *self.f.last().unwrap_or(&0.0)
    }

    #[inline]
    pub fn unit(&self) -> FrequencyUnit {
        self.unit
    }

    #[inline]
    pub fn sweep_type(&self) -> SweepType {
        self.sweep_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_sweep() {
        let sweep = FrequencySweep::new(1.0, 10.0, 10, FrequencyUnit::KHz, SweepType::Linear);
        assert_eq!(sweep.npoints(), 10);
        assert_relative_eq!(sweep.start(), 1e3, epsilon = 1e-9);
        assert_relative_eq!(sweep.stop(), 1e4, epsilon = 1e-9);
        assert_relative_eq!(sweep.f_scaled()[4], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_log_sweep_constant_ratio() {
        let sweep = FrequencySweep::new(10.0, 100000.0, 9, FrequencyUnit::Hz, SweepType::Log);
        assert_relative_eq!(sweep.start(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(sweep.stop(), 1e5, max_relative = 1e-12);
        let ratios: Vec<f64> = sweep.f().windows(2).map(|w| w[1] / w[0]).collect();
        for r in &ratios {
            assert_relative_eq!(*r, ratios[0], max_relative = 1e-10);
        }
    }

    #[test]
    fn test_degenerate_sweeps() {
        assert!(FrequencySweep::new(1.0, 2.0, 0, FrequencyUnit::Hz, SweepType::Log).f().is_empty());
        assert_eq!(
            FrequencySweep::new(3.0, 9.0, 1, FrequencyUnit::Hz, SweepType::Log).f(),
            &[3.0]
        );
    }

    #[test]
    fn test_from_f_and_units() {
        let sweep = FrequencySweep::from_f(vec![1.0, 2.5], FrequencyUnit::MHz);
        assert_relative_eq!(sweep.f()[1], 2.5e6);
        assert_eq!("kHz".parse::<FrequencyUnit>(), Ok(FrequencyUnit::KHz));
        assert!("GHz".parse::<FrequencyUnit>().is_err());
    }
}
