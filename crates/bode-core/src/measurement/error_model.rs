//! Instrumental error model
//!
//! Pure functions turning a full-scale reading into an absolute error and
//! propagating voltage, period and time-shift errors into frequency, gain and
//! phase errors. Instrumental errors are half-ranges of a uniform
//! distribution; dividing by sqrt(3) converts them into standard deviations.

use std::f64::consts::PI;

use crate::constants::{
    TIME_ACCURACY, TIME_PARTITIONS, VOLTAGE_ACCURACY_HIGH, VOLTAGE_ACCURACY_LOW,
    VOLTAGE_LOW_RANGE_LIMIT, VOLTAGE_PARTITIONS,
};
use crate::error::{BodeError, Result};

/// Accuracy class of a voltage range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoltageRange {
    /// Full-scale reading <= 10 mV
    Low,
    High,
}

impl VoltageRange {
    /// Classify a full-scale reading. Exactly 0.01 is a low range.
    pub fn of(full_scale: f64) -> Self {
        if full_scale <= VOLTAGE_LOW_RANGE_LIMIT {
            VoltageRange::Low
        } else {
            VoltageRange::High
        }
    }

    /// Relative accuracy for this range
    pub fn accuracy(&self) -> f64 {
        match self {
            VoltageRange::Low => VOLTAGE_ACCURACY_LOW,
            VoltageRange::High => VOLTAGE_ACCURACY_HIGH,
        }
    }
}

/// Uniform half-range of a voltage reading: `k * n * full_scale`
#[inline]
pub fn voltage_half_range(full_scale: f64) -> f64 {
    VoltageRange::of(full_scale).accuracy() * VOLTAGE_PARTITIONS * full_scale
}

/// Standard error of a voltage reading taken on the given full-scale range
///
/// `k * 8 * full_scale / sqrt(3)` with `k = 0.045` for ranges up to 10 mV and
/// `k = 0.035` above.
#[inline]
pub fn voltage_error(full_scale: f64) -> f64 {
    voltage_half_range(full_scale) / 3f64.sqrt()
}

/// Uniform half-range of a time reading: `full_scale * 0.0016 * 10`
#[inline]
pub fn time_half_range(full_scale: f64) -> f64 {
    full_scale * TIME_ACCURACY * TIME_PARTITIONS
}

/// Standard error of a time reading taken on the given timebase
#[inline]
pub fn time_error(full_scale: f64) -> f64 {
    time_half_range(full_scale) / 3f64.sqrt()
}

/// Gain `vout / vin`
pub fn gain(vin: f64, vout: f64) -> Result<f64> {
    if vin == 0.0 {
        return Err(BodeError::Domain("input voltage is zero".to_string()));
    }
    Ok(vout / vin)
}

/// First-order error on `vout / vin` for independent errors on both voltages
///
/// `sqrt((e_vout / vin)^2 + (e_vin * vout / vin^2)^2)`
pub fn gain_error(vin: f64, vout: f64, e_vin: f64, e_vout: f64) -> f64 {
    ((e_vout / vin).powi(2) + (e_vin * vout / vin.powi(2)).powi(2)).sqrt()
}

/// Frequency `1 / period`
pub fn frequency(period: f64) -> Result<f64> {
    if period == 0.0 {
        return Err(BodeError::Domain("period is zero".to_string()));
    }
    Ok(1.0 / period)
}

/// Error on `1 / period`: `e_period / period^2`
pub fn frequency_error(period: f64, e_period: f64) -> f64 {
    e_period / period.powi(2)
}

/// Phase in radians, `2 pi dt / period`, signed like the time shift
pub fn phase(period: f64, dt: f64) -> Result<f64> {
    if period == 0.0 {
        return Err(BodeError::Domain("period is zero".to_string()));
    }
    Ok(2.0 * PI * dt / period)
}

/// Error on the phase: `2 pi sqrt((e_dt / period)^2 + (dt * e_period / period^2)^2)`
pub fn phase_error(period: f64, dt: f64, e_period: f64, e_dt: f64) -> f64 {
    2.0 * PI * ((e_dt / period).powi(2) + (dt * e_period / period.powi(2)).powi(2)).sqrt()
}
