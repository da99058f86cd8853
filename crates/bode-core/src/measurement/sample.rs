//! Raw scope samples and the points derived from them

use serde::{Deserialize, Serialize};

use super::error_model::{
    frequency, frequency_error, gain, gain_error, phase, phase_error, time_error, voltage_error,
};
use crate::error::{BodeError, Result};

/// Number of numbers making up one record in the input format
pub const RECORD_FIELDS: usize = 8;

/// One oscilloscope reading
///
/// Every value is accompanied by the full-scale reading (range) it was taken
/// on; the instrumental error is derived from the range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Input amplitude (V)
    pub vin: f64,
    /// Full-scale reading for `vin` (V/div)
    pub fs_vin: f64,
    /// Output amplitude (V)
    pub vout: f64,
    /// Full-scale reading for `vout` (V/div)
    pub fs_vout: f64,
    /// Signal period (s)
    pub period: f64,
    /// Timebase used for the period (s/div)
    pub fs_period: f64,
    /// Time shift between output and input (s)
    pub time_shift: f64,
    /// Timebase used for the time shift (s/div)
    pub fs_time_shift: f64,
}

impl RawSample {
    /// Build a sample from the eight fields in file order
    pub fn from_fields(fields: [f64; RECORD_FIELDS]) -> Self {
        let [vin, fs_vin, vout, fs_vout, period, fs_period, time_shift, fs_time_shift] = fields;
        Self {
            vin,
            fs_vin,
            vout,
            fs_vout,
            period,
            fs_period,
            time_shift,
            fs_time_shift,
        }
    }

    /// The eight fields in file order
    pub fn to_fields(&self) -> [f64; RECORD_FIELDS] {
        [
            self.vin,
            self.fs_vin,
            self.vout,
            self.fs_vout,
            self.period,
            self.fs_period,
            self.time_shift,
            self.fs_time_shift,
        ]
    }

    /// Derive frequency, gain and phase with propagated errors
    ///
    /// Fails with [`BodeError::Domain`] when `vin` or `period` is zero or a
    /// derived value is not finite.
    pub fn derive(&self) -> Result<DerivedPoint> {
        let e_vin = voltage_error(self.fs_vin);
        let e_vout = voltage_error(self.fs_vout);
        let e_period = time_error(self.fs_period);
        let e_dt = time_error(self.fs_time_shift);

        let point = DerivedPoint {
            frequency: frequency(self.period)?,
            frequency_error: frequency_error(self.period, e_period),
            gain: gain(self.vin, self.vout)?,
            gain_error: gain_error(self.vin, self.vout, e_vin, e_vout),
            phase: phase(self.period, self.time_shift)?,
            phase_error: phase_error(self.period, self.time_shift, e_period, e_dt),
        };

        if point.is_finite() {
            Ok(point)
        } else {
            Err(BodeError::Domain(format!(
                "non-finite point derived from {:?}",
                self.to_fields()
            )))
        }
    }
}

/// A (frequency, gain, phase) point with standard errors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedPoint {
    pub frequency: f64,
    pub frequency_error: f64,
    pub gain: f64,
    pub gain_error: f64,
    /// Phase in radians
    pub phase: f64,
    pub phase_error: f64,
}

impl DerivedPoint {
    fn is_finite(&self) -> bool {
        [
            self.frequency,
            self.frequency_error,
            self.gain,
            self.gain_error,
            self.phase,
            self.phase_error,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}
