//! Synthetic measurement generator
//!
//! Produces oscilloscope-style records from an ideal filter response, with
//! optional noise drawn uniformly on the instrument half-range. The output
//! file uses the same eight-column format the dataset reads back.

use std::f64::consts::PI;
use std::path::Path;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{BodeError, Result};
use crate::measurement::{time_half_range, voltage_half_range, DerivedPoint, RawSample};
use crate::model::{select_model, FilterKind};
use crate::records;

/// Smallest voltage setting of the simulated instrument (V per division)
const MIN_VOLTAGE_SETTING: f64 = 1e-3;

/// Smallest timebase setting of the simulated instrument (s per division)
const MIN_TIME_SETTING: f64 = 1e-9;

/// Vertical divisions spanned by the peak-to-peak signal
const VOLTAGE_DIVISIONS: f64 = 8.0;

/// Horizontal divisions spanned by one period
const PERIOD_DIVISIONS: f64 = 5.0;

/// Amount of noise added to simulated readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseLevel {
    /// Exact readings
    #[default]
    None,
    /// Noise within the instrumental half-range
    Low,
    /// Noise up to three half-ranges
    High,
}

impl NoiseLevel {
    /// Multiplier applied to the instrumental half-range
    pub fn factor(&self) -> f64 {
        match self {
            NoiseLevel::None => 0.0,
            NoiseLevel::Low => 1.0,
            NoiseLevel::High => 3.0,
        }
    }
}

/// Seeded generator of simulated Bode measurements
#[derive(Debug, Clone)]
pub struct Simulator {
    kind: FilterKind,
    cutoff: Option<f64>,
    gain: Option<f64>,
    q: Option<f64>,
    noise: NoiseLevel,
    amplitude: f64,
    rng: StdRng,
}

impl Simulator {
    /// New lowpass simulator with no parameters set, 1 V input and no noise
    pub fn new(seed: u64) -> Self {
        Self {
            kind: FilterKind::Lowpass,
            cutoff: None,
            gain: None,
            q: None,
            noise: NoiseLevel::None,
            amplitude: 1.0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Select the filter by name; an unknown name keeps the current selection
    pub fn set_filter_type(&mut self, name: &str) -> Result<()> {
        self.kind = select_model(name)?;
        Ok(())
    }

    pub fn set_kind(&mut self, kind: FilterKind) {
        self.kind = kind;
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn set_cutoff(&mut self, cutoff: f64) {
        self.cutoff = Some(cutoff);
    }

    pub fn set_gain(&mut self, gain: f64) {
        self.gain = Some(gain);
    }

    pub fn set_q(&mut self, q: f64) {
        self.q = Some(q);
    }

    pub fn set_noise(&mut self, noise: NoiseLevel) {
        self.noise = noise;
    }

    pub fn noise(&self) -> NoiseLevel {
        self.noise
    }

    /// Peak input voltage
    pub fn set_amplitude(&mut self, amplitude: f64) -> Result<()> {
        if !(amplitude.is_finite() && amplitude > 0.0) {
            return Err(BodeError::InvalidParameters(format!(
                "amplitude must be positive, got {}",
                amplitude
            )));
        }
        self.amplitude = amplitude;
        Ok(())
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Parameter vector in canonical order
    fn params(&self) -> Result<Vec<f64>> {
        let gain = self.gain.ok_or(BodeError::NotReady("simulator gain not set"))?;
        let cutoff = self
            .cutoff
            .ok_or(BodeError::NotReady("simulator cutoff not set"))?;
        if !(cutoff.is_finite() && cutoff > 0.0) || !gain.is_finite() {
            return Err(BodeError::InvalidParameters(format!(
                "gain {} and cutoff {} must be finite with a positive cutoff",
                gain, cutoff
            )));
        }

        let mut params = vec![gain, cutoff];
        if !self.kind.is_low_high_pass() {
            let q = self.q.ok_or(BodeError::NotReady("simulator Q not set"))?;
            if !(q.is_finite() && q > 0.0) {
                return Err(BodeError::InvalidParameters(format!(
                    "Q must be positive, got {}",
                    q
                )));
            }
            params.push(q);
        }
        Ok(params)
    }

    /// Ideal (gain, phase) at `f`; phase is 0 for models without a phase formula
    pub fn ideal(&self, f: f64) -> Result<(f64, f64)> {
        let params = self.params()?;
        Ok(self.response(f, &params))
    }

    fn response(&self, f: f64, params: &[f64]) -> (f64, f64) {
        let gain = self.kind.gain_curve().eval(f, params);
        let phase = self
            .kind
            .phase_curve()
            .map_or(0.0, |curve| curve.eval(f, params));
        (gain, phase)
    }

    /// Simulated raw records, one per frequency
    pub fn generate_records(&mut self, freqs: &[f64]) -> Result<Vec<RawSample>> {
        let params = self.params()?;
        let factor = self.noise.factor();

        let mut samples = Vec::with_capacity(freqs.len());
        for &f in freqs {
            if !(f.is_finite() && f > 0.0) {
                return Err(BodeError::Domain(format!(
                    "simulation frequency must be positive, got {}",
                    f
                )));
            }
            let (gain, phase) = self.response(f, &params);
            let period = 1.0 / f;

            let vin = self.amplitude;
            let vout = gain * vin;
            let time_shift = phase * period / (2.0 * PI);

            let fs_vin = scale_setting(vin.abs() * 2.0 / VOLTAGE_DIVISIONS, MIN_VOLTAGE_SETTING);
            let fs_vout = scale_setting(vout.abs() * 2.0 / VOLTAGE_DIVISIONS, MIN_VOLTAGE_SETTING);
            let fs_time = scale_setting(period / PERIOD_DIVISIONS, MIN_TIME_SETTING);

            samples.push(RawSample {
                vin: vin + self.jitter(voltage_half_range(fs_vin) * factor),
                fs_vin,
                vout: vout + self.jitter(voltage_half_range(fs_vout) * factor),
                fs_vout,
                period: period + self.jitter(time_half_range(fs_time) * factor),
                fs_period: fs_time,
                time_shift: time_shift + self.jitter(time_half_range(fs_time) * factor),
                fs_time_shift: fs_time,
            });
        }

        debug!(
            "simulated {} {} records with {:?} noise",
            samples.len(),
            self.kind,
            self.noise
        );
        Ok(samples)
    }

    /// Simulated points with propagated instrumental errors
    pub fn generate(&mut self, freqs: &[f64]) -> Result<Vec<DerivedPoint>> {
        self.generate_records(freqs)?
            .iter()
            .map(RawSample::derive)
            .collect()
    }

    /// Write simulated records to `path` and return them
    pub fn write_records<P: AsRef<Path>>(
        &mut self,
        path: P,
        freqs: &[f64],
    ) -> Result<Vec<RawSample>> {
        let samples = self.generate_records(freqs)?;
        records::write_records(&path, &samples)?;
        info!(
            "wrote {} simulated records to {}",
            samples.len(),
            path.as_ref().display()
        );
        Ok(samples)
    }

    /// Uniform draw on `[-half_range, half_range)`
    fn jitter(&mut self, half_range: f64) -> f64 {
        if half_range > 0.0 {
            self.rng.random_range(-half_range..half_range)
        } else {
            0.0
        }
    }
}

/// Smallest 1-2-5 setting that is at least `needed`, never below `floor`
fn scale_setting(needed: f64, floor: f64) -> f64 {
    if !(needed.is_finite() && needed > floor) {
        return floor;
    }
    let decade = 10f64.powf(needed.log10().floor());
    [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * decade)
        .find(|&setting| setting >= needed * (1.0 - 1e-12))
        .unwrap_or(10.0 * decade)
}
