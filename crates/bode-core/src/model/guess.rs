//! Initial parameter guesses
//!
//! Fitting starts from user-supplied parameters when available; otherwise
//! these heuristics read a starting point off the data.

use std::f64::consts::FRAC_1_SQRT_2;

use super::filter::FilterKind;

/// Default quality factor when the half-power bandwidth cannot be bracketed
pub const DEFAULT_Q: f64 = 1.0;

/// Geometric centre of the positive frequencies, or 1 when there are none
fn geometric_centre(freq: &[f64]) -> f64 {
    let positive: Vec<f64> = freq.iter().cloned().filter(|f| *f > 0.0).collect();
    if positive.is_empty() {
        return 1.0;
    }
    let log_mean = positive.iter().map(|f| f.ln()).sum::<f64>() / positive.len() as f64;
    log_mean.exp()
}

/// Index of the sample whose value is closest to `target`
fn closest_to(values: &[f64], target: f64) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .min_by(|a, b| (a.1 - target).abs().total_cmp(&(b.1 - target).abs()))
        .map(|(i, _)| i)
}

/// Starting parameters for a gain fit
///
/// `freq` and `gain` must have equal length.
pub fn gain_params(kind: FilterKind, freq: &[f64], gain: &[f64]) -> Vec<f64> {
    let peak_idx = gain
        .iter()
        .enumerate()
        .filter(|(_, g)| g.is_finite())
        .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
        .map(|(i, _)| i);

    let Some(peak_idx) = peak_idx else {
        let mut p = vec![1.0, geometric_centre(freq)];
        if !kind.is_low_high_pass() {
            p.push(DEFAULT_Q);
        }
        return p;
    };

    let g0 = gain[peak_idx];
    let half_power = g0.abs() * FRAC_1_SQRT_2;
    let magnitudes: Vec<f64> = gain.iter().map(|g| g.abs()).collect();

    match kind {
        FilterKind::Lowpass | FilterKind::Highpass => {
            let cutoff = closest_to(&magnitudes, half_power)
                .map(|i| freq[i])
                .filter(|f| *f > 0.0)
                .unwrap_or_else(|| geometric_centre(freq));
            vec![g0, cutoff]
        }
        FilterKind::Bandpass => {
            let peak = freq[peak_idx];
            vec![g0, peak, bandpass_q(freq, &magnitudes, peak, half_power)]
        }
    }
}

/// Q from the half-power points either side of the peak
fn bandpass_q(freq: &[f64], magnitudes: &[f64], peak: f64, half_power: f64) -> f64 {
    // nearest sample at or below half power on each side of the peak
    let lower = freq
        .iter()
        .zip(magnitudes)
        .filter(|(f, m)| **f < peak && **m <= half_power)
        .map(|(f, _)| *f)
        .fold(f64::NEG_INFINITY, f64::max);
    let upper = freq
        .iter()
        .zip(magnitudes)
        .filter(|(f, m)| **f > peak && **m <= half_power)
        .map(|(f, _)| *f)
        .fold(f64::INFINITY, f64::min);

    let bandwidth = upper - lower;
    if bandwidth.is_finite() && bandwidth > 0.0 && peak > 0.0 {
        peak / bandwidth
    } else {
        DEFAULT_Q
    }
}

/// Starting parameters for a phase fit
///
/// Only the bandpass defines a phase response; its peak frequency is where the
/// phase crosses zero. The gain and Q entries do not enter the phase formula.
pub fn phase_params(kind: FilterKind, freq: &[f64], phase: &[f64]) -> Vec<f64> {
    let peak = closest_to(phase, 0.0)
        .map(|i| freq[i])
        .filter(|f| *f > 0.0)
        .unwrap_or_else(|| geometric_centre(freq));

    let mut p = vec![1.0, peak];
    if !kind.is_low_high_pass() {
        p.push(DEFAULT_Q);
    }
    p
}
