//! Value/error series

use serde::{Deserialize, Serialize};

use crate::measurement::DerivedPoint;

/// A sequence of values with one standard error per value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub values: Vec<f64>,
    pub errors: Vec<f64>,
}

impl Series {
    pub fn new(values: Vec<f64>, errors: Vec<f64>) -> Self {
        Self { values, errors }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Aligned frequency, gain and phase series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesSet {
    pub frequency: Series,
    pub gain: Series,
    pub phase: Series,
}

impl SeriesSet {
    /// Append one derived point to all three series
    pub fn push(&mut self, point: &DerivedPoint) {
        self.frequency.values.push(point.frequency);
        self.frequency.errors.push(point.frequency_error);
        self.gain.values.push(point.gain);
        self.gain.errors.push(point.gain_error);
        self.phase.values.push(point.phase);
        self.phase.errors.push(point.phase_error);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }

    /// The points back as rows
    pub fn points(&self) -> Vec<DerivedPoint> {
        (0..self.len())
            .map(|i| DerivedPoint {
                frequency: self.frequency.values[i],
                frequency_error: self.frequency.errors[i],
                gain: self.gain.values[i],
                gain_error: self.gain.errors[i],
                phase: self.phase.values[i],
                phase_error: self.phase.errors[i],
            })
            .collect()
    }
}

impl FromIterator<DerivedPoint> for SeriesSet {
    fn from_iter<I: IntoIterator<Item = DerivedPoint>>(iter: I) -> Self {
        let mut set = SeriesSet::default();
        for point in iter {
            set.push(&point);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_points() {
        let p = DerivedPoint {
            frequency: 100.0,
            frequency_error: 1.0,
            gain: 0.5,
            gain_error: 0.01,
            phase: -0.3,
            phase_error: 0.02,
        };
        let set: SeriesSet = vec![p, p].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set.gain.errors, vec![0.01, 0.01]);
        assert_eq!(set.points()[1], p);
    }
}
