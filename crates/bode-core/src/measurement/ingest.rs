//! Sample ingestion
//!
//! Turns an ordered sequence of raw samples into the aligned frequency, gain
//! and phase series held by a dataset.

use super::sample::RawSample;
use crate::dataset::SeriesSet;
use crate::error::BodeError;

/// A record that could not be turned into a point
#[derive(Debug)]
pub struct RejectedRecord {
    /// Zero-based position of the record in the input
    pub index: usize,
    pub sample: RawSample,
    pub error: BodeError,
}

/// Outcome of ingesting a sequence of samples
#[derive(Debug)]
pub struct IngestReport {
    /// Points derived from the accepted records, in input order
    pub series: SeriesSet,
    /// Number of records consumed from the input
    pub records_read: usize,
    /// Records rejected by the error model, in input order
    pub rejected: Vec<RejectedRecord>,
}

impl IngestReport {
    /// Number of points accepted into the series
    pub fn accepted(&self) -> usize {
        self.series.len()
    }
}

/// Derive one point per sample
///
/// A sample whose derivation fails (zero input voltage, zero period) is
/// reported in [`IngestReport::rejected`] and contributes no point; the
/// remaining samples are still ingested.
pub fn ingest_samples<I>(samples: I) -> IngestReport
where
    I: IntoIterator<Item = RawSample>,
{
    let mut series = SeriesSet::default();
    let mut rejected = Vec::new();
    let mut records_read = 0;

    for (index, sample) in samples.into_iter().enumerate() {
        records_read += 1;
        match sample.derive() {
            Ok(point) => series.push(&point),
            Err(error) => {
                log::warn!("record {} rejected: {}", index, error);
                rejected.push(RejectedRecord {
                    index,
                    sample,
                    error,
                });
            }
        }
    }

    log::debug!(
        "ingested {} records ({} points, {} rejected)",
        records_read,
        series.len(),
        rejected.len()
    );

    IngestReport {
        series,
        records_read,
        rejected,
    }
}
