//! Reading measurement files into a dataset

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::core::BodeDataset;
use crate::error::Result;
use crate::measurement::{ingest_samples, IngestReport};
use crate::model::FilterKind;
use crate::records::RecordReader;

impl BodeDataset {
    /// Create a dataset and read a record file into it
    pub fn from_file<P: AsRef<Path>>(kind: FilterKind, path: P) -> Result<(Self, IngestReport)> {
        let mut ds = Self::new(kind);
        let report = ds.read_input(path)?;
        Ok((ds, report))
    }

    /// Read a record file, set all three series and bind the functions
    pub fn read_input<P: AsRef<Path>>(&mut self, path: P) -> Result<IngestReport> {
        let path = path.as_ref();
        log::debug!("reading records from {}", path.display());
        let file = File::open(path)?;
        self.read_input_from(BufReader::new(file))
    }

    /// Read records from any buffered reader
    ///
    /// Rejected records are listed in the report and left out of the series.
    pub fn read_input_from<R: BufRead>(&mut self, reader: R) -> Result<IngestReport> {
        let report = ingest_samples(RecordReader::new(reader));
        let series = report.series.clone();

        self.set_frequency_series(series.frequency.values, series.frequency.errors)?;
        self.set_phase_series(series.phase.values, series.phase.errors)?;
        self.set_gain_series(series.gain.values, series.gain.errors)?;
        self.set_functions()?;

        log::info!(
            "read {} records: {} points, {} rejected",
            report.records_read,
            report.accepted(),
            report.rejected.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BodeError;
    use std::io::Cursor;

    const INPUT: &str = "\
1.0 0.5 0.9 0.2 1e-2 2e-3 -1e-4 2e-4
1.0 0.5 0.7 0.2 1e-3 2e-4 -1e-4 2e-5
0.0 0.5 0.5 0.2 5e-4 1e-4 -1e-4 2e-5
1.0 0.5 0.4 0.1 2e-4 5e-5 -4e-5 1e-5
";

    #[test]
    fn test_read_input_from() {
        let mut ds = BodeDataset::new(FilterKind::Lowpass);
        let report = ds.read_input_from(Cursor::new(INPUT)).unwrap();
        assert_eq!(report.records_read, 4);
        assert_eq!(report.accepted(), 3);
        assert_eq!(report.rejected[0].index, 2);
        assert_eq!(ds.n_points(), Some(3));
        assert!(ds.is_bound());
        assert_eq!(ds.gain_series().unwrap().values, vec![0.9, 0.7, 0.4]);
    }

    #[test]
    fn test_read_input_second_file_must_match_length() {
        let mut ds = BodeDataset::new(FilterKind::Lowpass);
        ds.read_input_from(Cursor::new(INPUT)).unwrap();
        let err = ds
            .read_input_from(Cursor::new("1 0.5 1 0.5 1e-3 1e-4 0 1e-4\n"))
            .unwrap_err();
        assert!(matches!(err, BodeError::LengthMismatch { expected: 3, found: 1, .. }));
    }

    #[test]
    fn test_read_input_missing_file() {
        let mut ds = BodeDataset::new(FilterKind::Lowpass);
        assert!(matches!(
            ds.read_input("/nonexistent/bode/input.txt"),
            Err(BodeError::Io(_))
        ));
    }
}
