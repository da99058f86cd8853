//! Record reader
//!
//! Records are extracted token by token: a record is the next eight
//! whitespace-separated numbers, wherever the line breaks fall. Reading stops
//! silently at end of input, at the first token that is not a number, or at an
//! incomplete trailing record.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;
use crate::measurement::sample::{RawSample, RECORD_FIELDS};

/// Lazy iterator over the records of a reader
pub struct RecordReader<R> {
    reader: R,
    tokens: VecDeque<String>,
    line: String,
    finished: bool,
}

impl RecordReader<BufReader<File>> {
    /// Open a record file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            tokens: VecDeque::new(),
            line: String::new(),
            finished: false,
        }
    }

    /// Next token, refilling from the reader as needed
    fn next_token(&mut self) -> Option<String> {
        while self.tokens.is_empty() {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => self
                    .tokens
                    .extend(self.line.split_whitespace().map(str::to_string)),
                Err(e) => {
                    log::warn!("record input ended on read error: {}", e);
                    return None;
                }
            }
        }
        self.tokens.pop_front()
    }

    fn next_value(&mut self) -> Option<f64> {
        let token = self.next_token()?;
        match token.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v),
            _ => {
                log::warn!("record input ended at unreadable token '{}'", token);
                None
            }
        }
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = RawSample;

    fn next(&mut self) -> Option<RawSample> {
        if self.finished {
            return None;
        }

        let mut fields = [0.0; RECORD_FIELDS];
        for (i, field) in fields.iter_mut().enumerate() {
            match self.next_value() {
                Some(v) => *field = v,
                None => {
                    if i > 0 {
                        log::warn!("discarding incomplete trailing record ({} of {} fields)", i, RECORD_FIELDS);
                    }
                    self.finished = true;
                    return None;
                }
            }
        }

        Some(RawSample::from_fields(fields))
    }
}

/// Read every record of a file
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<RawSample>> {
    Ok(RecordReader::open(path)?.collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read(content: &str) -> Vec<RawSample> {
        RecordReader::new(Cursor::new(content)).collect()
    }

    #[test]
    fn test_one_record_per_line() {
        let records = read(
            "1.0 0.5 0.5 0.2 1e-3 2e-4 -1e-4 1e-4\n\
             1.0 0.5 0.25 0.1 5e-4 1e-4 -5e-5 5e-5\n",
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].vout, 0.5);
        assert_eq!(records[1].period, 5e-4);
        assert_eq!(records[1].fs_time_shift, 5e-5);
    }

    #[test]
    fn test_records_span_lines() {
        let records = read("1 2 3 4\n5 6 7 8 9 10\n11 12 13 14 15 16\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].fs_time_shift, 8.0);
        assert_eq!(records[1].vin, 9.0);
        assert_eq!(records[1].fs_time_shift, 16.0);
    }

    #[test]
    fn test_stops_at_malformed_token() {
        let records = read(
            "1 2 3 4 5 6 7 8\n\
             1 2 three 4 5 6 7 8\n\
             1 2 3 4 5 6 7 8\n",
        );
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_stops_at_non_finite_token() {
        for token in ["nan", "NaN", "inf", "-inf", "+infinity"] {
            let input = format!(
                "1 1 1 1 1 1 1 1\n{} 1 1 1 1 1 1 1\n1 1 1 1 1 1 1 1\n",
                token
            );
            assert_eq!(read(&input).len(), 1, "token {}", token);
        }
    }

    #[test]
    fn test_read_error_ends_stream() {
        let mut bytes = b"1 2 3 4 5 6 7 8\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b' ', b'1', b'\n']);
        bytes.extend_from_slice(b"1 2 3 4 5 6 7 8\n");

        let mut reader = RecordReader::new(Cursor::new(bytes));
        assert_eq!(reader.next().map(|r| r.vin), Some(1.0));
        assert!(reader.next().is_none());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_drops_incomplete_trailing_record() {
        let records = read("1 2 3 4 5 6 7 8\n1 2 3\n");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_blank_lines_and_empty_input() {
        assert!(read("").is_empty());
        let records = read("\n\n1 2 3 4 5 6 7 8\n\n");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_fused_after_end() {
        let mut reader = RecordReader::new(Cursor::new("1 2 3 4 5 6 7 8 x 1 2 3 4 5 6 7 8"));
        assert!(reader.next().is_some());
        assert!(reader.next().is_none());
        assert!(reader.next().is_none());
    }
}
