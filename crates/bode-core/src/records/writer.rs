//! Record writer
//!
//! Writes raw samples in the format read by [`super::RecordReader`].

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::measurement::RawSample;

/// Write records to a file, one per line
pub fn write_records<P: AsRef<Path>>(path: P, samples: &[RawSample]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_records_to(&mut writer, samples)?;
    writer.flush()?;
    Ok(())
}

/// Write records to a writer, one per line
pub fn write_records_to<W: Write>(writer: &mut W, samples: &[RawSample]) -> Result<()> {
    for sample in samples {
        let line = sample
            .to_fields()
            .iter()
            .map(|v| format!("{:e}", v))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}
