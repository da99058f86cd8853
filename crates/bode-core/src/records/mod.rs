//! Record file I/O module
//!
//! Reads and writes the whitespace-separated measurement format:
//!
//! ```text
//! Vin fsVin Vout fsVout T fsT dt fsdt
//! ```

pub mod parser;
pub mod writer;

pub use parser::{read_records, RecordReader};
pub use writer::{write_records, write_records_to};
