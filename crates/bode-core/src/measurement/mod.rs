//! Measurement module - scope readings and their uncertainties
//!
//! Converts raw oscilloscope readings into frequency, gain and phase points
//! with analytically propagated errors.

pub mod error_model;
pub mod ingest;
pub mod sample;

pub use error_model::*;
pub use ingest::{ingest_samples, IngestReport, RejectedRecord};
pub use sample::{DerivedPoint, RawSample};
