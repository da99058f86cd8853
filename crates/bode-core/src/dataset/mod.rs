//! Bode dataset module
//!
//! Owns the measured frequency, gain and phase series of one circuit, the
//! selected filter model and the results of fitting it.

mod core;
mod fitting;
mod io;
mod series;

pub use self::core::{BodeDataset, ErrorCurve};
pub use fitting::{GainSummary, Measurement};
pub use series::{Series, SeriesSet};
