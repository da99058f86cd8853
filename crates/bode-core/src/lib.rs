//! bode-core: Bode-plot analysis of filter measurements
//!
//! Turns oscilloscope readings into frequency, gain and phase points with
//! propagated instrumental errors and fits first- and second-order filter
//! models to them.
//!
//! ## Modules
//!
//! - `measurement` - Error model and derivation of points from raw samples
//! - `records` - Eight-column record file I/O
//! - `model` - Filter models and initial guesses
//! - `fit` - Weighted Levenberg-Marquardt fitting
//! - `dataset` - Bode dataset: series, bound curves, fits and published scalars
//! - `simulate` - Synthetic measurement generator
//! - `frequency` - Frequency sweeps

pub mod constants;
pub mod dataset;
pub mod error;
pub mod fit;
pub mod frequency;
pub mod math;
pub mod measurement;
pub mod model;
pub mod records;
pub mod simulate;

pub use dataset::{BodeDataset, GainSummary, Measurement};
pub use error::{BodeError, Result};
pub use fit::{FitOptions, FitResult};
pub use frequency::{FrequencySweep, FrequencyUnit, SweepType};
pub use measurement::{DerivedPoint, IngestReport, RawSample};
pub use model::{select_model, FilterKind};
pub use simulate::{NoiseLevel, Simulator};
