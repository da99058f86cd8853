//! Error types for bode-core

use thiserror::Error;

use crate::model::FilterKind;

/// Errors reported by ingestion, dataset mutation and fitting.
///
/// None of these are fatal: every operation returns them to the caller and
/// leaves the dataset in its previous consistent state.
#[derive(Error, Debug)]
pub enum BodeError {
    /// A series does not match the length fixed by the first setter, or its
    /// values and errors differ in length.
    #[error("{series} series length mismatch: expected {expected}, found {found}")]
    LengthMismatch {
        series: &'static str,
        expected: usize,
        found: usize,
    },

    #[error(
        "system option '{0}' not recognised; available options are \"lowpass\", \"highpass\", \"bandpass\""
    )]
    UnknownSystem(String),

    /// The operation needs state that has not been set up yet.
    #[error("not ready: {0}")]
    NotReady(&'static str),

    #[error("fit did not converge: {0}")]
    FitConvergence(String),

    /// A derivation divided by zero or produced a non-finite value.
    #[error("domain error: {0}")]
    Domain(String),

    #[error("not enough points to fit: need at least {needed}, found {found}")]
    InsufficientPoints { needed: usize, found: usize },

    #[error("no phase response is defined for the {0} model")]
    PhaseModelUnavailable(FilterKind),

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, BodeError>;
