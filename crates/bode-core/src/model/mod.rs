//! Filter model registry
//!
//! Closed-form gain and phase responses of the supported filters, their
//! parameter layouts, and initial-guess heuristics for fitting them.

pub mod filter;
pub mod guess;

pub use filter::{select_model, FilterKind, ParamLayout, Quantity, ResponseCurve};
