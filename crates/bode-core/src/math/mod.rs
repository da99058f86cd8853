//! Mathematical helpers
//!
//! Dense linear algebra used by the least-squares solver.

pub mod linalg;

pub use linalg::{inv_real, solve_spd};
