//! Linear algebra operations
//!
//! This module provides a unified interface for the few matrix operations the
//! fitter needs. nalgebra is the backend; all ndarray <-> nalgebra
//! conversions are contained here so callers only ever see ndarray types.

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

// ============================================================================
// Conversion helpers (internal)
// ============================================================================

#[inline]
fn to_na(a: &Array2<f64>) -> DMatrix<f64> {
    let (m, n) = a.dim();
    DMatrix::from_fn(m, n, |i, j| a[[i, j]])
}

#[inline]
fn from_na(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

// ============================================================================
// Matrix inversion
// ============================================================================

/// Invert a real matrix
///
/// Returns None if the matrix is singular or non-square.
pub fn inv_real(a: &Array2<f64>) -> Option<Array2<f64>> {
    let (m, n) = a.dim();
    if m != n || m == 0 {
        return None;
    }

    let inv = to_na(a).try_inverse()?;
    if inv.iter().all(|v| v.is_finite()) {
        Some(from_na(&inv))
    } else {
        None
    }
}

// ============================================================================
// Linear solves
// ============================================================================

/// Solve `A x = b` for a symmetric positive-definite `A` (Cholesky).
///
/// Falls back to LU when the Cholesky factorisation fails, which happens for
/// matrices that are only semi-definite up to rounding. Returns None when the
/// system is singular or the dimensions do not agree.
pub fn solve_spd(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let (m, n) = a.dim();
    if m != n || m == 0 || b.len() != m {
        return None;
    }

    let a_na = to_na(a);
    let b_na = DVector::from_fn(m, |i, _| b[i]);

    let x = match a_na.clone().cholesky() {
        Some(chol) => chol.solve(&b_na),
        None => a_na.lu().solve(&b_na)?,
    };

    if x.iter().all(|v| v.is_finite()) {
        Some(Array1::from_iter(x.iter().cloned()))
    } else {
        None
    }
}
