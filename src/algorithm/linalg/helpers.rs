//! Helper functions for the pipelined linear algebra operations
//!
//! Input validation shared by both algorithms. Everything here runs on the
//! caller's thread before any worker is spawned.

use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::matrix::Matrix;

/// Validate matrix is square, returning its dimension
pub fn validate_square_matrix<T: Element>(a: &Matrix<T>) -> Result<usize> {
    if !a.is_square() {
        return Err(Error::ShapeMismatch {
            expected: vec![a.rows(), a.rows()],
            got: a.shape().to_vec(),
        });
    }
    Ok(a.rows())
}

/// Validate a right-hand side has one entry per row
pub fn validate_rhs_len<T: Element>(rhs: &[T], n: usize) -> Result<()> {
    if rhs.len() != n {
        return Err(Error::ShapeMismatch {
            expected: vec![n],
            got: vec![rhs.len()],
        });
    }
    Ok(())
}

/// Reject exactly-zero and non-finite diagonal entries
///
/// Small but non-zero pivots are accepted: dividing by them is exact up to
/// rounding whatever the overall scale of the system.
pub fn validate_nonsingular_diagonal<T: Element>(a: &Matrix<T>) -> Result<()> {
    let n = a.rows().min(a.cols());
    for i in 0..n {
        let d = a.get(i, i);
        if !d.is_finite() || d == T::zero() {
            return Err(Error::SingularPivot { index: i });
        }
    }
    Ok(())
}

/// Accept a raw Cholesky pivot only if it is finite and strictly positive
pub fn checked_pivot<T: Element>(column: usize, pivot: T) -> Result<T> {
    if !pivot.is_finite() || pivot <= T::zero() {
        return Err(Error::NotPositiveDefinite {
            column,
            pivot: pivot.to_f64_val(),
        });
    }
    Ok(pivot)
}
