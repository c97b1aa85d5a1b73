//! Relative Frobenius residuals for checking pipeline results

use super::helpers::{validate_rhs_len, validate_square_matrix};
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::matrix::frob_norm_slice;

/// `‖A x − rhs‖ / ‖rhs‖`, or the absolute residual when `rhs` is zero
pub fn triangular_residual<T: Element>(a: &Matrix<T>, x: &[T], rhs: &[T]) -> Result<f64> {
    let n = validate_square_matrix(a)?;
    validate_rhs_len(rhs, n)?;
    let ax = a.mul_vec(x)?;
    let diff: Vec<T> = ax.iter().zip(rhs).map(|(&l, &r)| l - r).collect();
    Ok(relative(frob_norm_slice(&diff), frob_norm_slice(rhs)))
}

/// `‖L Lᵗ − A‖ / ‖A‖`, or the absolute residual when `A` is zero
pub fn cholesky_residual<T: Element>(a: &Matrix<T>, l: &Matrix<T>) -> Result<f64> {
    validate_square_matrix(a)?;
    if l.shape() != a.shape() {
        return Err(Error::shape_mismatch(&a.shape(), &l.shape()));
    }
    let mut product = l.matmul(&l.transpose())?;
    product.add_scaled(a, -T::one())?;
    Ok(relative(
        frob_norm_slice(product.as_slice()),
        frob_norm_slice(a.as_slice()),
    ))
}

fn relative(residual: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        residual
    } else {
        residual / reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_solution_has_zero_residual() {
        let a = Matrix::from_vec(vec![2.0f64, 1.0, 0.0, 2.0], 2, 2).unwrap();
        assert_eq!(triangular_residual(&a, &[1.0, 1.0], &[3.0, 2.0]).unwrap(), 0.0);
        // x off by one in the last entry: A x - rhs = [1, 2]
        let r = triangular_residual(&a, &[1.0, 2.0], &[3.0, 2.0]).unwrap();
        assert!((r - (5.0f64 / 13.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_cholesky_residual() {
        let l = Matrix::from_vec(vec![2.0f64, 0.0, 1.0, 2.0], 2, 2).unwrap();
        let a = Matrix::from_vec(vec![4.0, 2.0, 2.0, 5.0], 2, 2).unwrap();
        assert_eq!(cholesky_residual(&a, &l).unwrap(), 0.0);
        assert!(cholesky_residual(&a, &Matrix::zeros(1, 1)).is_err());
    }
}
