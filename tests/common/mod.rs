//! Common test utilities
#![allow(dead_code)]

use blockpipe::dtype::{DType, Element};
use blockpipe::matrix::Matrix;
use blockpipe::random::{REFERENCE_SEED, random_rhs, random_spd, random_upper_triangular};

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Assert two f32 slices are close within tolerance
pub fn assert_allclose_f32(a: &[f32], b: &[f32], rtol: f32, atol: f32, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Largest acceptable relative Frobenius residual for a dtype
pub fn residual_tolerance(dtype: DType) -> f64 {
    match dtype {
        DType::F64 => 1e-10,
        DType::F32 => 1e-2,
    }
}

/// Every block size that evenly divides `n`, including 1 and `n`
pub fn divisors(n: usize) -> Vec<usize> {
    (1..=n).filter(|d| n % d == 0).collect()
}

/// Seeded upper-triangular system of dimension `n`
pub fn triangular_system<T: Element>(n: usize) -> (Matrix<T>, Vec<T>) {
    let a = random_upper_triangular(n, REFERENCE_SEED).unwrap();
    let rhs = random_rhs(n, REFERENCE_SEED + 1).unwrap();
    (a, rhs)
}

/// Seeded symmetric positive definite matrix of dimension `n`
pub fn spd_matrix<T: Element>(n: usize) -> Matrix<T> {
    random_spd(n, REFERENCE_SEED).unwrap()
}
