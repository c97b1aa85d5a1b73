//! Integration tests for the block-pipelined solvers

mod common;

use blockpipe::algorithm::linalg::{cholesky_residual, triangular_residual};
use blockpipe::algorithm::{
    cholesky_factor, cholesky_factor_with, solve_upper_triangular, solve_upper_triangular_with,
};
use blockpipe::config::PipelineConfig;
use blockpipe::dtype::{DType, Element};
use blockpipe::error::Error;
use blockpipe::matrix::Matrix;
use blockpipe::sync::WaitStrategy;
use common::{
    assert_allclose_f32, assert_allclose_f64, divisors, residual_tolerance, spd_matrix,
    triangular_system,
};
use std::time::Duration;

fn check_back_substitution<T: Element>(n: usize) {
    let (a, rhs) = triangular_system::<T>(n);
    for block_size in divisors(n) {
        let x = solve_upper_triangular(&a, &rhs, block_size).unwrap();
        let residual = triangular_residual(&a, &x, &rhs).unwrap();
        assert!(
            residual < residual_tolerance(T::DTYPE),
            "n={} block_size={} dtype={}: residual {}",
            n,
            block_size,
            T::DTYPE,
            residual
        );
    }
}

fn check_cholesky<T: Element>(n: usize) {
    let a = spd_matrix::<T>(n);
    for block_size in divisors(n) {
        let l = cholesky_factor(&a, block_size).unwrap();
        for r in 0..n {
            for c in (r + 1)..n {
                assert_eq!(l.get(r, c), T::zero(), "L must be lower triangular");
            }
        }
        let residual = cholesky_residual(&a, &l).unwrap();
        assert!(
            residual < residual_tolerance(T::DTYPE),
            "n={} block_size={} dtype={}: residual {}",
            n,
            block_size,
            T::DTYPE,
            residual
        );
    }
}

#[test]
fn test_back_substitution_residual_f64() {
    check_back_substitution::<f64>(24);
}

#[test]
fn test_back_substitution_residual_f32() {
    check_back_substitution::<f32>(32);
}

#[test]
fn test_cholesky_residual_f64() {
    check_cholesky::<f64>(24);
}

#[test]
fn test_cholesky_residual_f32() {
    check_cholesky::<f32>(16);
}

#[test]
fn test_back_substitution_partition_invariance() {
    let n = 36;
    let (a, rhs) = triangular_system::<f64>(n);
    let reference = solve_upper_triangular(&a, &rhs, n).unwrap();
    for block_size in [1, 2, 3, 4, 6, 9, 12, 18] {
        let x = solve_upper_triangular(&a, &rhs, block_size).unwrap();
        assert_allclose_f64(
            &x,
            &reference,
            1e-9,
            1e-9,
            &format!("block_size={}", block_size),
        );
    }
}

#[test]
fn test_cholesky_partition_invariance() {
    let n = 20;
    let a = spd_matrix::<f32>(n);
    let reference = cholesky_factor(&a, n).unwrap();
    for block_size in [1, 2, 4, 5, 10] {
        let l = cholesky_factor(&a, block_size).unwrap();
        assert_allclose_f32(
            l.as_slice(),
            reference.as_slice(),
            1e-3,
            1e-3,
            &format!("block_size={}", block_size),
        );
    }
}

#[test]
fn test_concrete_four_by_four_scenario() {
    let a = Matrix::from_vec(
        vec![
            2.0f64, 1.0, 0.0, 0.0, //
            0.0, 2.0, 1.0, 0.0, //
            0.0, 0.0, 2.0, 1.0, //
            0.0, 0.0, 0.0, 2.0,
        ],
        4,
        4,
    )
    .unwrap();
    let x = solve_upper_triangular(&a, &[3.0, 3.0, 3.0, 2.0], 2).unwrap();
    assert_eq!(x, vec![1.0, 1.0, 1.0, 1.0]);
}

#[test]
fn test_cholesky_then_solve_with_transpose() {
    // A x = b via L L^T: the upper factor L^T is exactly what back substitution takes
    let n = 12;
    let a = spd_matrix::<f64>(n);
    let l = cholesky_factor(&a, 4).unwrap();
    let u = l.transpose();
    let b: Vec<f64> = (0..n).map(|i| i as f64 - 3.0).collect();

    // L^T x = b  =>  (L^T)^T (L^T) x = L b
    let lb = l.mul_vec(&b).unwrap();
    let x = solve_upper_triangular(&u, &b, 3).unwrap();
    let ax = a.mul_vec(&x).unwrap();
    assert_allclose_f64(&ax, &lb, 1e-9, 1e-9, "A x = L b");
}

#[test]
fn test_every_wait_configuration() {
    let n = 16;
    let (a, rhs) = triangular_system::<f64>(n);
    let spd = spd_matrix::<f64>(n);
    let configs = [
        PipelineConfig::new(2),
        PipelineConfig::new(2).with_wait_strategy(WaitStrategy::Park),
        PipelineConfig::new(4).with_wait_strategy(WaitStrategy::poll(Duration::from_micros(1))),
        PipelineConfig::new(8).without_stall_timeout(),
    ];
    for config in &configs {
        let x = solve_upper_triangular_with(&a, &rhs, config).unwrap();
        assert!(triangular_residual(&a, &x, &rhs).unwrap() < residual_tolerance(DType::F64));
        let l = cholesky_factor_with(&spd, config).unwrap();
        assert!(cholesky_residual(&spd, &l).unwrap() < residual_tolerance(DType::F64));
    }
}

#[test]
fn test_invalid_block_size_rejected() {
    let (a, rhs) = triangular_system::<f64>(10);
    for block_size in [0, 3, 4, 11] {
        assert!(matches!(
            solve_upper_triangular(&a, &rhs, block_size),
            Err(Error::InvalidBlockSize { .. })
        ));
        assert!(matches!(
            cholesky_factor(&spd_matrix::<f64>(10), block_size),
            Err(Error::InvalidBlockSize { .. })
        ));
    }
}

#[test]
fn test_non_square_rejected() {
    let a = Matrix::<f64>::zeros(4, 3);
    assert!(matches!(
        cholesky_factor(&a, 1),
        Err(Error::ShapeMismatch { .. })
    ));
    assert!(matches!(
        solve_upper_triangular(&a, &[1.0; 4], 1),
        Err(Error::ShapeMismatch { .. })
    ));
}

#[test]
fn test_indefinite_matrix_reported_from_later_block() {
    // Positive leading 3x3, indefinite overall
    let n = 6;
    let mut a = spd_matrix::<f64>(n);
    a.set(5, 5, -1.0e6);
    for block_size in [1, 2, 3, 6] {
        let err = cholesky_factor(&a, block_size).unwrap_err();
        assert!(
            matches!(err, Error::NotPositiveDefinite { column: 5, .. }),
            "block_size={}: {:?}",
            block_size,
            err
        );
    }
}
