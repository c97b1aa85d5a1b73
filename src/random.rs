//! Seeded random inputs for the pipelined algorithms
//!
//! Reproduces the benchmark inputs: a well-conditioned upper-triangular
//! system and a symmetric positive definite matrix. All generators are
//! deterministic for a given seed.

use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::matrix::Matrix;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

/// Seed used by the reference benchmarks
pub const REFERENCE_SEED: u64 = 11828;

fn normal(std_dev: f64) -> Result<Normal<f64>> {
    Normal::new(0.0, std_dev).map_err(|e| Error::InvalidArgument {
        arg: "n",
        reason: format!("cannot build N(0, {}): {}", std_dev, e),
    })
}

fn require_nonzero(n: usize) -> Result<()> {
    if n == 0 {
        return Err(Error::InvalidArgument {
            arg: "n",
            reason: "dimension must be positive".to_string(),
        });
    }
    Ok(())
}

/// Upper-triangular `n x n` matrix with `N(0, 1/n)` entries and `1` added
/// to the diagonal
pub fn random_upper_triangular<T: Element>(n: usize, seed: u64) -> Result<Matrix<T>> {
    require_nonzero(n)?;
    let dist = normal(1.0 / n as f64)?;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok(Matrix::from_fn(n, n, |r, c| {
        if r > c {
            return T::zero();
        }
        let v = dist.sample(&mut rng);
        T::from_f64_val(if r == c { v + 1.0 } else { v })
    }))
}

/// Right-hand side of length `n` with entries `n * N(0, 1/n)`
pub fn random_rhs<T: Element>(n: usize, seed: u64) -> Result<Vec<T>> {
    require_nonzero(n)?;
    let dist = normal(1.0 / n as f64)?;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok((0..n)
        .map(|_| T::from_f64_val(dist.sample(&mut rng) * n as f64))
        .collect())
}

/// Symmetric positive definite `A = M^T M / n + I` with `M` drawn from `N(0, 10)`
pub fn random_spd<T: Element>(n: usize, seed: u64) -> Result<Matrix<T>> {
    require_nonzero(n)?;
    let dist = normal(10.0)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let m = Matrix::<T>::from_fn(n, n, |_, _| T::from_f64_val(dist.sample(&mut rng)));
    let mut a = m.transpose().matmul(&m)?;
    a.scale(T::one() / T::from_f64_val(n as f64));
    a.add_scaled(&Matrix::identity(n), T::one())?;
    Ok(a)
}
