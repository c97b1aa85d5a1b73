//! Sequential vs. pipelined timings and residuals for both algorithms
//!
//! Run with: `cargo run --release --example pipeline_residuals`

use blockpipe::prelude::*;
use blockpipe::random::{REFERENCE_SEED, random_rhs, random_spd, random_upper_triangular};
use std::time::Instant;

fn back_substitution(n: usize, block_counts: &[usize]) -> Result<()> {
    let a = random_upper_triangular::<f32>(n, REFERENCE_SEED)?;
    let rhs = random_rhs::<f32>(n, REFERENCE_SEED)?;

    for &p in block_counts {
        let start = Instant::now();
        let x = solve_upper_triangular(&a, &rhs, n / p)?;
        let elapsed = start.elapsed();
        let residual = triangular_residual(&a, &x, &rhs)?;

        println!("Back substitution, N = {}, p = {}", n, p);
        println!("Milliseconds: {}", elapsed.as_millis());
        println!("Percent residual (Frobenius): {:.6}", 100.0 * residual);
        println!("---------------------------");
    }
    Ok(())
}

fn cholesky(n: usize, block_counts: &[usize]) -> Result<()> {
    let a = random_spd::<f32>(n, REFERENCE_SEED)?;

    for &p in block_counts {
        let start = Instant::now();
        let l = cholesky_factor(&a, n / p)?;
        let elapsed = start.elapsed();
        let residual = cholesky_residual(&a, &l)?;

        println!("Cholesky, N = {}, p = {}", n, p);
        println!("Milliseconds: {}", elapsed.as_millis());
        println!("Percent residual (Frobenius): {:.6}", 100.0 * residual);
        println!("---------------------------");
    }
    Ok(())
}

fn main() -> Result<()> {
    back_substitution(2048, &[1, 2, 4, 8])?;
    cholesky(400, &[1, 2, 4, 8])?;
    Ok(())
}
