//! # blockpipe
//!
//! **Block-pipelined triangular solve and Cholesky factorization over a
//! broadcast message log.**
//!
//! A problem of dimension `n` is split into `p = n / block_size` contiguous
//! blocks. Each block runs on its own OS thread with a private copy of its
//! slice of the input, and blocks exchange finalized partial results only
//! through a single-log, many-cursor [`BroadcastQueue`](sync::BroadcastQueue).
//! After every worker has joined, a coordinator drains exactly one finalized
//! unit per block (or per column) in a fixed order and assembles the result.
//!
//! ## Quick Start
//!
//! ```rust
//! use blockpipe::prelude::*;
//!
//! let a = Matrix::from_vec(vec![4.0, 2.0, 2.0, 5.0], 2, 2)?;
//! let l = cholesky_factor(&a, 1)?;
//! assert!(cholesky_residual(&a, &l)? < 1e-12);
//!
//! let u = l.transpose();
//! let x = solve_upper_triangular(&u, &[2.0, 2.0], 1)?;
//! assert!(triangular_residual(&u, &x, &[2.0, 2.0])? < 1e-12);
//! # Ok::<(), blockpipe::error::Error>(())
//! ```
//!
//! ## Failure reporting
//!
//! - A block size that does not divide `n` is rejected before any thread starts.
//! - Zero diagonals and non-positive Cholesky pivots are reported, not turned into NaN.
//! - A dependency wait longer than the configured stall timeout fails with
//!   `PipelineStalled`; a worker error or panic aborts the queue so no sibling
//!   waits forever.
//! - Fewer finalized messages than required after join fails with
//!   `PipelineExhausted`.
//!
//! ## Feature Flags
//!
//! - `rayon` (default): Row-parallel matmul for residual checks and input generation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithm;
pub mod config;
pub mod dtype;
pub mod error;
pub mod matrix;
pub mod random;
pub mod sync;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithm::linalg::{cholesky_residual, triangular_residual};
    pub use crate::algorithm::{
        cholesky_factor, cholesky_factor_with, solve_upper_triangular, solve_upper_triangular_with,
    };
    pub use crate::config::PipelineConfig;
    pub use crate::dtype::{DType, Element};
    pub use crate::error::{Error, Result};
    pub use crate::matrix::Matrix;
    pub use crate::sync::{BroadcastQueue, Consumer, ConsumerId, WaitStrategy};
}
