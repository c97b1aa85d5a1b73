//! Pipelined algorithms and the machinery that runs them
//!
//! - [`partition`] splits a dimension into equal blocks
//! - [`pipeline`] spawns one worker per block, joins them, and drains the
//!   queue in the order an algorithm requires
//! - [`linalg`] holds the two block-pipelined algorithms
//!
//! ```text
//! partition ──► BlockWorker × p ──► BroadcastQueue ──► coordinator drain ──► result
//! ```

pub mod linalg;
pub mod partition;
pub mod pipeline;

pub use linalg::{
    cholesky_factor, cholesky_factor_with, solve_upper_triangular, solve_upper_triangular_with,
};
pub use partition::{BlockRange, Partition};
pub use pipeline::{BlockLink, BlockWorker, PipelineCoordinator};
