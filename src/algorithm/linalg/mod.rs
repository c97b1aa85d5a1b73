//! Block-pipelined linear algebra
//!
//! Both algorithms split the problem into equal contiguous blocks, run one
//! worker thread per block, and exchange finalized partial results only
//! through a [`BroadcastQueue`](crate::sync::BroadcastQueue).
//!
//! # Module Structure
//!
//! - `back_substitution`: upper-triangular solve, row blocks bottom to top
//! - `cholesky`: `A = L L^T`, column blocks left to right
//! - `helpers`: input validation
//! - `residual`: relative Frobenius residuals for checking results
//!
//! # Numerical preconditions
//!
//! Back substitution requires a non-zero diagonal and Cholesky requires a
//! symmetric positive definite input. Violations are reported as
//! `SingularPivot` / `NotPositiveDefinite` rather than propagated as NaN.

pub mod back_substitution;
pub mod cholesky;
pub mod helpers;
pub mod residual;

pub use back_substitution::{BlockSolution, solve_upper_triangular, solve_upper_triangular_with};
pub use cholesky::{RawColumn, cholesky_factor, cholesky_factor_with, normalize_raw_column};
pub use residual::{cholesky_residual, triangular_residual};
