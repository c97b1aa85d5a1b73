//! Error types for blockpipe

use crate::sync::ConsumerId;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using blockpipe's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in blockpipe operations
#[derive(Error, Debug)]
pub enum Error {
    /// Shape mismatch in an operation
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Index out of bounds
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index
        index: usize,
        /// Size of the dimension
        size: usize,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Block size is zero or does not evenly divide the problem dimension
    #[error("Block size {block_size} does not evenly divide dimension {dim}")]
    InvalidBlockSize {
        /// Requested block size
        block_size: usize,
        /// Problem dimension
        dim: usize,
    },

    /// Zero or non-finite diagonal entry in a triangular system
    #[error("Matrix is singular: diagonal entry {index} is zero or not finite")]
    SingularPivot {
        /// Row/column of the offending diagonal entry
        index: usize,
    },

    /// Raw Cholesky pivot is not strictly positive
    #[error("Matrix is not positive definite: pivot {pivot} at column {column}")]
    NotPositiveDefinite {
        /// Global column whose pivot failed
        column: usize,
        /// Raw (un-square-rooted) pivot value
        pivot: f64,
    },

    /// A consumer waited longer than the configured bound for a dependency
    #[error("Pipeline stalled: consumer {consumer} waited {waited:?} for a dependency")]
    PipelineStalled {
        /// Consumer that gave up waiting
        consumer: ConsumerId,
        /// How long it waited
        waited: Duration,
    },

    /// The coordinator drained fewer finalized messages than required
    #[error("Pipeline exhausted: expected {expected} finalized messages, received {received}")]
    PipelineExhausted {
        /// Messages the algorithm requires
        expected: usize,
        /// Messages actually observed
        received: usize,
    },

    /// Another worker failed and tore the pipeline down
    #[error("Pipeline aborted by a failing worker")]
    PipelineAborted,

    /// A finalized unit arrived out of the algorithm's required order
    #[error("Pipeline order violation: expected unit {expected}, got {got}")]
    PipelineOrder {
        /// Block or column index that should have arrived
        expected: usize,
        /// Block or column index that did arrive
        got: usize,
    },

    /// A worker thread panicked
    #[error("Worker for block {block} panicked: {message}")]
    WorkerPanicked {
        /// Block owned by the worker
        block: usize,
        /// Panic payload, if it was a string
        message: String,
    },

    /// `receive` was called with no observable message
    #[error("No observable message for consumer {consumer}")]
    EmptyQueue {
        /// Consumer that found nothing to receive
        consumer: ConsumerId,
    },

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Whether this error is a consequence of some other worker's failure
    pub fn is_secondary(&self) -> bool {
        matches!(self, Self::PipelineAborted)
    }
}
