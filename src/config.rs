//! Pipeline configuration
//!
//! # Example
//!
//! ```
//! use blockpipe::config::PipelineConfig;
//! use blockpipe::sync::WaitStrategy;
//! use std::time::Duration;
//!
//! let config = PipelineConfig::new(64)
//!     .with_wait_strategy(WaitStrategy::Park)
//!     .with_stall_timeout(Duration::from_secs(5));
//! assert_eq!(config.block_count(256).unwrap(), 4);
//! assert!(config.block_count(100).is_err());
//! ```

use crate::error::{Error, Result};
use crate::sync::WaitStrategy;
use std::time::Duration;

/// Stall bound applied unless overridden
pub const DEFAULT_STALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Partitioning and waiting behaviour for one pipeline invocation
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    block_size: usize,
    wait: WaitStrategy,
    stall_timeout: Option<Duration>,
}

impl PipelineConfig {
    /// Blocks of `block_size` rows (back substitution) or columns (Cholesky)
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size,
            wait: WaitStrategy::default(),
            stall_timeout: Some(DEFAULT_STALL_TIMEOUT),
        }
    }

    /// A single block covering all `n` rows/columns: no threads, no queue traffic
    pub fn sequential(n: usize) -> Self {
        Self::new(n)
    }

    /// Set how workers wait for unpublished dependencies
    pub fn with_wait_strategy(mut self, wait: WaitStrategy) -> Self {
        self.wait = wait;
        self
    }

    /// Bound every dependency wait; exceeding it fails with `PipelineStalled`
    pub fn with_stall_timeout(mut self, timeout: Duration) -> Self {
        self.stall_timeout = Some(timeout);
        self
    }

    /// Wait for dependencies indefinitely
    pub fn without_stall_timeout(mut self) -> Self {
        self.stall_timeout = None;
        self
    }

    /// Rows or columns per block
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Wait strategy for workers
    #[inline]
    pub fn wait_strategy(&self) -> WaitStrategy {
        self.wait
    }

    /// Per-wait stall bound, if any
    #[inline]
    pub fn stall_timeout(&self) -> Option<Duration> {
        self.stall_timeout
    }

    /// Number of blocks for a problem of dimension `dim`
    ///
    /// Fails with `InvalidBlockSize` if the block size is zero or does not
    /// evenly divide `dim`.
    pub fn block_count(&self, dim: usize) -> Result<usize> {
        if self.block_size == 0 || dim % self.block_size != 0 {
            return Err(Error::InvalidBlockSize {
                block_size: self.block_size,
                dim,
            });
        }
        Ok(dim / self.block_size)
    }
}
