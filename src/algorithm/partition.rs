//! Splitting a problem dimension into equal contiguous blocks

use crate::config::PipelineConfig;
use crate::error::Result;
use std::ops::Range;

/// One contiguous run of rows or columns owned by a single worker
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockRange {
    /// Zero-based block index
    pub index: usize,
    /// First global row/column in the block
    pub first: usize,
    /// Number of rows/columns in the block
    pub len: usize,
}

impl BlockRange {
    /// One past the last global row/column
    #[inline]
    pub fn end(&self) -> usize {
        self.first + self.len
    }

    /// Global index range covered by the block
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.first..self.end()
    }
}

/// A validated equal-size partition of `dim`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    block_size: usize,
    block_count: usize,
}

impl Partition {
    /// Partition `dim` by `config.block_size()`
    ///
    /// Fails with `InvalidBlockSize` unless the block size evenly divides `dim`.
    pub fn new(dim: usize, config: &PipelineConfig) -> Result<Self> {
        let block_count = config.block_count(dim)?;
        Ok(Self {
            block_size: config.block_size(),
            block_count,
        })
    }

    /// Rows/columns per block
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of blocks
    #[inline]
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Whether the whole problem is a single block
    #[inline]
    pub fn is_sequential(&self) -> bool {
        self.block_count <= 1
    }

    /// Block `index`
    pub fn block(&self, index: usize) -> BlockRange {
        BlockRange {
            index,
            first: index * self.block_size,
            len: self.block_size,
        }
    }

    /// All blocks in ascending index order
    pub fn blocks(&self) -> impl Iterator<Item = BlockRange> + '_ {
        (0..self.block_count).map(|i| self.block(i))
    }
}
