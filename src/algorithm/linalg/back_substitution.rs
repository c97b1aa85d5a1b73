//! Block-pipelined back substitution for upper-triangular systems
//!
//! Solves `A x = rhs` with `A` upper triangular. The rows are split into `p`
//! equal blocks. Block `p - 1` has no unresolved unknowns below it and
//! finishes first; block `i` eliminates the finalized values of blocks
//! `p - 1, p - 2, ..., i + 1`, in that order, then back-substitutes inside
//! its own rows and publishes the result.
//!
//! ```text
//!   block 0  [ A00 A01 A02 ] x0      waits for x2, then x1
//!   block 1  [  0  A11 A12 ] x1      waits for x2
//!   block 2  [  0   0  A22 ] x2      publishes immediately
//! ```

use super::helpers::{validate_nonsingular_diagonal, validate_rhs_len, validate_square_matrix};
use crate::algorithm::partition::{BlockRange, Partition};
use crate::algorithm::pipeline::{BlockLink, BlockWorker, PipelineCoordinator};
use crate::config::PipelineConfig;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::sync::BroadcastQueue;

/// Finalized unknowns for one row block
#[derive(Clone, Debug, PartialEq)]
pub struct BlockSolution<T> {
    /// Index of the block that produced these values
    pub block: usize,
    /// Global row of `values[0]`
    pub first_row: usize,
    /// Solved unknowns for the block's rows
    pub values: Vec<T>,
}

/// Worker for one row block
///
/// Owns a private copy of its `len x n` band of `A` and its running
/// right-hand side, pre-divided by the block's diagonal.
pub(crate) struct BackSubWorker<T: Element> {
    range: BlockRange,
    block_count: usize,
    rows: Matrix<T>,
    subcolumn: Vec<T>,
}

impl<T: Element> BackSubWorker<T> {
    pub(crate) fn new(
        a: &Matrix<T>,
        rhs: &[T],
        range: BlockRange,
        block_count: usize,
    ) -> Result<Self> {
        let mut rows = Matrix::zeros(range.len, a.cols());
        a.rows_into(range.first, &mut rows)?;
        let subcolumn = (0..range.len)
            .map(|j| rhs[range.first + j] / rows.get(j, range.first + j))
            .collect();
        Ok(Self {
            range,
            block_count,
            rows,
            subcolumn,
        })
    }

    /// Remove the contribution of already-solved unknowns from this block
    fn eliminate(&mut self, solved: &BlockSolution<T>) {
        let first = self.range.first;
        for (i, &value) in solved.values.iter().enumerate() {
            let col = solved.first_row + i;
            for (j, entry) in self.subcolumn.iter_mut().enumerate() {
                let diag = self.rows.get(j, first + j);
                *entry = *entry - value * self.rows.get(j, col) / diag;
            }
        }
    }

    /// In-block back substitution, last row first
    fn finalize(mut self) -> BlockSolution<T> {
        let first = self.range.first;
        for idx in (0..self.range.len).rev() {
            let diag = self.rows.get(idx, first + idx);
            let mut value = self.subcolumn[idx];
            for j in (idx + 1)..self.range.len {
                value = value - self.subcolumn[j] * self.rows.get(idx, first + j) / diag;
            }
            self.subcolumn[idx] = value;
        }
        BlockSolution {
            block: self.range.index,
            first_row: first,
            values: self.subcolumn,
        }
    }
}

impl<T: Element> BlockWorker for BackSubWorker<T> {
    type Message = BlockSolution<T>;

    fn block(&self) -> usize {
        self.range.index
    }

    fn run(mut self, link: &mut BlockLink<'_, BlockSolution<T>>) -> Result<()> {
        let dependencies = self.block_count - 1 - self.range.index;
        for k in 0..dependencies {
            let expected = self.block_count - 1 - k;
            let solved = link.recv()?;
            if solved.block != expected {
                return Err(Error::PipelineOrder {
                    expected,
                    got: solved.block,
                });
            }
            log::trace!(
                "back substitution: block {} eliminated block {}",
                self.range.index,
                solved.block
            );
            self.eliminate(&solved);
        }
        link.publish(self.finalize());
        Ok(())
    }
}

/// Solve `A x = rhs` for upper-triangular `A` with blocks of `block_size` rows
///
/// `block_size` must evenly divide the dimension of `A`. A block size equal
/// to the dimension runs inline on the calling thread.
///
/// # Example
///
/// ```
/// use blockpipe::algorithm::solve_upper_triangular;
/// use blockpipe::matrix::Matrix;
///
/// let a = Matrix::from_vec(
///     vec![
///         2.0, 1.0, 0.0, 0.0, //
///         0.0, 2.0, 1.0, 0.0, //
///         0.0, 0.0, 2.0, 1.0, //
///         0.0, 0.0, 0.0, 2.0,
///     ],
///     4,
///     4,
/// )?;
/// let x = solve_upper_triangular(&a, &[3.0, 3.0, 3.0, 2.0], 2)?;
/// assert_eq!(x, vec![1.0, 1.0, 1.0, 1.0]);
/// # Ok::<(), blockpipe::error::Error>(())
/// ```
pub fn solve_upper_triangular<T: Element>(
    a: &Matrix<T>,
    rhs: &[T],
    block_size: usize,
) -> Result<Vec<T>> {
    solve_upper_triangular_with(a, rhs, &PipelineConfig::new(block_size))
}

/// [`solve_upper_triangular`] with explicit wait and stall settings
pub fn solve_upper_triangular_with<T: Element>(
    a: &Matrix<T>,
    rhs: &[T],
    config: &PipelineConfig,
) -> Result<Vec<T>> {
    let n = validate_square_matrix(a)?;
    validate_rhs_len(rhs, n)?;
    let partition = Partition::new(n, config)?;
    validate_nonsingular_diagonal(a)?;
    if n == 0 {
        return Ok(Vec::new());
    }

    let p = partition.block_count();
    log::debug!(
        "back substitution: n={} dtype={} block_size={} blocks={} wait={:?}",
        n,
        a.dtype(),
        partition.block_size(),
        p,
        config.wait_strategy()
    );

    if partition.is_sequential() {
        let worker = BackSubWorker::new(a, rhs, partition.block(0), 1)?;
        return Ok(worker.finalize().values);
    }

    let workers = partition
        .blocks()
        .map(|range| BackSubWorker::new(a, rhs, range, p))
        .collect::<Result<Vec<_>>>()?;

    let queue = BroadcastQueue::new();
    let mut coordinator = PipelineCoordinator::new(&queue, *config);
    coordinator.run(workers)?;

    let mut x = vec![T::zero(); n];
    coordinator.drain(p, |k, solved| place_block(&mut x, p, k, solved))?;

    log::debug!("back substitution: assembled {} unknowns from {} blocks", n, p);
    Ok(x)
}

/// Copy the `k`-th drained block into `x`; blocks arrive bottom-up
fn place_block<T: Element>(
    x: &mut [T],
    block_count: usize,
    k: usize,
    solved: BlockSolution<T>,
) -> Result<()> {
    let expected = block_count - 1 - k;
    if solved.block != expected {
        return Err(Error::PipelineOrder {
            expected,
            got: solved.block,
        });
    }
    let end = solved.first_row + solved.values.len();
    x[solved.first_row..end].copy_from_slice(&solved.values);
    Ok(())
}
