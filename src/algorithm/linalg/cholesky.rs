//! Block-pipelined Cholesky factorization `A = L L^T`
//!
//! The columns of `A` are split into `p` equal blocks, processed left to
//! right. A block first absorbs the rank-1 update of every column to its left,
//! then finalizes its own columns one at a time, publishing each raw pivot
//! column before using it so blocks further right can start on it.
//!
//! Columns travel un-normalized. With raw column `c` and raw pivot `d = c[k]`,
//! subtracting `c c^T / d` from the trailing block equals subtracting
//! `l l^T` for `l = c / sqrt(d)`, so the square root and the division are
//! done once per column by whoever assembles `L` (see
//! [`normalize_raw_column`]) rather than by every consuming block.

use super::helpers::{checked_pivot, validate_square_matrix};
use crate::algorithm::partition::{BlockRange, Partition};
use crate::algorithm::pipeline::{BlockLink, BlockWorker, PipelineCoordinator};
use crate::config::PipelineConfig;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::sync::BroadcastQueue;

/// A fully updated, not yet normalized column of the factor
///
/// Entries above `column` are zero; `values[column]` is the raw pivot.
#[derive(Clone, Debug, PartialEq)]
pub struct RawColumn<T> {
    /// Global column index
    pub column: usize,
    /// All `n` rows of the column
    pub values: Vec<T>,
}

/// Turn a raw column into the matching column of `L`
///
/// `L[c][c] = sqrt(|raw[c]|)` and `L[j][c] = raw[j] / L[c][c]` for `j > c`.
pub fn normalize_raw_column<T: Element>(raw: RawColumn<T>) -> Vec<T> {
    let c = raw.column;
    let mut values = raw.values;
    let diag = values[c].abs().sqrt();
    values[c] = diag;
    for v in &mut values[c + 1..] {
        *v = *v / diag;
    }
    values
}

/// Worker for one column block
///
/// Owns a private `n x len` copy of its columns of `A`.
pub(crate) struct CholeskyWorker<T: Element> {
    range: BlockRange,
    cols: Matrix<T>,
}

impl<T: Element> CholeskyWorker<T> {
    pub(crate) fn new(a: &Matrix<T>, range: BlockRange) -> Result<Self> {
        let mut cols = Matrix::zeros(a.rows(), range.len);
        a.columns_into(range.first, &mut cols)?;
        Ok(Self { range, cols })
    }

    /// Apply the update contributed by a column left of this block
    fn absorb(&mut self, raw: &RawColumn<T>) {
        let c = raw.column;
        self.rank_one_update(&raw.values, c, raw.values[c]);
        self.cols.zero_row(c);
    }

    /// `cols -= column * column[block rows]^T / pivot`, below `pivot_row` only
    ///
    /// Rows and columns at or above `pivot_row` are already finished and the
    /// raw column is zero there, so they are skipped.
    fn rank_one_update(&mut self, column: &[T], pivot_row: usize, pivot: T) {
        let first = self.range.first;
        let start = (pivot_row + 1).max(first) - first;
        for r in (pivot_row + 1)..column.len() {
            let scale = column[r] / pivot;
            if scale == T::zero() {
                continue;
            }
            let row = &mut self.cols.row_mut(r)[start..];
            for (entry, &c) in row.iter_mut().zip(&column[first + start..]) {
                *entry = *entry - scale * c;
            }
        }
    }

    /// Finalize this block's columns left to right, handing each to `emit`
    /// before it is used to update the remaining local columns
    fn finalize_columns<F>(&mut self, mut emit: F) -> Result<()>
    where
        F: FnMut(RawColumn<T>) -> Result<()>,
    {
        for i in 0..self.range.len {
            let g = self.range.first + i;
            let mut values = self.cols.column(i);
            values[..g].fill(T::zero());
            let pivot = checked_pivot(g, values[g])?;

            emit(RawColumn {
                column: g,
                values: values.clone(),
            })?;

            self.rank_one_update(&values, g, pivot);
            self.cols.zero_row(g);
            self.cols.zero_column(i);
        }
        Ok(())
    }
}

impl<T: Element> BlockWorker for CholeskyWorker<T> {
    type Message = RawColumn<T>;

    fn block(&self) -> usize {
        self.range.index
    }

    fn run(mut self, link: &mut BlockLink<'_, RawColumn<T>>) -> Result<()> {
        for c in 0..self.range.first {
            let raw = link.recv()?;
            if raw.column != c {
                return Err(Error::PipelineOrder {
                    expected: c,
                    got: raw.column,
                });
            }
            self.absorb(&raw);
        }
        log::trace!(
            "cholesky: block {} absorbed {} columns",
            self.range.index,
            self.range.first
        );
        self.finalize_columns(|raw| {
            link.publish(raw);
            Ok(())
        })
    }
}

/// Factor symmetric positive definite `A` as `L L^T` with blocks of
/// `block_size` columns
///
/// Only the lower triangle of `A` is read. `block_size` must evenly divide
/// the dimension of `A`; a block size equal to the dimension runs inline on
/// the calling thread.
///
/// # Example
///
/// ```
/// use blockpipe::algorithm::cholesky_factor;
/// use blockpipe::matrix::Matrix;
///
/// // [[4, 2], [2, 5]] = L L^T with L = [[2, 0], [1, 2]]
/// let a = Matrix::from_vec(vec![4.0, 2.0, 2.0, 5.0], 2, 2)?;
/// let l = cholesky_factor(&a, 1)?;
/// assert_eq!(l.as_slice(), &[2.0, 0.0, 1.0, 2.0]);
/// # Ok::<(), blockpipe::error::Error>(())
/// ```
pub fn cholesky_factor<T: Element>(a: &Matrix<T>, block_size: usize) -> Result<Matrix<T>> {
    cholesky_factor_with(a, &PipelineConfig::new(block_size))
}

/// [`cholesky_factor`] with explicit wait and stall settings
pub fn cholesky_factor_with<T: Element>(
    a: &Matrix<T>,
    config: &PipelineConfig,
) -> Result<Matrix<T>> {
    let n = validate_square_matrix(a)?;
    let partition = Partition::new(n, config)?;
    let mut l = Matrix::zeros(n, n);
    if n == 0 {
        return Ok(l);
    }

    let p = partition.block_count();
    log::debug!(
        "cholesky: n={} dtype={} block_size={} blocks={} wait={:?}",
        n,
        a.dtype(),
        partition.block_size(),
        p,
        config.wait_strategy()
    );

    if partition.is_sequential() {
        let mut worker = CholeskyWorker::new(a, partition.block(0))?;
        worker.finalize_columns(|raw| {
            let c = raw.column;
            l.overwrite_column(c, &normalize_raw_column(raw), 0)
        })?;
        return Ok(l);
    }

    let workers = partition
        .blocks()
        .map(|range| CholeskyWorker::new(a, range))
        .collect::<Result<Vec<_>>>()?;

    let queue = BroadcastQueue::new();
    let mut coordinator = PipelineCoordinator::new(&queue, *config);
    coordinator.run(workers)?;

    coordinator.drain(n, |c, raw| place_column(&mut l, c, raw))?;

    log::debug!("cholesky: assembled {} columns from {} blocks", n, p);
    Ok(l)
}

/// Normalize the `c`-th drained column into `L`; columns arrive left to right
fn place_column<T: Element>(l: &mut Matrix<T>, c: usize, raw: RawColumn<T>) -> Result<()> {
    if raw.column != c {
        return Err(Error::PipelineOrder {
            expected: c,
            got: raw.column,
        });
    }
    l.overwrite_column(c, &normalize_raw_column(raw), 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::WaitStrategy;

    // A = L L^T with L = [[2, 0, 0], [1, 3, 0], [-1, 2, 1]]
    fn spd_3x3() -> (Matrix<f64>, Matrix<f64>) {
        let l = Matrix::from_vec(
            vec![
                2.0, 0.0, 0.0, //
                1.0, 3.0, 0.0, //
                -1.0, 2.0, 1.0,
            ],
            3,
            3,
        )
        .unwrap();
        let a = l.matmul(&l.transpose()).unwrap();
        (a, l)
    }

    fn assert_close(got: &Matrix<f64>, want: &Matrix<f64>) {
        for (g, w) in got.as_slice().iter().zip(want.as_slice()) {
            assert!((g - w).abs() < 1e-12, "got {:?}, want {:?}", got, want);
        }
    }

    #[test]
    fn test_normalize_raw_column() {
        let raw = RawColumn {
            column: 1,
            values: vec![0.0f64, 9.0, 3.0, -6.0],
        };
        assert_eq!(normalize_raw_column(raw), vec![0.0, 3.0, 1.0, -2.0]);
    }

    #[test]
    fn test_first_block_publishes_raw_columns() {
        let (a, _) = spd_3x3();
        let partition = Partition::new(3, &PipelineConfig::new(1)).unwrap();
        let mut worker = CholeskyWorker::new(&a, partition.block(0)).unwrap();
        let mut published = Vec::new();
        worker
            .finalize_columns(|raw| {
                published.push(raw);
                Ok(())
            })
            .unwrap();
        // First column of A is raw: [4, 2, -2]
        assert_eq!(
            published,
            vec![RawColumn {
                column: 0,
                values: vec![4.0, 2.0, -2.0]
            }]
        );
    }

    #[test]
    fn test_factor_all_block_sizes() {
        let (a, l) = spd_3x3();
        for block_size in [1, 3] {
            let got = cholesky_factor(&a, block_size).unwrap();
            assert_close(&got, &l);
        }
    }

    #[test]
    fn test_park_strategy() {
        let (a, l) = spd_3x3();
        let config = PipelineConfig::new(1).with_wait_strategy(WaitStrategy::Park);
        assert_close(&cholesky_factor_with(&a, &config).unwrap(), &l);
    }

    #[test]
    fn test_upper_triangle_is_ignored() {
        let (mut a, l) = spd_3x3();
        a.set(0, 2, 1000.0);
        a.set(1, 2, -7.0);
        assert_close(&cholesky_factor(&a, 1).unwrap(), &l);
    }

    #[test]
    fn test_not_positive_definite() {
        // [[1, 2], [2, 1]] has eigenvalues 3 and -1
        let a = Matrix::from_vec(vec![1.0f64, 2.0, 2.0, 1.0], 2, 2).unwrap();
        for block_size in [1, 2] {
            let err = cholesky_factor(&a, block_size).unwrap_err();
            assert!(
                matches!(err, Error::NotPositiveDefinite { column: 1, .. }),
                "block_size={}: {:?}",
                block_size,
                err
            );
        }
    }

    #[test]
    fn test_drain_rejects_out_of_order_column() {
        let queue = BroadcastQueue::new();
        let producer = queue.create_consumer();
        let mut coordinator = PipelineCoordinator::new(&queue, PipelineConfig::new(1));
        queue.publish(
            RawColumn {
                column: 0,
                values: vec![4.0f64, 2.0],
            },
            producer.id(),
        );
        queue.publish(
            RawColumn {
                column: 0,
                values: vec![4.0, 2.0],
            },
            producer.id(),
        );

        let mut l = Matrix::zeros(2, 2);
        let err = coordinator
            .drain(2, |c, raw| place_column(&mut l, c, raw))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::PipelineOrder {
                expected: 1,
                got: 0
            }
        ));
        // The in-order column was assembled before the violation
        assert_eq!(l.column(0), vec![2.0, 1.0]);
    }

    #[test]
    fn test_rejects_uneven_block_size() {
        let (a, _) = spd_3x3();
        assert!(matches!(
            cholesky_factor(&a, 2),
            Err(Error::InvalidBlockSize {
                block_size: 2,
                dim: 3
            })
        ));
    }
}
