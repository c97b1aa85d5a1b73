//! Owned, shape-checked dense matrix
//!
//! `Matrix<T>` is the container the pipelines read their inputs from and write
//! their results into. Storage is a single row-major `Vec<T>`; sub-blocks are
//! addressed with explicit `(first_row, first_col)` offsets and copied in and
//! out, never aliased.

mod ops;

pub(crate) use ops::frob_norm_slice;


use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use std::fmt;

/// Row-major dense matrix
#[derive(Clone, PartialEq)]
pub struct Matrix<T: Element> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Element> Matrix<T> {
    /// Create a `rows x cols` matrix filled with zeros
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![T::zero(); rows * cols],
            rows,
            cols,
        }
    }

    /// Create an `n x n` identity matrix
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = T::one();
        }
        m
    }

    /// Wrap row-major `data` as a `rows x cols` matrix
    ///
    /// Fails with `ShapeMismatch` if `data.len() != rows * cols`.
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::shape_mismatch(&[rows * cols], &[data.len()]));
        }
        Ok(Self { data, rows, cols })
    }

    /// Build a matrix by evaluating `f(row, col)` for every entry in row-major order
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { data, rows, cols }
    }

    /// Number of rows
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `[rows, cols]`
    #[inline]
    pub fn shape(&self) -> [usize; 2] {
        [self.rows, self.cols]
    }

    /// Runtime scalar type
    #[inline]
    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    /// Whether the matrix is square
    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Element at `(row, col)`
    ///
    /// Out-of-range `col` within the storage is not detected; out-of-range
    /// storage indices panic.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.cols + col]
    }

    /// Overwrite the element at `(row, col)`
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.data[row * self.cols + col] = value;
    }

    /// Borrow one row
    #[inline]
    pub fn row(&self, row: usize) -> &[T] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Mutably borrow one row
    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        let start = row * self.cols;
        &mut self.data[start..start + self.cols]
    }

    /// Copy one column out
    pub fn column(&self, col: usize) -> Vec<T> {
        (0..self.rows).map(|r| self.get(r, col)).collect()
    }

    /// Row-major storage
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Copy `dst.rows()` consecutive rows starting at `first_row` into `dst`
    ///
    /// `dst` must have the same column count as `self`.
    pub fn rows_into(&self, first_row: usize, dst: &mut Matrix<T>) -> Result<()> {
        if dst.cols != self.cols || first_row + dst.rows > self.rows {
            return Err(Error::shape_mismatch(
                &[self.rows.saturating_sub(first_row), self.cols],
                &[dst.rows, dst.cols],
            ));
        }
        let start = first_row * self.cols;
        dst.data
            .copy_from_slice(&self.data[start..start + dst.rows * self.cols]);
        Ok(())
    }

    /// Copy `dst.cols()` consecutive columns starting at `first_col` into `dst`
    ///
    /// `dst` must have the same row count as `self`.
    pub fn columns_into(&self, first_col: usize, dst: &mut Matrix<T>) -> Result<()> {
        if dst.rows != self.rows || first_col + dst.cols > self.cols {
            return Err(Error::shape_mismatch(
                &[self.rows, self.cols.saturating_sub(first_col)],
                &[dst.rows, dst.cols],
            ));
        }
        let width = dst.cols;
        for r in 0..self.rows {
            let src = &self.row(r)[first_col..first_col + width];
            dst.row_mut(r).copy_from_slice(src);
        }
        Ok(())
    }

    /// Write `src` into `self` with its top-left corner at `(first_row, first_col)`
    pub fn overwrite_submatrix(
        &mut self,
        src: &Matrix<T>,
        first_row: usize,
        first_col: usize,
    ) -> Result<()> {
        if first_row + src.rows > self.rows || first_col + src.cols > self.cols {
            return Err(Error::shape_mismatch(
                &[
                    self.rows.saturating_sub(first_row),
                    self.cols.saturating_sub(first_col),
                ],
                &[src.rows, src.cols],
            ));
        }
        for r in 0..src.rows {
            let dst_row = &mut self.row_mut(first_row + r)[first_col..first_col + src.cols];
            dst_row.copy_from_slice(src.row(r));
        }
        Ok(())
    }

    /// Write `values` down column `col`, starting at `first_row`
    pub fn overwrite_column(&mut self, col: usize, values: &[T], first_row: usize) -> Result<()> {
        if col >= self.cols {
            return Err(Error::IndexOutOfBounds {
                index: col,
                size: self.cols,
            });
        }
        if first_row + values.len() > self.rows {
            return Err(Error::shape_mismatch(
                &[self.rows.saturating_sub(first_row)],
                &[values.len()],
            ));
        }
        for (i, &v) in values.iter().enumerate() {
            self.set(first_row + i, col, v);
        }
        Ok(())
    }

    /// Zero every entry of row `row`
    pub fn zero_row(&mut self, row: usize) {
        self.row_mut(row).fill(T::zero());
    }

    /// Zero every entry of column `col`
    pub fn zero_column(&mut self, col: usize) {
        for r in 0..self.rows {
            self.set(r, col, T::zero());
        }
    }
}

impl<T: Element> fmt::Debug for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix<{}>[{}x{}]", T::DTYPE, self.rows, self.cols)?;
        for r in 0..self.rows {
            writeln!(f, "  {:?}", self.row(r))?;
        }
        Ok(())
    }
}
