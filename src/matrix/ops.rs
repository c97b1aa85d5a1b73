//! Dense arithmetic used by residual checks and input generation
//!
//! None of this runs inside a pipeline; workers only copy, read and update
//! their private slices element-wise.

use super::Matrix;
use crate::dtype::Element;
use crate::error::{Error, Result};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Skip Rayon when the product has fewer multiply-adds than this
#[cfg(feature = "rayon")]
const PARALLEL_THRESHOLD: usize = 1 << 16;

impl<T: Element> Matrix<T> {
    /// Matrix product `self * other`
    pub fn matmul(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        if self.cols != other.rows {
            return Err(Error::shape_mismatch(
                &[self.cols, other.cols],
                &[other.rows, other.cols],
            ));
        }
        let (m, n) = (self.rows, other.cols);
        let mut out = Matrix::zeros(m, n);
        if n == 0 {
            return Ok(out);
        }

        #[cfg(feature = "rayon")]
        if m * self.cols * n >= PARALLEL_THRESHOLD {
            out.data
                .par_chunks_mut(n)
                .enumerate()
                .for_each(|(r, out_row)| matmul_row(self.row(r), other, out_row));
            return Ok(out);
        }

        for r in 0..m {
            let start = r * n;
            matmul_row(self.row(r), other, &mut out.data[start..start + n]);
        }
        Ok(out)
    }

    /// Matrix-vector product `self * x`
    pub fn mul_vec(&self, x: &[T]) -> Result<Vec<T>> {
        if x.len() != self.cols {
            return Err(Error::shape_mismatch(&[self.cols], &[x.len()]));
        }
        Ok((0..self.rows)
            .map(|r| {
                self.row(r)
                    .iter()
                    .zip(x)
                    .fold(T::zero(), |acc, (&a, &b)| acc + a * b)
            })
            .collect())
    }

    /// Transposed copy
    pub fn transpose(&self) -> Matrix<T> {
        Matrix::from_fn(self.cols, self.rows, |r, c| self.get(c, r))
    }

    /// `self += scalar * other`
    pub fn add_scaled(&mut self, other: &Matrix<T>, scalar: T) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::shape_mismatch(&self.shape(), &other.shape()));
        }
        for (a, &b) in self.data.iter_mut().zip(&other.data) {
            *a = *a + scalar * b;
        }
        Ok(())
    }

    /// `self *= scalar`
    pub fn scale(&mut self, scalar: T) {
        for a in &mut self.data {
            *a = *a * scalar;
        }
    }

    /// Frobenius norm, accumulated in f64
    pub fn frob_norm(&self) -> T {
        T::from_f64_val(frob_norm_slice(&self.data))
    }
}

/// Frobenius (Euclidean) norm of a slice, accumulated in f64
pub(crate) fn frob_norm_slice<T: Element>(values: &[T]) -> f64 {
    values
        .iter()
        .map(|v| {
            let v = v.to_f64_val();
            v * v
        })
        .sum::<f64>()
        .sqrt()
}

/// One output row of a matmul: `out_row = lhs_row * rhs`
#[inline]
fn matmul_row<T: Element>(lhs_row: &[T], rhs: &Matrix<T>, out_row: &mut [T]) {
    for (k, &a) in lhs_row.iter().enumerate() {
        if a == T::zero() {
            continue;
        }
        for (o, &b) in out_row.iter_mut().zip(rhs.row(k)) {
            *o = *o + a * b;
        }
    }
}
