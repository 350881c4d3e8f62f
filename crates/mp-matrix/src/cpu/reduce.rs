//! Summation and row/column reductions.
//!
//! The totals computed here are mathematically identical; they differ in
//! traversal order and therefore in cache behaviour and rounding.

use crate::element::Element;
use crate::matrix::Matrix;

#[cfg(feature = "parallel")]
use crate::error::{MatrixError, Result};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Base case length for [`pairwise_sum`].
const PAIRWISE_BASE: usize = 32;

/// Which index a reduction collapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Collapse the row index: one sum per column.
    Rows,
    /// Collapse the column index: one sum per row.
    Cols,
}

/// Sequential left-to-right sum.
pub fn sum<T: Element>(values: &[T]) -> T {
    let mut acc = T::zero();
    for &v in values {
        acc += v;
    }
    acc
}

/// Recursive pairwise sum. Rounding error grows with `log n` instead of `n`.
pub fn pairwise_sum<T: Element>(values: &[T]) -> T {
    if values.len() <= PAIRWISE_BASE {
        return sum(values);
    }
    let (lo, hi) = values.split_at(values.len() / 2);
    pairwise_sum(lo) + pairwise_sum(hi)
}

/// Reduce a matrix along `axis`.
///
/// `Axis::Rows` yields `cols` sums, `Axis::Cols` yields `rows` sums.
pub fn sum_axis<T: Element>(m: &Matrix<T>, axis: Axis) -> Vec<T> {
    match axis {
        Axis::Rows => {
            let mut out = vec![T::zero(); m.cols()];
            for i in 0..m.rows() {
                for (acc, &v) in out.iter_mut().zip(m.row(i)) {
                    *acc += v;
                }
            }
            out
        }
        Axis::Cols => (0..m.rows()).map(|i| sum(m.row(i))).collect(),
    }
}

/// Total of all elements, visiting storage in memory order.
pub fn sum_row_major<T: Element>(m: &Matrix<T>) -> T {
    let (rows, cols) = (m.rows(), m.cols());
    let data = m.as_slice();
    let mut acc = T::zero();
    for i in 0..rows {
        for j in 0..cols {
            acc += data[i * cols + j];
        }
    }
    acc
}

/// Total of all elements, walking down each column (stride `cols`).
pub fn sum_col_major<T: Element>(m: &Matrix<T>) -> T {
    let (rows, cols) = (m.rows(), m.cols());
    let data = m.as_slice();
    let mut acc = T::zero();
    for j in 0..cols {
        for i in 0..rows {
            acc += data[i * cols + j];
        }
    }
    acc
}

/// Sum `values` in `chunk`-sized pieces on the rayon pool.
///
/// # Errors
/// Returns [`MatrixError::InvalidChunk`] if `chunk == 0`.
#[cfg(feature = "parallel")]
pub fn par_sum<T: Element>(values: &[T], chunk: usize) -> Result<T> {
    if chunk == 0 {
        return Err(MatrixError::InvalidChunk(chunk));
    }
    let partials: Vec<T> = values.par_chunks(chunk).map(sum::<T>).collect();
    Ok(sum(&partials))
}
