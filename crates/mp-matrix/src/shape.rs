use crate::error::{MatrixError, Result};
use std::fmt;

/// The `(rows, cols)` extent of a dense matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: usize,
    cols: usize,
}

impl Shape {
    /// Create a new shape.
    pub fn new(rows: usize, cols: usize) -> Self {
        Shape { rows, cols }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of elements, or `None` if `rows * cols` overflows.
    pub fn checked_numel(&self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }

    /// Total number of elements.
    ///
    /// # Panics
    /// Panics if `rows * cols` overflows `usize`.
    pub fn numel(&self) -> usize {
        match self.checked_numel() {
            Some(n) => n,
            None => panic!("shape {} has more than usize::MAX elements", self),
        }
    }

    /// Returns true if either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Row-major strides: `[cols, 1]`.
    pub fn strides(&self) -> [usize; 2] {
        [self.cols, 1]
    }

    /// Flat row-major offset of `(row, col)`, or `None` when out of range.
    pub fn offset(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.rows && col < self.cols {
            Some(row * self.cols + col)
        } else {
            None
        }
    }

    /// The shape with rows and columns swapped.
    pub fn transposed(&self) -> Shape {
        Shape::new(self.cols, self.rows)
    }

    /// Shape of the product `a @ b`.
    ///
    /// `a` is `[m, n]`, `b` must be `[n, p]`, the result is `[m, p]`.
    /// With `n == 0` both operands are empty but `m * p` can still overflow,
    /// which is reported as [`MatrixError::TooLarge`].
    pub fn matmul(a: &Shape, b: &Shape) -> Result<Shape> {
        if a.cols != b.rows {
            return Err(MatrixError::ShapeMismatch {
                m: a.rows,
                n: a.cols,
                n2: b.rows,
                p: b.cols,
            });
        }
        let out = Shape::new(a.rows, b.cols);
        if out.checked_numel().is_none() {
            return Err(MatrixError::TooLarge {
                rows: out.rows,
                cols: out.cols,
            });
        }
        Ok(out)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}x{}]", self.rows, self.cols)
    }
}

impl From<(usize, usize)> for Shape {
    fn from((rows, cols): (usize, usize)) -> Self {
        Shape::new(rows, cols)
    }
}
