use std::ops::{Index, IndexMut};

use approx::{AbsDiffEq, RelativeEq};
use log::trace;

use crate::cpu::LocalSumKernel;
use crate::element::{DType, Element};
use crate::error::{MatrixError, Result};
use crate::kernel::MatmulKernel;
use crate::shape::Shape;

/// A dense, row-major matrix.
///
/// Element `(i, j)` lives at `data[i * cols + j]`. The matrix owns its
/// storage; kernels only ever borrow it.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T = f64> {
    data: Vec<T>,
    shape: Shape,
}

impl<T: Element> Matrix<T> {
    /// Create a matrix from row-major data.
    ///
    /// # Errors
    /// Returns [`MatrixError::TooLarge`] if `rows * cols` overflows and
    /// [`MatrixError::DataLength`] if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        let shape = Shape::new(rows, cols);
        let numel = shape
            .checked_numel()
            .ok_or(MatrixError::TooLarge { rows, cols })?;
        if data.len() != numel {
            return Err(MatrixError::DataLength {
                len: data.len(),
                shape,
            });
        }
        Ok(Matrix { data, shape })
    }

    /// Create a matrix from a slice of rows.
    ///
    /// # Errors
    /// Returns [`MatrixError::RaggedRows`] if the rows differ in length.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != cols {
                return Err(MatrixError::RaggedRows {
                    row,
                    expected: cols,
                    got: values.len(),
                });
            }
            data.extend_from_slice(values);
        }
        Matrix::from_vec(rows.len(), cols, data)
    }

    /// Create a matrix by evaluating `f(row, col)` for every element.
    ///
    /// # Panics
    /// Panics if `rows * cols` overflows `usize`.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        let shape = Shape::new(rows, cols);
        let mut data = Vec::with_capacity(shape.numel());
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Matrix { data, shape }
    }

    /// Create a matrix with every element set to `value`.
    ///
    /// # Panics
    /// Panics if `rows * cols` overflows `usize`.
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        let shape = Shape::new(rows, cols);
        Matrix {
            data: vec![value; shape.numel()],
            shape,
        }
    }

    /// Create a zero-filled matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, T::zero())
    }

    /// Create the `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        Self::from_fn(n, n, |i, j| if i == j { T::one() } else { T::zero() })
    }

    pub fn rows(&self) -> usize {
        self.shape.rows()
    }

    pub fn cols(&self) -> usize {
        self.shape.cols()
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    /// Element at `(row, col)`, or `None` when out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        self.shape.offset(row, col).map(|off| &self.data[off])
    }

    /// Borrow row `i` as a contiguous slice.
    ///
    /// # Panics
    /// Panics if `i >= rows()`.
    pub fn row(&self, i: usize) -> &[T] {
        let cols = self.cols();
        &self.data[i * cols..(i + 1) * cols]
    }

    /// Copy column `j` out into a new vector.
    ///
    /// # Panics
    /// Panics if `j >= cols()`.
    pub fn column(&self, j: usize) -> Vec<T> {
        assert!(j < self.cols(), "column {} out of range for {}", j, self.shape);
        self.data.iter().skip(j).step_by(self.cols()).copied().collect()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Return the transpose as a new matrix.
    pub fn transpose(&self) -> Matrix<T> {
        let (rows, cols) = (self.rows(), self.cols());
        let mut data = vec![T::zero(); rows * cols];
        for i in 0..rows {
            for j in 0..cols {
                data[j * rows + i] = self.data[i * cols + j];
            }
        }
        Matrix {
            data,
            shape: self.shape.transposed(),
        }
    }

    /// Matrix product `self @ other` with the local-accumulate reference kernel.
    pub fn matmul(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        self.matmul_with(other, &LocalSumKernel)
    }

    /// Matrix product `self @ other` using the given kernel.
    ///
    /// self is [m, n], other is [n, p], result is [m, p].
    pub fn matmul_with(&self, other: &Matrix<T>, kernel: &dyn MatmulKernel<T>) -> Result<Matrix<T>> {
        trace!(
            "matmul {} @ {} ({}, {})",
            self.shape,
            other.shape,
            kernel.name(),
            T::DTYPE
        );
        kernel.matmul(self, other)
    }
}

impl<T: Element> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        match self.shape.offset(row, col) {
            Some(off) => &self.data[off],
            None => panic!("index ({}, {}) out of range for {}", row, col, self.shape),
        }
    }
}

impl<T: Element> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        match self.shape.offset(row, col) {
            Some(off) => &mut self.data[off],
            None => panic!("index ({}, {}) out of range for {}", row, col, self.shape),
        }
    }
}

impl<T: Element> AbsDiffEq for Matrix<T> {
    type Epsilon = T;

    fn default_epsilon() -> T {
        T::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: T) -> bool {
        self.shape == other.shape
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl<T: Element> RelativeEq for Matrix<T> {
    fn default_max_relative() -> T {
        T::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: T, max_relative: T) -> bool {
        self.shape == other.shape
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_vec() {
        let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.dtype(), DType::F64);
        assert_eq!(m[(1, 2)], 6.0);
        assert_eq!(m.get(0, 1), Some(&2.0));
        assert_eq!(m.get(2, 0), None);
    }

    #[test]
    fn test_from_vec_length_mismatch() {
        let err = Matrix::from_vec(2, 2, vec![1.0f64, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            MatrixError::DataLength {
                len: 3,
                shape: Shape::new(2, 2)
            }
        );
    }

    #[test]
    fn test_from_vec_overflowing_shape() {
        let big = usize::MAX / 2 + 1;
        let err = Matrix::<f64>::from_vec(big, 2, vec![]).unwrap_err();
        assert_eq!(err, MatrixError::TooLarge { rows: big, cols: 2 });
        assert!(Matrix::<f64>::from_vec(0, usize::MAX, Vec::new()).is_ok());
    }

    #[test]
    #[should_panic(expected = "more than usize::MAX elements")]
    fn test_zeros_overflowing_shape() {
        Matrix::<f64>::zeros(usize::MAX, 2);
    }

    #[test]
    fn test_from_rows() {
        let m = Matrix::<f64>::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        assert_eq!(m.as_slice(), &[1.0, 2.0, 3.0, 4.0]);

        let ragged = Matrix::<f64>::from_rows(&[vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(
            ragged,
            Err(MatrixError::RaggedRows {
                row: 1,
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn test_row_and_column() {
        let m = Matrix::<f64>::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
        assert_eq!(m.column(2), vec![3.0, 6.0]);
    }

    #[test]
    #[should_panic]
    fn test_index_out_of_range_panics() {
        let m = Matrix::<f32>::zeros(2, 2);
        let _ = m[(2, 0)];
    }

    #[test]
    fn test_identity_and_transpose() {
        let i = Matrix::<f64>::identity(3);
        assert_eq!(i[(0, 0)], 1.0);
        assert_eq!(i[(0, 1)], 0.0);
        assert_eq!(i.transpose(), i);

        let m = Matrix::<f64>::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
        let t = m.transpose();
        assert_eq!(t.shape(), Shape::new(3, 2));
        assert_eq!(t.as_slice(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_fill_and_index_mut() {
        let mut m = Matrix::<f64>::zeros(2, 2);
        m.fill(3.0);
        m[(0, 1)] = 7.0;
        assert_eq!(m.into_vec(), vec![3.0, 7.0, 3.0, 3.0]);
    }

    #[test]
    fn test_matmul() {
        let a = Matrix::<f64>::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let b = Matrix::<f64>::from_rows(&[[5.0, 6.0], [7.0, 8.0]]).unwrap();
        let c = a.matmul(&b).unwrap();
        assert_eq!(c.as_slice(), &[19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_matmul_dimension_mismatch() {
        let a = Matrix::<f64>::zeros(1, 3);
        let b = Matrix::<f64>::zeros(2, 2);
        assert!(matches!(
            a.matmul(&b),
            Err(MatrixError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_relative_eq() {
        let a = Matrix::<f64>::from_rows(&[[1.0, 2.0]]).unwrap();
        let b = Matrix::<f64>::from_rows(&[[1.0 + 1e-13, 2.0]]).unwrap();
        assert_relative_eq!(a, b, max_relative = 1e-9);

        let c = Matrix::<f64>::from_rows(&[[1.0], [2.0]]).unwrap();
        assert!(!a.relative_eq(&c, 1e-9, 1e-9));
    }
}
