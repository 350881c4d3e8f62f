pub mod matmul;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod reduce;

#[cfg(feature = "parallel")]
pub use parallel::ParallelKernel;

use log::trace;

use crate::element::Element;
use crate::error::{MatrixError, Result};
use crate::kernel::{check_matmul, MatmulKernel};
use crate::matrix::Matrix;

/// Default tile edge for [`BlockedKernel`].
pub const DEFAULT_BLOCK: usize = 64;

/// Naive i-j-k kernel that materializes a row, a column and their
/// element-wise product for every output cell.
///
/// Deliberately wasteful: this is the baseline the other kernels are
/// measured against.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveKernel;

/// i-j-k kernel that adds each term directly into the output cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccumulateKernel;

/// i-j-k kernel that sums into a local and writes each cell once.
///
/// This is the reference kernel used by [`Matrix::matmul`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSumKernel;

/// i-k-j kernel: unit-stride inner loop over B and C.
#[derive(Debug, Clone, Copy, Default)]
pub struct IkjKernel;

/// Cache-blocked kernel with a square tile edge.
#[derive(Debug, Clone, Copy)]
pub struct BlockedKernel {
    block: usize,
}

impl BlockedKernel {
    /// # Errors
    /// Returns [`MatrixError::InvalidBlock`] if `block == 0`.
    pub fn new(block: usize) -> Result<Self> {
        if block == 0 {
            return Err(MatrixError::InvalidBlock(block));
        }
        Ok(BlockedKernel { block })
    }

    pub fn block(&self) -> usize {
        self.block
    }
}

impl Default for BlockedKernel {
    fn default() -> Self {
        BlockedKernel {
            block: DEFAULT_BLOCK,
        }
    }
}

impl<T: Element> MatmulKernel<T> for NaiveKernel {
    fn name(&self) -> &str {
        "naive"
    }

    fn matmul_into(&self, a: &Matrix<T>, b: &Matrix<T>, c: &mut Matrix<T>) -> Result<()> {
        check_matmul(a, b, c)?;
        let (m, n, p) = (a.rows(), a.cols(), b.cols());
        matmul::naive_ijk(a.as_slice(), b.as_slice(), c.as_mut_slice(), m, n, p);
        Ok(())
    }
}

impl<T: Element> MatmulKernel<T> for AccumulateKernel {
    fn name(&self) -> &str {
        "accumulate"
    }

    fn matmul_into(&self, a: &Matrix<T>, b: &Matrix<T>, c: &mut Matrix<T>) -> Result<()> {
        check_matmul(a, b, c)?;
        c.fill(T::zero());
        let (m, n, p) = (a.rows(), a.cols(), b.cols());
        matmul::accumulate_ijk(a.as_slice(), b.as_slice(), c.as_mut_slice(), m, n, p);
        Ok(())
    }
}

impl<T: Element> MatmulKernel<T> for LocalSumKernel {
    fn name(&self) -> &str {
        "local-sum"
    }

    fn matmul_into(&self, a: &Matrix<T>, b: &Matrix<T>, c: &mut Matrix<T>) -> Result<()> {
        check_matmul(a, b, c)?;
        let (m, n, p) = (a.rows(), a.cols(), b.cols());
        matmul::local_sum_ijk(a.as_slice(), b.as_slice(), c.as_mut_slice(), m, n, p);
        Ok(())
    }
}

impl<T: Element> MatmulKernel<T> for IkjKernel {
    fn name(&self) -> &str {
        "ikj"
    }

    fn matmul_into(&self, a: &Matrix<T>, b: &Matrix<T>, c: &mut Matrix<T>) -> Result<()> {
        check_matmul(a, b, c)?;
        c.fill(T::zero());
        let (m, n, p) = (a.rows(), a.cols(), b.cols());
        matmul::accumulate_ikj(a.as_slice(), b.as_slice(), c.as_mut_slice(), m, n, p);
        Ok(())
    }
}

impl<T: Element> MatmulKernel<T> for BlockedKernel {
    fn name(&self) -> &str {
        "blocked"
    }

    fn matmul_into(&self, a: &Matrix<T>, b: &Matrix<T>, c: &mut Matrix<T>) -> Result<()> {
        check_matmul(a, b, c)?;
        c.fill(T::zero());
        let (m, n, p) = (a.rows(), a.cols(), b.cols());
        matmul::accumulate_blocked(
            a.as_slice(),
            b.as_slice(),
            c.as_mut_slice(),
            m,
            n,
            p,
            self.block,
        );
        Ok(())
    }
}

/// In-place accumulation: `C += A * B`.
///
/// `c` must already have shape `[rows(a), cols(b)]`. It is not zeroed, so
/// a caller can accumulate several products into the same buffer.
///
/// # Errors
/// Returns a shape error before touching `c` if any dimension disagrees.
pub fn matmul_accumulate<T: Element>(c: &mut Matrix<T>, a: &Matrix<T>, b: &Matrix<T>) -> Result<()> {
    let shape = check_matmul(a, b, c)?;
    trace!("matmul_accumulate into {}", shape);
    let (m, n, p) = (a.rows(), a.cols(), b.cols());
    matmul::accumulate_ijk(a.as_slice(), b.as_slice(), c.as_mut_slice(), m, n, p);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;

    fn kernels() -> Vec<Box<dyn MatmulKernel<f64>>> {
        vec![
            Box::new(NaiveKernel),
            Box::new(AccumulateKernel),
            Box::new(LocalSumKernel),
            Box::new(IkjKernel),
            Box::new(BlockedKernel::new(2).unwrap()),
        ]
    }

    #[test]
    fn test_matmul_basic() {
        // [1,2;3,4] @ [5,6;7,8] = [19,22;43,50]
        let a = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = Matrix::from_vec(2, 2, vec![5.0, 6.0, 7.0, 8.0]).unwrap();
        for k in kernels() {
            let c = k.matmul(&a, &b).unwrap();
            assert_eq!(c.as_slice(), &[19.0, 22.0, 43.0, 50.0], "{}", k.name());
        }
    }

    #[test]
    fn test_matmul_into_overwrites() {
        let a = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = Matrix::from_vec(2, 2, vec![5.0, 6.0, 7.0, 8.0]).unwrap();
        for k in kernels() {
            let mut c = Matrix::filled(2, 2, 100.0);
            k.matmul_into(&a, &b, &mut c).unwrap();
            assert_eq!(c.as_slice(), &[19.0, 22.0, 43.0, 50.0], "{}", k.name());
        }
    }

    #[test]
    fn test_mismatch_leaves_output_untouched() {
        let a = Matrix::<f64>::filled(2, 3, 1.0);
        let b = Matrix::<f64>::filled(2, 2, 1.0);
        for k in kernels() {
            let mut c = Matrix::filled(2, 2, 9.0);
            let err = k.matmul_into(&a, &b, &mut c).unwrap_err();
            assert!(matches!(err, MatrixError::ShapeMismatch { .. }), "{}", k.name());
            assert_eq!(c.as_slice(), &[9.0; 4], "{}", k.name());
        }
    }

    #[test]
    fn test_wrong_output_shape() {
        let a = Matrix::<f64>::filled(2, 3, 1.0);
        let b = Matrix::<f64>::filled(3, 2, 1.0);
        for k in kernels() {
            let mut c = Matrix::filled(3, 3, 9.0);
            let err = k.matmul_into(&a, &b, &mut c).unwrap_err();
            assert_eq!(
                err,
                MatrixError::OutputShapeMismatch {
                    expected: Shape::new(2, 2),
                    got: Shape::new(3, 3)
                }
            );
            assert_eq!(c.as_slice(), &[9.0; 9]);
        }
    }

    #[test]
    fn test_matmul_accumulate() {
        let a = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = Matrix::from_vec(2, 2, vec![5.0, 6.0, 7.0, 8.0]).unwrap();
        let mut c = Matrix::filled(2, 2, 1.0);
        matmul_accumulate(&mut c, &a, &b).unwrap();
        assert_eq!(c.as_slice(), &[20.0, 23.0, 44.0, 51.0]);
        matmul_accumulate(&mut c, &a, &b).unwrap();
        assert_eq!(c.as_slice(), &[39.0, 45.0, 87.0, 101.0]);
    }

    #[test]
    fn test_matmul_accumulate_mismatch() {
        let a = Matrix::<f64>::zeros(2, 3);
        let b = Matrix::<f64>::zeros(3, 2);
        let mut c = Matrix::<f64>::zeros(2, 3);
        assert!(matches!(
            matmul_accumulate(&mut c, &a, &b),
            Err(MatrixError::OutputShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_blocked_zero_block() {
        assert_eq!(BlockedKernel::new(0).unwrap_err(), MatrixError::InvalidBlock(0));
        assert_eq!(BlockedKernel::default().block(), DEFAULT_BLOCK);
    }

    #[test]
    fn test_f32_kernels() {
        let a = Matrix::from_vec(1, 2, vec![1.0f32, 2.0]).unwrap();
        let b = Matrix::from_vec(2, 1, vec![3.0f32, 4.0]).unwrap();
        let c = MatmulKernel::<f32>::matmul(&NaiveKernel, &a, &b).unwrap();
        assert_eq!(c.as_slice(), &[11.0f32]);
    }
}
