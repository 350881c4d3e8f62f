use std::fmt::{self, Debug};
use std::str::FromStr;

use crate::cpu::{AccumulateKernel, BlockedKernel, IkjKernel, LocalSumKernel, NaiveKernel};
#[cfg(feature = "parallel")]
use crate::cpu::ParallelKernel;
use crate::element::Element;
use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;
use crate::shape::Shape;

/// A matrix-multiplication algorithm.
///
/// Every implementation computes the same mathematical product
/// `C[i, j] = sum_k A[i, k] * B[k, j]`; they differ only in loop order,
/// temporaries and memory traffic. Results agree up to floating-point
/// accumulation order.
pub trait MatmulKernel<T: Element>: Send + Sync + Debug {
    /// Returns the name of this kernel (e.g. "naive", "local-sum").
    fn name(&self) -> &str;

    /// Overwrite `c` with `a @ b`.
    ///
    /// - `a`: shape [m, n]
    /// - `b`: shape [n, p]
    /// - `c`: shape [m, p]
    ///
    /// All shapes are checked before `c` is touched; on error `c` is left
    /// unchanged.
    fn matmul_into(&self, a: &Matrix<T>, b: &Matrix<T>, c: &mut Matrix<T>) -> Result<()>;

    /// Allocate a fresh `[m, p]` result and compute `a @ b` into it.
    fn matmul(&self, a: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>> {
        let shape = Shape::matmul(&a.shape(), &b.shape())?;
        let mut c = Matrix::zeros(shape.rows(), shape.cols());
        self.matmul_into(a, b, &mut c)?;
        Ok(c)
    }
}

/// Validate the shapes of `a @ b -> c`.
///
/// Returns the product shape `[m, p]`.
pub fn check_matmul<T: Element>(a: &Matrix<T>, b: &Matrix<T>, c: &Matrix<T>) -> Result<Shape> {
    let expected = Shape::matmul(&a.shape(), &b.shape())?;
    if c.shape() != expected {
        return Err(MatrixError::OutputShapeMismatch {
            expected,
            got: c.shape(),
        });
    }
    Ok(expected)
}

/// Identifies one of the built-in kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelKind {
    Naive,
    Accumulate,
    LocalSum,
    Ikj,
    Blocked,
    #[cfg(feature = "parallel")]
    Parallel,
}

impl KernelKind {
    /// Every built-in kernel, slowest first.
    #[cfg(feature = "parallel")]
    pub const ALL: &'static [KernelKind] = &[
        KernelKind::Naive,
        KernelKind::Accumulate,
        KernelKind::LocalSum,
        KernelKind::Ikj,
        KernelKind::Blocked,
        KernelKind::Parallel,
    ];

    /// Every built-in kernel, slowest first.
    #[cfg(not(feature = "parallel"))]
    pub const ALL: &'static [KernelKind] = &[
        KernelKind::Naive,
        KernelKind::Accumulate,
        KernelKind::LocalSum,
        KernelKind::Ikj,
        KernelKind::Blocked,
    ];

    /// The three loop nests every comparison must include.
    pub const REQUIRED: &'static [KernelKind] =
        &[KernelKind::Naive, KernelKind::Accumulate, KernelKind::LocalSum];

    pub fn name(&self) -> &'static str {
        match self {
            KernelKind::Naive => "naive",
            KernelKind::Accumulate => "accumulate",
            KernelKind::LocalSum => "local-sum",
            KernelKind::Ikj => "ikj",
            KernelKind::Blocked => "blocked",
            #[cfg(feature = "parallel")]
            KernelKind::Parallel => "parallel",
        }
    }

    /// Build the kernel with its default parameters.
    pub fn build<T: Element>(&self) -> Box<dyn MatmulKernel<T>> {
        match self {
            KernelKind::Naive => Box::new(NaiveKernel),
            KernelKind::Accumulate => Box::new(AccumulateKernel),
            KernelKind::LocalSum => Box::new(LocalSumKernel),
            KernelKind::Ikj => Box::new(IkjKernel),
            KernelKind::Blocked => Box::new(BlockedKernel::default()),
            #[cfg(feature = "parallel")]
            KernelKind::Parallel => Box::new(ParallelKernel::default()),
        }
    }
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KernelKind {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self> {
        KernelKind::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| MatrixError::UnknownKernel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_matmul_ok() {
        let a = Matrix::<f64>::zeros(2, 3);
        let b = Matrix::<f64>::zeros(3, 4);
        let c = Matrix::<f64>::zeros(2, 4);
        assert_eq!(check_matmul(&a, &b, &c).unwrap(), Shape::new(2, 4));
    }

    #[test]
    fn test_check_matmul_inner_mismatch() {
        let a = Matrix::<f64>::zeros(2, 3);
        let b = Matrix::<f64>::zeros(4, 4);
        let c = Matrix::<f64>::zeros(2, 4);
        assert!(matches!(
            check_matmul(&a, &b, &c),
            Err(MatrixError::ShapeMismatch {
                m: 2,
                n: 3,
                n2: 4,
                p: 4
            })
        ));
    }

    #[test]
    fn test_check_matmul_output_mismatch() {
        let a = Matrix::<f64>::zeros(2, 3);
        let b = Matrix::<f64>::zeros(3, 4);
        let c = Matrix::<f64>::zeros(4, 2);
        let err = check_matmul(&a, &b, &c).unwrap_err();
        assert_eq!(
            err,
            MatrixError::OutputShapeMismatch {
                expected: Shape::new(2, 4),
                got: Shape::new(4, 2)
            }
        );
    }

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in KernelKind::ALL {
            assert_eq!(kind.name().parse::<KernelKind>().unwrap(), *kind);
            assert_eq!(kind.build::<f64>().name(), kind.name());
        }
        assert_eq!("LOCAL-SUM".parse::<KernelKind>().unwrap(), KernelKind::LocalSum);
    }

    #[test]
    fn test_unknown_kind() {
        assert_eq!(
            "strassen".parse::<KernelKind>(),
            Err(MatrixError::UnknownKernel("strassen".to_string()))
        );
    }
}
