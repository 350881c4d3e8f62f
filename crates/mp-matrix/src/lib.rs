//! `mp-matrix` - Dense matrices and matmul kernel variants for matperf.
//!
//! This crate provides:
//! - A row-major `Matrix<T>` over `f32`/`f64` with a 2D `Shape`
//! - A `MatmulKernel` trait with naive, accumulate and local-sum loop nests
//! - Loop-swapped, cache-blocked and row-parallel extension kernels
//! - In-place accumulation (`C += A * B`) into caller-owned buffers
//! - Array summation and row/column reductions
//!
//! ```
//! use mp_matrix::{Matrix, MatmulKernel, NaiveKernel};
//!
//! let a = Matrix::<f64>::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
//! let b = Matrix::<f64>::from_rows(&[[5.0, 6.0], [7.0, 8.0]]).unwrap();
//!
//! let c = NaiveKernel.matmul(&a, &b).unwrap();
//! assert_eq!(c.as_slice(), &[19.0, 22.0, 43.0, 50.0]);
//! ```

pub mod cpu;
pub mod element;
pub mod error;
pub mod kernel;
pub mod matrix;
pub mod shape;

// Re-export primary types at the crate root for convenience.
pub use cpu::reduce::{self, Axis};
pub use cpu::{
    matmul_accumulate, AccumulateKernel, BlockedKernel, IkjKernel, LocalSumKernel, NaiveKernel,
};
#[cfg(feature = "parallel")]
pub use cpu::ParallelKernel;
pub use element::{DType, Element};
pub use error::{MatrixError, Result};
pub use kernel::{check_matmul, KernelKind, MatmulKernel};
pub use matrix::Matrix;
pub use shape::Shape;
