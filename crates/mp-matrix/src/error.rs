use thiserror::Error;

use crate::shape::Shape;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    #[error("matmul shape mismatch: [{m}x{n}] @ [{n2}x{p}]")]
    ShapeMismatch {
        m: usize,
        n: usize,
        n2: usize,
        p: usize,
    },
    #[error("output shape mismatch: expected {expected}, got {got}")]
    OutputShapeMismatch { expected: Shape, got: Shape },
    #[error("data length {len} does not match shape {shape}")]
    DataLength { len: usize, shape: Shape },
    #[error("shape [{rows}x{cols}] has more elements than fit in usize")]
    TooLarge { rows: usize, cols: usize },
    #[error("ragged rows: row {row} has {got} elements, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        got: usize,
    },
    #[error("block size must be > 0, got {0}")]
    InvalidBlock(usize),
    #[error("chunk size must be > 0, got {0}")]
    InvalidChunk(usize),
    #[error("unknown kernel: {0}")]
    UnknownKernel(String),
    #[error("thread pool: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, MatrixError>;
