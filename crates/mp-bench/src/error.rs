use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("kernel '{kernel}' disagrees with the reference at size {size}")]
    Mismatch { kernel: String, size: usize },
    #[error("matrix error: {0}")]
    Matrix(#[from] mp_matrix::MatrixError),
}

pub type Result<T> = std::result::Result<T, BenchError>;
