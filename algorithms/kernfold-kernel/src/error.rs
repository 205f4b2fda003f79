use thiserror::Error;

pub type Result<T> = std::result::Result<T, KernelError>;

/// Reasons for rejecting a precomputed kernel matrix
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    #[error("kernel matrix must be square, got {rows} rows and {cols} columns")]
    NotSquare { rows: usize, cols: usize },
    #[error("kernel matrix entry ({row}, {col}) is not finite")]
    NonFinite { row: usize, col: usize },
    #[error("kernel matrix is not symmetric: entries ({row}, {col}) and ({col}, {row}) differ by {delta}")]
    NotSymmetric { row: usize, col: usize, delta: f64 },
    #[error("kernel matrix is empty")]
    Empty,
}
