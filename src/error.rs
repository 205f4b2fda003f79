//! Error types in kernfold
//!

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid parameter {0}")]
    Parameters(String),
    #[error("not enough samples: {0}")]
    NotEnoughSamples(String),
    #[error("multiple targets not supported")]
    MultipleTargets,
    #[error("mismatched shapes: {0}")]
    MismatchedShapes(String),
    #[error("invalid folds: {0}")]
    InvalidFolds(String),
}
