use kernfold_kernel::KernelError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SvmError>;

#[derive(Error, Debug)]
pub enum SvmError {
    #[error(transparent)]
    BaseCrate(#[from] kernfold::Error),
    #[error(transparent)]
    Kernel(#[from] KernelError),
    #[error("C values {0:?} must be positive and finite")]
    InvalidC((f32, f32)),
    #[error("eps {0} must be positive and finite")]
    InvalidEps(f32),
    #[error("iteration limit must be positive, got {0}")]
    InvalidIterations(usize),
}
