//! `kernfold` evaluates kernel classifiers on panels of binary activity labels.
//!
//! Compounds are described by a precomputed kernel matrix, their activity against a panel of
//! cell lines by a boolean target matrix. The crate provides the shared building blocks:
//!
//! * the [`DatasetBase`] container and the traits connecting records, targets and models
//! * stratified k-fold splitting by the number of active labels of a sample
//! * cross-validated prediction with one model per target column
//! * binary classification metrics
//!
//! The kernel records live in `kernfold-kernel`, the support vector classifier in `kernfold-svm`
//! and the file readers in `kernfold-datasets`.
//!

pub mod composing;
pub mod cross_validation;
pub mod dataset;
pub mod error;
mod metrics_classification;
mod param_guard;
pub mod prelude;
pub mod traits;

pub use composing::MultiTargetModel;
pub use dataset::{Dataset, DatasetBase, Float};
pub use error::{Error, Result};
pub use param_guard::ParamGuard;

/// Common metrics functions for binary classification
pub mod metrics {
    pub use crate::metrics_classification::{
        column_confusion_matrices, BinaryConfusionMatrix, ToConfusionMatrix,
    };
}
