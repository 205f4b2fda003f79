//! Composition models
//!
//! This module contains the composition models:
//!  * `MultiTargetModel`: combine multiple univariate models to a single multi-target model
mod multi_target_model;

pub use multi_target_model::MultiTargetModel;
