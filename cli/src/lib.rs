//! Command line evaluation of per-target SVMs on a precomputed kernel
//!
//! Usage:
//!   kernfold --data-dir data --folds 5 -c 10
//!   kernfold --data-dir data --activity-threshold 6 --per-target
//!   kernfold --delimiter tab --normalize --json

pub mod args;
pub mod pipeline;
pub mod report;

pub use args::Args;
