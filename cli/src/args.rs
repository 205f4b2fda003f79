use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use kernfold_datasets::{DataFiles, LabelSource, TextFormat};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Space,
    Tab,
    Comma,
}

impl Delimiter {
    pub fn format(self) -> TextFormat {
        match self {
            Delimiter::Space => TextFormat::default(),
            Delimiter::Tab => TextFormat::tab(),
            Delimiter::Comma => TextFormat::comma(),
        }
    }
}

/// Cross-validate one SVM per target on a precomputed kernel
#[derive(Parser, Debug, Clone)]
#[command(name = "kernfold")]
#[command(version)]
pub struct Args {
    /// Directory holding the input matrices
    #[arg(long, env = "KERNFOLD_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Kernel matrix file, relative to the data directory
    #[arg(long, env = "KERNFOLD_KERNEL", default_value = "kernel.txt")]
    pub kernel: PathBuf,

    /// Label matrix file with +1/-1 entries
    #[arg(long, env = "KERNFOLD_LABELS", default_value = "labels.txt")]
    pub labels: PathBuf,

    /// Activity score matrix file
    #[arg(long, env = "KERNFOLD_ACTIVITY", default_value = "activity.txt")]
    pub activity: PathBuf,

    /// Correlation matrix between the targets
    #[arg(long, env = "KERNFOLD_CORRELATION", default_value = "correlation.txt")]
    pub correlation: PathBuf,

    /// Column separator of the input files
    #[arg(long, value_enum, env = "KERNFOLD_DELIMITER", default_value_t = Delimiter::Space)]
    pub delimiter: Delimiter,

    /// Number of cross-validation folds
    #[arg(long, env = "KERNFOLD_FOLDS", default_value_t = 5)]
    pub folds: usize,

    /// Number of stratification bins
    #[arg(long, env = "KERNFOLD_BINS", default_value_t = 10)]
    pub bins: usize,

    /// Seed of the fold assignment
    #[arg(long, env = "KERNFOLD_SEED", default_value_t = 0)]
    pub seed: u64,

    /// Keep the file order inside each stratum
    #[arg(long, env = "KERNFOLD_NO_SHUFFLE")]
    pub no_shuffle: bool,

    /// Penalty of misclassified training samples
    #[arg(short = 'c', long = "c", env = "KERNFOLD_C", default_value_t = 1.0)]
    pub c: f64,

    /// Penalty of positive samples, defaults to C
    #[arg(long, env = "KERNFOLD_C_POS")]
    pub c_pos: Option<f64>,

    /// Penalty of negative samples, defaults to C
    #[arg(long, env = "KERNFOLD_C_NEG")]
    pub c_neg: Option<f64>,

    /// Stopping threshold of the solver
    #[arg(long, env = "KERNFOLD_EPS", default_value_t = 1e-3)]
    pub eps: f64,

    /// Shrink the active set of the solver
    #[arg(long, env = "KERNFOLD_SHRINKING")]
    pub shrinking: bool,

    /// Scale the kernel to unit self-similarity
    #[arg(long, env = "KERNFOLD_NORMALIZE")]
    pub normalize: bool,

    /// Derive labels from the activity matrix, active when score >= threshold
    #[arg(long, env = "KERNFOLD_ACTIVITY_THRESHOLD")]
    pub activity_threshold: Option<f64>,

    /// Print scores of every target
    #[arg(long, env = "KERNFOLD_PER_TARGET")]
    pub per_target: bool,

    /// Print the report as JSON
    #[arg(long, env = "KERNFOLD_JSON")]
    pub json: bool,
}

impl Args {
    pub fn files(&self) -> DataFiles {
        DataFiles {
            kernel: self.kernel.clone(),
            labels: self.labels.clone(),
            activity: self.activity.clone(),
            correlation: self.correlation.clone(),
        }
    }

    pub fn label_source(&self) -> LabelSource {
        match self.activity_threshold {
            Some(threshold) => LabelSource::Activity { threshold },
            None => LabelSource::Labels,
        }
    }

    /// C of positive and negative samples
    pub fn penalties(&self) -> (f64, f64) {
        (self.c_pos.unwrap_or(self.c), self.c_neg.unwrap_or(self.c))
    }
}
