//! The four input matrices of an activity data set
use std::fmt;
use std::path::{Path, PathBuf};

use kernfold::DatasetBase;
use kernfold_kernel::{KernelError, PrecomputedKernel};
use ndarray::Array2;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::text::{read_matrix_file, TextFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileRole {
    Kernel,
    Labels,
    Activity,
    Correlation,
}

impl FileRole {
    pub const ALL: [FileRole; 4] = [
        FileRole::Kernel,
        FileRole::Labels,
        FileRole::Activity,
        FileRole::Correlation,
    ];
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileRole::Kernel => "kernel",
            FileRole::Labels => "labels",
            FileRole::Activity => "activity",
            FileRole::Correlation => "correlation",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BundleError {
    #[error("the {0} matrix is not available")]
    Missing(FileRole),
    #[error("label ({row}, {col}) is {value}, expected +1, -1 or 0")]
    InvalidLabel { row: usize, col: usize, value: f64 },
    #[error(transparent)]
    Kernel(#[from] KernelError),
    #[error("kernel relates {kernel} samples, but the label matrix has {labels} rows")]
    ShapeMismatch { kernel: usize, labels: usize },
}

/// File names of the matrices, relative to the data directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles {
    pub kernel: PathBuf,
    pub labels: PathBuf,
    pub activity: PathBuf,
    pub correlation: PathBuf,
}

impl Default for DataFiles {
    fn default() -> Self {
        DataFiles {
            kernel: "kernel.txt".into(),
            labels: "labels.txt".into(),
            activity: "activity.txt".into(),
            correlation: "correlation.txt".into(),
        }
    }
}

impl DataFiles {
    pub fn path(&self, role: FileRole) -> &Path {
        match role {
            FileRole::Kernel => &self.kernel,
            FileRole::Labels => &self.labels,
            FileRole::Activity => &self.activity,
            FileRole::Correlation => &self.correlation,
        }
    }
}

/// A file which could not be read
#[derive(Debug, Clone, PartialEq)]
pub struct LoadFailure {
    pub role: FileRole,
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to load {} matrix from {}: {}",
            self.role,
            self.path.display(),
            self.message
        )
    }
}

/// Where the binary targets come from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabelSource {
    /// Label matrix of `+1` and `-1` (or `0`) entries
    Labels,
    /// Activity scores, active when `score >= threshold`
    Activity { threshold: f64 },
}

impl LabelSource {
    fn role(&self) -> FileRole {
        match self {
            LabelSource::Labels => FileRole::Labels,
            LabelSource::Activity { .. } => FileRole::Activity,
        }
    }
}

/// Matrices of a data directory, each present if it could be read
#[derive(Debug, Clone, Default)]
pub struct DataBundle {
    pub kernel: Option<Array2<f64>>,
    pub labels: Option<Array2<f64>>,
    pub activity: Option<Array2<f64>>,
    pub correlation: Option<Array2<f64>>,
    failures: Vec<LoadFailure>,
}

impl DataBundle {
    /// Attempt to read all four matrices
    ///
    /// A missing or malformed file does not stop the others from loading, it is logged and
    /// recorded in [`failures`](DataBundle::failures) instead.
    pub fn load<P: AsRef<Path>>(dir: P, files: &DataFiles, format: &TextFormat) -> DataBundle {
        let mut bundle = DataBundle::default();

        for role in FileRole::ALL.iter().copied() {
            let path = dir.as_ref().join(files.path(role));

            match read_matrix_file(&path, format) {
                Ok(matrix) => {
                    info!(%role, rows = matrix.nrows(), cols = matrix.ncols(), "loaded {}", path.display());
                    *bundle.slot(role) = Some(matrix);
                }
                Err(err) => {
                    error!(%role, "failed to load {}: {}", path.display(), err);
                    bundle.failures.push(LoadFailure {
                        role,
                        path,
                        message: err.to_string(),
                    });
                }
            }
        }

        bundle
    }

    fn slot(&mut self, role: FileRole) -> &mut Option<Array2<f64>> {
        match role {
            FileRole::Kernel => &mut self.kernel,
            FileRole::Labels => &mut self.labels,
            FileRole::Activity => &mut self.activity,
            FileRole::Correlation => &mut self.correlation,
        }
    }

    pub fn matrix(&self, role: FileRole) -> Option<&Array2<f64>> {
        match role {
            FileRole::Kernel => self.kernel.as_ref(),
            FileRole::Labels => self.labels.as_ref(),
            FileRole::Activity => self.activity.as_ref(),
            FileRole::Correlation => self.correlation.as_ref(),
        }
    }

    pub fn failures(&self) -> &[LoadFailure] {
        &self.failures
    }

    /// Validate the kernel and build a multi-target data set
    ///
    /// # Errors
    ///
    /// * `Missing` if the kernel or the matrix of `source` was not loaded
    /// * `Kernel` if the kernel is not square, finite and symmetric within `1e-6 * max|k|`
    /// * `ShapeMismatch` if kernel and label matrix disagree on the sample count
    /// * `InvalidLabel` for label entries other than `+1`, `-1` and `0`
    pub fn into_dataset(
        mut self,
        source: LabelSource,
    ) -> Result<DatasetBase<PrecomputedKernel<f64>, Array2<bool>>, BundleError> {
        let matrix = self
            .kernel
            .take()
            .ok_or(BundleError::Missing(FileRole::Kernel))?;
        let scores = self
            .slot(source.role())
            .take()
            .ok_or_else(|| BundleError::Missing(source.role()))?;

        let kernel = PrecomputedKernel::new(matrix)?;
        kernel.check_symmetric(1e-6 * kernel.max_abs())?;

        let negative = kernel.negative_entries();
        if negative > 0 {
            warn!(negative, "kernel matrix has negative similarities");
        }

        if kernel.size() != scores.nrows() {
            return Err(BundleError::ShapeMismatch {
                kernel: kernel.size(),
                labels: scores.nrows(),
            });
        }

        let targets = match source {
            LabelSource::Labels => {
                if let Some(((row, col), value)) = scores
                    .indexed_iter()
                    .find(|(_, x)| **x != 1.0 && **x != -1.0 && **x != 0.0)
                {
                    return Err(BundleError::InvalidLabel {
                        row,
                        col,
                        value: *value,
                    });
                }
                scores.mapv(|x| x == 1.0)
            }
            LabelSource::Activity { threshold } => scores.mapv(|x| x >= threshold),
        };

        if let Some(correlation) = &self.correlation {
            if correlation.nrows() != targets.ncols() || correlation.ncols() != targets.ncols() {
                warn!(
                    rows = correlation.nrows(),
                    cols = correlation.ncols(),
                    targets = targets.ncols(),
                    "correlation matrix does not match the number of targets"
                );
            }
        }

        let names = (0..targets.ncols())
            .map(|i| format!("target_{}", i))
            .collect::<Vec<_>>();

        Ok(DatasetBase::new(kernel, targets).with_target_names(names))
    }
}

#[cfg(test)]
mod tests {
    use super::{BundleError, DataBundle, DataFiles, FileRole, LabelSource};
    use crate::text::TextFormat;
    use kernfold_kernel::KernelError;
    use ndarray::array;
    use std::path::Path;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    fn example_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "kernel.txt", "1 0.5 0.1\n0.5 1 0.2\n0.1 0.2 1\n");
        write(dir.path(), "labels.txt", "1 -1\n-1 -1\n1 1\n");
        write(dir.path(), "activity.txt", "6.5 4.0\n5.0 5.5\n7.2 3.1\n");
        write(dir.path(), "correlation.txt", "1 0.3\n0.3 1\n");
        dir
    }

    #[test]
    fn loads_all_files() {
        let dir = example_dir();
        let bundle = DataBundle::load(dir.path(), &DataFiles::default(), &TextFormat::default());

        assert!(bundle.failures().is_empty());
        for role in FileRole::ALL.iter() {
            assert!(bundle.matrix(*role).is_some());
        }

        let dataset = bundle.into_dataset(LabelSource::Labels).unwrap();
        assert_eq!(dataset.nsamples(), 3);
        assert_eq!(dataset.ntargets(), 2);
        assert_eq!(
            dataset.targets(),
            &array![[true, false], [false, false], [true, true]]
        );
        assert_eq!(dataset.target_names(), &["target_0", "target_1"]);
    }

    #[test]
    fn thresholds_activity() {
        let dir = example_dir();
        let bundle = DataBundle::load(dir.path(), &DataFiles::default(), &TextFormat::default());

        let dataset = bundle
            .into_dataset(LabelSource::Activity { threshold: 5.0 })
            .unwrap();
        assert_eq!(
            dataset.targets(),
            &array![[true, false], [true, true], [true, false]]
        );
    }

    #[test]
    fn missing_files_are_recorded() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "kernel.txt", "1 0\n0 1\n");

        let bundle = DataBundle::load(dir.path(), &DataFiles::default(), &TextFormat::default());
        let roles = bundle.failures().iter().map(|x| x.role).collect::<Vec<_>>();
        assert_eq!(
            roles,
            vec![FileRole::Labels, FileRole::Activity, FileRole::Correlation]
        );
        assert!(bundle.failures()[0]
            .to_string()
            .starts_with("failed to load labels matrix from"));

        let err = bundle.into_dataset(LabelSource::Labels).unwrap_err();
        assert_eq!(err, BundleError::Missing(FileRole::Labels));
    }

    #[test]
    fn custom_file_names() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "gram.csv", "1,0\n0,1\n");
        write(dir.path(), "y.csv", "1,0\n0,1\n");

        let files = DataFiles {
            kernel: "gram.csv".into(),
            labels: "y.csv".into(),
            ..Default::default()
        };
        let bundle = DataBundle::load(dir.path(), &files, &TextFormat::comma());
        assert_eq!(bundle.failures().len(), 2);

        let dataset = bundle.into_dataset(LabelSource::Labels).unwrap();
        assert_eq!(dataset.targets(), &array![[true, false], [false, true]]);
    }

    #[test]
    fn validates_inputs() {
        let bundle = |kernel, labels| DataBundle {
            kernel: Some(kernel),
            labels: Some(labels),
            ..Default::default()
        };

        let err = bundle(array![[1.0, 0.5], [0.4, 1.0]], array![[1.0], [-1.0]])
            .into_dataset(LabelSource::Labels)
            .unwrap_err();
        assert!(matches!(
            err,
            BundleError::Kernel(KernelError::NotSymmetric { row: 0, col: 1, .. })
        ));

        let err = bundle(array![[1.0, 0.5, 0.0]], array![[1.0]])
            .into_dataset(LabelSource::Labels)
            .unwrap_err();
        assert!(matches!(
            err,
            BundleError::Kernel(KernelError::NotSquare { rows: 1, cols: 3 })
        ));

        let err = bundle(array![[1.0, 0.0], [0.0, 1.0]], array![[1.0], [-1.0], [1.0]])
            .into_dataset(LabelSource::Labels)
            .unwrap_err();
        assert_eq!(err, BundleError::ShapeMismatch { kernel: 2, labels: 3 });

        let err = bundle(array![[1.0, 0.0], [0.0, 1.0]], array![[1.0], [2.0]])
            .into_dataset(LabelSource::Labels)
            .unwrap_err();
        assert_eq!(
            err,
            BundleError::InvalidLabel {
                row: 1,
                col: 0,
                value: 2.0
            }
        );

        // tiny asymmetries and negative entries pass
        let dataset = bundle(
            array![[1.0, -0.5], [-0.5 + 1e-9, 1.0]],
            array![[1.0], [-1.0]],
        )
        .into_dataset(LabelSource::Labels)
        .unwrap();
        assert_eq!(dataset.nsamples(), 2);
    }

    #[test]
    fn mismatched_correlation_is_ignored() {
        let bundle = DataBundle {
            kernel: Some(array![[1.0, 0.2], [0.2, 1.0]]),
            labels: Some(array![[1.0, -1.0], [-1.0, 1.0]]),
            correlation: Some(ndarray::Array2::eye(3)),
            ..Default::default()
        };

        let dataset = bundle.into_dataset(LabelSource::Labels).unwrap();
        assert_eq!(dataset.ntargets(), 2);
        assert_eq!(dataset.targets(), &array![[true, false], [false, true]]);
    }
}
