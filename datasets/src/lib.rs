//! `kernfold-datasets` reads the input matrices of a kernel cross-validation run.
//!
//! ## The Big Picture
//!
//! A data directory holds up to four whitespace-delimited numeric text files, each optionally
//! gzipped:
//!
//! * a square kernel matrix with the similarities between all samples
//! * a label matrix of `+1`/`-1` entries with one column per target
//! * an activity matrix of raw scores, which can be thresholded into labels instead
//! * a correlation matrix between the targets
//!
//! [`DataBundle::load`] reads whatever is available and records the files which failed, then
//! [`DataBundle::into_dataset`] validates the kernel against the chosen labels:
//! ```ignore
//! let bundle = DataBundle::load("data", &DataFiles::default(), &TextFormat::default());
//! for failure in bundle.failures() {
//!     println!("{}", failure);
//! }
//! let dataset = bundle.into_dataset(LabelSource::Labels)?;
//! ```
//!
//! With the `generate` feature enabled, [`generate`] builds synthetic kernel datasets for tests
//! and benchmarks.

mod bundle;
mod text;

#[cfg(feature = "generate")]
pub mod generate;

pub use bundle::{BundleError, DataBundle, DataFiles, FileRole, LabelSource, LoadFailure};
pub use text::{read_matrix, read_matrix_file, ReadError, TextFormat};
