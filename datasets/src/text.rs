//! Delimited numeric text matrices
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use flate2::read::GzDecoder;
use ndarray::Array2;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("malformed text: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}, column {col}: cannot parse {value:?} as a number")]
    Parse {
        row: usize,
        col: usize,
        value: String,
    },
    #[error("row {row} has {found} columns, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("no numeric rows found")]
    Empty,
    #[error("cannot open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Layout of a text matrix
///
/// Runs of the delimiter collapse into one separator, so both aligned and
/// single-spaced files are accepted. Lines starting with the comment byte are
/// skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextFormat {
    pub delimiter: u8,
    pub comment: Option<u8>,
}

impl Default for TextFormat {
    fn default() -> Self {
        TextFormat {
            delimiter: b' ',
            comment: Some(b'#'),
        }
    }
}

impl TextFormat {
    pub fn tab() -> Self {
        TextFormat {
            delimiter: b'\t',
            ..Default::default()
        }
    }

    pub fn comma() -> Self {
        TextFormat {
            delimiter: b',',
            ..Default::default()
        }
    }
}

/// Read a dense matrix of floats
///
/// Rows are numbered from zero, counting only lines which hold numbers. Every
/// row must have as many columns as the first one.
pub fn read_matrix<R: Read>(reader: R, format: &TextFormat) -> Result<Array2<f64>, ReadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .delimiter(format.delimiter)
        .comment(format.comment)
        .from_reader(reader);

    let mut values = Vec::new();
    let mut ncols = None;
    let mut nrows = 0;

    for record in reader.records() {
        let record = record?;
        let row = nrows;
        let start = values.len();

        for (col, field) in record.iter().filter(|x| !x.is_empty()).enumerate() {
            let value = field.parse::<f64>().map_err(|_| ReadError::Parse {
                row,
                col,
                value: field.to_string(),
            })?;
            values.push(value);
        }

        let found = values.len() - start;
        // whitespace only
        if found == 0 {
            continue;
        }

        match ncols {
            None => ncols = Some(found),
            Some(expected) if expected != found => {
                return Err(ReadError::Ragged {
                    row,
                    expected,
                    found,
                })
            }
            _ => {}
        }
        nrows += 1;
    }

    let ncols = ncols.ok_or(ReadError::Empty)?;

    // the length is rows times columns by construction
    Array2::from_shape_vec((nrows, ncols), values).map_err(|_| ReadError::Empty)
}

/// Read a matrix from a file, gunzipping paths which end in `.gz`
pub fn read_matrix_file<P: AsRef<Path>>(
    path: P,
    format: &TextFormat,
) -> Result<Array2<f64>, ReadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if path.extension().map_or(false, |ext| ext == "gz") {
        read_matrix(GzDecoder::new(file), format)
    } else {
        read_matrix(file, format)
    }
}
