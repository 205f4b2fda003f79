//! Stratification keys for multi-label targets
//!
//! Molecules differ widely in how many cell lines they are active against. Stratifying the
//! folds on the number of active labels keeps promiscuous and inactive molecules spread evenly
//! over all folds.
use ndarray::{Array1, ArrayBase, Axis, Data, Ix2};

use crate::error::{Error, Result};

/// Count the active (`true`) labels of every sample
pub fn active_counts<S: Data<Elem = bool>>(targets: &ArrayBase<S, Ix2>) -> Array1<usize> {
    targets.map_axis(Axis(1), |row| row.iter().filter(|x| **x).count())
}

/// Bucket the number of active labels per sample into `nbins` equally wide bins
///
/// The bins cover the range `0..=ntargets`, a sample with `c` active labels falls into bin
/// `c * nbins / (ntargets + 1)`. With ten bins every bin spans roughly a tenth of the label
/// columns.
pub fn active_count_strata<S: Data<Elem = bool>>(
    targets: &ArrayBase<S, Ix2>,
    nbins: usize,
) -> Result<Vec<usize>> {
    if nbins == 0 {
        return Err(Error::Parameters(
            "number of stratification bins must be at least one".to_string(),
        ));
    }

    let width = targets.ncols() + 1;

    Ok(active_counts(targets)
        .iter()
        .map(|count| count * nbins / width)
        .collect())
}
