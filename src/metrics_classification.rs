//! Common metrics for performance evaluation of binary classifiers
//!
//! Scoring is essential for classification tasks. This module implements a binary confusion
//! matrix and the scores derived from it: accuracy, precision, recall, f1-score and the Matthews
//! correlation coefficient.
use std::fmt;

use ndarray::prelude::*;
use ndarray::Data;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Divide, but return zero for an empty denominator
fn ratio(num: usize, denom: usize) -> f32 {
    if denom == 0 {
        0.0
    } else {
        num as f32 / denom as f32
    }
}

/// Confusion matrix for binary evaluation
///
/// The positive class corresponds to an active molecule. Undefined scores, for example the
/// precision of a classifier that never predicts the positive class, are reported as zero.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinaryConfusionMatrix {
    pub tp: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tn: usize,
}

impl BinaryConfusionMatrix {
    /// Total number of evaluated samples
    pub fn total(&self) -> usize {
        self.tp + self.fp + self.fn_ + self.tn
    }

    /// Number of positive samples in the ground truth
    pub fn positives(&self) -> usize {
        self.tp + self.fn_
    }

    /// Fraction of correct predictions
    pub fn accuracy(&self) -> f32 {
        ratio(self.tp + self.tn, self.total())
    }

    /// Fraction of positive predictions which are correct
    pub fn precision(&self) -> f32 {
        ratio(self.tp, self.tp + self.fp)
    }

    /// Fraction of positive samples which are predicted positive
    pub fn recall(&self) -> f32 {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// Return the beta score
    pub fn f_score(&self, beta: f32) -> f32 {
        let sb = beta * beta;
        let (p, r) = (self.precision(), self.recall());

        if p + r == 0.0 {
            0.0
        } else {
            (1.0 + sb) * (p * r) / (sb * p + r)
        }
    }

    /// Return the beta=1 score
    pub fn f1_score(&self) -> f32 {
        self.f_score(1.0)
    }

    /// Return the Matthew Correlation Coefficient
    ///
    /// Estimates the normalized cross-correlation between target and predicted variable. Zero
    /// if a row or column of the matrix is empty.
    pub fn mcc(&self) -> f32 {
        let (tp, fp, fn_, tn) = (
            self.tp as f32,
            self.fp as f32,
            self.fn_ as f32,
            self.tn as f32,
        );
        let denom = ((tp + fp) * (tp + fn_) * (tn + fp) * (tn + fn_)).sqrt();

        if denom == 0.0 {
            0.0
        } else {
            (tp * tn - fp * fn_) / denom
        }
    }
}

impl std::ops::Add for BinaryConfusionMatrix {
    type Output = BinaryConfusionMatrix;

    fn add(self, other: BinaryConfusionMatrix) -> BinaryConfusionMatrix {
        BinaryConfusionMatrix {
            tp: self.tp + other.tp,
            fp: self.fp + other.fp,
            fn_: self.fn_ + other.fn_,
            tn: self.tn + other.tn,
        }
    }
}

/// Print a confusion matrix
impl fmt::Display for BinaryConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{:<10} | {:<10} | {:<10}", "classes", "active", "inactive")?;
        writeln!(f, "{:<10} | {:<10} | {:<10}", "active", self.tp, self.fn_)?;
        write!(f, "{:<10} | {:<10} | {:<10}", "inactive", self.fp, self.tn)
    }
}

/// Create a confusion matrix from a prediction and the ground truth
pub trait ToConfusionMatrix<T> {
    fn confusion_matrix(&self, ground_truth: T) -> Result<BinaryConfusionMatrix>;
}

impl<S: Data<Elem = bool>, T: Data<Elem = bool>> ToConfusionMatrix<&ArrayBase<T, Ix1>>
    for ArrayBase<S, Ix1>
{
    fn confusion_matrix(&self, ground_truth: &ArrayBase<T, Ix1>) -> Result<BinaryConfusionMatrix> {
        if self.len() != ground_truth.len() {
            return Err(Error::MismatchedShapes(format!(
                "{} predictions for {} ground truth labels",
                self.len(),
                ground_truth.len()
            )));
        }

        let mut cm = BinaryConfusionMatrix::default();
        for (pred, truth) in self.iter().zip(ground_truth.iter()) {
            match (*pred, *truth) {
                (true, true) => cm.tp += 1,
                (true, false) => cm.fp += 1,
                (false, true) => cm.fn_ += 1,
                (false, false) => cm.tn += 1,
            }
        }

        Ok(cm)
    }
}

/// Column-wise confusion matrices of a multi-target prediction
pub fn column_confusion_matrices<S: Data<Elem = bool>, T: Data<Elem = bool>>(
    prediction: &ArrayBase<S, Ix2>,
    ground_truth: &ArrayBase<T, Ix2>,
) -> Result<Vec<BinaryConfusionMatrix>> {
    if prediction.dim() != ground_truth.dim() {
        return Err(Error::MismatchedShapes(format!(
            "prediction of shape {:?} for ground truth of shape {:?}",
            prediction.dim(),
            ground_truth.dim()
        )));
    }

    prediction
        .columns()
        .into_iter()
        .zip(ground_truth.columns())
        .map(|(pred, truth)| pred.confusion_matrix(&truth))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{column_confusion_matrices, BinaryConfusionMatrix, ToConfusionMatrix};
    use crate::error::Error;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, ArrayView1};

    #[test]
    fn test_confusion_matrix() {
        let predicted = ArrayView1::from(&[true, true, false, true, false, false]);
        let ground_truth = ArrayView1::from(&[true, false, false, true, true, false]);

        let cm = predicted.confusion_matrix(&ground_truth).unwrap();

        assert_eq!(
            cm,
            BinaryConfusionMatrix {
                tp: 2,
                fp: 1,
                fn_: 1,
                tn: 2
            }
        );
        assert_eq!(cm.total(), 6);
        assert_eq!(cm.positives(), 3);
    }

    #[test]
    fn test_cm_metrices() {
        let predicted = array![true, true, false, true, false, false, true];
        let ground_truth = array![true, false, false, true, true, false, true];

        let cm = predicted.confusion_matrix(&ground_truth).unwrap();

        assert_abs_diff_eq!(cm.accuracy(), 5.0 / 7.0);
        assert_abs_diff_eq!(cm.precision(), 3.0 / 4.0);
        assert_abs_diff_eq!(cm.recall(), 3.0 / 4.0);
        assert_abs_diff_eq!(cm.f1_score(), 3.0 / 4.0);
        assert_abs_diff_eq!(cm.mcc(), (3. * 2. - 1. * 1.) / (4.0f32 * 4. * 3. * 3.).sqrt());
    }

    #[test]
    fn undefined_scores_are_zero() {
        let predicted = array![false, false, false];
        let ground_truth = array![false, false, false];

        let cm = predicted.confusion_matrix(&ground_truth).unwrap();
        assert_abs_diff_eq!(cm.accuracy(), 1.0);
        assert_abs_diff_eq!(cm.precision(), 0.0);
        assert_abs_diff_eq!(cm.recall(), 0.0);
        assert_abs_diff_eq!(cm.f1_score(), 0.0);
        assert_abs_diff_eq!(cm.mcc(), 0.0);

        assert_eq!(BinaryConfusionMatrix::default().accuracy(), 0.0);
    }

    #[test]
    fn rejects_length_mismatch() {
        let predicted = array![true, false];
        let ground_truth = array![true];

        assert!(matches!(
            predicted.confusion_matrix(&ground_truth),
            Err(Error::MismatchedShapes(_))
        ));
    }

    #[test]
    fn one_matrix_per_column() {
        let predicted = array![[true, false], [false, false], [true, true]];
        let ground_truth = array![[true, true], [true, false], [false, true]];

        let cms = column_confusion_matrices(&predicted, &ground_truth).unwrap();
        assert_eq!(cms.len(), 2);
        assert_eq!(cms[0].tp + cms[0].fp + cms[0].fn_ + cms[0].tn, 3);
        assert_eq!((cms[1].tp, cms[1].fn_, cms[1].tn), (1, 1, 1));

        let sum = cms[0] + cms[1];
        assert_eq!(sum.total(), 6);
    }
}
