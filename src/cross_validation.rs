//! Cross-validated prediction and evaluation
//!
//! The evaluator trains one classifier per target column and fold. For every fold the records
//! are restricted to the training samples, in the case of a precomputed kernel to the block
//! `K[train, train]`, and the held-out samples are predicted from the cross block
//! `K[validation, train]`. The fold predictions are scattered back into the original sample order,
//! so that every sample is predicted exactly once by a model that never saw it.
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2};
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::composing::MultiTargetModel;
use crate::dataset::{
    active_count_strata, DatasetBase, Fold, SelectSamples, StratifiedKFold,
};
use crate::error::{Error, Result};
use crate::metrics_classification::{column_confusion_matrices, BinaryConfusionMatrix};
use crate::param_guard::ParamGuard;
use crate::traits::{Fit, PredictInplace};

/// Out-of-fold predictions of a cross-validation run
#[derive(Debug, Clone, PartialEq)]
pub struct CrossValPrediction {
    /// Predicted activity with shape (nsamples, ntargets)
    pub predictions: Array2<bool>,
    /// Index of the fold which validated each sample
    pub fold_of_sample: Array1<usize>,
}

/// Predict every sample with models trained on the other folds
///
/// For each fold and target column a model is fitted on the training records and the training
/// labels of this column. The column models of a fold are combined into a multi-target model,
/// which predicts the cross records of the validation samples.
///
/// # Errors
///
/// * `Error::InvalidFolds` if the validation sets don't partition the samples
/// * any error raised by fitting a column model
pub fn cross_val_predict<R, P, E>(
    dataset: &DatasetBase<R, Array2<bool>>,
    folds: &[Fold],
    params: &P,
) -> std::result::Result<CrossValPrediction, E>
where
    R: SelectSamples,
    P: Fit<R::Train, Array1<bool>, E>,
    P::Object: PredictInplace<R::Cross, Array1<bool>> + 'static,
    E: std::error::Error + From<Error>,
{
    let records = dataset.records();
    let targets = dataset.targets();
    let (nsamples, ntargets) = targets.dim();

    if records.nsamples() != nsamples {
        return Err(Error::MismatchedShapes(format!(
            "{} records for {} target rows",
            records.nsamples(),
            nsamples
        ))
        .into());
    }
    Fold::check_partition(folds, nsamples)?;

    let mut predictions = Array2::from_elem((nsamples, ntargets), false);
    let mut fold_of_sample = Array1::zeros(nsamples);

    for (k, fold) in folds.iter().enumerate() {
        info!(
            fold = k + 1,
            nfolds = folds.len(),
            train = fold.train.len(),
            validation = fold.validation.len(),
            "fitting fold"
        );

        let train_targets = targets.select(Axis(0), &fold.train);
        let mut train = DatasetBase::new(
            records.select_train(&fold.train),
            Array1::from_elem(0, false),
        );

        let mut models = Vec::with_capacity(ntargets);
        for column in train_targets.columns() {
            train = train.with_targets(column.to_owned());
            models.push(params.fit(&train)?);
        }
        let model = models.into_iter().collect::<MultiTargetModel<R::Cross, bool>>();

        let cross = records.select_cross(&fold.validation, &fold.train);
        let mut fold_prediction = model.default_target(&cross);
        model.predict_inplace(&cross, &mut fold_prediction);

        for (row, &idx) in fold_prediction.rows().into_iter().zip(fold.validation.iter()) {
            predictions.row_mut(idx).assign(&row);
            fold_of_sample[idx] = k;
        }

        debug!(fold = k + 1, "predicted validation samples");
    }

    Ok(CrossValPrediction {
        predictions,
        fold_of_sample,
    })
}

/// Per-target scores of a cross-validated prediction
///
/// Every metric array has one entry per target column, computed on the aggregated out-of-fold
/// predictions of all samples.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct CrossValReport {
    pub confusion: Vec<BinaryConfusionMatrix>,
    pub accuracy: Array1<f32>,
    pub f1: Array1<f32>,
    pub precision: Array1<f32>,
    pub recall: Array1<f32>,
    pub mcc: Array1<f32>,
}

impl CrossValReport {
    /// Score the predictions against the ground truth, column by column
    pub fn from_predictions<S: Data<Elem = bool>, T: Data<Elem = bool>>(
        prediction: &ArrayBase<S, Ix2>,
        ground_truth: &ArrayBase<T, Ix2>,
    ) -> Result<CrossValReport> {
        let confusion = column_confusion_matrices(prediction, ground_truth)?;
        let score = |f: fn(&BinaryConfusionMatrix) -> f32| -> Array1<f32> {
            confusion.iter().map(f).collect()
        };

        Ok(CrossValReport {
            accuracy: score(BinaryConfusionMatrix::accuracy),
            f1: score(BinaryConfusionMatrix::f1_score),
            precision: score(BinaryConfusionMatrix::precision),
            recall: score(BinaryConfusionMatrix::recall),
            mcc: score(BinaryConfusionMatrix::mcc),
            confusion,
        })
    }

    /// Number of target columns
    pub fn ntargets(&self) -> usize {
        self.confusion.len()
    }

    /// Number of positive samples per target column
    pub fn positives(&self) -> Array1<usize> {
        self.confusion.iter().map(|cm| cm.positives()).collect()
    }

    /// Mean and population standard deviation of a per-target metric
    pub fn mean_std(metric: &Array1<f32>) -> (f32, f32) {
        match metric.mean() {
            Some(mean) => (mean, metric.std(0.0)),
            None => (0.0, 0.0),
        }
    }
}

/// Checked parameters of the cross-validation evaluator
#[derive(Debug, Clone, PartialEq)]
pub struct CrossValidationValidParams {
    n_splits: usize,
    n_bins: usize,
    shuffle: bool,
    seed: u64,
}

/// Cross-validation evaluator
///
/// Samples are stratified by their number of active labels, bucketed into `n_bins` bins, and
/// split into `n_splits` folds.
///
/// ```ignore
/// let outcome = CrossValidation::params()
///     .n_splits(5)
///     .seed(42)
///     .evaluate(&dataset, &Svm::params().c(10.0))?;
///
/// println!("{:?}", CrossValReport::mean_std(&outcome.report.f1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CrossValidationParams(CrossValidationValidParams);

/// Everything produced by an evaluation run
#[derive(Debug, Clone, PartialEq)]
pub struct CrossValOutcome {
    pub folds: Vec<Fold>,
    pub prediction: CrossValPrediction,
    pub report: CrossValReport,
}

pub struct CrossValidation;

impl CrossValidation {
    /// Default parameters: five folds, ten stratification bins, shuffled with seed zero
    pub fn params() -> CrossValidationParams {
        CrossValidationParams(CrossValidationValidParams {
            n_splits: 5,
            n_bins: 10,
            shuffle: true,
            seed: 0,
        })
    }
}

impl Default for CrossValidationParams {
    fn default() -> Self {
        CrossValidation::params()
    }
}

impl CrossValidationParams {
    /// Set the number of folds
    pub fn n_splits(mut self, n_splits: usize) -> Self {
        self.0.n_splits = n_splits;
        self
    }

    /// Set the number of stratification bins
    pub fn n_bins(mut self, n_bins: usize) -> Self {
        self.0.n_bins = n_bins;
        self
    }

    /// Shuffle samples inside their stratum before splitting
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.0.shuffle = shuffle;
        self
    }

    /// Seed of the fold assignment
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }

    /// Check the parameters and run the evaluation
    pub fn evaluate<R, P, E>(
        &self,
        dataset: &DatasetBase<R, Array2<bool>>,
        params: &P,
    ) -> std::result::Result<CrossValOutcome, E>
    where
        R: SelectSamples,
        P: Fit<R::Train, Array1<bool>, E>,
        P::Object: PredictInplace<R::Cross, Array1<bool>> + 'static,
        E: std::error::Error + From<Error>,
    {
        self.check_ref()?.evaluate(dataset, params)
    }
}

impl CrossValidationValidParams {
    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Split the samples into stratified folds
    pub fn folds<S: Data<Elem = bool>>(&self, targets: &ArrayBase<S, Ix2>) -> Result<Vec<Fold>> {
        let strata = active_count_strata(targets, self.n_bins)?;

        StratifiedKFold::params()
            .n_splits(self.n_splits)
            .shuffle(self.shuffle)
            .seed(self.seed)
            .split(&strata)
    }

    /// Stratify, split, predict out-of-fold and score the predictions
    pub fn evaluate<R, P, E>(
        &self,
        dataset: &DatasetBase<R, Array2<bool>>,
        params: &P,
    ) -> std::result::Result<CrossValOutcome, E>
    where
        R: SelectSamples,
        P: Fit<R::Train, Array1<bool>, E>,
        P::Object: PredictInplace<R::Cross, Array1<bool>> + 'static,
        E: std::error::Error + From<Error>,
    {
        let folds = self.folds(dataset.targets())?;
        let prediction = cross_val_predict(dataset, &folds, params)?;
        let report = CrossValReport::from_predictions(&prediction.predictions, dataset.targets())?;

        Ok(CrossValOutcome {
            folds,
            prediction,
            report,
        })
    }
}

impl ParamGuard for CrossValidationParams {
    type Checked = CrossValidationValidParams;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.n_splits < 2 {
            Err(Error::Parameters(format!(
                "number of folds should be at least two, got {}",
                self.0.n_splits
            )))
        } else if self.0.n_bins == 0 {
            Err(Error::Parameters(
                "number of stratification bins should be positive".to_string(),
            ))
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
