//! Merge models with single target to multi-target models
//!
//! Most classifiers, the support vector machine among them, only predict a single target
//! variable. Activity against a panel of cell lines is a multi-target problem, this wrapper
//! combines one model per target column into a model predicting the whole panel.
use crate::dataset::Records;
use crate::traits::PredictInplace;
use ndarray::{Array1, Array2};
use std::iter::FromIterator;

/// Merge models with single target to multi-target models
///
/// The i-th model predicts the i-th target column. The models are boxed, this allows a mixture
/// of different single-target models in the same wrapper.
pub struct MultiTargetModel<R: Records, L> {
    models: Vec<Box<dyn PredictInplace<R, Array1<L>>>>,
}

impl<R: Records, L> MultiTargetModel<R, L> {
    /// Create a wrapper model from a list of single-target models
    ///
    /// If you want to use the same model type for all predictions, use the `FromIterator`
    /// implementation instead.
    pub fn new(models: Vec<Box<dyn PredictInplace<R, Array1<L>>>>) -> Self {
        MultiTargetModel { models }
    }

    /// Number of target columns this model predicts
    pub fn ntargets(&self) -> usize {
        self.models.len()
    }
}

impl<R: Records, L: Default + Clone> PredictInplace<R, Array2<L>> for MultiTargetModel<R, L> {
    fn predict_inplace(&self, records: &R, targets: &mut Array2<L>) {
        assert_eq!(
            targets.dim(),
            (records.nsamples(), self.models.len()),
            "The number of data points must match the number of output targets."
        );

        for (model, mut column) in self.models.iter().zip(targets.columns_mut()) {
            let mut prediction = model.default_target(records);
            model.predict_inplace(records, &mut prediction);
            column.assign(&prediction);
        }
    }

    fn default_target(&self, records: &R) -> Array2<L> {
        Array2::default((records.nsamples(), self.models.len()))
    }
}

impl<R: Records, L, P: PredictInplace<R, Array1<L>> + 'static> FromIterator<P>
    for MultiTargetModel<R, L>
{
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let models = iter
            .into_iter()
            .map(|x| Box::new(x) as Box<dyn PredictInplace<R, Array1<L>>>)
            .collect();

        MultiTargetModel { models }
    }
}
