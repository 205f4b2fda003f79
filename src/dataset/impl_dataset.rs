use super::{AsTargets, DatasetBase, Records};
use ndarray::{Array1, Array2, Axis};

/// Implementation without constraints on records and targets
///
/// This implementation block provides a method for the creation of datasets
/// from records and targets, as well as some accessor methods.
impl<R: Records, T> DatasetBase<R, T> {
    /// Create a new dataset from records and targets
    ///
    /// # Example
    ///
    /// ```ignore
    /// let dataset = Dataset::new(records, targets);
    /// ```
    pub fn new(records: R, targets: T) -> DatasetBase<R, T> {
        DatasetBase {
            records,
            targets,
            target_names: Vec::new(),
        }
    }

    /// Returns reference to targets
    pub fn targets(&self) -> &T {
        &self.targets
    }

    /// Returns reference to records
    pub fn records(&self) -> &R {
        &self.records
    }

    /// Return the target names, empty if none were assigned
    pub fn target_names(&self) -> &[String] {
        &self.target_names
    }

    /// Updates the target names of a dataset
    pub fn with_target_names<I: Into<String>>(mut self, names: Vec<I>) -> DatasetBase<R, T> {
        self.target_names = names.into_iter().map(|x| x.into()).collect();
        self
    }

    /// Updates the records of a dataset
    pub fn with_records<U: Records>(self, records: U) -> DatasetBase<U, T> {
        DatasetBase {
            records,
            targets: self.targets,
            target_names: self.target_names,
        }
    }

    /// Updates the targets of a dataset
    pub fn with_targets<U>(self, targets: U) -> DatasetBase<R, U> {
        DatasetBase {
            records: self.records,
            targets,
            target_names: self.target_names,
        }
    }

    /// Number of samples in the records
    pub fn nsamples(&self) -> usize {
        self.records.nsamples()
    }

    /// Number of features in the records
    pub fn nfeatures(&self) -> usize {
        self.records.nfeatures()
    }
}

impl<R: Records, L: Clone> DatasetBase<R, Array2<L>> {
    /// Map targets with a function `f`
    ///
    /// # Example
    ///
    /// ```ignore
    /// let dataset = labels.map_targets(|x| *x > 0.0);
    /// ```
    pub fn map_targets<S, G: FnMut(&L) -> S>(self, fnc: G) -> DatasetBase<R, Array2<S>> {
        let DatasetBase {
            records,
            targets,
            target_names,
        } = self;

        DatasetBase {
            records,
            targets: targets.map(fnc),
            target_names,
        }
    }
}

impl<R: Records, T: AsTargets> DatasetBase<R, T> {
    /// Number of target columns
    pub fn ntargets(&self) -> usize {
        self.targets.as_multi_targets().len_of(Axis(1))
    }

    /// Copy a single target column out of the targets
    ///
    /// # Panics
    ///
    /// If `idx` is not smaller than the number of targets
    pub fn target_column(&self, idx: usize) -> Array1<T::Elem>
    where
        T::Elem: Clone,
    {
        self.targets.as_multi_targets().column(idx).to_owned()
    }
}
