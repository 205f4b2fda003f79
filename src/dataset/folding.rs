//! Stratified k-fold splitting
//!
use std::collections::BTreeMap;

use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};
use tracing::warn;

use crate::error::{Error, Result};
use crate::param_guard::ParamGuard;

/// A single train/validation split of the sample indices
///
/// Both index lists are sorted in ascending order and together cover every sample exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
}

impl Fold {
    /// Check that the validation sets of `folds` partition `0..nsamples`
    ///
    /// Every sample has to be validated exactly once and the training set of each fold has to
    /// be the complement of its validation set.
    pub fn check_partition(folds: &[Fold], nsamples: usize) -> Result<()> {
        let mut seen = vec![0usize; nsamples];

        for (k, fold) in folds.iter().enumerate() {
            let mut member = vec![false; nsamples];
            for &idx in &fold.validation {
                if idx >= nsamples {
                    return Err(Error::InvalidFolds(format!(
                        "fold {} validates sample {} of {}",
                        k, idx, nsamples
                    )));
                }
                seen[idx] += 1;
                member[idx] = true;
            }

            for &idx in &fold.train {
                if idx >= nsamples || member[idx] {
                    return Err(Error::InvalidFolds(format!(
                        "fold {} trains on sample {} which is not in its complement",
                        k, idx
                    )));
                }
                member[idx] = true;
            }

            if fold.train.len() + fold.validation.len() != nsamples
                || member.iter().any(|x| !x)
            {
                return Err(Error::InvalidFolds(format!(
                    "fold {} does not cover all {} samples",
                    k, nsamples
                )));
            }
        }

        match seen.iter().position(|x| *x != 1) {
            Some(idx) => Err(Error::InvalidFolds(format!(
                "sample {} is validated {} times",
                idx, seen[idx]
            ))),
            None => Ok(()),
        }
    }
}

/// Checked parameters of a stratified k-fold split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StratifiedKFoldValidParams {
    n_splits: usize,
    shuffle: bool,
    seed: u64,
}

/// Parameters of a stratified k-fold split
///
/// Samples are grouped by their stratum, optionally shuffled inside the group and then dealt to
/// the folds one after another. Every fold therefore receives the same share of each stratum, up
/// to a difference of one sample.
///
/// ```
/// use kernfold::dataset::StratifiedKFold;
///
/// let folds = StratifiedKFold::params()
///     .n_splits(2)
///     .shuffle(false)
///     .split(&[0, 0, 1, 1])
///     .unwrap();
///
/// assert_eq!(folds[0].validation, vec![0, 2]);
/// assert_eq!(folds[1].validation, vec![1, 3]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StratifiedKFoldParams(StratifiedKFoldValidParams);

/// Stratified k-fold cross-validation splitter
pub struct StratifiedKFold;

impl StratifiedKFold {
    /// Default parameters: five splits, shuffling with seed zero
    pub fn params() -> StratifiedKFoldParams {
        StratifiedKFoldParams(StratifiedKFoldValidParams {
            n_splits: 5,
            shuffle: true,
            seed: 0,
        })
    }
}

impl StratifiedKFoldParams {
    /// Set the number of folds
    pub fn n_splits(mut self, n_splits: usize) -> Self {
        self.0.n_splits = n_splits;
        self
    }

    /// Shuffle samples inside every stratum before dealing them to folds
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.0.shuffle = shuffle;
        self
    }

    /// Seed of the shuffling random number generator
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }

    /// Check the parameters and split the samples
    pub fn split(&self, strata: &[usize]) -> Result<Vec<Fold>> {
        self.check_ref()?.split(strata)
    }
}

impl Default for StratifiedKFoldParams {
    fn default() -> Self {
        StratifiedKFold::params()
    }
}

impl StratifiedKFoldValidParams {
    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Split samples with stratum `strata[i]` for sample `i` into folds
    ///
    /// # Returns
    ///
    /// A vector of `n_splits` folds, or `Error::NotEnoughSamples` if there are fewer samples
    /// than folds.
    pub fn split(&self, strata: &[usize]) -> Result<Vec<Fold>> {
        let nsamples = strata.len();
        if self.n_splits > nsamples {
            return Err(Error::NotEnoughSamples(format!(
                "cannot split {} samples into {} folds",
                nsamples, self.n_splits
            )));
        }

        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (idx, stratum) in strata.iter().enumerate() {
            groups.entry(*stratum).or_default().push(idx);
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut assignment = vec![0; nsamples];
        let mut position = 0;

        for (stratum, members) in groups.iter_mut() {
            if members.len() < self.n_splits {
                warn!(
                    stratum = *stratum,
                    members = members.len(),
                    n_splits = self.n_splits,
                    "stratum has fewer members than folds"
                );
            }

            if self.shuffle {
                members.shuffle(&mut rng);
            }

            for idx in members.iter() {
                assignment[*idx] = position % self.n_splits;
                position += 1;
            }
        }

        Ok((0..self.n_splits)
            .map(|k| {
                let (validation, train): (Vec<usize>, Vec<usize>) =
                    (0..nsamples).partition(|idx| assignment[*idx] == k);

                Fold { train, validation }
            })
            .collect())
    }
}

impl ParamGuard for StratifiedKFoldParams {
    type Checked = StratifiedKFoldValidParams;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.n_splits < 2 {
            Err(Error::Parameters(format!(
                "number of splits should be at least two, got {}",
                self.0.n_splits
            )))
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{Fold, StratifiedKFold};
    use crate::error::Error;
    use crate::param_guard::ParamGuard;

    fn stratum_share(folds: &[Fold], strata: &[usize], stratum: usize) -> Vec<usize> {
        folds
            .iter()
            .map(|fold| {
                fold.validation
                    .iter()
                    .filter(|idx| strata[**idx] == stratum)
                    .count()
            })
            .collect()
    }

    #[test]
    fn folds_partition_the_samples() {
        let strata = (0..103).map(|x| x % 7).collect::<Vec<_>>();
        let folds = StratifiedKFold::params()
            .n_splits(5)
            .seed(42)
            .split(&strata)
            .unwrap();

        assert_eq!(folds.len(), 5);
        Fold::check_partition(&folds, strata.len()).unwrap();

        let mut sizes = folds.iter().map(|f| f.validation.len()).collect::<Vec<_>>();
        sizes.sort_unstable();
        assert!(sizes[4] - sizes[0] <= 1);

        for fold in &folds {
            assert!(fold.train.windows(2).all(|w| w[0] < w[1]));
            assert!(fold.validation.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn strata_are_spread_evenly() {
        let strata = [vec![0; 40], vec![1; 12], vec![2; 3]].concat();
        let folds = StratifiedKFold::params()
            .n_splits(4)
            .seed(1)
            .split(&strata)
            .unwrap();

        assert_eq!(stratum_share(&folds, &strata, 0), vec![10, 10, 10, 10]);
        assert_eq!(stratum_share(&folds, &strata, 1), vec![3, 3, 3, 3]);

        let rare = stratum_share(&folds, &strata, 2);
        assert_eq!(rare.iter().sum::<usize>(), 3);
        assert!(rare.iter().all(|x| *x <= 1));
    }

    #[test]
    fn unshuffled_split_is_round_robin() {
        let folds = StratifiedKFold::params()
            .n_splits(3)
            .shuffle(false)
            .split(&[0, 0, 0, 0, 0, 0])
            .unwrap();

        assert_eq!(folds[0].validation, vec![0, 3]);
        assert_eq!(folds[1].validation, vec![1, 4]);
        assert_eq!(folds[2].validation, vec![2, 5]);
        assert_eq!(folds[0].train, vec![1, 2, 4, 5]);
    }

    #[test]
    fn same_seed_same_folds() {
        let strata = (0..50).map(|x| x % 3).collect::<Vec<_>>();
        let params = StratifiedKFold::params().n_splits(5).seed(7);

        assert_eq!(params.split(&strata).unwrap(), params.split(&strata).unwrap());
    }

    #[test]
    fn rejects_invalid_split_counts() {
        assert!(StratifiedKFold::params().n_splits(1).check().is_err());

        let err = StratifiedKFold::params()
            .n_splits(5)
            .split(&[0, 1, 0])
            .unwrap_err();
        assert!(matches!(err, Error::NotEnoughSamples(_)));
    }

    #[test]
    fn rare_strata_still_partition() {
        // strata 1 and 2 have fewer members than folds
        let strata = [vec![0; 12], vec![1; 2], vec![2]].concat();
        let folds = StratifiedKFold::params()
            .n_splits(5)
            .seed(3)
            .split(&strata)
            .unwrap();

        Fold::check_partition(&folds, strata.len()).unwrap();
        assert!(stratum_share(&folds, &strata, 1).iter().all(|x| *x <= 1));
        assert_eq!(stratum_share(&folds, &strata, 2).iter().sum::<usize>(), 1);
    }

    #[test]
    fn partition_check_detects_overlap() {
        let folds = vec![
            Fold {
                train: vec![2],
                validation: vec![0, 1],
            },
            Fold {
                train: vec![0, 2],
                validation: vec![1],
            },
        ];

        assert!(matches!(
            Fold::check_partition(&folds, 3),
            Err(Error::InvalidFolds(_))
        ));
    }
}
