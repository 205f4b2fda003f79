use kernfold::prelude::*;
use kernfold_datasets::generate;
use kernfold_kernel::CosineNormalization;
use kernfold_svm::{Svm, SvmError};
use rand::{rngs::SmallRng, SeedableRng};

#[test]
fn evaluates_svm_per_target() {
    let dataset = generate::kernel_dataset(90, 4, 5, &mut SmallRng::seed_from_u64(11)).unwrap();
    assert_eq!(dataset.nsamples(), 90);

    let outcome = CrossValidation::params()
        .n_splits(5)
        .seed(3)
        .evaluate::<_, _, SvmError>(&dataset, &Svm::<f64, bool>::params().c(10.0))
        .unwrap();

    // every sample is held out exactly once
    let mut held_out = outcome
        .folds
        .iter()
        .flat_map(|fold| fold.validation.iter().copied())
        .collect::<Vec<_>>();
    held_out.sort_unstable();
    assert_eq!(held_out, (0..90).collect::<Vec<_>>());

    for (sample, fold) in outcome.prediction.fold_of_sample.iter().enumerate() {
        assert!(outcome.folds[*fold].validation.contains(&sample));
    }

    let report = &outcome.report;
    assert_eq!(outcome.prediction.predictions.dim(), (90, 4));
    assert_eq!(report.ntargets(), 4);
    assert_eq!(report.accuracy.len(), 4);
    assert_eq!(report.f1.len(), 4);
    assert_eq!(report.positives(), dataset.targets().map_axis(ndarray::Axis(0), |c| c.iter().filter(|x| **x).count()));

    let (accuracy, _) = CrossValReport::mean_std(&report.accuracy);
    assert!(accuracy > 0.6, "mean accuracy {}", accuracy);
}

#[test]
fn seeded_runs_repeat() {
    let dataset = generate::kernel_dataset(40, 2, 3, &mut SmallRng::seed_from_u64(5)).unwrap();
    let dataset = CosineNormalization.transform(dataset);
    let svm = Svm::<f64, bool>::params().shrinking(true);

    let first = CrossValidation::params()
        .n_splits(4)
        .seed(9)
        .evaluate::<_, _, SvmError>(&dataset, &svm)
        .unwrap();
    let second = CrossValidation::params()
        .n_splits(4)
        .seed(9)
        .evaluate::<_, _, SvmError>(&dataset, &svm)
        .unwrap();

    assert_eq!(first, second);
}
