//! Load, validate, cross-validate and report
use std::io::Write;

use anyhow::{Context, Result};
use kernfold::prelude::*;
use kernfold_datasets::DataBundle;
use kernfold_kernel::{CosineNormalization, PrecomputedKernel};
use kernfold_svm::{Svm, SvmError};
use ndarray::Array2;
use tracing::info;

use crate::args::Args;
use crate::report::Summary;

/// Read the data directory and build the multi-target dataset
///
/// Every file which failed to load is reported on its own line of `out`, also when the dataset
/// can be built without it.
pub fn load_dataset<W: Write>(
    args: &Args,
    out: &mut W,
) -> Result<DatasetBase<PrecomputedKernel<f64>, Array2<bool>>> {
    let bundle = DataBundle::load(&args.data_dir, &args.files(), &args.delimiter.format());
    for failure in bundle.failures() {
        writeln!(out, "{}", failure)?;
    }

    let dataset = bundle
        .into_dataset(args.label_source())
        .with_context(|| format!("invalid data in {}", args.data_dir.display()))?;

    if args.normalize {
        Ok(CosineNormalization.transform(dataset))
    } else {
        Ok(dataset)
    }
}

/// Cross-validate one SVM per target and summarize the out-of-fold predictions
pub fn evaluate(
    args: &Args,
    dataset: &DatasetBase<PrecomputedKernel<f64>, Array2<bool>>,
) -> Result<Summary> {
    let (c_pos, c_neg) = args.penalties();
    let svm = Svm::<f64, bool>::params()
        .pos_neg_weights(c_pos, c_neg)
        .eps(args.eps)
        .shrinking(args.shrinking);

    info!(
        samples = dataset.nsamples(),
        targets = dataset.ntargets(),
        folds = args.folds,
        c_pos,
        c_neg,
        "cross-validating"
    );

    let outcome = CrossValidation::params()
        .n_splits(args.folds)
        .n_bins(args.bins)
        .shuffle(!args.no_shuffle)
        .seed(args.seed)
        .evaluate::<_, _, SvmError>(dataset, &svm)
        .context("cross-validation failed")?;

    Ok(Summary::new(
        &outcome.report,
        dataset.target_names(),
        dataset.nsamples(),
        outcome.folds.len(),
    ))
}

/// Run the whole evaluation and write the summary to `out`
///
/// Load failures precede the text summary on `out`. With `--json` they go to `diagnostics`
/// instead, so `out` holds a single JSON document.
pub fn run<W: Write, D: Write>(args: &Args, out: &mut W, diagnostics: &mut D) -> Result<()> {
    if args.json {
        let dataset = load_dataset(args, diagnostics)?;
        evaluate(args, &dataset)?.write_json(out)?;
    } else {
        let dataset = load_dataset(args, out)?;
        evaluate(args, &dataset)?.write_text(out, args.per_target)?;
    }

    Ok(())
}
