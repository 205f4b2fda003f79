//! Text and JSON summaries of a cross-validation report
use std::io::{self, Write};

use kernfold::{cross_validation::CrossValReport, metrics::BinaryConfusionMatrix};
use ndarray::Array1;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Score {
    pub mean: f32,
    pub std: f32,
}

impl Score {
    fn of(metric: &Array1<f32>) -> Score {
        let (mean, std) = CrossValReport::mean_std(metric);
        Score { mean, std }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetScore {
    pub name: String,
    pub positives: usize,
    pub accuracy: f32,
    pub f1: f32,
    pub precision: f32,
    pub recall: f32,
    pub mcc: f32,
    pub confusion: BinaryConfusionMatrix,
}

/// Summary over all targets of an evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub samples: usize,
    pub targets: usize,
    pub folds: usize,
    pub accuracy: Score,
    pub f1: Score,
    pub precision: Score,
    pub recall: Score,
    pub mcc: Score,
    pub per_target: Vec<TargetScore>,
}

impl Summary {
    pub fn new(report: &CrossValReport, names: &[String], samples: usize, folds: usize) -> Summary {
        let per_target = (0..report.ntargets())
            .map(|i| TargetScore {
                name: names
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("target_{}", i)),
                positives: report.confusion[i].positives(),
                accuracy: report.accuracy[i],
                f1: report.f1[i],
                precision: report.precision[i],
                recall: report.recall[i],
                mcc: report.mcc[i],
                confusion: report.confusion[i],
            })
            .collect();

        Summary {
            samples,
            targets: report.ntargets(),
            folds,
            accuracy: Score::of(&report.accuracy),
            f1: Score::of(&report.f1),
            precision: Score::of(&report.precision),
            recall: Score::of(&report.recall),
            mcc: Score::of(&report.mcc),
            per_target,
        }
    }

    pub fn write_text<W: Write>(&self, out: &mut W, per_target: bool) -> io::Result<()> {
        writeln!(
            out,
            "samples: {}, targets: {}, folds: {}",
            self.samples, self.targets, self.folds
        )?;

        let rows = [
            ("accuracy", self.accuracy),
            ("F1", self.f1),
            ("precision", self.precision),
            ("recall", self.recall),
            ("MCC", self.mcc),
        ];
        for (name, score) in rows.iter() {
            writeln!(out, "{:<10} {:.4} ± {:.4}", name, score.mean, score.std)?;
        }

        if per_target {
            writeln!(out)?;
            writeln!(
                out,
                "{:<16} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
                "target", "positives", "accuracy", "F1", "precision", "recall", "MCC"
            )?;
            for target in &self.per_target {
                writeln!(
                    out,
                    "{:<16} {:>9} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>9.4}",
                    target.name,
                    target.positives,
                    target.accuracy,
                    target.f1,
                    target.precision,
                    target.recall,
                    target.mcc
                )?;
            }
        }

        Ok(())
    }

    pub fn write_json<W: Write>(&self, out: &mut W) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out).map_err(serde_json::Error::io)
    }
}

#[cfg(test)]
mod tests {
    use super::Summary;
    use kernfold::cross_validation::CrossValReport;
    use ndarray::array;

    fn example() -> Summary {
        let prediction = array![[true, false], [true, true], [false, false], [false, true]];
        let truth = array![[true, false], [false, true], [false, true], [false, true]];
        let report = CrossValReport::from_predictions(&prediction, &truth).unwrap();

        Summary::new(&report, &["first".to_string()], 4, 2)
    }

    #[test]
    fn aggregates_targets() {
        let summary = example();

        assert_eq!(summary.targets, 2);
        // accuracies 0.75 and 0.75
        assert_eq!(summary.accuracy.mean, 0.75);
        assert_eq!(summary.accuracy.std, 0.0);
        assert_eq!(summary.per_target[0].name, "first");
        assert_eq!(summary.per_target[1].name, "target_1");
        assert_eq!(summary.per_target[1].positives, 3);
    }

    #[test]
    fn text_layout() {
        let mut out = Vec::new();
        example().write_text(&mut out, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines = text.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], "samples: 4, targets: 2, folds: 2");
        assert_eq!(lines[1], "accuracy   0.7500 ± 0.0000");
        assert!(lines[2].starts_with("F1 "));
        assert!(lines[7].starts_with("target "));
        assert!(lines[8].starts_with("first "));
        assert_eq!(lines.len(), 10);

        let mut out = Vec::new();
        example().write_text(&mut out, false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 6);
    }

    #[test]
    fn json_layout() {
        let mut out = Vec::new();
        example().write_json(&mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["samples"], 4);
        assert_eq!(value["per_target"].as_array().unwrap().len(), 2);
        assert_eq!(value["per_target"][0]["confusion"]["tp"], 1);
    }
}
