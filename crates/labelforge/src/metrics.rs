//! Binary confusion matrix and the metrics the search is scored with.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LabelModelError, Result};
use crate::labels::Label;

/// Counts of (actual, predicted) pairs over {POSITIVE, NEGATIVE}.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(actual: &[Label], predicted: &[Label]) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(LabelModelError::Precondition(format!(
                "actual length {} != predicted length {}",
                actual.len(),
                predicted.len()
            )));
        }
        let mut matrix = ConfusionMatrix::new();
        for (&a, &p) in actual.iter().zip(predicted.iter()) {
            matrix.add(a, p)?;
        }
        Ok(matrix)
    }

    pub fn add(&mut self, actual: Label, predicted: Label) -> Result<()> {
        if actual.is_abstain() || predicted.is_abstain() {
            return Err(LabelModelError::Precondition(format!(
                "confusion matrix only accepts POSITIVE/NEGATIVE (got actual={}, predicted={})",
                actual, predicted
            )));
        }
        self.add_binary(actual.is_positive(), predicted.is_positive());
        Ok(())
    }

    #[inline]
    pub(crate) fn add_binary(&mut self, actual: bool, predicted: bool) {
        match (actual, predicted) {
            (true, true) => self.true_positives += 1,
            (false, true) => self.false_positives += 1,
            (false, false) => self.true_negatives += 1,
            (true, false) => self.false_negatives += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    /// Matthews correlation coefficient, 0 when the denominator vanishes.
    pub fn mcc(&self) -> f64 {
        let tp = self.true_positives as f64;
        let fp = self.false_positives as f64;
        let tn = self.true_negatives as f64;
        let fn_ = self.false_negatives as f64;

        let denominator = ((tp + fp) * (tp + fn_) * (tn + fp) * (tn + fn_)).sqrt();
        if denominator == 0.0 {
            return 0.0;
        }
        (tp * tn - fp * fn_) / denominator
    }

    /// F1 score. NaN when there is neither a positive prediction nor a
    /// positive instance.
    pub fn f1(&self) -> f64 {
        let tp = self.true_positives as f64;
        let denominator = 2.0 * tp + self.false_positives as f64 + self.false_negatives as f64;
        if denominator == 0.0 {
            return f64::NAN;
        }
        2.0 * tp / denominator
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        f64::NAN
    } else {
        num as f64 / den as f64
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tp={} fp={} tn={} fn={} mcc={:.4} f1={:.4}",
            self.true_positives,
            self.false_positives,
            self.true_negatives,
            self.false_negatives,
            self.mcc(),
            self.f1()
        )
    }
}

/// Scoring strategy a model is built with and applies everywhere.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    Mcc,
    F1,
}

impl Metric {
    pub fn score(self, matrix: &ConfusionMatrix) -> f64 {
        match self {
            Metric::Mcc => matrix.mcc(),
            Metric::F1 => matrix.f1(),
        }
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mcc" => Ok(Metric::Mcc),
            "f1" => Ok(Metric::F1),
            _ => Err(format!("Unknown metric: {}. Expected one of: mcc, f1", s)),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Mcc => f.write_str("MCC"),
            Metric::F1 => f.write_str("F1"),
        }
    }
}
