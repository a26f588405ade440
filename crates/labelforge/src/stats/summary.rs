use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dictionary::Dictionary;
use crate::error::{ensure, LabelModelError, Result};
use crate::feature_vector::FeatureVector;
use crate::labels::Label;

const ABSTAIN: i32 = -1;

/// Diagnostic snapshot of one labeling function over a labeled dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Labeling function name.
    pub label: String,
    /// Label names the function emitted at least once.
    pub polarity: BTreeSet<String>,
    /// Fraction of data points the function did not abstain on.
    pub coverage: f64,
    /// Fraction of labeled data points where another function agreed.
    pub overlaps: f64,
    /// Fraction of labeled data points where another function disagreed.
    pub conflicts: f64,
    /// Votes matching the gold label, `-1` when no gold labels were given.
    pub correct: i64,
    /// Votes contradicting the gold label, `-1` when no gold labels were given.
    pub incorrect: i64,
    pub labels_overlap: BTreeSet<String>,
    pub labels_conflict: BTreeSet<String>,
}

impl Summary {
    /// Empirical accuracy over the non-abstained votes, when it was computed.
    pub fn accuracy(&self) -> Option<f64> {
        if self.correct < 0 || self.incorrect < 0 || self.correct + self.incorrect == 0 {
            return None;
        }
        Some(self.correct as f64 / (self.correct + self.incorrect) as f64)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let polarity: Vec<&str> = self.polarity.iter().map(String::as_str).collect();
        write!(
            f,
            "{} [{}] coverage={:.4} overlaps={:.4} conflicts={:.4} correct={} incorrect={}",
            self.label,
            polarity.join(", "),
            self.coverage,
            self.overlaps,
            self.conflicts,
            self.correct,
            self.incorrect
        )
    }
}

/// Compute one [`Summary`] per labeling function.
///
/// `instances` holds one vector per data point with one cell per entry of
/// `lf_names`. When `gold_labels` is given it must be aligned with
/// `instances` by position.
pub fn summarize<D>(
    lf_names: &Dictionary,
    label_names: &Dictionary,
    instances: &[(D, FeatureVector<i32>)],
    gold_labels: Option<&[Label]>,
) -> Result<Vec<Summary>> {
    let nb_lfs = lf_names.size();
    ensure!(
        label_names.size() == 2,
        "label dictionary must have 2 entries, got {}",
        label_names.size()
    );
    ensure!(!instances.is_empty(), "at least one data point is required");
    if let Some((j, (_, vector))) = instances
        .iter()
        .enumerate()
        .find(|(_, (_, vector))| vector.len() != nb_lfs)
    {
        return Err(LabelModelError::Precondition(format!(
            "vector {} has {} cells, expected {}",
            j,
            vector.len(),
            nb_lfs
        )));
    }
    if let Some(gold) = gold_labels {
        ensure!(
            gold.len() == instances.len(),
            "{} gold labels for {} data points",
            gold.len(),
            instances.len()
        );
    }

    let nb_data_points = instances.len();
    let mut summaries = Vec::with_capacity(nb_lfs);

    for i in 0..nb_lfs {
        let mut polarity = BTreeSet::new();
        let mut labels_overlap = BTreeSet::new();
        let mut labels_conflict = BTreeSet::new();
        let mut nb_labelled = 0usize;
        let mut nb_overlaps = 0usize;
        let mut nb_conflicts = 0usize;
        let mut nb_correct = 0i64;
        let mut nb_incorrect = 0i64;

        for (j, (_, vector)) in instances.iter().enumerate() {
            let value = vector[i];
            if value <= ABSTAIN {
                continue;
            }

            nb_labelled += 1;
            polarity.insert(label_names.label(value as usize)?.to_string());

            let other = |k: usize| k != i && vector[k] > ABSTAIN;

            if let Some(k) = (0..nb_lfs).find(|&k| other(k) && vector[k] == value) {
                nb_overlaps += 1;
                labels_overlap.insert(lf_names.label(k)?.to_string());
            }
            if let Some(k) = (0..nb_lfs).find(|&k| other(k) && vector[k] != value) {
                nb_conflicts += 1;
                labels_conflict.insert(lf_names.label(k)?.to_string());
            }

            if let Some(gold) = gold_labels {
                if value == gold[j].value() {
                    nb_correct += 1;
                } else {
                    nb_incorrect += 1;
                }
            }
        }

        // Every labelled data point is either correct or incorrect.
        debug_assert!(
            gold_labels.is_none() || (nb_correct + nb_incorrect) as usize == nb_labelled
        );
        let (correct, incorrect) = match gold_labels {
            Some(_) => (nb_correct, nb_incorrect),
            None => (-1, -1),
        };

        let per_labelled = |count: usize| {
            if nb_labelled == 0 {
                0.0
            } else {
                count as f64 / nb_labelled as f64
            }
        };

        summaries.push(Summary {
            label: lf_names.label(i)?.to_string(),
            polarity,
            coverage: nb_labelled as f64 / nb_data_points as f64,
            overlaps: per_labelled(nb_overlaps),
            conflicts: per_labelled(nb_conflicts),
            correct,
            incorrect,
            labels_overlap,
            labels_conflict,
        });
    }

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::label_dictionary;

    fn instances(rows: &[&[i32]]) -> Vec<((), FeatureVector<i32>)> {
        rows.iter()
            .map(|row| ((), FeatureVector::from_vec(row.to_vec())))
            .collect()
    }

    #[test]
    fn test_agreeing_functions() {
        let lfs = Dictionary::from_names(["a", "b"]).unwrap();
        let data = instances(&[&[1, 1], &[0, 0], &[1, -1], &[-1, -1]]);

        let summaries = summarize(&lfs, &label_dictionary(), &data, None).unwrap();

        let a = &summaries[0];
        assert_eq!(a.label, "a");
        assert!((a.coverage - 0.75).abs() < 1e-12);
        assert!((a.overlaps - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(a.conflicts, 0.0);
        assert_eq!(a.correct, -1);
        assert_eq!(a.incorrect, -1);
        assert_eq!(a.polarity.iter().cloned().collect::<Vec<_>>(), vec!["KO", "OK"]);
        assert!(a.labels_overlap.contains("b"));
        assert!(a.labels_conflict.is_empty());

        let b = &summaries[1];
        assert!((b.coverage - 0.5).abs() < 1e-12);
        assert_eq!(b.overlaps, 1.0);
    }

    #[test]
    fn test_correct_and_incorrect_counts() {
        let lfs = Dictionary::from_names(["a"]).unwrap();
        let data = instances(&[&[1], &[0], &[1], &[-1]]);
        let gold = [Label::Positive, Label::Positive, Label::Negative, Label::Negative];

        let summaries = summarize(&lfs, &label_dictionary(), &data, Some(&gold)).unwrap();

        assert_eq!(summaries[0].correct, 1);
        assert_eq!(summaries[0].incorrect, 2);
        let labelled = summaries[0].coverage * data.len() as f64;
        assert_eq!((summaries[0].correct + summaries[0].incorrect) as f64, labelled);
        assert!((summaries[0].accuracy().unwrap() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_silent_function_is_nan_guarded() {
        let lfs = Dictionary::from_names(["a", "b"]).unwrap();
        let data = instances(&[&[-1, 1], &[-1, 0]]);

        let summaries = summarize(&lfs, &label_dictionary(), &data, None).unwrap();

        assert_eq!(summaries[0].coverage, 0.0);
        assert_eq!(summaries[0].overlaps, 0.0);
        assert_eq!(summaries[0].conflicts, 0.0);
        assert!(summaries[0].polarity.is_empty());
    }

    #[test]
    fn test_preconditions() {
        let lfs = Dictionary::from_names(["a", "b"]).unwrap();
        let short = instances(&[&[1]]);
        assert!(summarize(&lfs, &label_dictionary(), &short, None).is_err());

        let data = instances(&[&[1, 1]]);
        let gold = [Label::Positive, Label::Negative];
        assert!(summarize(&lfs, &label_dictionary(), &data, Some(&gold)).is_err());

        let empty: Vec<((), FeatureVector<i32>)> = Vec::new();
        assert!(summarize(&lfs, &label_dictionary(), &empty, None).is_err());
    }
}
