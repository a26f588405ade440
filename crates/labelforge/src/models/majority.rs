use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::thread_rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ensure, LabelModelError, Result};
use crate::feature_vector::FeatureVector;
use crate::labels::{GoldLabel, Label};
use crate::models::label_model::{check_gold_labels, LabelModel, LabelModelCore};

/// How to resolve data points where several labels share the top vote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakPolicy {
    /// Pick `candidates[i % n]` where `i` is the index of the data point.
    /// Reproducible for a given input ordering.
    Random,
    /// Pick uniformly at random.
    TrueRandom,
    #[default]
    Abstain,
}

impl FromStr for TieBreakPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "random" => Ok(TieBreakPolicy::Random),
            "true_random" => Ok(TieBreakPolicy::TrueRandom),
            "abstain" => Ok(TieBreakPolicy::Abstain),
            _ => Err(format!(
                "Unknown tie-break policy: {}. Expected one of: random, true_random, abstain",
                s
            )),
        }
    }
}

impl fmt::Display for TieBreakPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TieBreakPolicy::Random => "random",
            TieBreakPolicy::TrueRandom => "true_random",
            TieBreakPolicy::Abstain => "abstain",
        };
        f.write_str(s)
    }
}

/// Baseline model predicting the label most labeling functions voted for.
pub struct MajorityLabelModel<D> {
    core: LabelModelCore<D>,
    tie_break: TieBreakPolicy,
    tolerance: f64,
}

impl<D> MajorityLabelModel<D> {
    pub const DEFAULT_TOLERANCE: f64 = 1e-5;

    /// `tolerance` is the distance to the top probability under which a
    /// label still counts as a winner. It must lie in `[0, 1]`.
    pub fn new(core: LabelModelCore<D>, tie_break: TieBreakPolicy, tolerance: f64) -> Result<Self> {
        ensure!(
            tolerance.is_finite() && (0.0..=1.0).contains(&tolerance),
            "tolerance must be in [0, 1], got {}",
            tolerance
        );
        Ok(Self {
            core,
            tie_break,
            tolerance,
        })
    }

    pub fn tie_break(&self) -> TieBreakPolicy {
        self.tie_break
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// One cell per label: `1 / k` for each of the `k` labels with the most
    /// votes, 0 elsewhere. Abstentions are not votes, so a data point nobody
    /// voted on ties every label.
    pub fn predict_proba(&self, vector: &FeatureVector<i32>) -> Result<FeatureVector<f64>> {
        let nb_labels = self.core.label_names().size();
        let mut counts = vec![0usize; nb_labels];
        for &vote in vector.iter().filter(|&&vote| vote > Label::Abstain.value()) {
            let cell = usize::try_from(vote).ok().filter(|&cell| cell < nb_labels);
            match cell {
                Some(cell) => counts[cell] += 1,
                None => {
                    return Err(LabelModelError::Lookup(format!(
                        "vote {} has no entry in the label dictionary",
                        vote
                    )))
                }
            }
        }

        let max = counts.iter().copied().max().unwrap_or(0);
        let winners = counts.iter().filter(|&&count| count == max).count();
        Ok(counts
            .iter()
            .map(|&count| {
                if count == max {
                    1.0 / winners as f64
                } else {
                    0.0
                }
            })
            .collect())
    }

    /// Turn one row of the label matrix into a prediction. `index` is the
    /// position of the data point, used by [`TieBreakPolicy::Random`].
    pub fn label(&self, vector: &FeatureVector<i32>, index: usize) -> Result<Label> {
        let probabilities = self.predict_proba(vector)?;
        let max = match probabilities.max() {
            Some(max) => max,
            None => return Ok(Label::Abstain),
        };

        let candidates: Vec<usize> = probabilities
            .iter()
            .enumerate()
            .filter(|(_, &p)| (max - p).abs() < self.tolerance)
            .map(|(cell, _)| cell)
            .collect();

        let cell = match (candidates.len(), self.tie_break) {
            (0, _) => return Ok(Label::Abstain),
            (1, _) => candidates[0],
            (_, TieBreakPolicy::Abstain) => return Ok(Label::Abstain),
            (n, TieBreakPolicy::Random) => candidates[index % n],
            (_, TieBreakPolicy::TrueRandom) => match candidates.choose(&mut thread_rng()) {
                Some(&cell) => cell,
                None => return Ok(Label::Abstain),
            },
        };
        Label::try_from(cell as i32)
    }
}

impl<D: Clone + Send + Sync> LabelModel<D> for MajorityLabelModel<D> {
    fn core(&self) -> &LabelModelCore<D> {
        &self.core
    }

    /// Nothing is learned: the gold labels are only validated.
    fn fit(&mut self, gold_labels: &[GoldLabel<D>]) -> Result<()> {
        check_gold_labels(gold_labels)?;
        log::debug!(
            "Majority model over {} labeling functions needs no fitting ({} gold labels ignored)",
            self.core.lfs().len(),
            gold_labels.len()
        );
        Ok(())
    }

    fn predict(&self, data: &[D]) -> Result<Vec<Label>> {
        let vectors: Vec<FeatureVector<i32>> =
            data.par_iter().map(|d| self.core.vectorize(d)).collect();

        let mut predictions = Vec::with_capacity(vectors.len());
        for vector in &vectors {
            let label = self.label(vector, predictions.len())?;
            predictions.push(label);
        }
        Ok(predictions)
    }

    fn is_fitted(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "majority"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{label_dictionary, labeling_function, SharedLabelingFunction};

    fn constant(name: &str, label: Label) -> SharedLabelingFunction<u32> {
        labeling_function(name, move |_: &u32| label)
    }

    fn model(lfs: Vec<SharedLabelingFunction<u32>>, tie_break: TieBreakPolicy) -> MajorityLabelModel<u32> {
        let core = LabelModelCore::from_labeling_functions(label_dictionary(), lfs).unwrap();
        MajorityLabelModel::new(core, tie_break, MajorityLabelModel::<u32>::DEFAULT_TOLERANCE).unwrap()
    }

    #[test]
    fn test_majority_wins() {
        let m = model(
            vec![
                constant("a", Label::Positive),
                constant("b", Label::Positive),
                constant("c", Label::Negative),
                constant("d", Label::Abstain),
            ],
            TieBreakPolicy::Abstain,
        );
        assert_eq!(m.predict(&[1, 2]).unwrap(), vec![Label::Positive, Label::Positive]);

        let proba = m.predict_proba(&FeatureVector::from_vec(vec![1, 1, 0, -1])).unwrap();
        assert_eq!(proba.as_slice(), &[0.0, 1.0]);
    }

    #[test]
    fn test_tie_policies() {
        let lfs = || vec![constant("a", Label::Positive), constant("b", Label::Negative)];

        let abstain = model(lfs(), TieBreakPolicy::Abstain);
        assert_eq!(abstain.predict(&[0, 1]).unwrap(), vec![Label::Abstain; 2]);

        let random = model(lfs(), TieBreakPolicy::Random);
        assert_eq!(
            random.predict(&[0, 1, 2]).unwrap(),
            vec![Label::Negative, Label::Positive, Label::Negative]
        );
        assert_eq!(random.predict(&[0, 1, 2]).unwrap(), random.predict(&[0, 1, 2]).unwrap());

        let true_random = model(lfs(), TieBreakPolicy::TrueRandom);
        for label in true_random.predict(&[0; 16]).unwrap() {
            assert!(label == Label::Positive || label == Label::Negative);
        }
    }

    #[test]
    fn test_all_abstain_ties_every_label() {
        let m = model(vec![constant("a", Label::Abstain)], TieBreakPolicy::Abstain);
        let proba = m.predict_proba(&FeatureVector::from_vec(vec![-1])).unwrap();
        assert_eq!(proba.as_slice(), &[0.5, 0.5]);
        assert_eq!(m.predict(&[7]).unwrap(), vec![Label::Abstain]);
    }

    #[test]
    fn test_zero_tolerance_always_abstains() {
        let core = LabelModelCore::from_labeling_functions(
            label_dictionary(),
            vec![constant("a", Label::Positive)],
        )
        .unwrap();
        let m = MajorityLabelModel::new(core, TieBreakPolicy::Random, 0.0).unwrap();
        assert_eq!(m.predict(&[1]).unwrap(), vec![Label::Abstain]);
    }

    #[test]
    fn test_tolerance_out_of_range() {
        let core = || {
            LabelModelCore::from_labeling_functions(
                label_dictionary(),
                vec![constant("a", Label::Positive)],
            )
            .unwrap()
        };
        assert!(MajorityLabelModel::new(core(), TieBreakPolicy::Random, -0.1).is_err());
        assert!(MajorityLabelModel::new(core(), TieBreakPolicy::Random, f64::NAN).is_err());
        assert!(MajorityLabelModel::new(core(), TieBreakPolicy::Random, 1.5).is_err());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("true-random".parse::<TieBreakPolicy>().unwrap(), TieBreakPolicy::TrueRandom);
        assert!("coin".parse::<TieBreakPolicy>().is_err());
    }
}
