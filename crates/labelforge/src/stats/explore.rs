use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dictionary::Dictionary;
use crate::error::{ensure, Result};
use crate::feature_vector::FeatureVector;
use crate::labels::Label;

/// How a labeling function vote relates to the gold label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    Correct,
    Incorrect,
    /// Both the function and the gold label abstain.
    CorrectAbstain,
    /// The function abstains where the gold label does not.
    IncorrectAbstain,
}

impl Segment {
    pub fn of(vote: i32, gold: Label) -> Segment {
        let gold = gold.value();
        match (vote == Label::Abstain.value(), vote == gold) {
            (true, true) => Segment::CorrectAbstain,
            (true, false) => Segment::IncorrectAbstain,
            (false, true) => Segment::Correct,
            (false, false) => Segment::Incorrect,
        }
    }
}

/// Data points of one labeling function bucketed by [`Segment`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exploration<D> {
    pub correct: Vec<D>,
    pub incorrect: Vec<D>,
    pub correct_abstain: Vec<D>,
    pub incorrect_abstain: Vec<D>,
}

impl<D> Default for Exploration<D> {
    fn default() -> Self {
        Self {
            correct: Vec::new(),
            incorrect: Vec::new(),
            correct_abstain: Vec::new(),
            incorrect_abstain: Vec::new(),
        }
    }
}

impl<D> Exploration<D> {
    pub fn segment(&self, segment: Segment) -> &[D] {
        match segment {
            Segment::Correct => &self.correct,
            Segment::Incorrect => &self.incorrect,
            Segment::CorrectAbstain => &self.correct_abstain,
            Segment::IncorrectAbstain => &self.incorrect_abstain,
        }
    }

    fn push(&mut self, segment: Segment, data: D) {
        match segment {
            Segment::Correct => self.correct.push(data),
            Segment::Incorrect => self.incorrect.push(data),
            Segment::CorrectAbstain => self.correct_abstain.push(data),
            Segment::IncorrectAbstain => self.incorrect_abstain.push(data),
        }
    }

    pub fn len(&self) -> usize {
        self.correct.len()
            + self.incorrect.len()
            + self.correct_abstain.len()
            + self.incorrect_abstain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bucket every data point by how the labeling function `lf_name` voted on it.
pub fn explore<D: Clone>(
    lf_names: &Dictionary,
    instances: &[(D, FeatureVector<i32>)],
    gold_labels: &[Label],
    lf_name: &str,
) -> Result<Exploration<D>> {
    ensure!(
        gold_labels.len() == instances.len(),
        "{} gold labels for {} data points",
        gold_labels.len(),
        instances.len()
    );
    let i = lf_names.id(lf_name)?;

    let mut exploration = Exploration::default();
    for ((data, vector), &gold) in instances.iter().zip(gold_labels) {
        let vote = *vector.get(i)?;
        exploration.push(Segment::of(vote, gold), data.clone());
    }
    Ok(exploration)
}

/// [`explore`] every labeling function, keyed by name.
pub fn explore_all<D: Clone>(
    lf_names: &Dictionary,
    instances: &[(D, FeatureVector<i32>)],
    gold_labels: &[Label],
) -> Result<BTreeMap<String, Exploration<D>>> {
    lf_names
        .names()
        .into_iter()
        .map(|name| Ok((name.to_string(), explore(lf_names, instances, gold_labels, name)?)))
        .collect()
}
