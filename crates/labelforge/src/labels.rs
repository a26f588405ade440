//! Votes, labeling functions and gold labels.
//!
//! A labeling function maps a data point to one of three votes. Gold labels
//! carry the verified outcome of a data point and are the only ground truth
//! the models ever see.
use std::convert::TryFrom;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dictionary::Dictionary;
use crate::error::{LabelModelError, Result};

/// Name of the negative class in the label dictionary.
pub const KO: &str = "KO";
/// Name of the positive class in the label dictionary.
pub const OK: &str = "OK";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    Abstain,
    Negative,
    Positive,
}

impl Label {
    /// Integer encoding stored in feature vectors.
    pub fn value(self) -> i32 {
        match self {
            Label::Abstain => -1,
            Label::Negative => 0,
            Label::Positive => 1,
        }
    }

    pub fn is_abstain(self) -> bool {
        self == Label::Abstain
    }

    pub fn is_positive(self) -> bool {
        self == Label::Positive
    }
}

impl TryFrom<i32> for Label {
    type Error = LabelModelError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            -1 => Ok(Label::Abstain),
            0 => Ok(Label::Negative),
            1 => Ok(Label::Positive),
            other => Err(LabelModelError::Lookup(format!(
                "{} is not a valid label value",
                other
            ))),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Label::Abstain => "ABSTAIN",
            Label::Negative => "NEGATIVE",
            Label::Positive => "POSITIVE",
        };
        f.write_str(s)
    }
}

/// The `{"KO" -> 0, "OK" -> 1}` dictionary shared by every binary model.
pub fn label_dictionary() -> Dictionary {
    Dictionary::from_distinct(&[KO, OK])
}

/// A heuristic voting ABSTAIN, NEGATIVE or POSITIVE on a data point.
pub trait LabelingFunction<D>: Send + Sync {
    /// Unique name, also the key of the function in the model dictionary.
    fn name(&self) -> &str;

    fn apply(&self, data: &D) -> Label;
}

/// Shared handle to a labeling function.
pub type SharedLabelingFunction<D> = Arc<dyn LabelingFunction<D>>;

/// Labeling function backed by a closure.
pub struct FnLabelingFunction<F> {
    name: String,
    f: F,
}

impl<F> FnLabelingFunction<F> {
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<D, F> LabelingFunction<D> for FnLabelingFunction<F>
where
    F: Fn(&D) -> Label + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, data: &D) -> Label {
        (self.f)(data)
    }
}

/// Wrap a closure into a shareable labeling function.
pub fn labeling_function<D, F>(name: impl Into<String>, f: F) -> SharedLabelingFunction<D>
where
    F: Fn(&D) -> Label + Send + Sync + 'static,
    D: 'static,
{
    Arc::new(FnLabelingFunction::new(name, f))
}

/// Verified outcome of a gold label. Exactly one holds per label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    TruePositive,
    FalsePositive,
    TrueNegative,
    FalseNegative,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoldLabel<D> {
    pub id: String,
    /// Category the annotation belongs to. A model is fitted on a single one.
    pub label: String,
    pub data: D,
    pub outcome: Outcome,
}

impl<D> GoldLabel<D> {
    pub fn new(id: impl Into<String>, label: impl Into<String>, data: D, outcome: Outcome) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            data,
            outcome,
        }
    }

    pub fn is_true_positive(&self) -> bool {
        self.outcome == Outcome::TruePositive
    }

    pub fn is_false_positive(&self) -> bool {
        self.outcome == Outcome::FalsePositive
    }

    pub fn is_true_negative(&self) -> bool {
        self.outcome == Outcome::TrueNegative
    }

    pub fn is_false_negative(&self) -> bool {
        self.outcome == Outcome::FalseNegative
    }

    /// Ground truth of the data point: POSITIVE iff TP or FN.
    pub fn binary_label(&self) -> Label {
        if self.is_true_positive() || self.is_false_negative() {
            Label::Positive
        } else {
            Label::Negative
        }
    }
}
