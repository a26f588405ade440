//! Boolean combination trees over labeling functions.
//!
//! A tree never abstains: a leaf maps its labeling function's POSITIVE vote
//! to POSITIVE and both NEGATIVE and ABSTAIN to NEGATIVE, and the inner nodes
//! only look at whether their children are POSITIVE.
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LabelModelError, Result};
use crate::labels::{Label, SharedLabelingFunction};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combinator {
    And,
    Or,
    /// Left is POSITIVE and right is not.
    AndNot,
}

impl Combinator {
    #[inline]
    pub fn eval(self, left: bool, right: bool) -> bool {
        match self {
            Combinator::And => left && right,
            Combinator::Or => left || right,
            Combinator::AndNot => left && !right,
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
            Combinator::AndNot => "AND_NOT",
        };
        f.write_str(s)
    }
}

/// A node of a combination tree. Inner nodes own both of their children.
pub enum Aggregate<D> {
    Leaf(SharedLabelingFunction<D>),
    And(Box<Aggregate<D>>, Box<Aggregate<D>>),
    Or(Box<Aggregate<D>>, Box<Aggregate<D>>),
    AndNot(Box<Aggregate<D>>, Box<Aggregate<D>>),
}

impl<D> Aggregate<D> {
    pub fn leaf(lf: SharedLabelingFunction<D>) -> Self {
        Aggregate::Leaf(lf)
    }

    pub fn node(combinator: Combinator, left: Aggregate<D>, right: Aggregate<D>) -> Self {
        let (left, right) = (Box::new(left), Box::new(right));
        match combinator {
            Combinator::And => Aggregate::And(left, right),
            Combinator::Or => Aggregate::Or(left, right),
            Combinator::AndNot => Aggregate::AndNot(left, right),
        }
    }

    /// Evaluate the tree on one data point. Always POSITIVE or NEGATIVE.
    pub fn apply(&self, data: &D) -> Label {
        if self.is_positive(data) {
            Label::Positive
        } else {
            Label::Negative
        }
    }

    fn is_positive(&self, data: &D) -> bool {
        match self {
            Aggregate::Leaf(lf) => lf.apply(data).is_positive(),
            Aggregate::And(left, right) => left.is_positive(data) && right.is_positive(data),
            Aggregate::Or(left, right) => left.is_positive(data) || right.is_positive(data),
            Aggregate::AndNot(left, right) => left.is_positive(data) && !right.is_positive(data),
        }
    }

    pub fn combinator(&self) -> Option<Combinator> {
        match self {
            Aggregate::Leaf(_) => None,
            Aggregate::And(..) => Some(Combinator::And),
            Aggregate::Or(..) => Some(Combinator::Or),
            Aggregate::AndNot(..) => Some(Combinator::AndNot),
        }
    }

    pub fn children(&self) -> Option<(&Aggregate<D>, &Aggregate<D>)> {
        match self {
            Aggregate::Leaf(_) => None,
            Aggregate::And(left, right)
            | Aggregate::Or(left, right)
            | Aggregate::AndNot(left, right) => Some((&**left, &**right)),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Aggregate::Leaf(_))
    }

    pub fn depth(&self) -> usize {
        match self.children() {
            None => 1,
            Some((left, right)) => 1 + left.depth().max(right.depth()),
        }
    }

    /// Names of the labeling functions at the leaves, left to right.
    pub fn leaf_names(&self) -> Vec<&str> {
        match self {
            Aggregate::Leaf(lf) => vec![lf.name()],
            Aggregate::And(left, right)
            | Aggregate::Or(left, right)
            | Aggregate::AndNot(left, right) => {
                let mut names = left.leaf_names();
                names.extend(right.leaf_names());
                names
            }
        }
    }

    pub fn snapshot(&self) -> AggregateSnapshot {
        let node = |combinator, left: &Aggregate<D>, right: &Aggregate<D>| AggregateSnapshot::Node {
            combinator,
            left: Box::new(left.snapshot()),
            right: Box::new(right.snapshot()),
        };
        match self {
            Aggregate::Leaf(lf) => AggregateSnapshot::Leaf {
                name: lf.name().to_string(),
            },
            Aggregate::And(left, right) => node(Combinator::And, left, right),
            Aggregate::Or(left, right) => node(Combinator::Or, left, right),
            Aggregate::AndNot(left, right) => node(Combinator::AndNot, left, right),
        }
    }

    /// Rebuild a tree, resolving leaf names against `lfs`.
    pub fn from_snapshot(
        snapshot: &AggregateSnapshot,
        lfs: &HashMap<&str, SharedLabelingFunction<D>>,
    ) -> Result<Self> {
        match snapshot {
            AggregateSnapshot::Leaf { name } => lfs
                .get(name.as_str())
                .cloned()
                .map(Aggregate::Leaf)
                .ok_or_else(|| {
                    LabelModelError::Lookup(format!("no labeling function named '{}'", name))
                }),
            AggregateSnapshot::Node {
                combinator,
                left,
                right,
            } => Ok(Aggregate::node(
                *combinator,
                Aggregate::from_snapshot(left, lfs)?,
                Aggregate::from_snapshot(right, lfs)?,
            )),
        }
    }
}

impl<D> Clone for Aggregate<D> {
    fn clone(&self) -> Self {
        match self {
            Aggregate::Leaf(lf) => Aggregate::Leaf(lf.clone()),
            Aggregate::And(left, right) => Aggregate::And(left.clone(), right.clone()),
            Aggregate::Or(left, right) => Aggregate::Or(left.clone(), right.clone()),
            Aggregate::AndNot(left, right) => Aggregate::AndNot(left.clone(), right.clone()),
        }
    }
}

impl<D> fmt::Display for Aggregate<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregate::Leaf(lf) => f.write_str(lf.name()),
            Aggregate::And(left, right) => write!(f, "{}({}, {})", Combinator::And, left, right),
            Aggregate::Or(left, right) => write!(f, "{}({}, {})", Combinator::Or, left, right),
            Aggregate::AndNot(left, right) => {
                write!(f, "{}({}, {})", Combinator::AndNot, left, right)
            }
        }
    }
}

impl<D> fmt::Debug for Aggregate<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Aggregate({})", self)
    }
}

/// Serializable shape of a tree: combinators and labeling function names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregateSnapshot {
    Leaf {
        name: String,
    },
    Node {
        combinator: Combinator,
        left: Box<AggregateSnapshot>,
        right: Box<AggregateSnapshot>,
    },
}
