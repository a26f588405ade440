//! Generation-bounded search over combination trees.
//!
//! Generation 1 holds one leaf per labeling function. Every later generation
//! combines two earlier ones: each ordered pair `(a, b)` proposes
//! `AND(a, b)`, `OR(a, b)`, `AND_NOT(a, b)` and `AND_NOT(b, a)`. A proposal
//! survives only if its score is finite and at least as good as one of its
//! parents, and only the best `beam_width` survivors are kept.
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::labels::{GoldLabel, Label, SharedLabelingFunction};
use crate::metrics::{ConfusionMatrix, Metric};
use crate::models::aggregate::{Aggregate, Combinator};

/// Number of candidates kept per generation after the first.
pub const BEAM_WIDTH: usize = 100;

/// Generations 2 to 7 as pairs of (1-based) parent generations.
const SCHEDULE: [(usize, usize); 6] = [(1, 1), (2, 1), (2, 2), (3, 1), (3, 2), (3, 3)];

/// A tree together with how well it did on the training gold labels.
///
/// The per data point `actuals` and `predictions` are only needed while
/// searching. [`ScoredAggregate::reduce`] drops them once a tree is selected.
pub struct ScoredAggregate<D> {
    aggregate: Aggregate<D>,
    matrix: ConfusionMatrix,
    score: f64,
    parent_scores: Option<(f64, f64)>,
    actuals: Option<Arc<[Label]>>,
    predictions: Option<Vec<Label>>,
}

impl<D> ScoredAggregate<D> {
    /// Rebuild an already reduced aggregate, e.g. from a snapshot.
    pub(crate) fn reduced(aggregate: Aggregate<D>, matrix: ConfusionMatrix, score: f64) -> Self {
        Self {
            aggregate,
            matrix,
            score,
            parent_scores: None,
            actuals: None,
            predictions: None,
        }
    }

    pub fn aggregate(&self) -> &Aggregate<D> {
        &self.aggregate
    }

    pub fn confusion_matrix(&self) -> &ConfusionMatrix {
        &self.matrix
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// Scores of the two parents, `None` for leaves.
    pub fn parent_scores(&self) -> Option<(f64, f64)> {
        self.parent_scores
    }

    /// Ground truth the aggregate was scored against.
    pub fn actuals(&self) -> Option<&[Label]> {
        self.actuals.as_deref()
    }

    /// The aggregate's own predictions on the training data.
    pub fn predictions(&self) -> Option<&[Label]> {
        self.predictions.as_deref()
    }

    pub fn apply(&self, data: &D) -> Label {
        self.aggregate.apply(data)
    }

    pub fn is_reduced(&self) -> bool {
        self.predictions.is_none()
    }

    /// Drop the cached training arrays. Only `apply` is needed afterwards.
    pub fn reduce(&mut self) {
        self.actuals = None;
        self.predictions = None;
    }

    pub fn into_aggregate(self) -> Aggregate<D> {
        self.aggregate
    }
}

/// Every generation built by one search, in schedule order.
pub struct SearchOutcome<D> {
    pub generations: Vec<Vec<ScoredAggregate<D>>>,
}

impl<D> SearchOutcome<D> {
    pub fn len(&self) -> usize {
        self.generations.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Highest scoring aggregate over all generations. Ties go to the one
    /// seen first (earlier generation, then earlier position).
    pub fn best(self) -> Option<ScoredAggregate<D>> {
        let mut pool: Vec<ScoredAggregate<D>> = self.generations.into_iter().flatten().collect();
        pool.sort_by(|a, b| descending(a.score, b.score));
        pool.into_iter().next()
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// One proposed combination of `set_a[a]` and `set_b[b]`.
#[derive(Clone, Copy, Debug)]
struct Proposal {
    combinator: Combinator,
    a: usize,
    b: usize,
    /// Use `b` as the left operand.
    swapped: bool,
    matrix: ConfusionMatrix,
    score: f64,
}

/// Search parameters. The metric is fixed for the whole search.
#[derive(Clone, Copy, Debug)]
pub struct TreeSearch {
    pub metric: Metric,
    pub beam_width: usize,
    /// Checked between generations. Once exceeded, no further generation is
    /// built.
    pub deadline: Option<Duration>,
}

impl Default for TreeSearch {
    fn default() -> Self {
        Self {
            metric: Metric::default(),
            beam_width: BEAM_WIDTH,
            deadline: None,
        }
    }
}

impl TreeSearch {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            ..Self::default()
        }
    }

    /// Build the seven generations for `lfs` scored against `gold_labels`.
    pub fn run<D: Sync>(
        &self,
        lfs: &[SharedLabelingFunction<D>],
        gold_labels: &[GoldLabel<D>],
    ) -> SearchOutcome<D> {
        let started = Instant::now();
        let actuals: Arc<[Label]> = gold_labels.iter().map(GoldLabel::binary_label).collect();
        let data: Vec<&D> = gold_labels.iter().map(|gold| &gold.data).collect();

        let mut generations = vec![self.leaves(lfs, &data, &actuals)];
        log::debug!(
            "Generation 1: {} leaves, best {} = {:.4}",
            generations[0].len(),
            self.metric,
            best_score(&generations[0])
        );

        for (index, &(left, right)) in SCHEDULE.iter().enumerate() {
            if let Some(deadline) = self.deadline {
                if started.elapsed() >= deadline {
                    log::warn!(
                        "Search deadline of {:?} reached after {} generations",
                        deadline,
                        generations.len()
                    );
                    break;
                }
            }

            let generation = self.combine(&generations[left - 1], &generations[right - 1], &actuals);
            log::debug!(
                "Generation {} ({} x {}): {} candidates kept, best {} = {:.4}",
                index + 2,
                left,
                right,
                generation.len(),
                self.metric,
                best_score(&generation)
            );
            generations.push(generation);
        }

        log::trace!("Search finished in {:?}", started.elapsed());
        SearchOutcome { generations }
    }

    /// One leaf per labeling function. Leaves whose score is undefined are
    /// dropped.
    fn leaves<D: Sync>(
        &self,
        lfs: &[SharedLabelingFunction<D>],
        data: &[&D],
        actuals: &Arc<[Label]>,
    ) -> Vec<ScoredAggregate<D>> {
        lfs.par_iter()
            .map(|lf| {
                let aggregate = Aggregate::leaf(lf.clone());
                let predictions: Vec<Label> = data.iter().map(|d| aggregate.apply(d)).collect();
                let mut matrix = ConfusionMatrix::new();
                for (actual, prediction) in actuals.iter().zip(&predictions) {
                    matrix.add_binary(actual.is_positive(), prediction.is_positive());
                }
                let score = self.metric.score(&matrix);
                ScoredAggregate {
                    aggregate,
                    matrix,
                    score,
                    parent_scores: None,
                    actuals: Some(actuals.clone()),
                    predictions: Some(predictions),
                }
            })
            .filter(|leaf| leaf.score.is_finite())
            .collect()
    }

    /// Build the next generation out of every ordered pair of `set_a` x `set_b`.
    pub fn combine<D>(
        &self,
        set_a: &[ScoredAggregate<D>],
        set_b: &[ScoredAggregate<D>],
        actuals: &Arc<[Label]>,
    ) -> Vec<ScoredAggregate<D>> {
        let mut accepted: Vec<Proposal> = (0..set_a.len())
            .into_par_iter()
            .flat_map_iter(|a| {
                (0..set_b.len()).flat_map(move |b| {
                    [
                        (Combinator::And, false),
                        (Combinator::Or, false),
                        (Combinator::AndNot, false),
                        (Combinator::AndNot, true),
                    ]
                    .into_iter()
                    .map(move |(combinator, swapped)| (a, b, combinator, swapped))
                })
            })
            .filter_map(|(a, b, combinator, swapped)| {
                self.score_proposal(set_a, set_b, actuals, combinator, a, b, swapped)
            })
            .collect();

        log::trace!(
            "{} x {} pairs: {} proposals accepted",
            set_a.len(),
            set_b.len(),
            accepted.len()
        );

        accepted.sort_by(|x, y| descending(x.score, y.score));
        accepted.truncate(self.beam_width);

        accepted
            .into_iter()
            .filter_map(|proposal| materialize(set_a, set_b, actuals, &proposal))
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn score_proposal<D>(
        &self,
        set_a: &[ScoredAggregate<D>],
        set_b: &[ScoredAggregate<D>],
        actuals: &[Label],
        combinator: Combinator,
        a: usize,
        b: usize,
        swapped: bool,
    ) -> Option<Proposal> {
        let (left, right) = operands(set_a, set_b, a, b, swapped);
        let (left_predictions, right_predictions) = (left.predictions()?, right.predictions()?);

        let mut matrix = ConfusionMatrix::new();
        for ((actual, l), r) in actuals.iter().zip(left_predictions).zip(right_predictions) {
            matrix.add_binary(
                actual.is_positive(),
                combinator.eval(l.is_positive(), r.is_positive()),
            );
        }

        let score = self.metric.score(&matrix);
        let improves = score >= left.score || score >= right.score;
        if !score.is_finite() || !improves {
            return None;
        }

        Some(Proposal {
            combinator,
            a,
            b,
            swapped,
            matrix,
            score,
        })
    }
}

fn operands<'s, D>(
    set_a: &'s [ScoredAggregate<D>],
    set_b: &'s [ScoredAggregate<D>],
    a: usize,
    b: usize,
    swapped: bool,
) -> (&'s ScoredAggregate<D>, &'s ScoredAggregate<D>) {
    if swapped {
        (&set_b[b], &set_a[a])
    } else {
        (&set_a[a], &set_b[b])
    }
}

fn materialize<D>(
    set_a: &[ScoredAggregate<D>],
    set_b: &[ScoredAggregate<D>],
    actuals: &Arc<[Label]>,
    proposal: &Proposal,
) -> Option<ScoredAggregate<D>> {
    let (left, right) = operands(set_a, set_b, proposal.a, proposal.b, proposal.swapped);
    let predictions: Vec<Label> = left
        .predictions()?
        .iter()
        .zip(right.predictions()?)
        .map(|(l, r)| {
            if proposal.combinator.eval(l.is_positive(), r.is_positive()) {
                Label::Positive
            } else {
                Label::Negative
            }
        })
        .collect();

    Some(ScoredAggregate {
        aggregate: Aggregate::node(
            proposal.combinator,
            left.aggregate.clone(),
            right.aggregate.clone(),
        ),
        matrix: proposal.matrix,
        score: proposal.score,
        parent_scores: Some((left.score, right.score)),
        actuals: Some(actuals.clone()),
        predictions: Some(predictions),
    })
}

fn best_score<D>(generation: &[ScoredAggregate<D>]) -> f64 {
    generation
        .iter()
        .map(ScoredAggregate::score)
        .fold(f64::NAN, f64::max)
}
