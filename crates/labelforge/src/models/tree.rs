use std::collections::HashMap;
use std::time::Duration;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::dictionary::Dictionary;
use crate::error::{ensure, LabelModelError, Result};
use crate::labels::{GoldLabel, Label, SharedLabelingFunction};
use crate::metrics::{ConfusionMatrix, Metric};
use crate::models::aggregate::{Aggregate, AggregateSnapshot};
use crate::models::label_model::{check_gold_labels, LabelModel, LabelModelCore};
use crate::models::search::{ScoredAggregate, SearchOutcome, TreeSearch, BEAM_WIDTH};

/// Label model predicting with the best boolean combination of labeling
/// functions found by [`TreeSearch`].
pub struct TreeLabelModel<D> {
    core: LabelModelCore<D>,
    search: TreeSearch,
    tree: Option<ScoredAggregate<D>>,
}

impl<D> TreeLabelModel<D> {
    pub fn new(core: LabelModelCore<D>, metric: Metric) -> Self {
        Self {
            core,
            search: TreeSearch::new(metric),
            tree: None,
        }
    }

    /// Keep at most `beam_width` candidates per generation.
    pub fn with_beam_width(mut self, beam_width: usize) -> Result<Self> {
        ensure!(beam_width > 0, "beam width must be positive");
        self.search.beam_width = beam_width;
        Ok(self)
    }

    /// Stop building generations once `deadline` has elapsed during a fit.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.search.deadline = Some(deadline);
        self
    }

    pub fn metric(&self) -> Metric {
        self.search.metric
    }

    pub fn beam_width(&self) -> usize {
        self.search.beam_width
    }

    /// The selected tree, once fitted.
    pub fn tree(&self) -> Option<&Aggregate<D>> {
        self.tree.as_ref().map(ScoredAggregate::aggregate)
    }

    /// Score of the selected tree on the gold labels it was fitted on.
    pub fn score(&self) -> Option<f64> {
        self.tree.as_ref().map(ScoredAggregate::score)
    }

    /// Confusion matrix of the selected tree on the gold labels it was
    /// fitted on.
    pub fn training_confusion_matrix(&self) -> Option<&ConfusionMatrix> {
        self.tree.as_ref().map(ScoredAggregate::confusion_matrix)
    }

    pub fn snapshot(&self) -> Result<TreeModelSnapshot> {
        let tree = self.tree.as_ref().ok_or(LabelModelError::NotFitted)?;
        Ok(TreeModelSnapshot {
            lf_names: self.core.lf_names().clone(),
            label_names: self.core.label_names().clone(),
            metric: self.search.metric,
            beam_width: self.search.beam_width,
            score: tree.score(),
            matrix: *tree.confusion_matrix(),
            tree: tree.aggregate().snapshot(),
        })
    }

    /// Rebuild a fitted model. `lfs` must match the snapshot's labeling
    /// function dictionary position by position.
    pub fn from_snapshot(
        snapshot: TreeModelSnapshot,
        lfs: Vec<SharedLabelingFunction<D>>,
    ) -> Result<Self> {
        let core = LabelModelCore::new(snapshot.lf_names, snapshot.label_names, lfs)?;
        let registry: HashMap<&str, SharedLabelingFunction<D>> = core
            .lfs()
            .iter()
            .map(|lf| (lf.name(), lf.clone()))
            .collect();
        let aggregate = Aggregate::from_snapshot(&snapshot.tree, &registry)?;
        drop(registry);

        let mut model = TreeLabelModel::new(core, snapshot.metric).with_beam_width(snapshot.beam_width)?;
        model.tree = Some(ScoredAggregate::reduced(aggregate, snapshot.matrix, snapshot.score));
        Ok(model)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.snapshot()?)?)
    }

    pub fn from_json(json: &str, lfs: Vec<SharedLabelingFunction<D>>) -> Result<Self> {
        let snapshot: TreeModelSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot, lfs)
    }
}

impl<D: Sync> TreeLabelModel<D> {
    /// Run the search without selecting a tree. Exposes every generation.
    pub fn search(&self, gold_labels: &[GoldLabel<D>]) -> Result<SearchOutcome<D>> {
        check_gold_labels(gold_labels)?;
        Ok(self.search.run(self.core.lfs(), gold_labels))
    }
}

impl<D: Clone + Send + Sync> LabelModel<D> for TreeLabelModel<D> {
    fn core(&self) -> &LabelModelCore<D> {
        &self.core
    }

    /// Search for the best tree and keep it. On error the previously fitted
    /// tree, if any, is left in place.
    fn fit(&mut self, gold_labels: &[GoldLabel<D>]) -> Result<()> {
        let outcome = self.search(gold_labels)?;
        let nb_candidates = outcome.len();

        let mut best = outcome.best().ok_or_else(|| {
            LabelModelError::NoCandidate(format!(
                "none of the {} labeling functions has a defined {}",
                self.core.lfs().len(),
                self.search.metric
            ))
        })?;
        best.reduce();

        log::info!(
            "Selected {} out of {} candidates with {} = {:.4} ({})",
            best.aggregate(),
            nb_candidates,
            self.search.metric,
            best.score(),
            best.confusion_matrix()
        );

        self.tree = Some(best);
        Ok(())
    }

    fn predict(&self, data: &[D]) -> Result<Vec<Label>> {
        let tree = self.tree.as_ref().ok_or(LabelModelError::NotFitted)?;
        Ok(data.par_iter().map(|d| tree.apply(d)).collect())
    }

    fn is_fitted(&self) -> bool {
        self.tree.is_some()
    }

    fn name(&self) -> &str {
        "tree"
    }
}

/// Serializable form of a fitted [`TreeLabelModel`]. Labeling functions are
/// referenced by name and resolved again on load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeModelSnapshot {
    pub lf_names: Dictionary,
    pub label_names: Dictionary,
    pub metric: Metric,
    #[serde(default = "default_beam_width")]
    pub beam_width: usize,
    pub score: f64,
    pub matrix: ConfusionMatrix,
    pub tree: AggregateSnapshot,
}

fn default_beam_width() -> usize {
    BEAM_WIDTH
}
