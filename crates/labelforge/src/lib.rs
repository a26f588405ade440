//! labelforge: aggregation of noisy labeling functions into binary predictions.
//!
//! Labeling functions vote ABSTAIN, NEGATIVE or POSITIVE on a data point. This
//! crate combines those votes into one prediction per data point, using a
//! modest set of gold labels to score candidate combinations, and provides the
//! per labeling function diagnostics (coverage, overlaps, conflicts,
//! correctness, correlations) used to inspect them.
//!
//! Two models are available: a majority vote baseline and a tree model that
//! searches boolean combinations of the labeling functions.
pub mod config;
pub mod dictionary;
pub mod error;
pub mod feature_vector;
pub mod labels;
pub mod metrics;
pub mod models;
pub mod report;
pub mod stats;

pub use dictionary::Dictionary;
pub use error::{LabelModelError, Result};
pub use feature_vector::FeatureVector;
pub use labels::{
    label_dictionary, labeling_function, GoldLabel, Label, LabelingFunction, Outcome,
    SharedLabelingFunction,
};
pub use metrics::{ConfusionMatrix, Metric};
pub use models::{LabelModel, LabelModelCore, MajorityLabelModel, TreeLabelModel};
