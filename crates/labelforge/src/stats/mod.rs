//! Per labeling function diagnostics.
//!
//! Everything here works on the label matrix produced by applying every
//! labeling function to every data point: one [`FeatureVector<i32>`] per
//! data point, one cell per function.
//!
//! [`FeatureVector<i32>`]: crate::feature_vector::FeatureVector
pub mod correlation;
pub mod explore;
pub mod summary;

pub use correlation::{labeling_functions_correlations, CorrelationMethod};
pub use explore::{explore, explore_all, Exploration, Segment};
pub use summary::{summarize, Summary};
