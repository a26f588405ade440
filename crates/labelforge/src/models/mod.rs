pub mod aggregate;
pub mod factory;
pub mod label_model;
pub mod majority;
pub mod search;
pub mod tree;

pub use label_model::{LabelModel, LabelModelCore};
pub use majority::{MajorityLabelModel, TieBreakPolicy};
pub use tree::{TreeLabelModel, TreeModelSnapshot};
