use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::metrics::Metric;
use crate::models::majority::{MajorityLabelModel, TieBreakPolicy};
use crate::models::search::BEAM_WIDTH;

/// Central configuration for label models in the crate.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LabelModelConfig {
    #[serde(flatten)]
    pub model_type: ModelType,
}

/// Supported label models and their parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    Majority {
        tie_break: TieBreakPolicy,
        tolerance: f64,
    },
    Tree {
        metric: Metric,
        beam_width: usize,
        /// Time budget of a fit, in milliseconds.
        deadline_ms: Option<u64>,
    },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::Tree {
            metric: Metric::Mcc,
            beam_width: BEAM_WIDTH,
            deadline_ms: None,
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "majority" => Ok(ModelType::Majority {
                tie_break: TieBreakPolicy::Abstain,
                tolerance: MajorityLabelModel::<()>::DEFAULT_TOLERANCE,
            }),
            "tree" => Ok(ModelType::default()),
            _ => Err(format!(
                "Unknown model type: {}. Expected one of: majority, tree",
                s
            )),
        }
    }
}

impl LabelModelConfig {
    pub fn new(model_type: ModelType) -> Self {
        Self { model_type }
    }
}

impl Default for LabelModelConfig {
    fn default() -> Self {
        Self {
            model_type: ModelType::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        match LabelModelConfig::default().model_type {
            ModelType::Tree {
                metric,
                beam_width,
                deadline_ms,
            } => {
                assert_eq!(metric, Metric::Mcc);
                assert_eq!(beam_width, 100);
                assert_eq!(deadline_ms, None);
            }
            other => panic!("unexpected default {:?}", other),
        }
    }

    #[test]
    fn test_from_str() {
        assert!(matches!("Majority".parse::<ModelType>(), Ok(ModelType::Majority { .. })));
        assert!(matches!("tree".parse::<ModelType>(), Ok(ModelType::Tree { .. })));
        assert_eq!(
            "majority".parse::<ModelType>().unwrap(),
            ModelType::Majority {
                tie_break: TieBreakPolicy::Abstain,
                tolerance: MajorityLabelModel::<u32>::DEFAULT_TOLERANCE,
            }
        );
        assert!("snorkel".parse::<ModelType>().is_err());
    }
}
