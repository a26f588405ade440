use std::time::Duration;

use crate::config::{LabelModelConfig, ModelType};
use crate::error::Result;
use crate::models::label_model::{LabelModel, LabelModelCore};
use crate::models::majority::MajorityLabelModel;
use crate::models::tree::TreeLabelModel;

/// Build a boxed label model from a `LabelModelConfig`.
pub fn build_model<D>(
    params: LabelModelConfig,
    core: LabelModelCore<D>,
) -> Result<Box<dyn LabelModel<D>>>
where
    D: Clone + Send + Sync + 'static,
{
    let model: Box<dyn LabelModel<D>> = match params.model_type {
        ModelType::Majority {
            tie_break,
            tolerance,
        } => Box::new(MajorityLabelModel::new(core, tie_break, tolerance)?),

        ModelType::Tree {
            metric,
            beam_width,
            deadline_ms,
        } => {
            let model = TreeLabelModel::new(core, metric).with_beam_width(beam_width)?;
            match deadline_ms {
                Some(ms) => Box::new(model.with_deadline(Duration::from_millis(ms))),
                None => Box::new(model),
            }
        }
    };
    log::debug!("Built {} label model", model.name());
    Ok(model)
}
