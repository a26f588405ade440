use anyhow::{Context, Result};
use std::fs::File;

use labelforge::config::{LabelModelConfig, ModelType};
use labelforge::models::factory;
use labelforge::report;
use labelforge::stats::CorrelationMethod;
use labelforge::{
    label_dictionary, labeling_function, GoldLabel, Label, LabelModelCore, Metric, Outcome,
    SharedLabelingFunction,
};

fn divisible_by(n: u64) -> SharedLabelingFunction<u64> {
    labeling_function(format!("isDivisibleBy{}", n), move |x: &u64| {
        if x % n == 0 {
            Label::Positive
        } else {
            Label::Negative
        }
    })
}

fn ends_with(digit: u64) -> SharedLabelingFunction<u64> {
    labeling_function(format!("endsWith{}", digit), move |x: &u64| {
        if x % 10 == digit {
            Label::Positive
        } else {
            Label::Abstain
        }
    })
}

fn main() -> Result<()> {
    env_logger::init();

    let lfs = vec![
        divisible_by(2),
        divisible_by(3),
        divisible_by(5),
        divisible_by(7),
        ends_with(0),
    ];

    // Annotate multiples of 6 and of 35 as the positive class
    let gold: Vec<GoldLabel<u64>> = (1..=210)
        .map(|x| {
            let outcome = if x % 6 == 0 || x % 35 == 0 {
                Outcome::TruePositive
            } else {
                Outcome::TrueNegative
            };
            GoldLabel::new(format!("n{}", x), "multiples", x, outcome)
        })
        .collect();

    for model_type in [
        "majority".parse::<ModelType>().map_err(anyhow::Error::msg)?,
        ModelType::Tree {
            metric: Metric::Mcc,
            beam_width: 50,
            deadline_ms: Some(10_000),
        },
    ] {
        let core = LabelModelCore::from_labeling_functions(label_dictionary(), lfs.clone())?;
        let mut model = factory::build_model(LabelModelConfig::new(model_type), core)?;
        model
            .fit(&gold)
            .with_context(|| format!("Failed to fit the {} model", model.name()))?;

        let matrix = model.confusion_matrix(&gold)?;
        println!(
            "{}: MCC = {:.4}, F1 = {:.4} ({})",
            model.name(),
            matrix.mcc(),
            matrix.f1(),
            matrix
        );

        let held_out: Vec<u64> = (211..=225).collect();
        let predictions = model.predict(&held_out)?;
        for (x, prediction) in held_out.iter().zip(predictions) {
            println!("  {} -> {}", x, prediction);
        }
    }

    let core = LabelModelCore::from_labeling_functions(label_dictionary(), lfs)?;
    let model = factory::build_model(LabelModelConfig::default(), core)?;
    let summaries = model.summarize(&gold)?;
    for summary in &summaries {
        println!("{}", summary);
    }

    let summaries_path = "labeling_functions_summary.csv";
    let file = File::create(summaries_path)
        .with_context(|| format!("Failed to create {}", summaries_path))?;
    report::write_summaries(&summaries, file)?;

    let correlations_path = "labeling_functions_correlations.csv";
    let matrix = model.labeling_functions_correlations(&gold, CorrelationMethod::Spearman)?;
    let file = File::create(correlations_path)
        .with_context(|| format!("Failed to create {}", correlations_path))?;
    report::write_correlations(model.core().lf_names(), &matrix, file)?;
    println!("Wrote {} and {}", summaries_path, correlations_path);

    Ok(())
}
