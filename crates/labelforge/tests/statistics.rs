//! Diagnostics of labeling functions computed through the label models.

use labelforge::report;
use labelforge::stats::{CorrelationMethod, Segment};
use labelforge::{
    label_dictionary, labeling_function, GoldLabel, Label, LabelModel, LabelModelCore,
    MajorityLabelModel, Outcome, SharedLabelingFunction,
};

fn parity(name: &str, even: Label, odd: Label) -> SharedLabelingFunction<u32> {
    labeling_function(name, move |x: &u32| if x % 2 == 0 { even } else { odd })
}

fn majority(lfs: Vec<SharedLabelingFunction<u32>>) -> MajorityLabelModel<u32> {
    let core = LabelModelCore::from_labeling_functions(label_dictionary(), lfs)
        .expect("failed to build model core");
    MajorityLabelModel::new(core, Default::default(), MajorityLabelModel::<u32>::DEFAULT_TOLERANCE)
        .expect("failed to build majority model")
}

// Even numbers are the positive class.
fn gold_even(n: u32) -> Vec<GoldLabel<u32>> {
    (1..=n)
        .map(|x| {
            let outcome = if x % 2 == 0 {
                Outcome::TruePositive
            } else {
                Outcome::TrueNegative
            };
            GoldLabel::new(format!("gold-{}", x), "even", x, outcome)
        })
        .collect()
}

#[test]
fn test_agreeing_functions_always_overlap() {
    let model = majority(vec![
        parity("even_a", Label::Positive, Label::Negative),
        parity("even_b", Label::Positive, Label::Negative),
    ]);
    let summaries = model.summarize(&gold_even(12)).unwrap();

    assert_eq!(summaries.len(), 2);
    for summary in &summaries {
        assert_eq!(summary.coverage, 1.0);
        assert_eq!(summary.overlaps, 1.0);
        assert_eq!(summary.conflicts, 0.0);
        assert_eq!(summary.correct, 12);
        assert_eq!(summary.incorrect, 0);
        assert_eq!(summary.accuracy(), Some(1.0));
        assert_eq!(summary.polarity.len(), 2);
        assert!(summary.labels_conflict.is_empty());
    }
    assert!(summaries[0].labels_overlap.contains("even_b"));
    assert!(summaries[1].labels_overlap.contains("even_a"));
}

#[test]
fn test_opposed_functions_always_conflict() {
    let model = majority(vec![
        parity("even", Label::Positive, Label::Negative),
        parity("odd", Label::Negative, Label::Positive),
    ]);
    let summaries = model.summarize(&gold_even(12)).unwrap();

    for summary in &summaries {
        assert_eq!(summary.overlaps, 0.0);
        assert_eq!(summary.conflicts, 1.0);
        assert!(summary.labels_overlap.is_empty());
    }
    assert_eq!((summaries[0].correct, summaries[0].incorrect), (12, 0));
    assert_eq!((summaries[1].correct, summaries[1].incorrect), (0, 12));
}

#[test]
fn test_abstaining_function_has_partial_coverage() {
    let model = majority(vec![
        parity("even", Label::Positive, Label::Negative),
        parity("even_only", Label::Positive, Label::Abstain),
    ]);
    let summaries = model.summarize(&gold_even(10)).unwrap();

    assert_eq!(summaries[0].coverage, 1.0);
    assert_eq!(summaries[0].overlaps, 0.5);
    assert_eq!(summaries[1].coverage, 0.5);
    assert_eq!(summaries[1].overlaps, 1.0);
    assert_eq!(summaries[1].polarity.iter().collect::<Vec<_>>(), vec!["OK"]);
    assert_eq!(summaries[1].correct + summaries[1].incorrect, 5);
}

#[test]
fn test_exploration_buckets_every_data_point() {
    let model = majority(vec![
        parity("even_only", Label::Positive, Label::Abstain),
        parity("odd", Label::Negative, Label::Positive),
    ]);
    let gold = gold_even(6);

    let exploration = model.explore(&gold, "even_only").unwrap();
    assert_eq!(exploration.len(), 6);
    assert_eq!(exploration.segment(Segment::Correct), &[2, 4, 6]);
    assert!(exploration.segment(Segment::Incorrect).is_empty());
    assert_eq!(exploration.segment(Segment::IncorrectAbstain), &[1, 3, 5]);

    let exploration = model.explore(&gold, "odd").unwrap();
    assert_eq!(exploration.segment(Segment::Incorrect), &[1, 2, 3, 4, 5, 6]);

    assert!(model.explore(&gold, "missing").is_err());
}

#[test]
fn test_correlations_of_identical_and_opposed_functions() {
    let model = majority(vec![
        parity("even_a", Label::Positive, Label::Negative),
        parity("even_b", Label::Positive, Label::Negative),
        parity("odd", Label::Negative, Label::Positive),
        labeling_function("constant", |_: &u32| Label::Positive),
    ]);
    let gold = gold_even(8);

    for method in [
        CorrelationMethod::Pearson,
        CorrelationMethod::Spearman,
        CorrelationMethod::Kendall,
    ] {
        let matrix = model.labeling_functions_correlations(&gold, method).unwrap();
        assert_eq!(matrix.dim(), (4, 4));
        assert!((matrix[[0, 1]] - 1.0).abs() < 1e-9, "{}", method);
        assert!((matrix[[0, 2]] + 1.0).abs() < 1e-9, "{}", method);
        assert_eq!(matrix[[0, 3]], 0.0, "{}", method);
        assert_eq!(matrix[[3, 3]], 1.0, "{}", method);
        assert_eq!(matrix[[2, 0]], matrix[[0, 2]]);
    }
}

#[test]
fn test_diagnostics_reject_bad_gold_labels() {
    let model = majority(vec![parity("even", Label::Positive, Label::Negative)]);
    assert!(model.summarize(&[]).is_err());

    let mut mixed = gold_even(4);
    mixed[0].label = "odd".to_string();
    assert!(model.summarize(&mixed).is_err());
    assert!(model
        .labeling_functions_correlations(&mixed, CorrelationMethod::Pearson)
        .is_err());
}

#[test]
fn test_summaries_export_to_csv() {
    let model = majority(vec![
        parity("even", Label::Positive, Label::Negative),
        parity("odd", Label::Negative, Label::Positive),
    ]);
    let gold = gold_even(4);
    let csv = report::summaries_to_csv(&model.summarize(&gold).unwrap()).unwrap();

    let rows: Vec<&str> = csv.lines().collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[1].starts_with("even,KO|OK,1.0,0.0,1.0,4,0,,odd"));

    let matrix = model
        .labeling_functions_correlations(&gold, CorrelationMethod::Pearson)
        .unwrap();
    let mut buffer = Vec::new();
    report::write_correlations(model.core().lf_names(), &matrix, &mut buffer).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    assert_eq!(text.lines().nth(2).unwrap(), "odd,-1.000000,1.000000");
}
