use ndarray::Array2;
use rayon::prelude::*;

use crate::dictionary::Dictionary;
use crate::error::{ensure, LabelModelError, Result};
use crate::feature_vector::FeatureVector;
use crate::labels::{GoldLabel, Label, SharedLabelingFunction};
use crate::metrics::ConfusionMatrix;
use crate::stats::{self, CorrelationMethod, Exploration, Summary};

/// State shared by every label model: the labeling functions and the two
/// dictionaries naming them and the labels they emit.
pub struct LabelModelCore<D> {
    lf_names: Dictionary,
    label_names: Dictionary,
    lfs: Vec<SharedLabelingFunction<D>>,
}

impl<D> LabelModelCore<D> {
    /// `lfs[i]` must be named `lf_names.label(i)` and `label_names` must hold
    /// exactly the two binary labels.
    pub fn new(
        lf_names: Dictionary,
        label_names: Dictionary,
        lfs: Vec<SharedLabelingFunction<D>>,
    ) -> Result<Self> {
        ensure!(
            label_names.size() == 2,
            "label dictionary must have 2 entries, got {}",
            label_names.size()
        );
        ensure!(
            lf_names.size() == lfs.len(),
            "{} labeling functions for a dictionary of {} names",
            lfs.len(),
            lf_names.size()
        );
        for (i, lf) in lfs.iter().enumerate() {
            let expected = lf_names.label(i)?;
            ensure!(
                lf.name() == expected,
                "labeling function at position {} is '{}', dictionary expects '{}'",
                i,
                lf.name(),
                expected
            );
        }
        Ok(Self {
            lf_names,
            label_names,
            lfs,
        })
    }

    /// Build the name dictionary from the functions themselves.
    pub fn from_labeling_functions(
        label_names: Dictionary,
        lfs: Vec<SharedLabelingFunction<D>>,
    ) -> Result<Self> {
        let lf_names = Dictionary::from_names(lfs.iter().map(|lf| lf.name().to_string()))?;
        Self::new(lf_names, label_names, lfs)
    }

    pub fn lf_names(&self) -> &Dictionary {
        &self.lf_names
    }

    pub fn label_names(&self) -> &Dictionary {
        &self.label_names
    }

    pub fn lfs(&self) -> &[SharedLabelingFunction<D>] {
        &self.lfs
    }

    /// Apply every labeling function to `data`.
    pub fn vectorize(&self, data: &D) -> FeatureVector<i32> {
        self.lfs.iter().map(|lf| lf.apply(data).value()).collect()
    }
}

impl<D: Clone + Send + Sync> LabelModelCore<D> {
    /// Label the data of every gold label. Returns the label matrix along
    /// with the binary ground truth of each row.
    pub fn label_gold(
        &self,
        gold_labels: &[GoldLabel<D>],
    ) -> (Vec<(D, FeatureVector<i32>)>, Vec<Label>) {
        let instances = gold_labels
            .par_iter()
            .map(|gold| (gold.data.clone(), self.vectorize(&gold.data)))
            .collect();
        let truth = gold_labels.iter().map(GoldLabel::binary_label).collect();
        (instances, truth)
    }
}

/// Gold labels used for fitting or diagnostics must be non-empty and share
/// one category.
pub fn check_gold_labels<D>(gold_labels: &[GoldLabel<D>]) -> Result<()> {
    let first = gold_labels
        .first()
        .ok_or_else(|| LabelModelError::Precondition("gold labels must not be empty".into()))?;
    if let Some(other) = gold_labels.iter().find(|gold| gold.label != first.label) {
        return Err(LabelModelError::Precondition(format!(
            "gold labels mix categories '{}' and '{}'",
            first.label, other.label
        )));
    }
    Ok(())
}

/// Lifecycle and diagnostics shared by the label models.
///
/// `fit` prepares the model from gold labels and `predict` turns data points
/// into one binary prediction each. The diagnostics label the gold data with
/// every labeling function and hand the resulting matrix to [`crate::stats`].
pub trait LabelModel<D: Clone + Send + Sync>: Send + Sync {
    fn core(&self) -> &LabelModelCore<D>;

    fn fit(&mut self, gold_labels: &[GoldLabel<D>]) -> Result<()>;

    fn predict(&self, data: &[D]) -> Result<Vec<Label>>;

    fn is_fitted(&self) -> bool;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "label_model"
    }

    fn summarize(&self, gold_labels: &[GoldLabel<D>]) -> Result<Vec<Summary>> {
        check_gold_labels(gold_labels)?;
        let core = self.core();
        let (instances, truth) = core.label_gold(gold_labels);
        stats::summarize(core.lf_names(), core.label_names(), &instances, Some(&truth))
    }

    fn explore(&self, gold_labels: &[GoldLabel<D>], lf_name: &str) -> Result<Exploration<D>> {
        check_gold_labels(gold_labels)?;
        let core = self.core();
        let (instances, truth) = core.label_gold(gold_labels);
        stats::explore(core.lf_names(), &instances, &truth, lf_name)
    }

    fn labeling_functions_correlations(
        &self,
        gold_labels: &[GoldLabel<D>],
        method: CorrelationMethod,
    ) -> Result<Array2<f64>> {
        check_gold_labels(gold_labels)?;
        let core = self.core();
        let (instances, _) = core.label_gold(gold_labels);
        stats::labeling_functions_correlations(core.lf_names(), &instances, method)
    }

    /// Score the model's predictions against the gold labels. An abstained
    /// prediction counts as NEGATIVE.
    fn confusion_matrix(&self, gold_labels: &[GoldLabel<D>]) -> Result<ConfusionMatrix> {
        check_gold_labels(gold_labels)?;
        let data: Vec<D> = gold_labels.iter().map(|gold| gold.data.clone()).collect();
        let predictions = self.predict(&data)?;

        let mut matrix = ConfusionMatrix::new();
        for (gold, prediction) in gold_labels.iter().zip(predictions) {
            let prediction = if prediction.is_abstain() {
                Label::Negative
            } else {
                prediction
            };
            matrix.add(gold.binary_label(), prediction)?;
        }
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{label_dictionary, labeling_function, Outcome};

    fn positive_if_even() -> SharedLabelingFunction<i32> {
        labeling_function("even", |x: &i32| {
            if x % 2 == 0 {
                Label::Positive
            } else {
                Label::Abstain
            }
        })
    }

    #[test]
    fn test_core_checks_names_and_sizes() {
        let lf_names = Dictionary::from_names(["even"]).unwrap();
        assert!(LabelModelCore::new(lf_names.clone(), label_dictionary(), vec![positive_if_even()]).is_ok());

        let wrong = Dictionary::from_names(["odd"]).unwrap();
        assert!(LabelModelCore::new(wrong, label_dictionary(), vec![positive_if_even()]).is_err());

        assert!(LabelModelCore::<i32>::new(lf_names.clone(), label_dictionary(), vec![]).is_err());

        let three_labels = Dictionary::from_names(["KO", "OK", "MAYBE"]).unwrap();
        assert!(LabelModelCore::new(lf_names, three_labels, vec![positive_if_even()]).is_err());
    }

    #[test]
    fn test_vectorize_and_label_gold() {
        let core =
            LabelModelCore::from_labeling_functions(label_dictionary(), vec![positive_if_even()])
                .unwrap();
        assert_eq!(core.vectorize(&4).as_slice(), &[1]);
        assert_eq!(core.vectorize(&3).as_slice(), &[-1]);

        let gold = vec![
            GoldLabel::new("1", "even", 2, Outcome::TruePositive),
            GoldLabel::new("2", "even", 3, Outcome::TrueNegative),
        ];
        let (instances, truth) = core.label_gold(&gold);
        assert_eq!(instances[0].0, 2);
        assert_eq!(instances[1].1.as_slice(), &[-1]);
        assert_eq!(truth, vec![Label::Positive, Label::Negative]);
    }

    #[test]
    fn test_gold_label_checks() {
        let empty: Vec<GoldLabel<i32>> = Vec::new();
        assert!(check_gold_labels(&empty).is_err());

        let mixed = vec![
            GoldLabel::new("1", "a", 1, Outcome::TruePositive),
            GoldLabel::new("2", "b", 2, Outcome::TrueNegative),
        ];
        assert!(check_gold_labels(&mixed).is_err());
    }
}
