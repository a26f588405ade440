//! CSV export of the diagnostics, for inspection outside of Rust.
use std::io::Write;

use ndarray::Array2;
use serde::Serialize;

use crate::dictionary::Dictionary;
use crate::error::{ensure, LabelModelError, Result};
use crate::stats::Summary;

#[derive(Serialize)]
struct SummaryRow<'a> {
    label: &'a str,
    polarity: String,
    coverage: f64,
    overlaps: f64,
    conflicts: f64,
    correct: i64,
    incorrect: i64,
    labels_overlap: String,
    labels_conflict: String,
}

fn join<'a>(values: impl IntoIterator<Item = &'a String>) -> String {
    values
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("|")
}

impl<'a> From<&'a Summary> for SummaryRow<'a> {
    fn from(summary: &'a Summary) -> Self {
        SummaryRow {
            label: &summary.label,
            polarity: join(&summary.polarity),
            coverage: summary.coverage,
            overlaps: summary.overlaps,
            conflicts: summary.conflicts,
            correct: summary.correct,
            incorrect: summary.incorrect,
            labels_overlap: join(&summary.labels_overlap),
            labels_conflict: join(&summary.labels_conflict),
        }
    }
}

/// Write one CSV row per summary. Set-valued columns are `|`-separated.
pub fn write_summaries<W: Write>(summaries: &[Summary], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for summary in summaries {
        wtr.serialize(SummaryRow::from(summary))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn summaries_to_csv(summaries: &[Summary]) -> Result<String> {
    let mut buffer = Vec::new();
    write_summaries(summaries, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| LabelModelError::State(e.to_string()))
}

/// Write a labeling function correlation matrix with a header row and a
/// leading name column.
pub fn write_correlations<W: Write>(
    lf_names: &Dictionary,
    matrix: &Array2<f64>,
    writer: W,
) -> Result<()> {
    let names = lf_names.names();
    ensure!(
        matrix.dim() == (names.len(), names.len()),
        "matrix of shape {:?} for {} labeling functions",
        matrix.dim(),
        names.len()
    );

    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec![""];
    header.extend(names.iter().copied());
    wtr.write_record(&header)?;

    for (name, row) in names.iter().zip(matrix.rows()) {
        let mut record = vec![name.to_string()];
        record.extend(row.iter().map(|r| format!("{:.6}", r)));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}
