use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, OrderStatistics, RankTieBreaker, Statistics};

use crate::dictionary::Dictionary;
use crate::error::{ensure, Result};
use crate::feature_vector::FeatureVector;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationMethod {
    #[default]
    Pearson,
    Spearman,
    Kendall,
}

impl FromStr for CorrelationMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pearson" => Ok(CorrelationMethod::Pearson),
            "spearman" => Ok(CorrelationMethod::Spearman),
            "kendall" => Ok(CorrelationMethod::Kendall),
            _ => Err(format!(
                "Unknown correlation method: {}. Expected one of: pearson, spearman, kendall",
                s
            )),
        }
    }
}

impl fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CorrelationMethod::Pearson => "pearson",
            CorrelationMethod::Spearman => "spearman",
            CorrelationMethod::Kendall => "kendall",
        };
        f.write_str(s)
    }
}

impl CorrelationMethod {
    /// Correlation coefficient of two equally long samples. May be NaN when
    /// one of the samples is constant.
    pub fn coefficient(self, x: &[f64], y: &[f64]) -> f64 {
        match self {
            CorrelationMethod::Pearson => pearson(x, y),
            CorrelationMethod::Spearman => pearson(&ranks(x), &ranks(y)),
            CorrelationMethod::Kendall => kendall_tau_b(x, y),
        }
    }
}

/// Pairwise correlation of the labeling functions' outputs.
///
/// Row and column `i` of the returned matrix correspond to the `i`-th entry
/// of `lf_names`. The diagonal is 1 and non-finite coefficients (a function
/// that always emits the same value) are reported as 0.
pub fn labeling_functions_correlations<D>(
    lf_names: &Dictionary,
    instances: &[(D, FeatureVector<i32>)],
    method: CorrelationMethod,
) -> Result<Array2<f64>> {
    let nb_lfs = lf_names.size();
    ensure!(
        instances.iter().all(|(_, vector)| vector.len() == nb_lfs),
        "every vector must have {} cells",
        nb_lfs
    );

    // One column per labeling function.
    let columns: Vec<Vec<f64>> = (0..nb_lfs)
        .map(|i| instances.iter().map(|(_, vector)| vector[i] as f64).collect())
        .collect();

    let upper: Vec<Vec<f64>> = (0..nb_lfs)
        .into_par_iter()
        .map(|i| {
            ((i + 1)..nb_lfs)
                .map(|j| {
                    let r = method.coefficient(&columns[i], &columns[j]);
                    if r.is_finite() {
                        r
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect();

    let mut matrix = Array2::<f64>::eye(nb_lfs);
    for (i, row) in upper.into_iter().enumerate() {
        for (offset, r) in row.into_iter().enumerate() {
            let j = i + 1 + offset;
            matrix[[i, j]] = r;
            matrix[[j, i]] = r;
        }
    }

    log::trace!("Computed {}x{} {} correlation matrix", nb_lfs, nb_lfs, method);

    Ok(matrix)
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }
    let covariance = x.iter().covariance(y.iter());
    covariance / (x.iter().std_dev() * y.iter().std_dev())
}

fn ranks(x: &[f64]) -> Vec<f64> {
    Data::new(x.to_vec()).ranks(RankTieBreaker::Average)
}

/// Kendall's tau-b, which accounts for ties in either sample.
fn kendall_tau_b(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return f64::NAN;
    }

    let mut concordant = 0i64;
    let mut discordant = 0i64;
    let mut ties_x = 0i64;
    let mut ties_y = 0i64;

    for i in 0..x.len() {
        for j in (i + 1)..x.len() {
            let dx = x[i].partial_cmp(&x[j]).unwrap_or(Ordering::Equal);
            let dy = y[i].partial_cmp(&y[j]).unwrap_or(Ordering::Equal);
            match (dx, dy) {
                (Ordering::Equal, Ordering::Equal) => {}
                (Ordering::Equal, _) => ties_x += 1,
                (_, Ordering::Equal) => ties_y += 1,
                (a, b) if a == b => concordant += 1,
                _ => discordant += 1,
            }
        }
    }

    let n0 = (concordant + discordant + ties_x) as f64;
    let n1 = (concordant + discordant + ties_y) as f64;
    (concordant - discordant) as f64 / (n0 * n1).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instances(rows: &[&[i32]]) -> Vec<((), FeatureVector<i32>)> {
        rows.iter()
            .map(|row| ((), FeatureVector::from_vec(row.to_vec())))
            .collect()
    }

    #[test]
    fn test_identical_and_opposite_functions() {
        let lfs = Dictionary::from_names(["a", "b", "c"]).unwrap();
        let data = instances(&[&[1, 1, 0], &[0, 0, 1], &[1, 1, 0], &[-1, -1, 1]]);

        for method in [
            CorrelationMethod::Pearson,
            CorrelationMethod::Spearman,
            CorrelationMethod::Kendall,
        ] {
            let matrix = labeling_functions_correlations(&lfs, &data, method).unwrap();
            assert_eq!(matrix.dim(), (3, 3));
            for i in 0..3 {
                assert_eq!(matrix[[i, i]], 1.0);
            }
            assert!((matrix[[0, 1]] - 1.0).abs() < 1e-9, "{}", method);
            assert!(matrix[[0, 2]] < 0.0, "{}", method);
            assert_eq!(matrix[[0, 2]], matrix[[2, 0]]);
        }
    }

    #[test]
    fn test_constant_function_is_forced_to_zero() {
        let lfs = Dictionary::from_names(["a", "b"]).unwrap();
        let data = instances(&[&[1, 1], &[1, 0], &[1, -1]]);

        let matrix =
            labeling_functions_correlations(&lfs, &data, CorrelationMethod::Pearson).unwrap();
        assert_eq!(matrix[[0, 1]], 0.0);
        assert_eq!(matrix[[1, 1]], 1.0);
    }

    #[test]
    fn test_kendall_with_ties() {
        let tau = kendall_tau_b(&[1.0, 2.0, 2.0, 3.0], &[1.0, 2.0, 3.0, 4.0]);
        assert!(tau > 0.9 && tau < 1.0);
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!(
            "Spearman".parse::<CorrelationMethod>().unwrap(),
            CorrelationMethod::Spearman
        );
        assert!("cosine".parse::<CorrelationMethod>().is_err());
    }
}
