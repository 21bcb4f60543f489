//! Combining per-metric outlier masks into one verdict per timepoint.

use crate::error::{OutlierError, Result};
use ndarray::{Array1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the rows of an outlier matrix are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombinationRule {
    /// Outlier only if every metric flags the timepoint.
    All,
    /// Outlier if at least one metric flags the timepoint.
    Any,
}

impl fmt::Display for CombinationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombinationRule::All => write!(f, "all"),
            CombinationRule::Any => write!(f, "any"),
        }
    }
}

impl FromStr for CombinationRule {
    type Err = OutlierError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(CombinationRule::All),
            "any" => Ok(CombinationRule::Any),
            other => Err(OutlierError::UnknownCombinationRule(other.to_string())),
        }
    }
}

/// Combine an outlier matrix (rows = metrics, columns = timepoints).
///
/// A matrix without rows carries no evidence and yields an all-false mask.
pub fn combine(matrix: ArrayView2<'_, bool>, rule: CombinationRule) -> Array1<bool> {
    let n_rows = matrix.nrows();
    if n_rows == 0 {
        return Array1::from_elem(matrix.ncols(), false);
    }

    matrix
        .axis_iter(Axis(1))
        .map(|column| {
            let flagged = column.iter().filter(|&&f| f).count();
            match rule {
                CombinationRule::All => flagged == n_rows,
                CombinationRule::Any => flagged > 0,
            }
        })
        .collect()
}

/// Combine an outlier matrix using a rule given by name.
pub fn consensus_outliers(matrix: ArrayView2<'_, bool>, rule: &str) -> Result<Array1<bool>> {
    Ok(combine(matrix, rule.parse()?))
}

/// Indices of the `true` entries, ascending.
pub fn outlier_indices(mask: &Array1<bool>) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(i, &flagged)| flagged.then_some(i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn matrix() -> Array2<bool> {
        array![[false, true, false], [true, true, false]]
    }

    #[test]
    fn test_any() {
        let mask = combine(matrix().view(), CombinationRule::Any);
        assert_eq!(mask.to_vec(), vec![true, true, false]);
    }

    #[test]
    fn test_all() {
        let mask = combine(matrix().view(), CombinationRule::All);
        assert_eq!(mask.to_vec(), vec![false, true, false]);
    }

    #[test]
    fn test_all_subset_of_any() {
        let m = array![
            [true, false, true, false, true],
            [true, true, false, false, true],
            [false, true, true, false, true]
        ];
        let all = combine(m.view(), CombinationRule::All);
        let any = combine(m.view(), CombinationRule::Any);
        for (a, b) in all.iter().zip(any.iter()) {
            assert!(!a || *b);
        }
    }

    #[test]
    fn test_unknown_rule() {
        let err = consensus_outliers(matrix().view(), "majority").unwrap_err();
        assert_eq!(err, OutlierError::UnknownCombinationRule("majority".to_string()));
    }

    #[test]
    fn test_rule_by_name() {
        let mask = consensus_outliers(matrix().view(), "all").unwrap();
        assert_eq!(mask.to_vec(), vec![false, true, false]);
    }

    #[test]
    fn test_empty_matrix() {
        let m = Array2::<bool>::from_elem((0, 4), false);
        assert_eq!(combine(m.view(), CombinationRule::All).to_vec(), vec![false; 4]);
        assert_eq!(combine(m.view(), CombinationRule::Any).to_vec(), vec![false; 4]);
    }

    #[test]
    fn test_outlier_indices() {
        let mask = array![false, true, false, true];
        assert_eq!(outlier_indices(&mask), vec![1, 3]);
    }

    #[test]
    fn test_display_roundtrip() {
        for rule in [CombinationRule::All, CombinationRule::Any] {
            assert_eq!(rule.to_string().parse::<CombinationRule>().unwrap(), rule);
        }
    }
}
