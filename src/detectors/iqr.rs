//! Interquartile-range detector (Tukey fences).

use super::stats::{percentile, sorted};
use super::Tails;
use crate::error::Result;
use crate::options::{OptionReader, Options};
use ndarray::{Array1, ArrayView1};

/// Registered name.
pub const NAME: &str = "iqr_detector";

/// Flag values outside `[Q1 - k * IQR, Q3 + k * IQR]`.
///
/// Options:
/// - `iqr_proportion` (default 1.5): the fence multiplier `k`.
/// - `pos_only` (default true): only test the upper fence.
/// - `neg_only` (default false): only test the lower fence.
///
/// Setting both `pos_only` and `neg_only` disables both tests.
pub fn iqr_detector(series: ArrayView1<'_, f64>, options: &Options) -> Result<Array1<bool>> {
    let reader = OptionReader::new(NAME, options);
    reader.expect_only(&["iqr_proportion", "pos_only", "neg_only"])?;
    let proportion = reader.f64("iqr_proportion", 1.5)?;
    let tails = Tails::from_options(&reader)?;

    if series.is_empty() {
        return Ok(Array1::from_elem(0, false));
    }

    let ordered = sorted(&series.to_vec());
    let q1 = percentile(&ordered, 25.0);
    let q3 = percentile(&ordered, 75.0);
    let iqr = q3 - q1;

    let upper_fence = q3 + proportion * iqr;
    let lower_fence = q1 - proportion * iqr;

    Ok(series.mapv(|v| tails.flags(v, lower_fence, upper_fence)))
}
