//! Median / scaled-MAD detector.

use super::stats::{median, median_absolute_deviation};
use super::Tails;
use crate::error::Result;
use crate::options::{OptionReader, Options};
use ndarray::{Array1, ArrayView1};
use statrs::function::erf::erfc_inv;

/// Registered name.
pub const NAME: &str = "median_detector";

/// Factor making the MAD a consistent estimator of the standard deviation
/// for normal data: `1 / (sqrt(2) * |erfcinv(3/2)|)`, about 1.4826.
pub fn mad_scale_factor() -> f64 {
    1.0 / (std::f64::consts::SQRT_2 * erfc_inv(1.5).abs())
}

/// Flag values more than `scale` scaled MADs away from the median.
///
/// Options:
/// - `scale` (default 5): threshold in scaled-MAD units.
/// - `pos_only` (default true): only test values above the median.
/// - `neg_only` (default false): only test values below the median.
pub fn median_detector(series: ArrayView1<'_, f64>, options: &Options) -> Result<Array1<bool>> {
    let reader = OptionReader::new(NAME, options);
    reader.expect_only(&["scale", "pos_only", "neg_only"])?;
    let scale = reader.f64("scale", 5.0)?;
    let tails = Tails::from_options(&reader)?;

    if series.is_empty() {
        return Ok(Array1::from_elem(0, false));
    }

    let values = series.to_vec();
    let center = median(&values);
    let scaled_mad = mad_scale_factor() * median_absolute_deviation(&values, center);

    let upper = center + scale * scaled_mad;
    let lower = center - scale * scaled_mad;

    Ok(series.mapv(|v| tails.flags(v, lower, upper)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use serde_json::json;

    fn opts(value: serde_json::Value) -> Options {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_scale_factor() {
        assert!((mad_scale_factor() - 1.4826).abs() < 1e-4);
    }

    #[test]
    fn test_flags_spike() {
        let series = array![10.0, 11.0, 9.0, 10.5, 9.5, 10.0, 60.0, 10.2];
        let mask = median_detector(series.view(), &Options::new()).unwrap();
        assert_eq!(mask.iter().filter(|&&f| f).count(), 1);
        assert!(mask[6]);
    }

    #[test]
    fn test_scale_controls_threshold() {
        // median 10, MAD 1 -> scaled MAD ~1.4826
        let series = array![9.0, 10.0, 11.0, 10.0, 9.0, 11.0, 10.0, 14.0];
        let strict = median_detector(series.view(), &opts(json!({ "scale": 2 }))).unwrap();
        let loose = median_detector(series.view(), &opts(json!({ "scale": 5 }))).unwrap();
        assert!(strict[7]);
        assert!(!loose[7]);
    }

    #[test]
    fn test_lower_tail() {
        let series = array![10.0, 11.0, 9.0, 10.5, 9.5, 10.0, -40.0, 10.2];
        let upper_only = median_detector(series.view(), &Options::new()).unwrap();
        assert!(!upper_only[6]);

        let lower_only = median_detector(
            series.view(),
            &opts(json!({ "pos_only": false, "neg_only": true })),
        )
        .unwrap();
        assert!(lower_only[6]);
    }

    #[test]
    fn test_constant_series() {
        let series = Array1::from_elem(9, -2.0);
        let mask = median_detector(series.view(), &opts(json!({ "pos_only": false }))).unwrap();
        assert!(mask.iter().all(|&f| !f));
    }

    #[test]
    fn test_nan_in_series_flags_nothing() {
        let series = array![1.0, 2.0, 3.0, 4.0, 5.0, 100.0, f64::NAN];
        let mask = median_detector(series.view(), &opts(json!({ "pos_only": false }))).unwrap();
        assert_eq!(mask.len(), 7);
        assert!(mask.iter().all(|&f| !f));
    }

    #[test]
    fn test_bad_option_type() {
        let series = array![1.0, 2.0, 3.0];
        assert!(median_detector(series.view(), &opts(json!({ "scale": "five" }))).is_err());
    }
}
