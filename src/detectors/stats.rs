//! Order statistics shared by the detectors.

/// Sort a copy of `values` in ascending order.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Compute percentile `p` (0-100) of sorted data using linear interpolation.
///
/// Any NaN in the data makes the result NaN, so thresholds derived from it
/// never compare true and nothing is flagged.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() || sorted.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;

    if upper >= sorted.len() {
        sorted[sorted.len() - 1]
    } else {
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

/// Median of unsorted data.
pub fn median(values: &[f64]) -> f64 {
    percentile(&sorted(values), 50.0)
}

/// Median absolute deviation about the median.
pub fn median_absolute_deviation(values: &[f64], center: f64) -> f64 {
    let deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    median(&deviations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates() {
        let data = sorted(&[5.0, 1.0, 100.0, 3.0, 2.0, 4.0]);
        assert!((percentile(&data, 25.0) - 2.25).abs() < 1e-12);
        assert!((percentile(&data, 75.0) - 4.75).abs() < 1e-12);
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), 2.5);
    }

    #[test]
    fn test_mad() {
        let values = [1.0, 1.0, 2.0, 2.0, 4.0, 6.0, 9.0];
        let center = median(&values);
        assert_eq!(center, 2.0);
        assert_eq!(median_absolute_deviation(&values, center), 1.0);
    }

    #[test]
    fn test_empty_is_nan() {
        assert!(median(&[]).is_nan());
    }

    #[test]
    fn test_nan_propagates() {
        let data = sorted(&[1.0, 2.0, f64::NAN, 4.0]);
        assert!(percentile(&data, 25.0).is_nan());
        assert!(median(&[1.0, f64::NAN, 3.0]).is_nan());
        assert!(median(&[-f64::NAN, 1.0, 3.0]).is_nan());
        assert!(median_absolute_deviation(&[1.0, 2.0, 3.0], f64::NAN).is_nan());
    }
}
