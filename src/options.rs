//! Keyword options for metrics and detectors.
//!
//! Options are carried as a JSON object so that they can come straight from
//! the TOML configuration or be built in code with `serde_json::json!`.

use crate::error::{OutlierError, Result};
use serde_json::{Map, Value};

/// Keyword options passed to a metric or detector.
pub type Options = Map<String, Value>;

/// Typed, validated access to an [`Options`] map.
pub struct OptionReader<'a> {
    target: &'a str,
    options: &'a Options,
}

impl<'a> OptionReader<'a> {
    /// Create a reader for the metric or detector named `target`.
    pub fn new(target: &'a str, options: &'a Options) -> Self {
        Self { target, options }
    }

    /// Reject any key not listed in `known`.
    pub fn expect_only(&self, known: &[&str]) -> Result<()> {
        match self.options.keys().find(|k| !known.contains(&k.as_str())) {
            Some(key) => Err(self.invalid(key, "not a recognised option")),
            None => Ok(()),
        }
    }

    /// Read a numeric option, falling back to `default` when absent.
    pub fn f64(&self, key: &str, default: f64) -> Result<f64> {
        match self.options.get(key) {
            None => Ok(default),
            Some(value) => value
                .as_f64()
                .ok_or_else(|| self.invalid(key, &format!("expected a number, got {}", value))),
        }
    }

    /// Read a boolean option, falling back to `default` when absent.
    pub fn bool(&self, key: &str, default: bool) -> Result<bool> {
        match self.options.get(key) {
            None => Ok(default),
            Some(value) => value
                .as_bool()
                .ok_or_else(|| self.invalid(key, &format!("expected a boolean, got {}", value))),
        }
    }

    fn invalid(&self, key: &str, reason: &str) -> OutlierError {
        OutlierError::InvalidOption {
            target: self.target.to_string(),
            option: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: Value) -> Options {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_defaults_when_absent() {
        let opts = Options::new();
        let reader = OptionReader::new("iqr_detector", &opts);
        assert_eq!(reader.f64("iqr_proportion", 1.5).unwrap(), 1.5);
        assert!(reader.bool("pos_only", true).unwrap());
    }

    #[test]
    fn test_integer_reads_as_f64() {
        let opts = options(json!({ "scale": 3 }));
        let reader = OptionReader::new("median_detector", &opts);
        assert_eq!(reader.f64("scale", 5.0).unwrap(), 3.0);
    }

    #[test]
    fn test_wrong_type_rejected() {
        let opts = options(json!({ "pos_only": "yes" }));
        let reader = OptionReader::new("iqr_detector", &opts);
        let err = reader.bool("pos_only", true).unwrap_err();
        assert!(matches!(err, OutlierError::InvalidOption { .. }));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let opts = options(json!({ "threshold": 2.0 }));
        let reader = OptionReader::new("iqr_detector", &opts);
        assert!(reader.expect_only(&["iqr_proportion"]).is_err());
        assert!(reader.expect_only(&["threshold"]).is_ok());
    }
}
