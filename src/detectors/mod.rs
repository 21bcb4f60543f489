//! Outlier detectors and the registry that dispatches them by name.
//!
//! A detector maps a metric series to a boolean mask of the same length,
//! where `true` marks an outlier. [`DetectorRegistry::detect`] additionally
//! aligns the mask to the scan's timepoints.

pub mod iqr;
pub mod mad;
pub mod stats;

pub use iqr::iqr_detector;
pub use mad::median_detector;

use crate::error::{OutlierError, Result};
use crate::options::{OptionReader, Options};
use ndarray::{s, Array1, ArrayView1};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A registered detector function.
pub type DetectorFn = Arc<dyn Fn(ArrayView1<'_, f64>, &Options) -> Result<Array1<bool>> + Send + Sync>;

/// Which side(s) of the threshold band are tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tails {
    pub upper: bool,
    pub lower: bool,
}

impl Tails {
    /// Read `pos_only` (default true) and `neg_only` (default false).
    ///
    /// `pos_only` suppresses the lower test and `neg_only` the upper one,
    /// so setting both leaves nothing to test.
    pub fn from_options(reader: &OptionReader<'_>) -> Result<Self> {
        let pos_only = reader.bool("pos_only", true)?;
        let neg_only = reader.bool("neg_only", false)?;
        Ok(Self {
            upper: !neg_only,
            lower: !pos_only,
        })
    }

    /// Whether `value` falls outside the band on an enabled side.
    pub fn flags(&self, value: f64, lower: f64, upper: f64) -> bool {
        (self.upper && value > upper) || (self.lower && value < lower)
    }
}

/// Name-to-detector lookup table.
#[derive(Clone, Default)]
pub struct DetectorRegistry {
    detectors: HashMap<String, DetectorFn>,
}

impl DetectorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in detectors.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(iqr::NAME, iqr_detector);
        registry.register(mad::NAME, median_detector);
        registry
    }

    /// Register `detector` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, detector: F)
    where
        F: Fn(ArrayView1<'_, f64>, &Options) -> Result<Array1<bool>> + Send + Sync + 'static,
    {
        self.detectors.insert(name.into(), Arc::new(detector));
    }

    /// Whether a detector is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.detectors.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.detectors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run the detector registered under `name` and align its mask to
    /// `n_timepoints`.
    ///
    /// A series shorter than `n_timepoints` (e.g. from a difference-based
    /// metric) is left-padded with non-outlier entries. A longer series is
    /// an error and is never truncated.
    pub fn detect(
        &self,
        name: &str,
        series: ArrayView1<'_, f64>,
        n_timepoints: usize,
        options: &Options,
    ) -> Result<Array1<bool>> {
        let detector = self
            .detectors
            .get(name)
            .ok_or_else(|| OutlierError::UnknownDetector(name.to_string()))?;

        if series.len() > n_timepoints {
            return Err(OutlierError::ShapeMismatch {
                series_len: series.len(),
                n_timepoints,
            });
        }

        let mask = detector(series, options)?;
        if mask.len() != series.len() {
            return Err(OutlierError::DetectorOutputMismatch {
                detector: name.to_string(),
                mask_len: mask.len(),
                series_len: series.len(),
            });
        }

        let pad = n_timepoints - mask.len();
        debug!(
            "Detector {} flagged {} of {} values (padding {})",
            name,
            mask.iter().filter(|&&f| f).count(),
            mask.len(),
            pad
        );

        let mut aligned = Array1::from_elem(n_timepoints, false);
        aligned.slice_mut(s![pad..]).assign(&mask);
        Ok(aligned)
    }
}

impl fmt::Debug for DetectorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectorRegistry")
            .field("detectors", &self.names())
            .finish()
    }
}
