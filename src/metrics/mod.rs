//! Per-timepoint metrics and the registry that dispatches them by name.
//!
//! A metric maps a volume to a series with one value per timepoint, or one
//! value per consecutive pair of timepoints for difference-based metrics.
//! New metrics are added with [`MetricRegistry::register`].

pub mod dvars;
pub mod variation;

pub use dvars::dvars;
pub use variation::coefficient_of_variation;

use crate::error::{OutlierError, Result};
use crate::options::Options;
use ndarray::{Array1, ArrayView4};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A registered metric function.
pub type MetricFn = Arc<dyn Fn(ArrayView4<'_, f64>, &Options) -> Result<Array1<f64>> + Send + Sync>;

/// Name-to-metric lookup table.
#[derive(Clone, Default)]
pub struct MetricRegistry {
    metrics: HashMap<String, MetricFn>,
}

impl MetricRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in metrics.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(dvars::NAME, dvars);
        registry.register(variation::NAME, coefficient_of_variation);
        registry
    }

    /// Register `metric` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, metric: F)
    where
        F: Fn(ArrayView4<'_, f64>, &Options) -> Result<Array1<f64>> + Send + Sync + 'static,
    {
        self.metrics.insert(name.into(), Arc::new(metric));
    }

    /// Whether a metric is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.metrics.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.metrics.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Compute the metric registered under `name`.
    pub fn compute(&self, name: &str, volume: ArrayView4<'_, f64>, options: &Options) -> Result<Array1<f64>> {
        let metric = self
            .metrics
            .get(name)
            .ok_or_else(|| OutlierError::UnknownMetric(name.to_string()))?;

        debug!("Computing metric {} on volume {:?}", name, volume.dim());
        metric(volume, options)
    }
}

impl fmt::Debug for MetricRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricRegistry")
            .field("metrics", &self.names())
            .finish()
    }
}
