//! Runs the configured (metric, detector) steps on one volume.

use super::consensus::{combine, outlier_indices, CombinationRule};
use crate::detectors::DetectorRegistry;
use crate::error::{OutlierError, Result};
use crate::metrics::MetricRegistry;
use crate::options::Options;
use crate::volume::n_timepoints;
use ndarray::{Array1, Array2, ArrayView4, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// One metric paired with the detector applied to its series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStep {
    /// Registered metric name.
    pub metric: String,
    /// Registered detector name.
    pub detector: String,
    /// Options passed to the metric.
    #[serde(default, skip_serializing_if = "Options::is_empty")]
    pub metric_options: Options,
    /// Options passed to the detector.
    #[serde(default, skip_serializing_if = "Options::is_empty")]
    pub detector_options: Options,
}

impl PipelineStep {
    /// A step with no options.
    pub fn new(metric: impl Into<String>, detector: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            detector: detector.into(),
            metric_options: Options::new(),
            detector_options: Options::new(),
        }
    }

    /// Attach detector options.
    pub fn with_detector_options(mut self, options: Options) -> Self {
        self.detector_options = options;
        self
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.metric, self.detector)
    }
}

/// Ordered steps plus the rule used to merge their masks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Consensus rule.
    #[serde(default = "default_combination")]
    pub combination: CombinationRule,
    /// Steps in evaluation order; each contributes one matrix row.
    #[serde(default = "default_steps")]
    pub steps: Vec<PipelineStep>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            combination: default_combination(),
            steps: default_steps(),
        }
    }
}

fn default_combination() -> CombinationRule {
    CombinationRule::Any
}

fn default_steps() -> Vec<PipelineStep> {
    vec![
        PipelineStep::new("dvars", "median_detector"),
        PipelineStep::new("coefficient_of_variation", "iqr_detector"),
    ]
}

/// Per-step result of a scan analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub metric: String,
    pub detector: String,
    /// Timepoints flagged by this step after alignment.
    pub flagged: Vec<usize>,
}

/// Full result of running the pipeline on one volume.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanAnalysis {
    pub n_timepoints: usize,
    pub steps: Vec<StepOutcome>,
    /// Final per-timepoint decision.
    pub consensus: Array1<bool>,
    /// Ascending indices where `consensus` is true.
    pub outliers: Vec<usize>,
}

/// Metric/detector/consensus pipeline.
///
/// Holds no state between calls; the same volume and configuration always
/// give the same result.
#[derive(Debug, Clone)]
pub struct Pipeline {
    metrics: Arc<MetricRegistry>,
    detectors: Arc<DetectorRegistry>,
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline over explicit registries.
    pub fn new(metrics: Arc<MetricRegistry>, detectors: Arc<DetectorRegistry>, config: PipelineConfig) -> Self {
        Self {
            metrics,
            detectors,
            config,
        }
    }

    /// Create a pipeline over the built-in metrics and detectors.
    pub fn with_builtins(config: PipelineConfig) -> Self {
        Self::new(
            Arc::new(MetricRegistry::with_builtins()),
            Arc::new(DetectorRegistry::with_builtins()),
            config,
        )
    }

    /// Check every configured name against the registries.
    pub fn validate(&self) -> Result<()> {
        for step in &self.config.steps {
            if !self.metrics.contains(&step.metric) {
                return Err(OutlierError::UnknownMetric(step.metric.clone()));
            }
            if !self.detectors.contains(&step.detector) {
                return Err(OutlierError::UnknownDetector(step.detector.clone()));
            }
        }
        Ok(())
    }

    /// Run every step on `volume` and combine the masks.
    ///
    /// Names are validated before anything is computed, so a misconfigured
    /// step fails the scan before any detector runs.
    pub fn analyze(&self, volume: ArrayView4<'_, f64>) -> Result<ScanAnalysis> {
        self.validate()?;

        let n = n_timepoints(&volume);
        let mut matrix = Array2::from_elem((self.config.steps.len(), n), false);
        let mut steps = Vec::with_capacity(self.config.steps.len());

        for (step, mut row) in self.config.steps.iter().zip(matrix.axis_iter_mut(Axis(0))) {
            let series = self.metrics.compute(&step.metric, volume.view(), &step.metric_options)?;
            let mask = self
                .detectors
                .detect(&step.detector, series.view(), n, &step.detector_options)?;

            let flagged = outlier_indices(&mask);
            debug!("Step {} flagged {:?}", step, flagged);

            row.assign(&mask);
            steps.push(StepOutcome {
                metric: step.metric.clone(),
                detector: step.detector.clone(),
                flagged,
            });
        }

        let consensus = combine(matrix.view(), self.config.combination);
        let outliers = outlier_indices(&consensus);
        info!(
            "{} of {} timepoints flagged (rule: {})",
            outliers.len(),
            n,
            self.config.combination
        );

        Ok(ScanAnalysis {
            n_timepoints: n,
            steps,
            consensus,
            outliers,
        })
    }

    /// Ascending indices of the outlier timepoints in `volume`.
    pub fn detect_outliers(&self, volume: ArrayView4<'_, f64>) -> Result<Vec<usize>> {
        Ok(self.analyze(volume)?.outliers)
    }
}
