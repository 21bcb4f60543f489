//! Error types for the outlier detection core.
//!
//! Every variant is a deterministic configuration or data error. They are
//! raised where detected and propagated unchanged up to the pipeline caller.

use thiserror::Error;

/// Errors raised by metrics, detectors, dispatch and consensus.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OutlierError {
    /// No metric is registered under this name.
    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    /// No detector is registered under this name.
    #[error("unknown detector: {0}")]
    UnknownDetector(String),

    /// Combination rule is neither `all` nor `any`.
    #[error("unknown combination rule: {0} (expected 'all' or 'any')")]
    UnknownCombinationRule(String),

    /// The volume is too small for the requested metric.
    #[error("insufficient data for {metric}: {reason}")]
    InsufficientData { metric: String, reason: String },

    /// A metric series is longer than the number of timepoints.
    #[error("series of length {series_len} does not fit {n_timepoints} timepoints")]
    ShapeMismatch {
        series_len: usize,
        n_timepoints: usize,
    },

    /// A detector returned a mask whose length differs from its input series.
    #[error("detector {detector} returned {mask_len} flags for a series of length {series_len}")]
    DetectorOutputMismatch {
        detector: String,
        mask_len: usize,
        series_len: usize,
    },

    /// A keyword option is unknown or has the wrong type.
    #[error("invalid option '{option}' for {target}: {reason}")]
    InvalidOption {
        target: String,
        option: String,
        reason: String,
    },
}

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, OutlierError>;
