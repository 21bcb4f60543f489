//! Outlier analysis: consensus, the per-scan pipeline and batch runs.

pub mod batch;
pub mod consensus;
pub mod pipeline;

pub use batch::{find_outliers, ScanOutcome};
pub use consensus::{combine, consensus_outliers, outlier_indices, CombinationRule};
pub use pipeline::{Pipeline, PipelineConfig, PipelineStep, ScanAnalysis, StepOutcome};
