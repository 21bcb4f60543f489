//! Data models for outlier reports.
//!
//! This module contains the serializable structures describing a batch
//! run: one entry per scan plus summary statistics and run metadata.

use crate::analysis::{ScanOutcome, StepOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outlier detection result for a single scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Path to the image file.
    pub path: String,
    /// Number of timepoints in the scan (0 if it failed).
    pub n_timepoints: usize,
    /// Outlier timepoint indices, ascending.
    pub outliers: Vec<usize>,
    /// Per-step flagged indices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepOutcome>,
    /// Error message if the scan failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanResult {
    /// Whether the scan was analysed successfully.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Fraction of timepoints flagged.
    pub fn outlier_fraction(&self) -> f64 {
        if self.n_timepoints == 0 {
            0.0
        } else {
            self.outliers.len() as f64 / self.n_timepoints as f64
        }
    }
}

impl From<ScanOutcome> for ScanResult {
    fn from(outcome: ScanOutcome) -> Self {
        let path = outcome.path.display().to_string();
        match outcome.result {
            Ok(analysis) => Self {
                path,
                n_timepoints: analysis.n_timepoints,
                outliers: analysis.outliers,
                steps: analysis.steps,
                error: None,
            },
            Err(e) => Self {
                path,
                n_timepoints: 0,
                outliers: Vec::new(),
                steps: Vec::new(),
                error: Some(format!("{:#}", e)),
            },
        }
    }
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of scans processed.
    pub scans_total: usize,
    /// Number of scans that failed.
    pub scans_failed: usize,
    /// Number of scans with at least one outlier.
    pub scans_with_outliers: usize,
    /// Total timepoints across successful scans.
    pub total_timepoints: usize,
    /// Total outlier timepoints across successful scans.
    pub total_outliers: usize,
}

impl RunSummary {
    /// Creates a summary from scan results.
    pub fn from_results(results: &[ScanResult]) -> Self {
        let mut summary = Self {
            scans_total: results.len(),
            ..Self::default()
        };

        for result in results {
            if !result.is_ok() {
                summary.scans_failed += 1;
                continue;
            }
            if !result.outliers.is_empty() {
                summary.scans_with_outliers += 1;
            }
            summary.total_timepoints += result.n_timepoints;
            summary.total_outliers += result.outliers.len();
        }

        summary
    }
}

/// Metadata about the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Data directory that was scanned.
    pub data_dir: String,
    /// Date and time of the run.
    pub analysis_date: DateTime<Utc>,
    /// Consensus rule used.
    pub combination: String,
    /// Configured steps, in order.
    pub steps: Vec<String>,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
}

/// The complete outlier report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Metadata about the report.
    pub metadata: ReportMetadata,
    /// Per-scan results, ordered by path.
    pub scans: Vec<ScanResult>,
    /// Summary statistics.
    pub summary: RunSummary,
}

impl Report {
    /// Build a report, computing the summary from `scans`.
    pub fn new(metadata: ReportMetadata, scans: Vec<ScanResult>) -> Self {
        let summary = RunSummary::from_results(&scans);
        Self {
            metadata,
            scans,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::path::PathBuf;

    fn result(path: &str, n: usize, outliers: Vec<usize>) -> ScanResult {
        ScanResult {
            path: path.to_string(),
            n_timepoints: n,
            outliers,
            steps: Vec::new(),
            error: None,
        }
    }

    #[test]
    fn test_summary() {
        let mut failed = result("c.nii", 0, Vec::new());
        failed.error = Some("boom".to_string());
        let results = vec![result("a.nii", 100, vec![3, 40]), result("b.nii", 50, vec![]), failed];

        let summary = RunSummary::from_results(&results);
        assert_eq!(summary.scans_total, 3);
        assert_eq!(summary.scans_failed, 1);
        assert_eq!(summary.scans_with_outliers, 1);
        assert_eq!(summary.total_timepoints, 150);
        assert_eq!(summary.total_outliers, 2);
    }

    #[test]
    fn test_outlier_fraction() {
        assert_eq!(result("a.nii", 100, vec![1, 2]).outlier_fraction(), 0.02);
        assert_eq!(result("a.nii", 0, vec![]).outlier_fraction(), 0.0);
    }

    #[test]
    fn test_from_failed_outcome() {
        let outcome = ScanOutcome {
            path: PathBuf::from("data/sub-01.nii.gz"),
            result: Err(anyhow!("unknown metric: foo")),
        };
        let result = ScanResult::from(outcome);
        assert!(!result.is_ok());
        assert_eq!(result.error.as_deref(), Some("unknown metric: foo"));
        assert!(result.outliers.is_empty());
    }
}
