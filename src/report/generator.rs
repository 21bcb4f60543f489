//! Markdown and JSON report generation.
//!
//! This module renders a batch run's results; the core pipeline itself
//! never writes anything.

use crate::models::{Report, ReportMetadata, RunSummary, ScanResult};
use anyhow::Result;

/// Options controlling Markdown output.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownOptions {
    /// Include the per-step breakdown for each scan.
    pub include_steps: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            include_steps: true,
        }
    }
}

impl From<&crate::config::ReportConfig> for MarkdownOptions {
    fn from(config: &crate::config::ReportConfig) -> Self {
        Self {
            include_steps: config.include_steps,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: MarkdownOptions) -> String {
    let mut output = String::new();

    output.push_str("# Outlier Detection Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(&report.summary));
    output.push_str(&generate_scans_section(&report.scans));

    if options.include_steps {
        output.push_str(&generate_steps_section(&report.scans));
    }

    output.push_str(&generate_failures_section(&report.scans));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Data Directory:** {}\n", metadata.data_dir));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Combination Rule:** `{}`\n", metadata.combination));
    section.push_str("- **Steps:**\n");
    for step in &metadata.steps {
        section.push_str(&format!("  - `{}`\n", step));
    }
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the summary section.
fn generate_summary_section(summary: &RunSummary) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Scans | Failed | With Outliers | Timepoints | Outlier Frames |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} | **{}** |\n\n",
        summary.scans_total,
        summary.scans_failed,
        summary.scans_with_outliers,
        summary.total_timepoints,
        summary.total_outliers
    ));

    section
}

/// Generate the per-scan outlier table.
fn generate_scans_section(scans: &[ScanResult]) -> String {
    let mut section = String::new();

    section.push_str("## Outliers by Scan\n\n");

    let ok: Vec<_> = scans.iter().filter(|s| s.is_ok()).collect();
    if ok.is_empty() {
        section.push_str("No scans were analysed successfully.\n\n");
        return section;
    }

    section.push_str("| Scan | Timepoints | Outliers | Fraction | Indices |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---|\n");

    for scan in ok {
        section.push_str(&format!(
            "| `{}` | {} | {} | {:.1}% | {} |\n",
            scan.path,
            scan.n_timepoints,
            scan.outliers.len(),
            scan.outlier_fraction() * 100.0,
            format_indices(&scan.outliers)
        ));
    }
    section.push('\n');

    section
}

/// Generate the per-step breakdown.
fn generate_steps_section(scans: &[ScanResult]) -> String {
    let with_steps: Vec<_> = scans.iter().filter(|s| !s.steps.is_empty()).collect();
    if with_steps.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Step Breakdown\n\n");

    for scan in with_steps {
        section.push_str(&format!("### {}\n\n", scan.path));
        section.push_str("| Metric | Detector | Flagged |\n");
        section.push_str("|:---|:---|:---|\n");
        for step in &scan.steps {
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                step.metric,
                step.detector,
                format_indices(&step.flagged)
            ));
        }
        section.push('\n');
    }

    section
}

/// Generate the failed scans section.
fn generate_failures_section(scans: &[ScanResult]) -> String {
    let failed: Vec<_> = scans.iter().filter(|s| !s.is_ok()).collect();
    if failed.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Failed Scans\n\n");
    for scan in failed {
        section.push_str(&format!(
            "- `{}`: {}\n",
            scan.path,
            scan.error.as_deref().unwrap_or("unknown error")
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    format!(
        "---\n\n*Report generated by findoutlie v{}*\n",
        env!("CARGO_PKG_VERSION")
    )
}

fn format_indices(indices: &[usize]) -> String {
    if indices.is_empty() {
        return "-".to_string();
    }
    indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StepOutcome;
    use chrono::Utc;

    fn create_test_report() -> Report {
        let metadata = ReportMetadata {
            data_dir: "data".to_string(),
            analysis_date: Utc::now(),
            combination: "any".to_string(),
            steps: vec![
                "dvars -> median_detector".to_string(),
                "coefficient_of_variation -> iqr_detector".to_string(),
            ],
            duration_seconds: 3.2,
        };

        let scans = vec![
            ScanResult {
                path: "data/sub-01_run-01_bold.nii.gz".to_string(),
                n_timepoints: 160,
                outliers: vec![12, 87],
                steps: vec![
                    StepOutcome {
                        metric: "dvars".to_string(),
                        detector: "median_detector".to_string(),
                        flagged: vec![12],
                    },
                    StepOutcome {
                        metric: "coefficient_of_variation".to_string(),
                        detector: "iqr_detector".to_string(),
                        flagged: vec![87],
                    },
                ],
                error: None,
            },
            ScanResult {
                path: "data/sub-02_run-01_bold.nii.gz".to_string(),
                n_timepoints: 0,
                outliers: Vec::new(),
                steps: Vec::new(),
                error: Some("Failed to read NIfTI file".to_string()),
            },
        ];

        Report::new(metadata, scans)
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report, MarkdownOptions::default());

        assert!(markdown.contains("# Outlier Detection Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Summary"));
        assert!(markdown.contains("## Outliers by Scan"));
        assert!(markdown.contains("12, 87"));
        assert!(markdown.contains("## Step Breakdown"));
        assert!(markdown.contains("## Failed Scans"));
        assert!(markdown.contains("Failed to read NIfTI file"));
    }

    #[test]
    fn test_markdown_without_steps() {
        let report = create_test_report();
        let markdown = generate_markdown_report(
            &report,
            MarkdownOptions {
                include_steps: false,
            },
        );
        assert!(!markdown.contains("## Step Breakdown"));
    }

    #[test]
    fn test_format_indices() {
        assert_eq!(format_indices(&[]), "-");
        assert_eq!(format_indices(&[1, 5, 9]), "1, 5, 9");
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"data_dir\""));
        assert!(json.contains("\"scans\""));
        assert!(json.contains("\"outliers\""));
        assert!(json.contains("\"scans_failed\": 1"));
    }
}
