//! Running the pipeline over many scans.
//!
//! Scans are independent: each one is loaded and analysed on a blocking
//! worker thread, and a failing scan is recorded without aborting the rest.

use super::pipeline::{Pipeline, ScanAnalysis};
use crate::loader::VolumeLoader;
use anyhow::{anyhow, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of processing one file.
#[derive(Debug)]
pub struct ScanOutcome {
    pub path: PathBuf,
    pub result: Result<ScanAnalysis>,
}

impl ScanOutcome {
    /// Outlier indices, or `None` if the scan failed.
    pub fn outliers(&self) -> Option<&[usize]> {
        self.result.as_ref().ok().map(|a| a.outliers.as_slice())
    }
}

/// Load and analyse every file, at most `concurrency` at a time.
///
/// Outcomes are returned sorted by path.
pub async fn find_outliers(
    files: Vec<PathBuf>,
    pipeline: Arc<Pipeline>,
    loader: Arc<dyn VolumeLoader>,
    concurrency: usize,
    show_progress: bool,
) -> Vec<ScanOutcome> {
    let progress = if show_progress {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} scans ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut outcomes: Vec<ScanOutcome> = stream::iter(files)
        .map(|path| {
            let pipeline = Arc::clone(&pipeline);
            let loader = Arc::clone(&loader);
            let progress = progress.clone();
            async move {
                let task_path = path.clone();
                let result = tokio::task::spawn_blocking(move || analyze_file(&task_path, &pipeline, loader.as_ref()))
                    .await
                    .unwrap_or_else(|e| Err(anyhow!("Scan task failed: {}", e)));

                match &result {
                    Ok(analysis) => info!(
                        "{}: {} outlier frame(s) of {}",
                        path.display(),
                        analysis.outliers.len(),
                        analysis.n_timepoints
                    ),
                    Err(e) => warn!("{}: {:#}", path.display(), e),
                }

                progress.inc(1);
                ScanOutcome { path, result }
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    progress.finish_and_clear();
    outcomes.sort_by(|a, b| a.path.cmp(&b.path));
    outcomes
}

fn analyze_file(path: &std::path::Path, pipeline: &Pipeline, loader: &dyn VolumeLoader) -> Result<ScanAnalysis> {
    let volume = loader.load(path)?;
    let analysis = pipeline.analyze(volume.view())?;
    Ok(analysis)
}
