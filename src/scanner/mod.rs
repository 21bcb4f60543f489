//! Discovery of functional runs in a data directory.
//!
//! Walks the directory tree and keeps image files matching the configured
//! name prefix and extensions, skipping hidden and excluded directories.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Configuration for dataset scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Required file name prefix (e.g. "sub-")
    pub pattern: String,
    /// Accepted file extensions without the leading dot (e.g. ["nii.gz", "nii"])
    pub extensions: Vec<String>,
    /// Directory names to skip (e.g. ["derivatives"])
    pub excludes: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            pattern: "sub-".to_string(),
            extensions: vec!["nii.gz".to_string(), "nii".to_string()],
            excludes: vec!["derivatives".to_string(), "sourcedata".to_string()],
        }
    }
}

impl From<&crate::config::ScannerConfig> for ScanConfig {
    fn from(config: &crate::config::ScannerConfig) -> Self {
        Self {
            pattern: config.pattern.clone(),
            extensions: config.extensions.clone(),
            excludes: config.excludes.clone(),
        }
    }
}

/// A discovered image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

/// Scanner for image files under a data directory.
pub struct FileScanner {
    config: ScanConfig,
    data_root: PathBuf,
}

impl FileScanner {
    /// Create a new file scanner.
    pub fn new(data_root: PathBuf, config: ScanConfig) -> Self {
        Self { config, data_root }
    }

    /// Scan for all matching files, sorted by path.
    pub fn scan(&self) -> Result<Vec<ScannedFile>> {
        if !self.data_root.is_dir() {
            return Err(anyhow!(
                "Data directory not found: {}",
                self.data_root.display()
            ));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.data_root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_excluded(entry));

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_file() && self.matches(entry.path()) {
                let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                files.push(ScannedFile {
                    path: entry.into_path(),
                    size,
                });
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!("Found {} image files under {}", files.len(), self.data_root.display());
        Ok(files)
    }

    /// Check if a file name matches the prefix and an accepted extension.
    pub fn matches(&self, path: &Path) -> bool {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => return false,
        };

        name.starts_with(&self.config.pattern)
            && self
                .config
                .extensions
                .iter()
                .any(|ext| name.ends_with(&format!(".{}", ext)))
    }

    /// Check if an entry is hidden or explicitly excluded.
    fn is_excluded(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();

        if name.starts_with('.') {
            return true;
        }

        entry.file_type().is_dir() && self.config.excludes.iter().any(|pattern| name == pattern.as_str())
    }
}

/// Path of a subject/run functional image under `data_dir`.
///
/// Layout: `group-00/sub-SS/func/sub-SS_task-taskzero_run-RR_bold.nii.gz`.
pub fn scan_path(data_dir: &Path, subject: u32, run: u32) -> PathBuf {
    let subject_dir = format!("sub-{:02}", subject);
    let filename = format!("sub-{:02}_task-taskzero_run-{:02}_bold.nii.gz", subject, run);
    data_dir
        .join("group-00")
        .join(subject_dir)
        .join("func")
        .join(filename)
}

/// Resolve the image of one subject/run, failing if it is not on disk.
pub fn find_run(data_dir: &Path, subject: u32, run: u32) -> Result<ScannedFile> {
    let path = scan_path(data_dir, subject, run);
    let metadata = std::fs::metadata(&path).with_context(|| {
        format!(
            "No image for subject {} run {} at {}",
            subject,
            run,
            path.display()
        )
    })?;

    Ok(ScannedFile {
        path,
        size: metadata.len(),
    })
}
