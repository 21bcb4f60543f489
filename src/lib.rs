//! findoutlie - outlier volume detection for 4D functional imaging runs.
//!
//! Per-timepoint metrics are computed on a volume, each metric series is run
//! through an outlier detector, and the resulting masks are merged into one
//! consensus verdict per timepoint.
//!
//! ```no_run
//! use findoutlie::analysis::{Pipeline, PipelineConfig};
//! use findoutlie::loader::{NiftiLoader, VolumeLoader};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let volume = NiftiLoader.load(Path::new("sub-01_task-taskzero_run-01_bold.nii.gz"))?;
//! let pipeline = Pipeline::with_builtins(PipelineConfig::default());
//! let outliers = pipeline.detect_outliers(volume.view())?;
//! println!("outlier frames: {:?}", outliers);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod detectors;
pub mod error;
pub mod integrity;
pub mod loader;
pub mod metrics;
pub mod models;
pub mod options;
pub mod report;
pub mod scanner;
pub mod volume;

pub use error::{OutlierError, Result};
