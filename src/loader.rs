//! Loading volumes from disk.
//!
//! The pipeline only sees in-memory volumes; this module is the seam where
//! files become arrays.

use crate::volume::{Volume, TIME_AXIS};
use anyhow::{bail, Context, Result};
use ndarray::{ArrayD, Ix4};
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};
use std::path::Path;
use tracing::debug;

/// Something that turns a file into a [`Volume`].
pub trait VolumeLoader: Send + Sync {
    /// Load the volume stored at `path`.
    fn load(&self, path: &Path) -> Result<Volume>;
}

/// Loads `.nii` and `.nii.gz` images.
#[derive(Debug, Clone, Copy, Default)]
pub struct NiftiLoader;

impl VolumeLoader for NiftiLoader {
    fn load(&self, path: &Path) -> Result<Volume> {
        let object = ReaderOptions::new()
            .read_file(path)
            .with_context(|| format!("Failed to read NIfTI file: {}", path.display()))?;

        let data = object
            .into_volume()
            .into_ndarray::<f64>()
            .with_context(|| format!("Failed to decode image data: {}", path.display()))?;

        debug!("Loaded {} with shape {:?}", path.display(), data.shape());
        into_volume(data)
    }
}

/// Convert a dynamic-dimensional array into a 4D volume.
///
/// A 3D image is a single timepoint.
pub fn into_volume(data: ArrayD<f64>) -> Result<Volume> {
    let data = match data.ndim() {
        3 => data.insert_axis(TIME_AXIS),
        4 => data,
        n => bail!("Expected a 3D or 4D image, got {} dimensions", n),
    };

    data.into_dimensionality::<Ix4>()
        .context("Failed to reshape image into a 4D volume")
}
