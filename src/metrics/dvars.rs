//! DVARS: RMS of the voxel-wise change between consecutive frames.

use crate::error::{OutlierError, Result};
use crate::options::{OptionReader, Options};
use crate::volume::{n_timepoints, n_voxels, TIME_AXIS};
use ndarray::{Array1, ArrayView3, ArrayView4};

/// Registered name.
pub const NAME: &str = "dvars";

/// Compute DVARS for every pair of consecutive frames.
///
/// For frames `t` and `t + 1` the value is
/// `sqrt(mean over voxels of (v[t + 1] - v[t])^2)`, so the series has
/// `n_timepoints - 1` entries. Takes no options.
pub fn dvars(volume: ArrayView4<'_, f64>, options: &Options) -> Result<Array1<f64>> {
    OptionReader::new(NAME, options).expect_only(&[])?;

    let n = n_timepoints(&volume);
    if n < 2 {
        return Err(OutlierError::InsufficientData {
            metric: NAME.to_string(),
            reason: format!("needs at least 2 timepoints, got {}", n),
        });
    }
    if n_voxels(&volume) == 0 {
        return Err(OutlierError::InsufficientData {
            metric: NAME.to_string(),
            reason: "volume has no voxels".to_string(),
        });
    }

    let frames: Vec<ArrayView3<'_, f64>> = volume.axis_iter(TIME_AXIS).collect();
    let values = frames
        .windows(2)
        .map(|pair| {
            let diff = &pair[1] - &pair[0];
            diff.mapv(|d| d * d).mean().unwrap_or(0.0).sqrt()
        })
        .collect();

    Ok(values)
}
