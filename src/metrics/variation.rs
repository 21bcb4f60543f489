//! Coefficient of variation of each frame.

use crate::error::{OutlierError, Result};
use crate::options::{OptionReader, Options};
use crate::volume::{n_voxels, TIME_AXIS};
use ndarray::{Array1, ArrayView4};

/// Registered name.
pub const NAME: &str = "coefficient_of_variation";

/// Spatial standard deviation over spatial mean, one value per frame.
///
/// Uses the population standard deviation. A frame whose mean is exactly
/// zero yields 0 instead of NaN or infinity.
pub fn coefficient_of_variation(volume: ArrayView4<'_, f64>, options: &Options) -> Result<Array1<f64>> {
    OptionReader::new(NAME, options).expect_only(&[])?;

    if n_voxels(&volume) == 0 {
        return Err(OutlierError::InsufficientData {
            metric: NAME.to_string(),
            reason: "volume has no voxels".to_string(),
        });
    }

    let values = volume
        .axis_iter(TIME_AXIS)
        .map(|frame| {
            let mean = frame.mean().unwrap_or(0.0);
            if mean == 0.0 {
                0.0
            } else {
                frame.std(0.0) / mean
            }
        })
        .collect();

    Ok(values)
}
