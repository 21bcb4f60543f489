//! The 4D volume type consumed by the metrics.
//!
//! A volume is indexed `(x, y, z, t)`; the last axis is time.

use ndarray::{Array4, ArrayView4, Axis};

/// A 4D functional image held in memory.
pub type Volume = Array4<f64>;

/// Axis holding the timepoints.
pub const TIME_AXIS: Axis = Axis(3);

/// Number of timepoints (length of the last axis).
pub fn n_timepoints(volume: &ArrayView4<'_, f64>) -> usize {
    volume.len_of(TIME_AXIS)
}

/// Number of spatial voxels in a single frame.
pub fn n_voxels(volume: &ArrayView4<'_, f64>) -> usize {
    let (x, y, z, _) = volume.dim();
    x * y * z
}
