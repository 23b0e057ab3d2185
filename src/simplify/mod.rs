//! Trajectory simplification: reducing a raw trace to a small, geometrically
//! faithful sequence of directed segments.

mod dots;
mod sest;

pub use dots::simplify;
pub use sest::simplify_sest;

use crate::error::Result;
use crate::geometry::{SegmentLocation, Trajectory};

/// Converts a simplification (point indices into the original trajectory)
/// into a sequence of segments, filtering out any segment whose length is
/// at or below `min_length`. Ids are assigned starting at `start_id`,
/// contiguously, in creation order.
///
/// Returns the emitted segments and the next free id.
pub fn extract_segments(traj: &Trajectory, indices: &[usize], start_id: u32, min_length: f64) -> (Vec<SegmentLocation>, u32) {
    let points = traj.points();
    let mut out = Vec::with_capacity(indices.len().saturating_sub(1));
    let mut next_id = start_id;
    for w in indices.windows(2) {
        let (i, j) = (w[0], w[1]);
        let a = points[i];
        let b = points[j];
        let seg = SegmentLocation::new(next_id, a.x, a.y, b.x - a.x, b.y - a.y, a.t, b.t);
        if seg.length() > min_length {
            out.push(seg);
            next_id += 1;
        }
    }
    (out, next_id)
}

/// Simplifies a single trajectory and extracts its filtered segments,
/// assigning ids starting at `start_id`.
///
/// `SimplificationFailure` is recoverable per the pipeline's error policy:
/// callers should log it and move on to the next trajectory.
pub fn simplify_to_segments(
    traj: &Trajectory,
    tau: f64,
    use_temporal: bool,
    temporal_weight: f64,
    min_length: f64,
    start_id: u32,
) -> Result<(Vec<SegmentLocation>, u32)> {
    let indices = simplify(traj, tau, use_temporal, temporal_weight)?;
    Ok(extract_segments(traj, &indices, start_id, min_length))
}
