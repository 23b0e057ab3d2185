use std::collections::HashSet;

use super::dots;
use crate::error::Result;
use crate::geometry::Trajectory;

/// Scale-exploratory segmentation: the family of simplifications produced
/// by sweeping the threshold upward from `tau0` in steps of `delta`.
///
/// Iteration stops as soon as a simplification collapses to two or fewer
/// segments, or would repeat a point-index set already produced at a lower
/// threshold (further coarsening cannot add anything new past that point).
/// Each surviving member shares `traj`'s origin id; it is the caller's job
/// to register one trajectory-in-clusters entry per member.
pub fn simplify_sest(traj: &Trajectory, tau0: f64, delta: f64, use_temporal: bool, temporal_weight: f64) -> Vec<Vec<usize>> {
    let mut family = Vec::new();
    let mut seen: HashSet<Vec<usize>> = HashSet::new();
    let mut k: u64 = 0;

    loop {
        let tau = tau0 + (k as f64) * delta;
        let path: Result<Vec<usize>> = dots::simplify(traj, tau, use_temporal, temporal_weight);
        let path = match path {
            Ok(p) => p,
            Err(_) => break,
        };

        if seen.contains(&path) {
            break;
        }
        let segment_count = path.len().saturating_sub(1);
        seen.insert(path.clone());
        family.push(path);

        if segment_count <= 2 {
            break;
        }
        k += 1;
    }

    family
}
