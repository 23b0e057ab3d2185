use crate::error::{Error, Result};
use crate::geometry::{point_segment_distance, Trajectory};

/// DOTS-style simplification: the minimum-edge (fewest-segment) polyline
/// approximation of `traj` under distance threshold `tau`.
///
/// Returns the indices into `traj.points()` that survive, always including
/// the first and last index. Ties among equal-length shortest paths are
/// broken by preferring, at each step, the farthest-reaching feasible next
/// index that still lies on a shortest path — the lexicographically
/// earliest sequence of indices.
pub fn simplify(traj: &Trajectory, tau: f64, use_temporal: bool, temporal_weight: f64) -> Result<Vec<usize>> {
    let points = traj.points();
    let n = points.len();
    if n < 2 {
        return Err(Error::SimplificationFailure(format!(
            "trajectory has {n} point(s), need at least 2"
        )));
    }

    // reachable[i][j] (j > i): does the straight segment i->j stay within
    // tau of every intermediate sampled point?
    let reachable = |i: usize, j: usize| -> bool {
        if j == i + 1 {
            return true;
        }
        let a = points[i];
        let b = points[j];
        (i + 1..j).all(|k| point_segment_distance(points[k], a, b, use_temporal, temporal_weight) <= tau)
    };

    // dist_to_end[j]: fewest hops from j to n-1, or None if unreachable.
    let mut dist_to_end: Vec<Option<usize>> = vec![None; n];
    dist_to_end[n - 1] = Some(0);
    for j in (0..n - 1).rev() {
        let best = (j + 1..n)
            .filter(|&k| reachable(j, k))
            .filter_map(|k| dist_to_end[k])
            .min();
        dist_to_end[j] = best.map(|d| d + 1);
    }

    if dist_to_end[0].is_none() {
        return Err(Error::SimplificationFailure(
            "no feasible simplification path exists under the given threshold".to_string(),
        ));
    }

    let mut path = vec![0usize];
    let mut cur = 0usize;
    while cur != n - 1 {
        let remaining = dist_to_end[cur].unwrap();
        let next = (cur + 1..n)
            .find(|&k| reachable(cur, k) && dist_to_end[k] == Some(remaining - 1))
            .expect("dist_to_end is consistent with reachability");
        path.push(next);
        cur = next;
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn traj(points: Vec<(f64, f64, f64)>) -> Trajectory {
        let points = points.into_iter().map(|(x, y, t)| Point::new(x, y, t)).collect();
        Trajectory::new(points, 0).unwrap()
    }

    #[test]
    fn collinear_points_collapse_to_one_segment() {
        let t = traj(vec![(0., 0., 0.), (1., 0., 1.), (2., 0., 2.)]);
        let path = simplify(&t, 0.5, false, 1.0).unwrap();
        assert_eq!(path, vec![0, 2]);
    }

    #[test]
    fn containment_first_and_last_always_kept() {
        let t = traj(vec![(0., 0., 0.), (1., 5., 1.), (2., -3., 2.), (10., 0., 3.)]);
        let path = simplify(&t, 0.1, false, 1.0).unwrap();
        assert_eq!(*path.first().unwrap(), 0);
        assert_eq!(*path.last().unwrap(), 3);
    }

    #[test]
    fn feasibility_respects_threshold() {
        // A big spike at index 1 should force it to be kept when tau is small.
        let t = traj(vec![(0., 0., 0.), (5., 100., 1.), (10., 0., 2.)]);
        let path = simplify(&t, 1.0, false, 1.0).unwrap();
        assert!(path.contains(&1));
    }

    #[test]
    fn loose_threshold_collapses_spike() {
        let t = traj(vec![(0., 0., 0.), (5., 1.0, 1.), (10., 0., 2.)]);
        let path = simplify(&t, 10.0, false, 1.0).unwrap();
        assert_eq!(path, vec![0, 2]);
    }

    #[test]
    fn two_point_trajectory_is_one_segment() {
        let t = traj(vec![(0., 0., 0.), (1., 1., 1.)]);
        let path = simplify(&t, 0.01, false, 1.0).unwrap();
        assert_eq!(path, vec![0, 1]);
    }
}
