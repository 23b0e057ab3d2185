//! The spatial-continuity graph: which clusters may directly follow which
//! others, used to constrain PrefixSpan's candidate extensions.

use std::collections::BTreeMap;

use crate::catalog::ClusterCatalog;

/// Directed neighbor graph over cluster ids: `a -> b` exists iff `b`'s start
/// point lies within `radius` of `a`'s end point.
#[derive(Debug, Clone)]
pub struct ContinuityGraph {
    successors: BTreeMap<u32, Vec<u32>>,
}

impl ContinuityGraph {
    /// Builds the graph in O(|catalog|²): for each ordered pair `(a, b)`
    /// with `a != b`, adds the edge `a -> b` when the Euclidean distance
    /// from `a`'s end point to `b`'s start point is strictly less than
    /// `radius`. Successor lists are kept in ascending cluster-id order.
    pub fn build(catalog: &ClusterCatalog, radius: f64) -> Self {
        let clusters = catalog.clusters();
        let mut successors: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
        for a in clusters {
            let end = (a.centroid[0] + a.centroid[2], a.centroid[1] + a.centroid[3]);
            let mut edges = Vec::new();
            for b in clusters {
                if a.id == b.id {
                    continue;
                }
                let start = (b.centroid[0], b.centroid[1]);
                let dx = end.0 - start.0;
                let dy = end.1 - start.1;
                if (dx * dx + dy * dy).sqrt() < radius {
                    edges.push(b.id);
                }
            }
            edges.sort_unstable();
            successors.insert(a.id, edges);
        }
        ContinuityGraph { successors }
    }

    /// Allowed successors of `cluster_id`, ascending, or an empty slice if
    /// the cluster has none (or does not exist).
    pub fn successors(&self, cluster_id: u32) -> &[u32] {
        self.successors.get(&cluster_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// All cluster ids with at least one entry in the graph, ascending —
    /// the candidate set PrefixSpan uses for an empty prefix.
    pub fn all_ids(&self) -> Vec<u32> {
        self.successors.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cftree::{CFEntry, K};

    fn catalog_from(points: &[[f64; K]]) -> ClusterCatalog {
        let entries: Vec<CFEntry> = points.iter().map(|p| CFEntry::from_point(*p)).collect();
        ClusterCatalog::from_entries(&entries, &[1.0; K])
    }

    #[test]
    fn edge_exists_within_radius() {
        // a: (0,0) -> (1,0); b starts at (1.05, 0) — within radius 0.2.
        let a = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
        let b = [1.05, 0.0, 1.0, 0.0, 1.0, 2.0];
        let catalog = catalog_from(&[a, b]);
        let graph = ContinuityGraph::build(&catalog, 0.2);
        assert_eq!(graph.successors(0), &[1]);
        assert!(graph.successors(1).is_empty());
    }

    #[test]
    fn no_edge_beyond_radius() {
        let a = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
        let b = [10.0, 0.0, 1.0, 0.0, 1.0, 2.0];
        let catalog = catalog_from(&[a, b]);
        let graph = ContinuityGraph::build(&catalog, 0.2);
        assert!(graph.successors(0).is_empty());
    }

    #[test]
    fn no_self_edges() {
        let a = [0.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        let catalog = catalog_from(&[a]);
        let graph = ContinuityGraph::build(&catalog, 1000.0);
        assert!(graph.successors(0).is_empty());
    }
}
