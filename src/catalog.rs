//! Materializes the CF-tree's final subclusters into a stable, queryable
//! catalog of segment clusters.

use crate::cftree::{CFEntry, K};
use crate::features;
use crate::geometry::SegmentLocation;

/// One finished cluster: its id (position in the catalog, used as the
/// cluster/"word" id downstream), the unweighted centroid in segment-feature
/// space, and the number of segments assigned to it by the CF-tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub id: u32,
    pub centroid: [f64; K],
    pub n: u64,
}

/// An immutable, indexed view over the clusters produced by a finished
/// [`crate::cftree::CFTree`].
#[derive(Debug, Clone)]
pub struct ClusterCatalog {
    clusters: Vec<Cluster>,
}

impl ClusterCatalog {
    /// Builds a catalog from the CF-tree's final subclusters, un-applying
    /// `weights` so centroids live back in the segment's native feature
    /// space. Cluster ids are assigned by position, 0-based, matching
    /// `entries`' order (the CF-tree's leaf-chain order).
    pub fn from_entries(entries: &[CFEntry], weights: &[f64; K]) -> Self {
        let clusters = entries
            .iter()
            .enumerate()
            .map(|(i, e)| Cluster { id: i as u32, centroid: features::unweighted(e.centroid(), weights), n: e.n })
            .collect();
        ClusterCatalog { clusters }
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn get(&self, id: u32) -> Option<&Cluster> {
        self.clusters.get(id as usize)
    }

    /// The catalog's clusters rendered as [`SegmentLocation`]s, for callers
    /// that want to serialize or inspect centroids in the `.cluster` wire
    /// format (`id` becomes the cluster id, not a segment serial number).
    pub fn as_segment_locations(&self) -> Vec<SegmentLocation> {
        self.clusters
            .iter()
            .map(|c| SegmentLocation::new(c.id, c.centroid[0], c.centroid[1], c.centroid[2], c.centroid[3], c.centroid[4], c.centroid[5]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_positional_ids_and_unweights_centroids() {
        let weights = [2.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        let a = CFEntry::from_point([2.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let b = CFEntry::from_point([4.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let catalog = ClusterCatalog::from_entries(&[a, b], &weights);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).unwrap().id, 0);
        assert_eq!(catalog.get(1).unwrap().id, 1);
        assert!((catalog.get(0).unwrap().centroid[0] - 1.0).abs() < 1e-12);
        assert!((catalog.get(1).unwrap().centroid[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn preserves_subcluster_counts() {
        let weights = [1.0; K];
        let e = CFEntry::from_point([1.0; K]).merge(&CFEntry::from_point([2.0; K]));
        let catalog = ClusterCatalog::from_entries(&[e], &weights);
        assert_eq!(catalog.get(0).unwrap().n, 2);
    }
}
