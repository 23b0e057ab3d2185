//! Rewrites each trajectory's segment-id sequence into a run-length-collapsed
//! sequence of cluster ids — the "trajectory-in-clusters" (TinC) string.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Segment id → cluster id, as produced by the CF-tree's final
/// `redistribute` pass.
pub type SegmentToCluster = HashMap<u32, u32>;

pub struct Rewriter;

impl Rewriter {
    /// Rewrites one trajectory's ordered segment ids into its TinC, keeping
    /// a cluster id only if it differs from the last one appended.
    ///
    /// Uses the corrected collapse predicate — `tinc.is_empty() ||
    /// last != cluster_id` — rather than the inverted, panic-prone form
    /// that checks `.last()` before the emptiness guard.
    pub fn rewrite_one(segment_ids: &[u32], s2c: &SegmentToCluster) -> Result<Vec<u32>> {
        let mut tinc: Vec<u32> = Vec::new();
        for &sid in segment_ids {
            let cid = *s2c
                .get(&sid)
                .ok_or_else(|| Error::MalformedArtifact(format!("segment {sid} has no cluster assignment in s2c")))?;
            if tinc.is_empty() || *tinc.last().unwrap() != cid {
                tinc.push(cid);
            }
        }
        Ok(tinc)
    }

    /// Rewrites a full stream of per-trajectory segment-id sequences.
    /// Trajectories whose TinC collapses to length 0 are dropped; the
    /// returned pairs carry the surviving trajectory's original index so
    /// callers can still look it up in `t2ot`.
    pub fn rewrite_all(tins: &[Vec<u32>], s2c: &SegmentToCluster) -> Result<Vec<(usize, Vec<u32>)>> {
        let mut out = Vec::with_capacity(tins.len());
        for (idx, segment_ids) in tins.iter().enumerate() {
            let tinc = Self::rewrite_one(segment_ids, s2c)?;
            if !tinc.is_empty() {
                out.push((idx, tinc));
            } else {
                log::warn!("trajectory {idx} collapsed to an empty TinC and was dropped");
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s2c(pairs: &[(u32, u32)]) -> SegmentToCluster {
        pairs.iter().copied().collect()
    }

    #[test]
    fn collapses_consecutive_duplicates() {
        let map = s2c(&[(0, 1), (1, 1), (2, 2), (3, 2), (4, 1)]);
        let tinc = Rewriter::rewrite_one(&[0, 1, 2, 3, 4], &map).unwrap();
        assert_eq!(tinc, vec![1, 2, 1]);
    }

    #[test]
    fn single_segment_is_single_element_tinc() {
        let map = s2c(&[(0, 7)]);
        let tinc = Rewriter::rewrite_one(&[0], &map).unwrap();
        assert_eq!(tinc, vec![7]);
    }

    #[test]
    fn unknown_segment_is_malformed_artifact() {
        let map = s2c(&[(0, 1)]);
        let err = Rewriter::rewrite_one(&[0, 99], &map).unwrap_err();
        assert!(matches!(err, Error::MalformedArtifact(_)));
    }

    #[test]
    fn rewrite_all_preserves_original_indices_and_drops_empties() {
        let map = s2c(&[(0, 1)]);
        let tins = vec![vec![0], vec![]];
        let out = Rewriter::rewrite_all(&tins, &map).unwrap();
        assert_eq!(out, vec![(0, vec![1])]);
    }
}
