//! The pattern store: canonicalizing PrefixSpan's raw emissions and
//! resolving them back into segment-location records for persistence.

use std::collections::BTreeMap;
use std::collections::HashSet;

use crate::catalog::ClusterCatalog;
use crate::geometry::SegmentLocation;

/// A non-empty ordered sequence of cluster ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern(Vec<u32>);

impl Pattern {
    pub fn new(ids: Vec<u32>) -> Self {
        Pattern(ids)
    }

    pub fn ids(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolves each cluster id in this pattern to its catalog centroid,
    /// the representation `.stp` persists.
    pub fn to_segment_locations(&self, catalog: &ClusterCatalog) -> Vec<SegmentLocation> {
        self.0
            .iter()
            .filter_map(|&id| {
                catalog.get(id).map(|c| SegmentLocation::new(c.id, c.centroid[0], c.centroid[1], c.centroid[2], c.centroid[3], c.centroid[4], c.centroid[5]))
            })
            .collect()
    }
}

#[derive(Default, Debug)]
struct TrieNode {
    children: BTreeMap<u32, usize>,
    is_pattern: bool,
}

fn get_or_create_child(arena: &mut Vec<TrieNode>, node: usize, id: u32) -> usize {
    if let Some(&child) = arena[node].children.get(&id) {
        return child;
    }
    let new_idx = arena.len();
    arena.push(TrieNode::default());
    arena[node].children.insert(id, new_idx);
    new_idx
}

fn has_pattern_descendant(arena: &[TrieNode], node: usize, cache: &mut [Option<bool>]) -> bool {
    if let Some(v) = cache[node] {
        return v;
    }
    let mut result = false;
    for &child in arena[node].children.values() {
        if arena[child].is_pattern || has_pattern_descendant(arena, child, cache) {
            result = true;
        }
    }
    cache[node] = Some(result);
    result
}

/// Removes every pattern that is a strict prefix of another pattern in the
/// set, via a trie over the raw emissions: a pattern survives iff its
/// trie node has no descendant marked as a pattern. Duplicate emissions
/// collapse to one entry; retention order is otherwise unspecified.
pub fn canonicalize(patterns: Vec<Pattern>) -> Vec<Pattern> {
    let mut seen = HashSet::new();
    let mut arena = vec![TrieNode::default()];
    let mut ends = Vec::with_capacity(patterns.len());
    let mut unique = Vec::with_capacity(patterns.len());

    for p in patterns {
        if !seen.insert(p.clone()) {
            continue;
        }
        let mut cur = 0;
        for &id in p.ids() {
            cur = get_or_create_child(&mut arena, cur, id);
        }
        arena[cur].is_pattern = true;
        ends.push(cur);
        unique.push(p);
    }

    let mut cache = vec![None; arena.len()];
    unique
        .into_iter()
        .zip(ends)
        .filter(|(_, node)| !has_pattern_descendant(&arena, *node, &mut cache))
        .map(|(p, _)| p)
        .collect()
}

/// Post-canonicalization display filter: drops patterns shorter than
/// `min_len`. Purely cosmetic — it never affects canonicalization or
/// support counting.
pub fn filter_by_min_len(patterns: &[Pattern], min_len: usize) -> Vec<Pattern> {
    patterns.iter().filter(|p| p.len() >= min_len).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(ids: &[u32]) -> Pattern {
        Pattern::new(ids.to_vec())
    }

    #[test]
    fn drops_strict_prefixes() {
        let patterns = vec![p(&[1]), p(&[1, 2]), p(&[1, 2, 3]), p(&[2]), p(&[2, 3])];
        let mut result = canonicalize(patterns);
        result.sort_by(|a, b| a.ids().cmp(b.ids()));
        assert_eq!(result, vec![p(&[1, 2, 3]), p(&[2, 3])]);
    }

    #[test]
    fn keeps_unrelated_patterns() {
        let patterns = vec![p(&[1, 2]), p(&[3, 4])];
        let mut result = canonicalize(patterns);
        result.sort_by(|a, b| a.ids().cmp(b.ids()));
        assert_eq!(result, vec![p(&[1, 2]), p(&[3, 4])]);
    }

    #[test]
    fn deduplicates_identical_emissions() {
        let patterns = vec![p(&[1, 2]), p(&[1, 2])];
        let result = canonicalize(patterns);
        assert_eq!(result, vec![p(&[1, 2])]);
    }

    #[test]
    fn min_len_filter_is_purely_cosmetic() {
        let patterns = vec![p(&[1]), p(&[1, 2])];
        let filtered = filter_by_min_len(&patterns, 2);
        assert_eq!(filtered, vec![p(&[1, 2])]);
    }
}
