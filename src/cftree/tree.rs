use std::cmp::Reverse;

use priority_queue::PriorityQueue;

use super::entry::{euclidean, CFEntry};
use super::K;

const DEFAULT_BRANCHING: usize = 8;
/// Growth multiplier applied to the leaf-radius threshold when the tree
/// overflows its memory bound. Monotonic increase is all that's required
/// for eventual convergence; 1.5 is the smallest "round" multiplier that
/// reliably thins out leaves in practice.
const GROWTH_FACTOR: f64 = 1.5;
const BASE_NODE_BYTES: usize = 48;
const ENTRY_OVERHEAD_BYTES: usize = 16;

#[derive(Debug, Clone)]
enum NodeBody {
    Internal(Vec<(CFEntry, usize)>),
    Leaf(Vec<CFEntry>),
}

#[derive(Debug, Clone)]
struct Node {
    body: NodeBody,
    parent: Option<usize>,
    prev_leaf: Option<usize>,
    next_leaf: Option<usize>,
}

impl Node {
    fn new_leaf() -> Self {
        Node { body: NodeBody::Leaf(Vec::new()), parent: None, prev_leaf: None, next_leaf: None }
    }

    fn entry_count(&self) -> usize {
        match &self.body {
            NodeBody::Internal(v) => v.len(),
            NodeBody::Leaf(v) => v.len(),
        }
    }

    fn cf_sum(&self) -> CFEntry {
        match &self.body {
            NodeBody::Internal(v) => v.iter().fold(CFEntry::empty(), |acc, (cf, _)| acc.merge(cf)),
            NodeBody::Leaf(v) => v.iter().fold(CFEntry::empty(), |acc, cf| acc.merge(cf)),
        }
    }
}

/// An incremental, memory-bounded BIRCH CF-tree over `K`-dimensional
/// feature vectors.
///
/// Nodes live in a single arena (`Vec<Node>`) addressed by index; parent
/// pointers are reverse lookups rather than owning references, and leaves
/// form a doubly linked chain through the same arena.
pub struct CFTree {
    threshold: f64,
    mem_limit: usize,
    b_nonleaf: usize,
    b_leaf: usize,
    arena: Vec<Node>,
    root: usize,
    leaf_head: Option<usize>,
    n_inserts: u64,
}

impl CFTree {
    /// Creates an empty tree with leaf-radius threshold `threshold` and a
    /// memory ceiling of `mem_limit_bytes` (0 disables the memory bound).
    pub fn new(threshold: f64, mem_limit_bytes: usize) -> Self {
        Self::with_branching(threshold, mem_limit_bytes, DEFAULT_BRANCHING, DEFAULT_BRANCHING)
    }

    /// Like [`CFTree::new`] but with explicit non-leaf/leaf branching
    /// factors, mainly useful for exercising splits with small datasets.
    pub fn with_branching(threshold: f64, mem_limit_bytes: usize, b_nonleaf: usize, b_leaf: usize) -> Self {
        CFTree {
            threshold,
            mem_limit: mem_limit_bytes,
            b_nonleaf,
            b_leaf,
            arena: vec![Node::new_leaf()],
            root: 0,
            leaf_head: Some(0),
            n_inserts: 0,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Number of raw points inserted so far (not the number of subclusters).
    pub fn len(&self) -> u64 {
        self.n_inserts
    }

    pub fn is_empty(&self) -> bool {
        self.n_inserts == 0
    }

    /// Inserts one `K`-dimensional (already weighted) point.
    pub fn insert(&mut self, v: [f64; K]) {
        self.insert_entry(CFEntry::from_point(v));
        self.n_inserts += 1;
        self.maybe_rebuild_for_memory();
    }

    /// Final consolidation pass. If `merge_overlap`, leaf-level entries
    /// whose centroids fall within `threshold` of each other are merged
    /// pairwise, closest first, until no such pair remains.
    pub fn rebuild(&mut self, merge_overlap: bool) {
        self.rebuild_at(self.threshold, merge_overlap);
    }

    /// The current leaf-level subclusters, in stable leaf-chain order.
    pub fn cluster(&self) -> Vec<CFEntry> {
        self.collect_leaf_entries()
    }

    /// Assigns each (already weighted) point to the index of its nearest
    /// entry centroid. Ties go to the lowest index.
    pub fn redistribute(points: &[[f64; K]], entries: &[CFEntry]) -> Vec<usize> {
        points
            .iter()
            .map(|p| {
                let mut best_idx = 0;
                let mut best_dist = f64::INFINITY;
                for (i, e) in entries.iter().enumerate() {
                    let d = euclidean(p, &e.centroid());
                    if d < best_dist {
                        best_dist = d;
                        best_idx = i;
                    }
                }
                best_idx
            })
            .collect()
    }

    fn collect_leaf_entries(&self) -> Vec<CFEntry> {
        let mut out = Vec::new();
        let mut cur = self.leaf_head;
        while let Some(idx) = cur {
            if let NodeBody::Leaf(v) = &self.arena[idx].body {
                out.extend_from_slice(v);
            }
            cur = self.arena[idx].next_leaf;
        }
        out
    }

    fn estimated_bytes(&self) -> usize {
        self.arena
            .iter()
            .map(|n| BASE_NODE_BYTES + n.entry_count() * (std::mem::size_of::<CFEntry>() + ENTRY_OVERHEAD_BYTES))
            .sum()
    }

    fn maybe_rebuild_for_memory(&mut self) {
        if self.mem_limit == 0 {
            return;
        }
        if self.estimated_bytes() > self.mem_limit {
            let new_threshold = self.threshold * GROWTH_FACTOR;
            log::debug!(
                "cf-tree exceeded memory limit ({} > {} bytes); rebuilding at threshold {:.6}",
                self.estimated_bytes(),
                self.mem_limit,
                new_threshold
            );
            self.rebuild_at(new_threshold, false);
        }
    }

    fn rebuild_at(&mut self, new_threshold: f64, merge_overlap: bool) {
        let mut entries = self.collect_leaf_entries();
        self.threshold = new_threshold;

        if merge_overlap {
            merge_close_entries(&mut entries, self.threshold);
        }

        self.arena = vec![Node::new_leaf()];
        self.root = 0;
        self.leaf_head = Some(0);
        for cf in entries {
            self.insert_entry(cf);
        }
    }

    /// Inserts a clustering feature as a single unit: descends to the
    /// nearest leaf, merges into the nearest existing subcluster if that
    /// stays within `threshold`, otherwise adds it as a new subcluster
    /// (splitting the leaf if it is already full).
    fn insert_entry(&mut self, unit: CFEntry) {
        let leaf_idx = self.find_leaf(self.root, &unit.centroid());
        self.insert_into_leaf(leaf_idx, unit);
    }

    fn find_leaf(&self, node_idx: usize, target: &[f64; K]) -> usize {
        match &self.arena[node_idx].body {
            NodeBody::Leaf(_) => node_idx,
            NodeBody::Internal(children) => {
                let (_, child_idx) = children
                    .iter()
                    .map(|(cf, child)| (euclidean(&cf.centroid(), target), *child))
                    .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap())
                    .expect("internal node always has at least one child");
                self.find_leaf(child_idx, target)
            }
        }
    }

    fn insert_into_leaf(&mut self, leaf_idx: usize, unit: CFEntry) {
        let needs_split;
        {
            let entries = match &mut self.arena[leaf_idx].body {
                NodeBody::Leaf(v) => v,
                NodeBody::Internal(_) => unreachable!("find_leaf must return a leaf"),
            };
            if entries.is_empty() {
                entries.push(unit);
                needs_split = false;
            } else {
                let target = unit.centroid();
                let (nearest_pos, _) = entries
                    .iter()
                    .enumerate()
                    .map(|(i, e)| (i, euclidean(&e.centroid(), &target)))
                    .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
                    .unwrap();
                let merged = entries[nearest_pos].merge(&unit);
                if merged.radius() <= self.threshold {
                    entries[nearest_pos] = merged;
                    needs_split = false;
                } else if entries.len() < self.b_leaf {
                    entries.push(unit);
                    needs_split = false;
                } else {
                    needs_split = true;
                }
            }
        }

        // Reflect the point's contribution up the ancestor chain regardless
        // of whether a split follows: splitting only reorganizes entries
        // between two nodes, it never changes their combined total.
        self.update_ancestors_add(leaf_idx, &unit);

        if needs_split {
            self.split_leaf_and_fixup(leaf_idx, unit);
        }
    }

    fn update_ancestors_add(&mut self, start: usize, unit: &CFEntry) {
        let mut node_idx = start;
        loop {
            let parent = self.arena[node_idx].parent;
            match parent {
                None => break,
                Some(p) => {
                    if let NodeBody::Internal(children) = &mut self.arena[p].body {
                        for (cf, child) in children.iter_mut() {
                            if *child == node_idx {
                                *cf = cf.merge(unit);
                                break;
                            }
                        }
                    }
                    node_idx = p;
                }
            }
        }
    }

    fn split_leaf_and_fixup(&mut self, leaf_idx: usize, unit: CFEntry) {
        let mut items = match &self.arena[leaf_idx].body {
            NodeBody::Leaf(v) => v.clone(),
            NodeBody::Internal(_) => unreachable!(),
        };
        items.push(unit);

        let (idx_a, idx_b) = seed_split(&items, |e| e.centroid());
        let group_a: Vec<CFEntry> = idx_a.iter().map(|&i| items[i]).collect();
        let group_b: Vec<CFEntry> = idx_b.iter().map(|&i| items[i]).collect();

        let parent = self.arena[leaf_idx].parent;
        let next = self.arena[leaf_idx].next_leaf;

        self.arena[leaf_idx].body = NodeBody::Leaf(group_a);

        let new_idx = self.arena.len();
        self.arena.push(Node {
            body: NodeBody::Leaf(group_b),
            parent,
            prev_leaf: Some(leaf_idx),
            next_leaf: next,
        });
        self.arena[leaf_idx].next_leaf = Some(new_idx);
        if let Some(next_idx) = next {
            self.arena[next_idx].prev_leaf = Some(new_idx);
        }

        self.fixup_after_split(leaf_idx, new_idx);
    }

    fn split_internal_and_fixup(&mut self, node_idx: usize) {
        let children = match &self.arena[node_idx].body {
            NodeBody::Internal(v) => v.clone(),
            NodeBody::Leaf(_) => unreachable!(),
        };

        let (idx_a, idx_b) = seed_split(&children, |(cf, _)| cf.centroid());
        let group_a: Vec<(CFEntry, usize)> = idx_a.iter().map(|&i| children[i]).collect();
        let group_b: Vec<(CFEntry, usize)> = idx_b.iter().map(|&i| children[i]).collect();

        let parent = self.arena[node_idx].parent;

        self.arena[node_idx].body = NodeBody::Internal(group_a);

        let new_idx = self.arena.len();
        for (_, child) in &group_b {
            self.arena[*child].parent = Some(new_idx);
        }
        self.arena.push(Node { body: NodeBody::Internal(group_b), parent, prev_leaf: None, next_leaf: None });

        self.fixup_after_split(node_idx, new_idx);
    }

    /// Reconciles the parent level after `node_idx` was split into itself
    /// plus `sibling_idx`: either installs a brand-new root above both, or
    /// updates the parent's entry for `node_idx` and adds one for
    /// `sibling_idx`, splitting the parent in turn if that overflows it.
    fn fixup_after_split(&mut self, node_idx: usize, sibling_idx: usize) {
        let parent = self.arena[node_idx].parent;
        match parent {
            None => {
                let left_cf = self.arena[node_idx].cf_sum();
                let right_cf = self.arena[sibling_idx].cf_sum();
                let new_root_idx = self.arena.len();
                self.arena.push(Node {
                    body: NodeBody::Internal(vec![(left_cf, node_idx), (right_cf, sibling_idx)]),
                    parent: None,
                    prev_leaf: None,
                    next_leaf: None,
                });
                self.arena[node_idx].parent = Some(new_root_idx);
                self.arena[sibling_idx].parent = Some(new_root_idx);
                self.root = new_root_idx;
            }
            Some(parent) => {
                self.arena[sibling_idx].parent = Some(parent);
                let left_cf = self.arena[node_idx].cf_sum();
                let right_cf = self.arena[sibling_idx].cf_sum();
                let overflow = match &mut self.arena[parent].body {
                    NodeBody::Internal(children) => {
                        for (cf, child) in children.iter_mut() {
                            if *child == node_idx {
                                *cf = left_cf;
                                break;
                            }
                        }
                        children.push((right_cf, sibling_idx));
                        children.len() > self.b_nonleaf
                    }
                    NodeBody::Leaf(_) => unreachable!("parent of a node is always internal"),
                };
                if overflow {
                    self.split_internal_and_fixup(parent);
                }
            }
        }
    }
}

/// Picks the pair of items with maximum pairwise distance as split seeds,
/// then assigns each remaining item to whichever seed it is nearer to.
fn seed_split<T>(items: &[T], centroid_of: impl Fn(&T) -> [f64; K]) -> (Vec<usize>, Vec<usize>) {
    let n = items.len();
    let mut best = (0usize, n.saturating_sub(1).max(1), -1.0);
    for i in 0..n {
        for j in (i + 1)..n {
            let d = euclidean(&centroid_of(&items[i]), &centroid_of(&items[j]));
            if d > best.2 {
                best = (i, j, d);
            }
        }
    }
    let (si, sj, _) = best;
    let seed_a = centroid_of(&items[si]);
    let seed_b = centroid_of(&items[sj]);

    let mut group_a = vec![si];
    let mut group_b = vec![sj];
    for idx in 0..n {
        if idx == si || idx == sj {
            continue;
        }
        let c = centroid_of(&items[idx]);
        if euclidean(&c, &seed_a) <= euclidean(&c, &seed_b) {
            group_a.push(idx);
        } else {
            group_b.push(idx);
        }
    }
    (group_a, group_b)
}

/// Greedily merges the closest pair of entries whose centroid distance is
/// below `threshold`, repeating until no such pair remains. Uses a
/// priority queue of candidate pairs ordered by (quantized) distance so the
/// closest pair is always merged first.
fn merge_close_entries(entries: &mut Vec<CFEntry>, threshold: f64) {
    loop {
        let mut pq: PriorityQueue<(usize, usize), Reverse<i64>> = PriorityQueue::new();
        for i in 0..entries.len() {
            for j in (i + 1)..entries.len() {
                let d = entries[i].distance_to(&entries[j]);
                if d < threshold {
                    pq.push((i, j), Reverse(quantize(d)));
                }
            }
        }
        match pq.pop() {
            None => break,
            Some(((i, j), _)) => {
                let merged = entries[i].merge(&entries[j]);
                let (hi, lo) = if i > j { (i, j) } else { (j, i) };
                entries.remove(hi);
                entries.remove(lo);
                entries.push(merged);
            }
        }
    }
}

fn quantize(d: f64) -> i64 {
    (d * 1_000_000.0).round() as i64
}
