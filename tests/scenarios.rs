//! The six end-to-end scenarios, driven through the public API the way an
//! external caller would use it.

use std::collections::HashMap;

use trajpattern::cftree::{CFEntry, K};
use trajpattern::catalog::ClusterCatalog;
use trajpattern::continuity::ContinuityGraph;
use trajpattern::mining::{self, TincEntry};
use trajpattern::patterns;
use trajpattern::{CancellationToken, Point, Trajectory};

fn traj(points: &[(f64, f64, f64)], origin: usize) -> Trajectory {
    let pts = points.iter().map(|&(x, y, t)| Point::new(x, y, t)).collect();
    Trajectory::new(pts, origin).unwrap()
}

#[test]
fn scenario_1_trivial_collinear_trajectory_emits_no_pattern() {
    let trajectories = vec![traj(&[(0.0, 0.0, 0.0), (1.0, 0.0, 1.0), (2.0, 0.0, 2.0)], 0)];
    let config = trajpattern::PipelineConfig::new(1.0, false, 0.0, false, 10.0, &[1.0; 6], 1.0, 0, 1000.0, 2, 1).unwrap();
    let cancel = CancellationToken::new();
    let out = trajpattern::run(&trajectories, &config, &cancel).unwrap();

    assert_eq!(out.segments.len(), 1);
    assert_eq!(out.tins, vec![vec![0]]);
    assert_eq!(out.tinc, vec![(0, vec![0])]);
    assert!(out.patterns.is_empty(), "support 1 < minSup 2");
}

#[test]
fn scenario_2_two_identical_zigzags_merge_into_one_length_4_pattern() {
    let zigzag = [(0.0, 0.0, 0.0), (1.0, 5.0, 1.0), (2.0, 0.0, 2.0), (3.0, 5.0, 3.0), (4.0, 0.0, 4.0)];
    let trajectories = vec![traj(&zigzag, 0), traj(&zigzag, 1)];
    let weights = [1.0, 1.0, 1.0, 1.0, 0.0, 0.0];
    let config = trajpattern::PipelineConfig::new(1.0, false, 0.0, false, 0.5, &weights, 0.01, 0, 0.5, 2, 1).unwrap();
    let cancel = CancellationToken::new();
    let out = trajpattern::run(&trajectories, &config, &cancel).unwrap();

    assert_eq!(out.catalog.len(), 4);
    assert_eq!(out.patterns.len(), 1);
    assert_eq!(out.patterns[0].len(), 4);
}

#[test]
fn scenario_3_origin_dedup_counts_simplification_variants_once() {
    // One raw trace simplified at 3 thresholds contributes 3 TinC variants,
    // all tracing back to origin 0; a second trace (origin 1) matches too.
    let entries: Vec<CFEntry> = (0..2).map(|i| CFEntry::from_point([i as f64, 0.0, 1.0, 0.0, 0.0, 1.0])).collect();
    let catalog = ClusterCatalog::from_entries(&entries, &[1.0; K]);
    let graph = ContinuityGraph::build(&catalog, 10.0);

    let tincs: Vec<TincEntry> = vec![
        (0, vec![0, 1]), // origin 0, variant A
        (1, vec![0, 1]), // origin 0, variant B
        (2, vec![0, 1]), // origin 0, variant C
        (3, vec![0, 1]), // origin 1
    ];
    let mut t2ot = HashMap::new();
    t2ot.insert(0, 0);
    t2ot.insert(1, 0);
    t2ot.insert(2, 0);
    t2ot.insert(3, 1);
    let cancel = CancellationToken::new();

    let at_2 = mining::mine(&tincs, &t2ot, &graph, 2, &cancel);
    assert!(at_2.iter().any(|p| p.ids() == [0, 1]), "support is 2 distinct origins, minSup 2 should emit");

    let at_3 = mining::mine(&tincs, &t2ot, &graph, 3, &cancel);
    assert!(at_3.is_empty(), "only 2 distinct origins exist, minSup 3 must emit nothing");
}

#[test]
fn scenario_4_continuity_graph_blocks_non_adjacent_transition() {
    // A -> B is a true adjacency; B -> C is geometrically far and excluded
    // from the continuity graph, so [A,B,C] and [B,C] must never emit.
    let entries = vec![
        CFEntry::from_point([0.0, 0.0, 1.0, 0.0, 0.0, 1.0]),
        CFEntry::from_point([1.0, 0.0, 1.0, 0.0, 1.0, 2.0]),
        CFEntry::from_point([100.0, 0.0, 1.0, 0.0, 2.0, 3.0]),
    ];
    let catalog = ClusterCatalog::from_entries(&entries, &[1.0; K]);
    let graph = ContinuityGraph::build(&catalog, 0.5);

    let tincs: Vec<TincEntry> = vec![(0, vec![0, 1, 2]), (1, vec![0, 1, 2])];
    let t2ot: HashMap<usize, usize> = (0..2).map(|i| (i, i)).collect();
    let cancel = CancellationToken::new();

    let mut patterns = mining::mine(&tincs, &t2ot, &graph, 2, &cancel);
    patterns.sort_by(|a, b| a.ids().cmp(b.ids()));
    let ids: Vec<Vec<u32>> = patterns.iter().map(|p| p.ids().to_vec()).collect();

    assert!(ids.contains(&vec![0]));
    assert!(ids.contains(&vec![1]));
    assert!(ids.contains(&vec![2]));
    assert!(ids.contains(&vec![0, 1]));
    assert!(!ids.contains(&vec![1, 2]));
    assert!(!ids.contains(&vec![0, 1, 2]));
}

#[test]
fn scenario_5_canonicalization_keeps_only_maximal_patterns() {
    use trajpattern::Pattern;

    let raw = vec![
        Pattern::new(vec![1]),
        Pattern::new(vec![1, 2]),
        Pattern::new(vec![1, 2, 3]),
        Pattern::new(vec![2]),
        Pattern::new(vec![2, 3]),
    ];
    let mut canonical: Vec<Vec<u32>> = patterns::canonicalize(raw).into_iter().map(|p| p.ids().to_vec()).collect();
    canonical.sort();

    assert_eq!(canonical, vec![vec![1, 2, 3], vec![2, 3]]);
}

#[test]
fn scenario_6_rebuild_bounds_leaf_radius_and_cluster_count() {
    use trajpattern::cftree::CFTree;

    // A tight initial threshold and a small memory ceiling force at least
    // one automatic rebuild partway through the insert loop.
    let mut tree = CFTree::with_branching(0.1, 600, 4, 4);
    for i in 0..200 {
        tree.insert([i as f64 * 0.05, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }
    assert!(tree.threshold() > 0.1, "memory overflow should have grown the threshold");
    let pre_rebuild_count = tree.cluster().len();

    tree.rebuild(true);
    let entries = tree.cluster();
    let t = tree.threshold();
    for e in &entries {
        assert!(e.radius() <= t + 1e-6, "leaf radius {} exceeds threshold {}", e.radius(), t);
    }
    assert!(entries.len() <= pre_rebuild_count);
}
