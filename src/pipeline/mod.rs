//! Orchestrates the four core stages end to end: simplification, CF-tree
//! clustering, trajectory rewriting, and continuity-constrained PrefixSpan
//! mining.
//!
//! A single-threaded, synchronous pipeline: stages run strictly in order,
//! and `Vec<Trajectory>` ingestion (parsing raw trace files, applying the
//! Mercator projection) is left to the caller.

pub mod cancel;

use std::collections::HashMap;

use rayon::prelude::*;

use crate::catalog::ClusterCatalog;
use crate::cftree::CFTree;
use crate::config::PipelineConfig;
use crate::continuity::ContinuityGraph;
use crate::error::Result;
use crate::features;
use crate::geometry::{SegmentLocation, Trajectory};
use crate::mining::{self, TincEntry};
use crate::patterns::{self, Pattern};
use crate::rewrite::{Rewriter, SegmentToCluster};
use crate::simplify;

pub use cancel::CancellationToken;

/// Everything the pipeline produces, at the granularity the on-disk
/// artifact set persists: segments, the trajectory→origin map, the
/// cluster catalog, the segment→cluster map, TinC strings, and the final
/// (canonicalized, display-filtered) pattern set.
#[derive(Debug)]
pub struct PipelineOutput {
    pub segments: Vec<SegmentLocation>,
    pub tins: Vec<Vec<u32>>,
    pub t2ot: Vec<(u32, u32)>,
    pub catalog: ClusterCatalog,
    pub s2c: SegmentToCluster,
    pub tinc: Vec<(usize, Vec<u32>)>,
    pub graph: ContinuityGraph,
    /// Canonicalized patterns, before the cosmetic `minLen` display filter.
    pub patterns: Vec<Pattern>,
    /// `patterns` with `config.min_len` applied, the set callers typically
    /// want to display or persist to `.stp`.
    pub displayed_patterns: Vec<Pattern>,
}

/// Runs stage B (simplification) over every input trajectory, embarrassingly
/// parallel (segment ids are assigned by a serial renumbering pass
/// afterward, keeping ids a contiguous prefix of the naturals).
///
/// Per-trajectory `SimplificationFailure` is recoverable: it is logged and
/// the trajectory is dropped. Returns, for each surviving trajectory
/// variant, its segment list and origin index.
fn run_simplification(trajectories: &[Trajectory], config: &PipelineConfig, cancel: &CancellationToken) -> Vec<(usize, Vec<SegmentLocation>)> {
    trajectories
        .par_iter()
        .enumerate()
        .filter_map(|(_i, traj)| {
            if cancel.is_cancelled() {
                return None;
            }
            let origin = traj.origin();
            let families: Vec<Vec<usize>> = if config.use_sest {
                simplify::simplify_sest(traj, config.dots_th, config.seg_step, config.use_temporal, config.temporal_weight)
            } else {
                match simplify::simplify(traj, config.dots_th, config.use_temporal, config.temporal_weight) {
                    Ok(indices) => vec![indices],
                    Err(e) => {
                        log::warn!("trajectory with origin {origin} failed to simplify: {e}");
                        Vec::new()
                    }
                }
            };

            let mut out = Vec::with_capacity(families.len());
            for indices in families {
                // start_id is patched in the serial renumbering pass below;
                // 0 here is a placeholder local to this trajectory.
                let (segments, _) = simplify::extract_segments(traj, &indices, 0, config.min_length);
                if !segments.is_empty() {
                    out.push((origin, segments));
                }
            }
            Some(out)
        })
        .flatten()
        .collect()
}

/// Serially renumbers segment ids across every trajectory variant so they
/// form a contiguous prefix of the naturals in variant order, and records
/// one `t2ot` pair per variant.
fn renumber_segments(variants: Vec<(usize, Vec<SegmentLocation>)>) -> (Vec<(u32, u32)>, Vec<Vec<SegmentLocation>>) {
    let mut next_id = 0u32;
    let mut t2ot = Vec::with_capacity(variants.len());
    let mut tins = Vec::with_capacity(variants.len());
    for (variant_idx, (origin, mut segments)) in variants.into_iter().enumerate() {
        for seg in segments.iter_mut() {
            seg.id = next_id;
            next_id += 1;
        }
        t2ot.push((variant_idx as u32, origin as u32));
        tins.push(segments);
    }
    (t2ot, tins)
}

/// Runs stage D: inserts every segment's weighted feature vector into a
/// CF-tree, performs a final consolidating rebuild with overlap merging,
/// and materializes the cluster catalog plus the segment→cluster map.
fn run_clustering(tins: &[Vec<SegmentLocation>], config: &PipelineConfig, cancel: &CancellationToken) -> (ClusterCatalog, SegmentToCluster) {
    let mut tree = CFTree::with_branching(config.thresh, config.memory_lim, config.b_nonleaf, config.b_leaf);
    let mut weighted_by_id: Vec<(u32, [f64; crate::cftree::K])> = Vec::new();

    for segments in tins {
        for seg in segments {
            if cancel.is_cancelled() {
                break;
            }
            let v = features::weighted(seg, &config.weights);
            tree.insert(v);
            weighted_by_id.push((seg.id, v));
        }
    }

    tree.rebuild(true);
    let entries = tree.cluster();
    let catalog = ClusterCatalog::from_entries(&entries, &config.weights);

    let points: Vec<[f64; crate::cftree::K]> = weighted_by_id.iter().map(|(_, v)| *v).collect();
    let assignments = CFTree::redistribute(&points, &entries);
    let s2c: SegmentToCluster = weighted_by_id.iter().zip(assignments).map(|((id, _), cluster)| (*id, cluster as u32)).collect();

    (catalog, s2c)
}

/// Runs the full pipeline: simplification, clustering, rewriting, the
/// continuity graph, and PrefixSpan mining, in that order. `trajectories`
/// must already carry a valid origin index per raw input file (raw point
/// ingestion and Mercator projection are the caller's responsibility).
pub fn run(trajectories: &[Trajectory], config: &PipelineConfig, cancel: &CancellationToken) -> Result<PipelineOutput> {
    config.validate()?;

    log::info!("stage B: simplifying {} trajectories", trajectories.len());
    let variants = run_simplification(trajectories, config, cancel);
    let (t2ot, tins) = renumber_segments(variants);
    let segments: Vec<SegmentLocation> = tins.iter().flatten().copied().collect();
    log::info!("stage B produced {} segments across {} trajectory variants", segments.len(), tins.len());

    log::info!("stage D: clustering segments");
    let (catalog, s2c) = run_clustering(&tins, config, cancel);
    log::info!("stage D produced {} clusters", catalog.len());

    log::info!("stage F: rewriting trajectories into TinC strings");
    let tins_ids: Vec<Vec<u32>> = tins.iter().map(|segs| segs.iter().map(|s| s.id).collect()).collect();
    let tinc = Rewriter::rewrite_all(&tins_ids, &s2c)?;

    log::info!("stage G: building the continuity graph");
    let graph = ContinuityGraph::build(&catalog, config.continuity_radius);

    log::info!("stage H: mining patterns (minSup = {})", config.min_sup);
    let t2ot_map: HashMap<usize, usize> = t2ot.iter().map(|&(variant, origin)| (variant as usize, origin as usize)).collect();
    let tinc_entries: Vec<TincEntry> = tinc.clone();
    let raw_patterns = mining::mine(&tinc_entries, &t2ot_map, &graph, config.min_sup, cancel);

    log::info!("stage I: canonicalizing {} raw pattern emissions", raw_patterns.len());
    let patterns = patterns::canonicalize(raw_patterns);
    let displayed_patterns = patterns::filter_by_min_len(&patterns, config.min_len);
    log::info!("mining finished with {} canonical patterns ({} after minLen filter)", patterns.len(), displayed_patterns.len());

    Ok(PipelineOutput { segments, tins: tins_ids, t2ot, catalog, s2c, tinc, graph, patterns, displayed_patterns })
}
