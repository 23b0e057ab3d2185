//! Continuity-constrained PrefixSpan: projected-database sequential pattern
//! mining over TinC strings, with support counted by distinct *origin*
//! trajectory rather than by derived simplification variant.

use std::collections::{HashMap, HashSet};

use crate::continuity::ContinuityGraph;
use crate::patterns::Pattern;
use crate::pipeline::cancel::CancellationToken;

/// One surviving trajectory's TinC, paired with the (variant) trajectory
/// index used to look it up in `t2ot`.
pub type TincEntry = (usize, Vec<u32>);

/// A projected-database cursor: which trajectory (index into `tincs`) and
/// how far into its TinC the projection currently starts.
type Projection = (usize, usize);

/// Mines the canonical-before-dedup pattern set for the given TinC strings,
/// constrained to transitions allowed by `graph`, with support computed
/// over distinct entries of `t2ot`.
///
/// Sequential by design for deterministic emission order — see [`par_mine`]
/// for a variant that fans recursion out across threads instead.
pub fn mine(tincs: &[TincEntry], t2ot: &HashMap<usize, usize>, graph: &ContinuityGraph, min_sup: usize, cancel: &CancellationToken) -> Vec<Pattern> {
    let initial: Vec<Projection> = (0..tincs.len()).map(|j| (j, 0)).collect();
    let mut out = Vec::new();
    mine_rec(&[], initial, tincs, t2ot, graph, min_sup, cancel, &mut out);
    out
}

/// Like [`mine`], but fans the candidate set of each recursive call out
/// across two `rayon::join` branches, splitting the candidate list the way
/// a binary partition tree splits into two children. Emission order is
/// therefore unspecified; canonicalization and support counting are
/// unaffected since they are set-based.
pub fn par_mine(tincs: &[TincEntry], t2ot: &HashMap<usize, usize>, graph: &ContinuityGraph, min_sup: usize, cancel: &CancellationToken) -> Vec<Pattern> {
    let initial: Vec<Projection> = (0..tincs.len()).map(|j| (j, 0)).collect();
    par_mine_rec(&[], initial, tincs, t2ot, graph, min_sup, cancel)
}

fn distinct_origin_count(projections: &[Projection], tincs: &[TincEntry], t2ot: &HashMap<usize, usize>) -> usize {
    projections.iter().map(|&(j, _)| t2ot[&tincs[j].0]).collect::<HashSet<_>>().len()
}

fn candidates_for(prefix: &[u32], graph: &ContinuityGraph) -> Vec<u32> {
    match prefix.last() {
        None => graph.all_ids(),
        Some(&last) => graph.successors(last).to_vec(),
    }
}

/// Extends every current projection by `c`, finding the smallest index at
/// or after its offset whose cluster id matches. Returns the set of origin
/// ids among *all* matches (terminal-position matches count toward
/// support) and the subset of projections usable for further recursion
/// (matches that are not already at the end of their TinC).
fn extend_by(c: u32, projections: &[Projection], tincs: &[TincEntry], t2ot: &HashMap<usize, usize>) -> (HashSet<usize>, Vec<Projection>) {
    let mut origins = HashSet::new();
    let mut next = Vec::new();
    for &(j, o) in projections {
        let seq = &tincs[j].1;
        if let Some(idx) = (o..seq.len()).find(|&k| seq[k] == c) {
            origins.insert(t2ot[&tincs[j].0]);
            if idx + 1 < seq.len() {
                next.push((j, idx + 1));
            }
        }
    }
    (origins, next)
}

#[allow(clippy::too_many_arguments)]
fn mine_rec(
    prefix: &[u32],
    projections: Vec<Projection>,
    tincs: &[TincEntry],
    t2ot: &HashMap<usize, usize>,
    graph: &ContinuityGraph,
    min_sup: usize,
    cancel: &CancellationToken,
    out: &mut Vec<Pattern>,
) {
    if distinct_origin_count(&projections, tincs, t2ot) < min_sup {
        return;
    }
    for c in candidates_for(prefix, graph) {
        if cancel.is_cancelled() {
            return;
        }
        let (origins, next_projections) = extend_by(c, &projections, tincs, t2ot);
        if origins.len() < min_sup {
            continue;
        }
        let mut extended = prefix.to_vec();
        extended.push(c);
        out.push(Pattern::new(extended.clone()));
        mine_rec(&extended, next_projections, tincs, t2ot, graph, min_sup, cancel, out);
    }
}

fn par_mine_rec(
    prefix: &[u32],
    projections: Vec<Projection>,
    tincs: &[TincEntry],
    t2ot: &HashMap<usize, usize>,
    graph: &ContinuityGraph,
    min_sup: usize,
    cancel: &CancellationToken,
) -> Vec<Pattern> {
    if cancel.is_cancelled() || distinct_origin_count(&projections, tincs, t2ot) < min_sup {
        return Vec::new();
    }
    let candidates = candidates_for(prefix, graph);
    if candidates.len() <= 1 {
        let mut out = Vec::new();
        for c in candidates {
            expand_one(prefix, &projections, c, tincs, t2ot, graph, min_sup, cancel, &mut out);
        }
        return out;
    }

    let mid = candidates.len() / 2;
    let (left, right) = candidates.split_at(mid);
    let (mut left_out, right_out) = rayon::join(
        || {
            let mut acc = Vec::new();
            for &c in left {
                expand_one(prefix, &projections, c, tincs, t2ot, graph, min_sup, cancel, &mut acc);
            }
            acc
        },
        || {
            let mut acc = Vec::new();
            for &c in right {
                expand_one(prefix, &projections, c, tincs, t2ot, graph, min_sup, cancel, &mut acc);
            }
            acc
        },
    );
    left_out.extend(right_out);
    left_out
}

#[allow(clippy::too_many_arguments)]
fn expand_one(
    prefix: &[u32],
    projections: &[Projection],
    c: u32,
    tincs: &[TincEntry],
    t2ot: &HashMap<usize, usize>,
    graph: &ContinuityGraph,
    min_sup: usize,
    cancel: &CancellationToken,
    out: &mut Vec<Pattern>,
) {
    let (origins, next_projections) = extend_by(c, projections, tincs, t2ot);
    if origins.len() < min_sup {
        return;
    }
    let mut extended = prefix.to_vec();
    extended.push(c);
    out.push(Pattern::new(extended.clone()));
    out.extend(par_mine_rec(&extended, next_projections, tincs, t2ot, graph, min_sup, cancel));
}
