//! `PipelineConfig`: the tunables the pipeline stages consume, validated
//! once before any stage runs.

use serde::{Deserialize, Serialize};

use crate::cftree::K;
use crate::error::{Error, Result};
use crate::features;

/// All tunables the core pipeline consumes, independent of I/O or CLI
/// concerns (those are left to callers per the crate's scope).
///
/// Derives `Serialize`/`Deserialize` so a caller can round-trip a config
/// through JSON, TOML, or any other serde format without this crate
/// knowing which one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Additive threshold step in SEST (units of the distance function).
    pub seg_step: f64,
    /// Whether simplification distance uses the time axis.
    pub use_temporal: bool,
    /// Scale applied to the time axis when `use_temporal` is set, expressed
    /// in the same units as spatial distance (meters). Defaults to `1.0`
    /// when left unset.
    pub temporal_weight: f64,
    /// Minimum segment length filter, applied after simplification.
    pub min_length: f64,
    /// Single-threshold simplification (`false`) vs. a SEST threshold
    /// sweep (`true`).
    pub use_sest: bool,
    /// Primary / starting simplification threshold.
    pub dots_th: f64,
    /// Per-dimension feature weights, length `K` (`[x, y, rx, ry, startT,
    /// endT]`). Validated by [`PipelineConfig::validate`].
    pub weights: [f64; K],
    /// CF-tree leaf-radius threshold `T`.
    pub thresh: f64,
    /// Byte ceiling triggering a CF-tree rebuild; `0` disables the bound.
    pub memory_lim: usize,
    /// Radius `r` in the continuity graph.
    pub continuity_radius: f64,
    /// Pattern support threshold, counted over distinct origin
    /// trajectories.
    pub min_sup: usize,
    /// Post-canonicalization display-only length filter; never affects
    /// canonicalization or support counting.
    pub min_len: usize,
    /// CF-tree non-leaf branching factor.
    pub b_nonleaf: usize,
    /// CF-tree leaf branching factor.
    pub b_leaf: usize,
}

impl PipelineConfig {
    /// Builds a config from a caller-supplied weight slice, checking its
    /// length up front (`WeightMismatch` is fatal before any stage runs).
    pub fn new(
        seg_step: f64,
        use_temporal: bool,
        min_length: f64,
        use_sest: bool,
        dots_th: f64,
        weights: &[f64],
        thresh: f64,
        memory_lim: usize,
        continuity_radius: f64,
        min_sup: usize,
        min_len: usize,
    ) -> Result<Self> {
        let weights = features::validate_weights(weights)?;
        Ok(PipelineConfig {
            seg_step,
            use_temporal,
            temporal_weight: 1.0,
            min_length,
            use_sest,
            dots_th,
            weights,
            thresh,
            memory_lim,
            continuity_radius,
            min_sup,
            min_len,
            b_nonleaf: 8,
            b_leaf: 8,
        })
    }

    /// Re-validates a config built by hand (e.g. via struct-update syntax),
    /// mainly useful once weights have been mutated after construction.
    pub fn validate(&self) -> Result<()> {
        if self.min_sup == 0 {
            return Err(Error::MalformedArtifact("minSup must be >= 1".to_string()));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    /// Conservative defaults: no SEST sweep, unweighted-by-default
    /// thresholds left to the caller to tune.
    fn default() -> Self {
        PipelineConfig {
            seg_step: 1.0,
            use_temporal: false,
            temporal_weight: 1.0,
            min_length: 0.0,
            use_sest: false,
            dots_th: 1.0,
            weights: [1.0; K],
            thresh: 1.0,
            memory_lim: 0,
            continuity_radius: 1.0,
            min_sup: 1,
            min_len: 1,
            b_nonleaf: 8,
            b_leaf: 8,
        }
    }
}
