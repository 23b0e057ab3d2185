//! A BIRCH-style CF-tree: incremental, memory-bounded clustering over a
//! fixed-dimension feature space.
//!
//! Unlike the intrusive, pointer-linked trees typical of BIRCH
//! implementations, this one is arena-indexed: nodes live in a single
//! `Vec`, addressed by `usize` handles, with parent links as plain reverse
//! lookups rather than owning pointers (see the design note on arenas vs.
//! raw pointers).

mod entry;
mod tree;

pub use entry::CFEntry;
pub use tree::CFTree;

/// Dimensionality of the feature space clustered by the CF-tree:
/// `[x, y, rx, ry, startT, endT]`.
pub const K: usize = 6;
