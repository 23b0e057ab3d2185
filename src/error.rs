//! Crate-wide error hierarchy.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the pipeline.
///
/// `SimplificationFailure` is the only recoverable kind: stage B catches it
/// per-trajectory, logs, and continues. Every other variant is fatal to the
/// stage that raised it.
#[derive(Debug, Error)]
pub enum Error {
    /// A trajectory with fewer than two points, non-monotonic timestamps, or
    /// an otherwise unreadable sample sequence.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// DOTS/SEST simplification found no feasible path for a trajectory.
    /// Recoverable: callers should skip the trajectory and continue.
    #[error("simplification failed: {0}")]
    SimplificationFailure(String),

    /// The CF-tree could not allocate a node or complete a split.
    #[error("clustering failed: {0}")]
    ClusteringFailure(String),

    /// The feature weight vector did not have exactly `K` entries.
    #[error("weight vector has {got} entries, expected {expected}")]
    WeightMismatch { expected: usize, got: usize },

    /// An on-disk artifact was internally inconsistent (e.g. `.tins` and
    /// `.s2c` disagree on segment order, or a record count header did not
    /// match the following records).
    #[error("malformed artifact: {0}")]
    MalformedArtifact(String),

    /// Propagated I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
