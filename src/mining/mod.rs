//! Continuity-constrained, origin-unique sequential pattern mining.

mod prefixspan;

pub use prefixspan::{mine, par_mine, TincEntry};
