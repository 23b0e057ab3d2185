//! Geometry primitives: points, trajectories, segments, and distances.
//!
//! Map projection (Mercator) and coordinate normalization happen upstream
//! of this crate; everything here operates on already-projected planar
//! coordinates in meters, with time in seconds since epoch.

mod point;
mod segment;

pub use point::{point_segment_distance, Point, Trajectory};
pub use segment::{SegmentLocation, WIRE_SIZE};
