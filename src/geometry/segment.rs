use crate::error::{Error, Result};

/// Wire size of a [`SegmentLocation`]: one `u32` plus six `f64`s.
pub const WIRE_SIZE: usize = 4 + 6 * 8;

/// A directed line segment: runs from `(x, y)` to `(x + rx, y + ry)` between
/// `startT` and `endT`. `id` is a serial number assigned in creation order
/// across the whole stream of segments produced from all trajectories (or,
/// for catalog entries, the cluster id).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentLocation {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub rx: f64,
    pub ry: f64,
    pub start_t: f64,
    pub end_t: f64,
}

impl SegmentLocation {
    pub fn new(id: u32, x: f64, y: f64, rx: f64, ry: f64, start_t: f64, end_t: f64) -> Self {
        SegmentLocation { id, x, y, rx, ry, start_t, end_t }
    }

    /// Euclidean length of the segment.
    pub fn length(&self) -> f64 {
        (self.rx * self.rx + self.ry * self.ry).sqrt()
    }

    pub fn start_point(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn end_point(&self) -> (f64, f64) {
        (self.x + self.rx, self.y + self.ry)
    }

    /// Serializes to the fixed 52-byte little-endian wire format
    /// (one `u32` plus six `f64`s: 4 + 6*8 = 52 bytes).
    pub fn to_bytes(&self) -> [u8; WIRE_SIZE] {
        let mut buf = [0u8; WIRE_SIZE];
        buf[0..4].copy_from_slice(&self.id.to_le_bytes());
        buf[4..12].copy_from_slice(&self.x.to_le_bytes());
        buf[12..20].copy_from_slice(&self.y.to_le_bytes());
        buf[20..28].copy_from_slice(&self.rx.to_le_bytes());
        buf[28..36].copy_from_slice(&self.ry.to_le_bytes());
        buf[36..44].copy_from_slice(&self.start_t.to_le_bytes());
        buf[44..52].copy_from_slice(&self.end_t.to_le_bytes());
        buf
    }

    /// Parses the fixed 52-byte little-endian wire format.
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        if buf.len() != WIRE_SIZE {
            return Err(Error::MalformedArtifact(format!(
                "expected {WIRE_SIZE} bytes for a SegmentLocation, got {}",
                buf.len()
            )));
        }
        let id = u32::from_le_bytes(buf[0..4].try_into().unwrap());
        let x = f64::from_le_bytes(buf[4..12].try_into().unwrap());
        let y = f64::from_le_bytes(buf[12..20].try_into().unwrap());
        let rx = f64::from_le_bytes(buf[20..28].try_into().unwrap());
        let ry = f64::from_le_bytes(buf[28..36].try_into().unwrap());
        let start_t = f64::from_le_bytes(buf[36..44].try_into().unwrap());
        let end_t = f64::from_le_bytes(buf[44..52].try_into().unwrap());
        Ok(SegmentLocation { id, x, y, rx, ry, start_t, end_t })
    }
}
