//! Binary encode/decode helpers for the on-disk artifact set:
//! `.seg`, `.tins`, `.t2ot`, `.cluster`, `.s2c`, `.tinc`, `.stp`.
//!
//! Every record is little-endian; `u32` counts precede the records they
//! govern. A count whose following records run past EOF is a
//! `MalformedArtifact`, not an `IoError` — the header lied about what
//! follows it.

use std::io::{self, Read, Write};

use crate::error::{Error, Result};
use crate::geometry::SegmentLocation;

fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn write_u32<W: Write>(w: &mut W, v: u32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

/// Reads a concatenation of wire-format `SegmentLocation` records, used for
/// both `.seg` (stage B output) and `.cluster` (stage D output, `id` being
/// the cluster id).
pub fn read_segments<R: Read>(r: &mut R) -> Result<Vec<SegmentLocation>> {
    let mut out = Vec::new();
    let mut buf = [0u8; crate::geometry::WIRE_SIZE];
    loop {
        match r.read_exact(&mut buf) {
            Ok(()) => out.push(SegmentLocation::from_bytes(&buf)?),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(Error::Io(e)),
        }
    }
    Ok(out)
}

pub fn write_segments<W: Write>(w: &mut W, segments: &[SegmentLocation]) -> Result<()> {
    for s in segments {
        w.write_all(&s.to_bytes())?;
    }
    Ok(())
}

/// Reads `.tins`/`.tinc`: repeated `(u32 count, count * u32)` records, one
/// per trajectory.
pub fn read_u32_lists<R: Read>(r: &mut R) -> Result<Vec<Vec<u32>>> {
    let mut out = Vec::new();
    loop {
        let count = match read_u32(r) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(Error::Io(e)),
        };
        let mut ids = Vec::with_capacity(count as usize);
        for _ in 0..count {
            match read_u32(r) {
                Ok(id) => ids.push(id),
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    return Err(Error::MalformedArtifact(format!(
                        "record header announced {count} ids but stream ended after {}",
                        ids.len()
                    )))
                }
                Err(e) => return Err(Error::Io(e)),
            }
        }
        out.push(ids);
    }
    Ok(out)
}

pub fn write_u32_lists<W: Write>(w: &mut W, lists: &[Vec<u32>]) -> Result<()> {
    for ids in lists {
        write_u32(w, ids.len() as u32)?;
        for &id in ids {
            write_u32(w, id)?;
        }
    }
    Ok(())
}

/// Reads `.t2ot`/`.s2c`: repeated `(u32, u32)` pairs.
pub fn read_u32_pairs<R: Read>(r: &mut R) -> Result<Vec<(u32, u32)>> {
    let mut out = Vec::new();
    loop {
        let a = match read_u32(r) {
            Ok(a) => a,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(Error::Io(e)),
        };
        let b = match read_u32(r) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(Error::MalformedArtifact("pair stream ended after its first element".to_string()))
            }
            Err(e) => return Err(Error::Io(e)),
        };
        out.push((a, b));
    }
    Ok(out)
}

pub fn write_u32_pairs<W: Write>(w: &mut W, pairs: &[(u32, u32)]) -> Result<()> {
    for &(a, b) in pairs {
        write_u32(w, a)?;
        write_u32(w, b)?;
    }
    Ok(())
}

/// Reads `.stp`: repeated `(u32 count, count * SegmentLocation)` pattern
/// records.
pub fn read_pattern_records<R: Read>(r: &mut R) -> Result<Vec<Vec<SegmentLocation>>> {
    let mut out = Vec::new();
    let mut buf = [0u8; crate::geometry::WIRE_SIZE];
    loop {
        let count = match read_u32(r) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(Error::Io(e)),
        };
        let mut segs = Vec::with_capacity(count as usize);
        for _ in 0..count {
            match r.read_exact(&mut buf) {
                Ok(()) => segs.push(SegmentLocation::from_bytes(&buf)?),
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    return Err(Error::MalformedArtifact(format!(
                        "pattern record announced {count} segments but stream ended after {}",
                        segs.len()
                    )))
                }
                Err(e) => return Err(Error::Io(e)),
            }
        }
        out.push(segs);
    }
    Ok(out)
}

pub fn write_pattern_records<W: Write>(w: &mut W, records: &[Vec<SegmentLocation>]) -> Result<()> {
    for segs in records {
        write_u32(w, segs.len() as u32)?;
        for s in segs {
            w.write_all(&s.to_bytes())?;
        }
    }
    Ok(())
}
