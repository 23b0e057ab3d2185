//! Mapping a [`SegmentLocation`] to the 6-D feature vector the CF-tree
//! clusters on.

use crate::cftree::K;
use crate::error::{Error, Result};
use crate::geometry::SegmentLocation;

/// `[x, y, rx, ry, startT, endT]`, unweighted.
pub fn encode(segment: &SegmentLocation) -> [f64; K] {
    [segment.x, segment.y, segment.rx, segment.ry, segment.start_t, segment.end_t]
}

/// `encode(segment)` with each dimension multiplied by the corresponding
/// weight.
pub fn weighted(segment: &SegmentLocation, weights: &[f64; K]) -> [f64; K] {
    let mut f = encode(segment);
    for i in 0..K {
        f[i] *= weights[i];
    }
    f
}

/// Un-applies a weight vector from a weighted feature vector, used when
/// materializing cluster centroids back into the unweighted segment space.
pub fn unweighted(v: [f64; K], weights: &[f64; K]) -> [f64; K] {
    let mut out = v;
    for i in 0..K {
        out[i] /= weights[i];
    }
    out
}

/// Validates that a caller-supplied weight slice has exactly `K` entries.
pub fn validate_weights(weights: &[f64]) -> Result<[f64; K]> {
    if weights.len() != K {
        return Err(Error::WeightMismatch { expected: K, got: weights.len() });
    }
    let mut out = [0.0; K];
    out.copy_from_slice(weights);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    #[test]
    fn weighted_then_unweighted_is_identity() {
        let seg = SegmentLocation::new(0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        let weights = [2.0, 0.5, 1.0, 1.0, 0.0, 1.0];
        // Zero weight on a dimension is not invertible; use non-zero weights here.
        let weights = if weights[4] == 0.0 { [2.0, 0.5, 1.0, 1.0, 1.0, 1.0] } else { weights };
        let w = weighted(&seg, &weights);
        let back = unweighted(w, &weights);
        for i in 0..K {
            assert!(approx_eq!(f64, back[i], encode(&seg)[i], epsilon = 1e-9));
        }
    }

    #[test]
    fn rejects_mismatched_weight_length() {
        assert!(validate_weights(&[1.0, 2.0, 3.0]).is_err());
        assert!(validate_weights(&[1.0; 6]).is_ok());
    }
}
