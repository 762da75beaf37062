//! Column normalization and banding utilities shared by the scorers.
//!
//! Every engagement metric and interaction feature in this engine goes
//! through [`min_max`] before entering a weighted sum; the degenerate
//! rule (constant column → all zeros) guarantees a flat metric never
//! influences a ranking.

use tracing::warn;

/// Tolerance below which a column's spread counts as degenerate.
const DEGENERATE_RANGE: f32 = 1e-10;

/// Min-max scales a column into [0, 1].
///
/// A degenerate column (max == min, including single-element and
/// all-equal inputs) maps to all zeros — not 0.5 and not NaN — so a
/// flat metric contributes nothing to a weighted sum. The input is
/// never mutated; an empty slice yields an empty vector.
///
/// # Examples
///
/// ```
/// use recomendar::preprocessing::min_max;
///
/// let scaled = min_max(&[10.0, 20.0, 30.0]);
/// assert_eq!(scaled, vec![0.0, 0.5, 1.0]);
///
/// // Constant column: all zeros, by policy.
/// assert_eq!(min_max(&[7.0, 7.0, 7.0]), vec![0.0, 0.0, 0.0]);
/// ```
#[must_use]
pub fn min_max(values: &[f32]) -> Vec<f32> {
    if values.is_empty() {
        return Vec::new();
    }

    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for &v in values {
        if v < lo {
            lo = v;
        }
        if v > hi {
            hi = v;
        }
    }

    let range = hi - lo;
    if range.abs() < DEGENERATE_RANGE {
        return vec![0.0; values.len()];
    }

    values.iter().map(|&v| (v - lo) / range).collect()
}

/// Interior quantile cut points for splitting a column into `bands`
/// coarse segments.
///
/// Returns `bands - 1` ascending bounds computed by linear
/// interpolation on a sorted copy (the same scheme as a q-cut with
/// evenly spaced quantiles). Fewer than two distinct values, or fewer
/// than two bands, yield no bounds — callers should treat that as a
/// single segment.
///
/// # Examples
///
/// ```
/// use recomendar::preprocessing::quantile_bounds;
///
/// let bounds = quantile_bounds(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3);
/// assert_eq!(bounds.len(), 2);
/// assert!(bounds[0] < bounds[1]);
/// ```
#[must_use]
pub fn quantile_bounds(values: &[f32], bands: usize) -> Vec<f32> {
    if bands < 2 || values.len() < 2 {
        return Vec::new();
    }

    let mut sorted: Vec<f32> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    if (sorted[sorted.len() - 1] - sorted[0]).abs() < DEGENERATE_RANGE {
        warn!(n = values.len(), "degenerate column, no quantile bounds");
        return Vec::new();
    }

    (1..bands)
        .map(|b| {
            let q = b as f32 / bands as f32;
            let pos = q * (sorted.len() - 1) as f32;
            let lo_idx = pos.floor() as usize;
            let hi_idx = pos.ceil() as usize;
            let frac = pos - lo_idx as f32;
            sorted[lo_idx] + (sorted[hi_idx] - sorted[lo_idx]) * frac
        })
        .collect()
}

/// Index of the band a value falls into, given ascending `bounds`.
///
/// With `n` bounds the result is in `0..=n`; an empty bounds slice
/// puts everything in band 0.
#[must_use]
pub fn band_index(value: f32, bounds: &[f32]) -> usize {
    bounds.iter().take_while(|b| value > **b).count()
}


// Normalization bound contracts (constant column, output range).
#[cfg(test)]
#[path = "normalize_contract.rs"]
mod normalize_contract;
