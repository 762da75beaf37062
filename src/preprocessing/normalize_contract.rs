//! Property contracts for column normalization.
//!
//! - `min_max` output always lies in [0, 1]
//! - a constant column always maps to all zeros
//! - output length always equals input length
//! - `quantile_bounds` is monotone and bounded by the data range

use super::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn minmax_output_in_unit_interval(values in prop::collection::vec(-1e6f32..1e6, 0..64)) {
        let out = min_max(&values);
        prop_assert_eq!(out.len(), values.len());
        for v in out {
            prop_assert!((0.0..=1.0).contains(&v), "out of range: {}", v);
        }
    }

    #[test]
    fn minmax_constant_column_all_zeros(value in -1e6f32..1e6, len in 1usize..32) {
        let values = vec![value; len];
        let out = min_max(&values);
        prop_assert!(out.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn minmax_hits_both_endpoints(values in prop::collection::vec(-1e6f32..1e6, 2..64)) {
        let out = min_max(&values);
        let spread = {
            let lo = values.iter().copied().fold(f32::INFINITY, f32::min);
            let hi = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            hi - lo
        };
        if spread > 1e-6 {
            let max = out.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let min = out.iter().copied().fold(f32::INFINITY, f32::min);
            prop_assert!((max - 1.0).abs() < 1e-5);
            prop_assert!(min.abs() < 1e-5);
        }
    }

    #[test]
    fn quantile_bounds_monotone_and_in_range(
        values in prop::collection::vec(0.0f32..1e6, 2..64),
        bands in 2usize..6,
    ) {
        let bounds = quantile_bounds(&values, bands);
        let lo = values.iter().copied().fold(f32::INFINITY, f32::min);
        let hi = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        for pair in bounds.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
        for b in bounds {
            prop_assert!(b >= lo && b <= hi);
        }
    }
}
