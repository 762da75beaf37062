//! Property contracts for cosine similarity.
//!
//! - result on non-negative vectors lies in [0, 1]
//! - symmetric in its arguments
//! - self-similarity of a non-zero vector is 1

use super::cosine_similarity;
use proptest::prelude::*;

proptest! {
    #[test]
    fn cosine_nonnegative_vectors_in_unit_interval(
        pair in prop::collection::vec((0.0f32..100.0, 0.0f32..100.0), 1..32)
    ) {
        let a: Vec<f32> = pair.iter().map(|p| p.0).collect();
        let b: Vec<f32> = pair.iter().map(|p| p.1).collect();
        let sim = cosine_similarity(&a, &b).unwrap();
        prop_assert!((-1e-6..=1.0 + 1e-6).contains(&sim), "out of range: {}", sim);
    }

    #[test]
    fn cosine_symmetric(
        pair in prop::collection::vec((0.0f32..100.0, 0.0f32..100.0), 1..32)
    ) {
        let a: Vec<f32> = pair.iter().map(|p| p.0).collect();
        let b: Vec<f32> = pair.iter().map(|p| p.1).collect();
        let ab = cosine_similarity(&a, &b).unwrap();
        let ba = cosine_similarity(&b, &a).unwrap();
        prop_assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn cosine_self_similarity_is_one(values in prop::collection::vec(0.1f32..100.0, 1..32)) {
        let sim = cosine_similarity(&values, &values).unwrap();
        prop_assert!((sim - 1.0).abs() < 1e-5);
    }
}
