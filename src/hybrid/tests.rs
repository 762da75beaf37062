use super::*;
use crate::data::{EngagementMetrics, InteractionKind};

fn item(id: u64, name: &str, category: &str, brand: &str, price: f32, sold: u32) -> Item {
    Item {
        id,
        name: name.to_string(),
        description: format!("{name} description"),
        category: category.to_string(),
        brand: brand.to_string(),
        price_min: price,
        price_max: price * 1.1,
        metrics: EngagementMetrics {
            review_count: sold / 5,
            avg_rating: 3.5 + (sold % 15) as f32 / 10.0,
            sold_count: sold,
            order_count: sold / 2,
            unique_viewers: sold * 4,
            total_views: sold * 9,
            days_since_launch: 60,
        },
    }
}

fn catalog() -> Vec<Item> {
    vec![
        item(1, "Nova Smartphone X", "Phones", "Apple", 1000.0, 120),
        item(2, "Nova Smartphone Y", "Phones", "Apple", 1050.0, 90),
        item(3, "Orbit Smartphone Z", "Phones", "Samsung", 980.0, 150),
        item(4, "Budget Smartphone A", "Phones", "Xiaomi", 250.0, 200),
        item(5, "Creator Laptop Pro", "Laptops", "Apple", 2000.0, 40),
        item(6, "Gamer Laptop GX", "Laptops", "MSI", 1800.0, 60),
        item(7, "Studio Headphone Air", "Audio", "Sony", 300.0, 80),
        item(8, "Mini Speaker Go", "Audio", "JBL", 90.0, 170),
    ]
}

/// user 1 carries a rich history (≥ 5 events), user 2 a thin one.
fn interactions() -> Vec<Interaction> {
    vec![
        Interaction::rating(1, 1, 5.0, 100),
        Interaction::rating(1, 2, 4.5, 110),
        Interaction::new(1, 5, InteractionKind::Purchase, 120),
        Interaction::new(1, 7, InteractionKind::View, 130),
        Interaction::new(1, 8, InteractionKind::View, 140),
        Interaction::rating(2, 1, 4.0, 150),
        Interaction::new(2, 3, InteractionKind::Purchase, 160),
        Interaction::rating(3, 3, 4.8, 170),
        Interaction::new(3, 4, InteractionKind::Purchase, 180),
        Interaction::new(3, 6, InteractionKind::View, 190),
        Interaction::rating(3, 8, 4.2, 200),
        Interaction::new(3, 8, InteractionKind::Purchase, 210),
    ]
}

fn fitted() -> HybridCombiner {
    let mut combiner = HybridCombiner::new();
    combiner.fit(&catalog(), &interactions()).unwrap();
    combiner
}

#[test]
fn test_no_ids_is_empty() {
    let combiner = fitted();
    assert!(combiner.recommend(None, None, 8).is_empty());
}

#[test]
fn test_user_without_history_and_no_product_is_empty() {
    let combiner = fitted();
    // user 2 has 2 interactions, below the history gate
    assert!(combiner.recommend(Some(2), None, 8).is_empty());
    // unknown user likewise
    assert!(combiner.recommend(Some(999), None, 8).is_empty());
}

#[test]
fn test_product_only_request_works() {
    let combiner = fitted();
    let ranked = combiner.recommend(None, Some(1), 6);
    assert!(!ranked.is_empty());
    assert!(ranked.len() <= 6);
}

#[test]
fn test_no_duplicate_ids_and_size_bound() {
    let combiner = fitted();
    for (user, product) in [(Some(1), Some(1)), (None, Some(3)), (Some(1), None)] {
        let ranked = combiner.recommend(user, product, 5);
        assert!(ranked.len() <= 5);
        let mut ids: Vec<u64> = ranked.iter().map(|r| r.item_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), ranked.len(), "duplicate item ids in output");
    }
}

#[test]
fn test_scores_normalized_to_unit_interval() {
    let combiner = fitted();
    let ranked = combiner.recommend(Some(1), Some(1), 8);
    assert!(!ranked.is_empty());
    assert!((ranked[0].score - 1.0).abs() < 1e-6, "top score must be 1.0");
    for entry in &ranked {
        assert!(entry.score > 0.0 && entry.score <= 1.0 + 1e-6);
    }
}

#[test]
fn test_sorted_by_score_descending() {
    let combiner = fitted();
    let ranked = combiner.recommend(Some(1), Some(1), 8);
    for pair in ranked.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn test_popularity_tops_up_thin_results() {
    let combiner = fitted();
    // unknown product id: content yields nothing, popularity fills in
    let ranked = combiner.recommend(None, Some(999), 4);
    assert!(!ranked.is_empty());
    assert!(ranked.iter().all(|r| r.source == Source::Popularity));
    assert!(ranked.iter().all(|r| r.reason == "trending right now"));
}

#[test]
fn test_every_entry_has_a_reason() {
    let combiner = fitted();
    let ranked = combiner.recommend(Some(1), Some(1), 8);
    assert!(ranked.iter().all(|r| !r.reason.is_empty()));
}

#[test]
fn test_reason_bands() {
    assert_eq!(
        reason(Source::Content, 0.9),
        "almost identical to what you're viewing"
    );
    assert_eq!(
        reason(Source::Content, 0.8),
        "very similar to what you're viewing"
    );
    assert_eq!(reason(Source::Content, 0.5), "related to what you're viewing");
    assert_eq!(
        reason(Source::Collaborative, 0.95),
        "a top pick from shoppers like you"
    );
    assert_eq!(
        reason(Source::Collaborative, 0.6),
        "based on your shopping history"
    );
    assert_eq!(reason(Source::Popularity, 0.99), "trending right now");
}

#[test]
fn test_merge_keeps_max_weight() {
    let mut fused: HashMap<u64, Fused> = HashMap::new();
    let mut order = 0usize;

    let weak = vec![RecommendationCandidate {
        item_id: 42,
        score: 0.2,
        source: Source::Popularity,
        rank: 0,
    }];
    let strong = vec![RecommendationCandidate {
        item_id: 42,
        score: 0.9,
        source: Source::Content,
        rank: 0,
    }];

    merge(&mut fused, &weak, 0.15, &mut order);
    merge(&mut fused, &strong, 0.5, &mut order);

    let entry = &fused[&42];
    assert!((entry.weight - 0.5).abs() < 1e-6, "max policy violated");
    assert_eq!(entry.source, Source::Content);

    // a later, weaker sighting never lowers the stored weight
    merge(&mut fused, &weak, 0.15, &mut order);
    assert!((fused[&42].weight - 0.5).abs() < 1e-6);
}

#[test]
fn test_rank_decay_is_linear_within_list() {
    let mut fused: HashMap<u64, Fused> = HashMap::new();
    let mut order = 0usize;
    let candidates: Vec<RecommendationCandidate> = (0..4)
        .map(|rank| RecommendationCandidate {
            item_id: rank as u64,
            score: 1.0,
            source: Source::Content,
            rank,
        })
        .collect();
    merge(&mut fused, &candidates, 0.5, &mut order);

    // weights: 0.5 · (4-rank)/4
    assert!((fused[&0].weight - 0.500).abs() < 1e-6);
    assert!((fused[&1].weight - 0.375).abs() < 1e-6);
    assert!((fused[&2].weight - 0.250).abs() < 1e-6);
    assert!((fused[&3].weight - 0.125).abs() < 1e-6);
}

#[test]
fn test_collaborative_candidates_exclude_history() {
    let combiner = fitted();
    let ranked = combiner.recommend(Some(1), None, 8);
    // user 1 already touched items 1, 2, 5, 7, 8; collaborative
    // entries must avoid them (popularity top-ups may still carry
    // them)
    for entry in ranked.iter().filter(|r| r.source == Source::Collaborative) {
        assert!(![1u64, 2, 5, 7, 8].contains(&entry.item_id));
    }
}

#[test]
fn test_refit_swaps_history_gate() {
    let mut combiner = fitted();
    assert_eq!(combiner.history_len(1), 5);
    combiner.fit(&catalog(), &interactions()[..2]).unwrap();
    assert_eq!(combiner.history_len(1), 2);
    assert!(combiner.recommend(Some(1), None, 4).is_empty());
}
