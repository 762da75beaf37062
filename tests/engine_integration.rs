//! End-to-end engine behavior over a seeded synthetic store.

use std::collections::HashSet;

use recomendar::prelude::*;
use recomendar::synthetic;

fn store() -> (Vec<Item>, Vec<Interaction>) {
    let items = synthetic::catalog(40, 1234);
    let interactions = synthetic::interactions(&items, 15, 10, 1234);
    (items, interactions)
}

#[test]
fn full_pipeline_product_page() {
    let (items, interactions) = store();
    let service = Recommender::new();
    service.fit(&items, &interactions).unwrap();

    for item in items.iter().take(10) {
        let ranked = service.recommend(None, Some(item.id), 8);
        assert!(ranked.len() <= 8);

        let ids: HashSet<u64> = ranked.iter().map(|r| r.item_id).collect();
        assert_eq!(ids.len(), ranked.len(), "duplicate ids for item {}", item.id);
        assert!(!ids.contains(&item.id), "query item recommended to itself");

        for entry in &ranked {
            assert!(entry.score > 0.0 && entry.score <= 1.0 + 1e-6);
            assert!(!entry.reason.is_empty());
        }
    }
}

#[test]
fn full_pipeline_personalized() {
    let (items, interactions) = store();
    let service = Recommender::new();
    service.fit(&items, &interactions).unwrap();

    let combiner = service.snapshot();
    for user in 1..=15u64 {
        let ranked = service.recommend(Some(user), None, 8);
        if combiner.history_len(user) < 5 {
            assert!(ranked.is_empty(), "user {user} below the history gate");
            continue;
        }
        // collaborative entries never repeat the user's own history
        for entry in ranked.iter().filter(|r| r.source == Source::Collaborative) {
            let score = combiner
                .collaborative()
                .interaction_score(user, entry.item_id)
                .unwrap_or(0.0);
            assert!(score == 0.0, "user {user} re-recommended item {}", entry.item_id);
        }
    }
}

#[test]
fn scorer_level_contracts_hold_on_synthetic_data() {
    let (items, interactions) = store();

    let mut content = ContentSimilarityEngine::new();
    content.fit(&items).unwrap();
    for item in items.iter().take(10) {
        for candidate in content.recommend(item.id, 10) {
            assert!(
                (0.0..=0.95 + 1e-6).contains(&candidate.score),
                "content score out of bounds: {}",
                candidate.score
            );
        }
    }

    let mut collaborative = CollaborativeFilter::new();
    collaborative.fit(&interactions).unwrap();
    for user in 1..=15u64 {
        for candidate in collaborative.recommend(user, 10) {
            let score = collaborative
                .interaction_score(user, candidate.item_id)
                .unwrap();
            assert!(score == 0.0);
        }
    }

    let mut popularity = PopularityScorer::new();
    popularity.fit(&items).unwrap();
    let top = popularity.recommend(10, &PopularityFilter::new());
    assert!(top.len() <= 10);
    for candidate in &top {
        assert!(popularity.reason(candidate.item_id).is_some());
    }
}

#[test]
fn live_updates_shift_the_snapshot() {
    let (items, interactions) = store();
    let service = Recommender::new();
    service.fit(&items, &interactions).unwrap();

    let before = service
        .snapshot()
        .collaborative()
        .interaction_score(1, items[5].id)
        .unwrap_or(0.0);

    let weight = InteractionKind::Purchase.base_weight();
    service.queue_update(1, items[5].id, weight).unwrap();
    service.flush_updates().unwrap();

    let after = service
        .snapshot()
        .collaborative()
        .interaction_score(1, items[5].id)
        .unwrap();
    let expected = 0.8 * before + 0.2 * weight;
    assert!(
        (after - expected).abs() < 1e-5,
        "decay blend mismatch: expected {expected}, got {after}"
    );
}

#[test]
fn retrain_is_atomic_for_readers() {
    let (items, interactions) = store();
    let service = std::sync::Arc::new(Recommender::new());
    service.fit(&items, &interactions).unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let service = std::sync::Arc::clone(&service);
            let product = items[0].id;
            std::thread::spawn(move || {
                for _ in 0..100 {
                    let ranked = service.recommend(Some(1), Some(product), 6);
                    // whichever generation served this, the output
                    // contract holds
                    let ids: HashSet<u64> = ranked.iter().map(|r| r.item_id).collect();
                    assert_eq!(ids.len(), ranked.len());
                    assert!(ranked.len() <= 6);
                }
            })
        })
        .collect();

    for _ in 0..3 {
        service.fit(&items, &interactions).unwrap();
    }
    for reader in readers {
        reader.join().unwrap();
    }
}

#[test]
fn evaluation_metrics_on_engine_output() {
    let (items, interactions) = store();
    let service = Recommender::new();
    service.fit(&items, &interactions).unwrap();

    let lists: Vec<Vec<u64>> = items
        .iter()
        .take(20)
        .map(|item| {
            service
                .recommend(None, Some(item.id), 6)
                .iter()
                .map(|r| r.item_id)
                .collect()
        })
        .collect();

    let coverage = recomendar::metrics::coverage(&lists, items.len());
    assert!((0.0..=1.0).contains(&coverage));
    assert!(coverage > 0.0, "twenty product pages covered nothing");
}
