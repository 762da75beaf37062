use super::*;
use crate::data::Interaction;

/// A small but well-conditioned interaction set: three users with
/// overlapping tastes across six items.
fn training_set() -> Vec<Interaction> {
    let mut events = Vec::new();
    // user 1 likes items 10, 11, 12
    events.push(Interaction::rating(1, 10, 5.0, 100));
    events.push(Interaction::rating(1, 11, 4.5, 110));
    events.push(Interaction::new(1, 12, InteractionKind::Purchase, 120));
    // user 2 overlaps on 10, 11 and also buys 13
    events.push(Interaction::rating(2, 10, 4.8, 130));
    events.push(Interaction::rating(2, 11, 4.0, 140));
    events.push(Interaction::new(2, 13, InteractionKind::Purchase, 150));
    // user 3 views 12, 14, 15
    events.push(Interaction::new(3, 12, InteractionKind::View, 160));
    events.push(Interaction::new(3, 14, InteractionKind::View, 170));
    events.push(Interaction::rating(3, 15, 3.5, 180));
    events
}

fn fitted() -> CollaborativeFilter {
    let mut filter = CollaborativeFilter::new();
    filter.fit(&training_set()).unwrap();
    filter
}

#[test]
fn test_untrained_recommend_is_empty() {
    let filter = CollaborativeFilter::new();
    assert!(filter.recommend(1, 5).is_empty());
}

#[test]
fn test_unknown_user_is_empty() {
    let filter = fitted();
    assert!(filter.recommend(999, 5).is_empty());
}

#[test]
fn test_fit_shapes() {
    let filter = fitted();
    assert_eq!(filter.n_users(), 3);
    assert_eq!(filter.n_items(), 6);
}

#[test]
fn test_never_recommends_interacted_items() {
    let filter = fitted();
    for user in [1u64, 2, 3] {
        for rec in filter.recommend(user, 10) {
            let score = filter.interaction_score(user, rec.item_id).unwrap();
            assert!(
                score == 0.0,
                "user {user} got already-interacted item {} (score {score})",
                rec.item_id
            );
        }
    }
}

#[test]
fn test_recommend_limit() {
    let filter = fitted();
    assert!(filter.recommend(1, 2).len() <= 2);
    assert!(filter.recommend(1, 0).is_empty());
}

#[test]
fn test_overlapping_tastes_surface_peer_items() {
    // users 1 and 2 agree on items 10 and 11; item 13 (bought by
    // user 2) should rank above the unrelated item 15 for user 1
    let filter = fitted();
    let recs = filter.recommend(1, 10);
    let pos = |id: u64| recs.iter().position(|r| r.item_id == id);
    match (pos(13), pos(15)) {
        (Some(p13), Some(p15)) => assert!(p13 < p15, "peer item not preferred: {recs:?}"),
        (Some(_), None) => {}
        other => panic!("unexpected recommendation set: {other:?} in {recs:?}"),
    }
}

#[test]
fn test_single_user_single_item_is_degenerate() {
    let mut filter = CollaborativeFilter::new();
    filter
        .fit(&[Interaction::rating(1, 10, 5.0, 100)])
        .unwrap();
    assert_eq!(filter.n_users(), 1);
    assert_eq!(filter.n_items(), 1);
    assert!(filter.recommend(1, 5).is_empty());
}

#[test]
fn test_empty_fit_is_degenerate() {
    let mut filter = CollaborativeFilter::new();
    filter.fit(&[]).unwrap();
    assert!(filter.recommend(1, 5).is_empty());
    assert_eq!(filter.sparsity(), 1.0);
}

#[test]
fn test_update_decay_blend() {
    let mut filter = CollaborativeFilter::new();
    // first touch: 0.8 · 0 + 0.2 · 1 = 0.2
    filter.update(1, 10, 1.0).unwrap();
    assert!((filter.interaction_score(1, 10).unwrap() - 0.2).abs() < 1e-6);
    // second touch: 0.8 · 0.2 + 0.2 · 3 = 0.76
    filter.update(1, 10, 3.0).unwrap();
    assert!((filter.interaction_score(1, 10).unwrap() - 0.76).abs() < 1e-6);
}

#[test]
fn test_update_extends_matrix_for_new_ids() {
    let mut filter = fitted();
    let (users, items) = (filter.n_users(), filter.n_items());
    filter.update(77, 42, 3.0).unwrap();
    assert_eq!(filter.n_users(), users + 1);
    assert_eq!(filter.n_items(), items + 1);
    assert!((filter.interaction_score(77, 42).unwrap() - 0.6).abs() < 1e-6);
    // existing cells are untouched
    assert!(filter.interaction_score(1, 10).unwrap() > 0.0);
}

#[test]
fn test_update_then_recommend_masks_new_interaction() {
    let mut filter = fitted();
    // user 1 interacts with item 14; it must disappear from results
    filter.update(1, 14, 3.0).unwrap();
    assert!(filter.recommend(1, 10).iter().all(|r| r.item_id != 14));
}

#[test]
fn test_apply_updates_batches_in_one_pass() {
    let mut batched = CollaborativeFilter::new();
    batched
        .apply_updates(&[(1, 10, 1.0), (1, 11, 2.0), (2, 10, 3.0)])
        .unwrap();

    let mut sequential = CollaborativeFilter::new();
    sequential.update(1, 10, 1.0).unwrap();
    sequential.update(1, 11, 2.0).unwrap();
    sequential.update(2, 10, 3.0).unwrap();

    for (user, item) in [(1u64, 10u64), (1, 11), (2, 10)] {
        assert!(
            (batched.interaction_score(user, item).unwrap()
                - sequential.interaction_score(user, item).unwrap())
            .abs()
                < 1e-6
        );
    }
}

#[test]
fn test_apply_updates_empty_is_noop() {
    let mut filter = fitted();
    let before = filter.sparsity();
    filter.apply_updates(&[]).unwrap();
    assert_eq!(filter.sparsity(), before);
}

#[test]
fn test_sparsity() {
    let filter = fitted();
    // 9 aggregated pairs in a 3×6 matrix; some pairs may normalize
    // to a zero score, so sparsity is at least 1 - 9/18
    let sparsity = filter.sparsity();
    assert!((0.0..=1.0).contains(&sparsity));
    assert!(sparsity >= 0.5 - 1e-6);
}

#[test]
fn test_category_boost_prefers_known_category() {
    let mut filter = CollaborativeFilter::new();
    filter.set_item_categories(&[
        (10, "phones".to_string()),
        (11, "phones".to_string()),
        (12, "phones".to_string()),
        (13, "laptops".to_string()),
        (14, "phones".to_string()),
        (15, "laptops".to_string()),
    ]);
    filter.fit(&training_set()).unwrap();

    // user 1 interacted with phones only; among unseen items a phone
    // with positive prediction should be lifted relative to the
    // unboosted run
    let boosted = filter.recommend(1, 10);

    let mut plain = CollaborativeFilter::new();
    plain.fit(&training_set()).unwrap();
    let unboosted = plain.recommend(1, 10);

    let score = |recs: &[RecommendationCandidate], id: u64| {
        recs.iter().find(|r| r.item_id == id).map(|r| r.score)
    };
    if let (Some(b), Some(p)) = (score(&boosted, 14), score(&unboosted, 14)) {
        if p > 0.0 {
            assert!(b >= p - 1e-6, "boost lowered a preferred-category item");
        }
    }
}

#[test]
fn test_interaction_score_unknown_ids() {
    let filter = fitted();
    assert!(filter.interaction_score(1, 999).is_none());
    assert!(filter.interaction_score(999, 10).is_none());
}
