//! Seeded synthetic catalogs and interaction logs.
//!
//! Deterministic generators for examples, tests and benchmarks, so
//! fixtures don't get hand-rolled in every harness. The same seed
//! always produces the same data.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::{EngagementMetrics, Interaction, InteractionKind, Item};

/// (category, noun used in names, brand pool, price floor, price span)
const CATEGORY_TABLE: [(&str, &str, &[&str], f32, f32); 5] = [
    ("Phones", "Smartphone", &["Apple", "Samsung", "Xiaomi"], 200.0, 1100.0),
    ("Laptops", "Laptop", &["Apple", "MSI", "Lenovo"], 600.0, 2400.0),
    ("Audio", "Headphone", &["Sony", "JBL"], 40.0, 400.0),
    ("PC & Components", "GeForce Card", &["MSI", "Asus"], 250.0, 1400.0),
    ("Tablets", "Tablet", &["Apple", "Samsung"], 150.0, 900.0),
];

const NAME_PREFIXES: [&str; 6] = ["Nova", "Orbit", "Volt", "Aero", "Prime", "Zen"];

/// Generates `n_items` catalog items with ids `1..=n_items`.
///
/// # Examples
///
/// ```
/// use recomendar::synthetic;
///
/// let items = synthetic::catalog(10, 42);
/// assert_eq!(items.len(), 10);
/// // deterministic for a fixed seed
/// assert_eq!(items, synthetic::catalog(10, 42));
/// ```
#[must_use]
pub fn catalog(n_items: usize, seed: u64) -> Vec<Item> {
    let mut rng = StdRng::seed_from_u64(seed);

    (1..=n_items as u64)
        .map(|id| {
            let (category, noun, brands, price_floor, price_span) =
                CATEGORY_TABLE[rng.gen_range(0..CATEGORY_TABLE.len())];
            let prefix = NAME_PREFIXES[rng.gen_range(0..NAME_PREFIXES.len())];
            let brand = brands[rng.gen_range(0..brands.len())];
            let price_min = price_floor + rng.gen_range(0.0..price_span);
            let sold = rng.gen_range(0..400u32);

            Item {
                id,
                name: format!("{prefix} {noun} {id}"),
                description: format!("{prefix} {noun} by {brand} in {category}"),
                category: category.to_string(),
                brand: brand.to_string(),
                price_min,
                price_max: price_min * rng.gen_range(1.0..1.4),
                metrics: EngagementMetrics {
                    review_count: rng.gen_range(0..120),
                    avg_rating: rng.gen_range(2.5..5.0),
                    sold_count: sold,
                    order_count: sold / 2,
                    unique_viewers: sold * rng.gen_range(2..6),
                    total_views: sold * rng.gen_range(6..15),
                    days_since_launch: rng.gen_range(1..720),
                },
            }
        })
        .collect()
}

/// Generates roughly `per_user` interactions for each of `n_users`
/// users (ids `1..=n_users`) over the given catalog.
///
/// Kind mix: views dominate, with carts, ratings and purchases in
/// decreasing order; rating magnitudes fall in [3, 5].
///
/// # Examples
///
/// ```
/// use recomendar::synthetic;
///
/// let items = synthetic::catalog(10, 1);
/// let events = synthetic::interactions(&items, 4, 6, 1);
/// assert_eq!(events.len(), 24);
/// ```
#[must_use]
pub fn interactions(items: &[Item], n_users: usize, per_user: usize, seed: u64) -> Vec<Interaction> {
    if items.is_empty() {
        return Vec::new();
    }

    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    let mut events = Vec::with_capacity(n_users * per_user);
    let mut timestamp = 1_700_000_000i64;

    for user_id in 1..=n_users as u64 {
        for _ in 0..per_user {
            let item_id = items[rng.gen_range(0..items.len())].id;
            timestamp += rng.gen_range(30..3_600);
            let event = match rng.gen_range(0..10u8) {
                0..=4 => Interaction::new(user_id, item_id, InteractionKind::View, timestamp),
                5 | 6 => Interaction::new(user_id, item_id, InteractionKind::Cart, timestamp),
                7 | 8 => Interaction::rating(user_id, item_id, rng.gen_range(3.0..5.0), timestamp),
                _ => Interaction::new(user_id, item_id, InteractionKind::Purchase, timestamp),
            };
            events.push(event);
        }
    }

    events
}
