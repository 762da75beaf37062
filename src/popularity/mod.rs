//! Aggregate popularity scoring with catalog filters and
//! diversification.
//!
//! Each item's engagement metrics are min-max normalized and combined
//! into a single popularity score by a fixed weighted sum. Ranking
//! requests filter by optional catalog predicates and then pass
//! through a diversification walk so one category, brand or price
//! segment cannot dominate the list.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::data::{Item, RecommendationCandidate, Source};
use crate::error::Result;
use crate::preprocessing::{band_index, min_max, quantile_bounds};

/// Metric weights for the popularity score. They sum to 1.0:
/// rating 0.25, sold 0.20, reviews 0.15, unique viewers 0.15,
/// orders 0.10, recency 0.10, total views 0.05.
const W_RATING: f32 = 0.25;
const W_SOLD: f32 = 0.20;
const W_REVIEWS: f32 = 0.15;
const W_VIEWERS: f32 = 0.15;
const W_ORDERS: f32 = 0.10;
const W_RECENCY: f32 = 0.10;
const W_VIEWS: f32 = 0.05;

/// Recency half-life in days: 1 / (1 + days/30) decays monthly.
const RECENCY_PERIOD_DAYS: f32 = 30.0;

/// Diversification caps per (category, brand) pair and per price
/// segment.
const MAX_PER_CATEGORY_BRAND: usize = 2;
const MAX_PER_PRICE_SEGMENT: usize = 2;

/// Number of coarse price bands per category.
const PRICE_BANDS: usize = 3;

/// Categories need at least this many priced items for their own
/// bands; smaller categories fall back to the global bands.
const MIN_ITEMS_FOR_CATEGORY_BANDS: usize = 4;

/// Reason thresholds.
const EXCELLENT_RATING: f32 = 4.5;
const EXCELLENT_RATING_MIN_REVIEWS: u32 = 10;
const BEST_SELLER_SOLD: u32 = 100;
const WIDELY_VIEWED_VIEWERS: u32 = 500;
const NEW_ARRIVAL_MAX_DAYS: u32 = 30;

/// Optional catalog predicates for a popularity request.
///
/// # Examples
///
/// ```
/// use recomendar::popularity::PopularityFilter;
///
/// let filter = PopularityFilter::new()
///     .with_category("Phones")
///     .with_max_price(1000.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PopularityFilter {
    category: Option<String>,
    brand: Option<String>,
    min_price: Option<f32>,
    max_price: Option<f32>,
}

impl PopularityFilter {
    /// No predicates: every fitted item qualifies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to one category.
    #[must_use]
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    /// Restricts to one brand.
    #[must_use]
    pub fn with_brand(mut self, brand: &str) -> Self {
        self.brand = Some(brand.to_string());
        self
    }

    /// Requires the item's price range to reach at least this price.
    #[must_use]
    pub fn with_min_price(mut self, min_price: f32) -> Self {
        self.min_price = Some(min_price);
        self
    }

    /// Requires the item's price range to start at or below this price.
    #[must_use]
    pub fn with_max_price(mut self, max_price: f32) -> Self {
        self.max_price = Some(max_price);
        self
    }

    fn admits(&self, entry: &ScoredEntry) -> bool {
        if let Some(category) = &self.category {
            if entry.category != *category {
                return false;
            }
        }
        if let Some(brand) = &self.brand {
            if entry.brand != *brand {
                return false;
            }
        }
        if let Some(min_price) = self.min_price {
            if entry.price_max < min_price {
                return false;
            }
        }
        if let Some(max_price) = self.max_price {
            if entry.price_min > max_price {
                return false;
            }
        }
        true
    }
}

/// One scored item in the fitted table.
#[derive(Debug, Clone)]
struct ScoredEntry {
    item_id: u64,
    score: f32,
    category: String,
    brand: String,
    price_min: f32,
    price_max: f32,
    avg_rating: f32,
    review_count: u32,
    sold_count: u32,
    unique_viewers: u32,
    days_since_launch: u32,
}

/// Ranks catalog items by combined engagement metrics.
///
/// # Examples
///
/// ```
/// use recomendar::popularity::{PopularityFilter, PopularityScorer};
/// use recomendar::synthetic;
///
/// let items = synthetic::catalog(20, 7);
/// let mut scorer = PopularityScorer::new();
/// scorer.fit(&items).unwrap();
///
/// let top = scorer.recommend(5, &PopularityFilter::new());
/// assert!(top.len() <= 5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PopularityScorer {
    /// Score-sorted table, ties broken by (score desc, price asc).
    entries: Vec<ScoredEntry>,
    /// Per-category price band bounds.
    category_bands: HashMap<String, Vec<f32>>,
    /// Global fallback band bounds.
    global_bands: Vec<f32>,
}

impl PopularityScorer {
    /// Creates an untrained scorer; `recommend` yields nothing until
    /// [`fit`](Self::fit) succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scores every item and stores the sorted table.
    ///
    /// Missing metrics are zero before normalization, so a sparse
    /// catalog never fails to fit; a metric that is constant across
    /// the catalog contributes nothing (degenerate normalization
    /// rule).
    ///
    /// # Errors
    ///
    /// Infallible today; the `Result` reserves the contract.
    pub fn fit(&mut self, items: &[Item]) -> Result<()> {
        let reviews = min_max(&items.iter().map(|i| i.metrics.review_count as f32).collect::<Vec<_>>());
        let ratings = min_max(&items.iter().map(|i| i.metrics.avg_rating).collect::<Vec<_>>());
        let sold = min_max(&items.iter().map(|i| i.metrics.sold_count as f32).collect::<Vec<_>>());
        let orders = min_max(&items.iter().map(|i| i.metrics.order_count as f32).collect::<Vec<_>>());
        let viewers = min_max(&items.iter().map(|i| i.metrics.unique_viewers as f32).collect::<Vec<_>>());
        let views = min_max(&items.iter().map(|i| i.metrics.total_views as f32).collect::<Vec<_>>());
        let recency = min_max(
            &items
                .iter()
                .map(|i| 1.0 / (1.0 + i.metrics.days_since_launch as f32 / RECENCY_PERIOD_DAYS))
                .collect::<Vec<_>>(),
        );

        let mut entries: Vec<ScoredEntry> = items
            .iter()
            .enumerate()
            .map(|(idx, item)| ScoredEntry {
                item_id: item.id,
                score: W_REVIEWS * reviews[idx]
                    + W_RATING * ratings[idx]
                    + W_SOLD * sold[idx]
                    + W_ORDERS * orders[idx]
                    + W_VIEWERS * viewers[idx]
                    + W_VIEWS * views[idx]
                    + W_RECENCY * recency[idx],
                category: item.category.clone(),
                brand: item.brand.clone(),
                price_min: item.price_min,
                price_max: item.price_max,
                avg_rating: item.metrics.avg_rating,
                review_count: item.metrics.review_count,
                sold_count: item.metrics.sold_count,
                unique_viewers: item.metrics.unique_viewers,
                days_since_launch: item.metrics.days_since_launch,
            })
            .collect();

        entries.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    a.price_min
                        .partial_cmp(&b.price_min)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
        });

        let mut by_category: HashMap<String, Vec<f32>> = HashMap::new();
        for item in items {
            by_category
                .entry(item.category.clone())
                .or_default()
                .push(item.price_min);
        }
        self.category_bands = by_category
            .into_iter()
            .filter(|(_, prices)| prices.len() >= MIN_ITEMS_FOR_CATEGORY_BANDS)
            .map(|(category, prices)| (category, quantile_bounds(&prices, PRICE_BANDS)))
            .collect();
        self.global_bands = quantile_bounds(
            &items.iter().map(|i| i.price_min).collect::<Vec<_>>(),
            PRICE_BANDS,
        );
        self.entries = entries;

        info!(items = self.entries.len(), "popularity model fitted");
        Ok(())
    }

    /// Top `limit` items passing the filter, diversified.
    ///
    /// Walks the score-sorted table admitting at most two items per
    /// (category, brand) pair and at most two per coarse price
    /// segment; items that would exceed a cap are skipped, not
    /// deferred, so the result can be shorter than `limit`. Untrained
    /// or fully filtered input yields an empty list.
    #[must_use]
    pub fn recommend(
        &self,
        limit: usize,
        filter: &PopularityFilter,
    ) -> Vec<RecommendationCandidate> {
        debug!(limit, "popularity recommend");
        let mut pair_counts: HashMap<(String, String), usize> = HashMap::new();
        let mut segment_counts: HashMap<(String, usize), usize> = HashMap::new();
        let mut out = Vec::new();

        for entry in self.entries.iter().filter(|e| filter.admits(e)) {
            if out.len() >= limit {
                break;
            }

            let pair = (entry.category.clone(), entry.brand.clone());
            let bands = self
                .category_bands
                .get(&entry.category)
                .unwrap_or(&self.global_bands);
            let segment = (entry.category.clone(), band_index(entry.price_min, bands));

            let pair_seen = pair_counts.get(&pair).copied().unwrap_or(0);
            let segment_seen = segment_counts.get(&segment).copied().unwrap_or(0);
            if pair_seen >= MAX_PER_CATEGORY_BRAND || segment_seen >= MAX_PER_PRICE_SEGMENT {
                continue;
            }

            pair_counts.insert(pair, pair_seen + 1);
            segment_counts.insert(segment, segment_seen + 1);
            out.push(RecommendationCandidate {
                item_id: entry.item_id,
                score: entry.score,
                source: Source::Popularity,
                rank: out.len(),
            });
        }

        out
    }

    /// Post-hoc justification for a fitted item, up to two clauses.
    ///
    /// Returns `None` for an unknown id. Clauses fire on fixed metric
    /// thresholds; when none fires the generic fallback applies.
    #[must_use]
    pub fn reason(&self, item_id: u64) -> Option<String> {
        let entry = self.entries.iter().find(|e| e.item_id == item_id)?;

        let mut clauses: Vec<&str> = Vec::new();
        if entry.avg_rating >= EXCELLENT_RATING && entry.review_count > EXCELLENT_RATING_MIN_REVIEWS
        {
            clauses.push("excellent rating");
        }
        if entry.sold_count >= BEST_SELLER_SOLD {
            clauses.push("best seller");
        }
        if entry.unique_viewers >= WIDELY_VIEWED_VIEWERS {
            clauses.push("widely viewed");
        }
        if entry.days_since_launch <= NEW_ARRIVAL_MAX_DAYS {
            clauses.push("new arrival");
        }

        if clauses.is_empty() {
            return Some("popular right now".to_string());
        }
        clauses.truncate(2);
        Some(clauses.join(", "))
    }

    /// Number of fitted items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True before the first successful `fit` or after fitting an
    /// empty catalog.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
