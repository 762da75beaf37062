//! Rank fusion across the three scorers.
//!
//! The combiner queries whichever scorers the request can feed
//! (content needs a product id, collaborative needs a user with
//! enough history), decays each candidate's source weight linearly by
//! its rank within its own list, merges duplicates by MAX weight,
//! normalizes by the best weight and emits the final ranked list with
//! a per-item justification.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::{debug, info};

use crate::collaborative::CollaborativeFilter;
use crate::content::{ContentConfig, ContentSimilarityEngine};
use crate::data::{Interaction, Item, RankedItem, RecommendationCandidate, Source};
use crate::error::Result;
use crate::popularity::{PopularityFilter, PopularityScorer};

/// Base source weights before rank decay.
const W_CONTENT: f32 = 0.5;
const W_COLLABORATIVE: f32 = 0.4;
const W_POPULARITY: f32 = 0.15;

/// Minimum recorded interactions before the collaborative filter
/// speaks for a user.
const MIN_HISTORY: usize = 5;

/// Weight bands for the reason templates.
const BAND_HIGH: f32 = 0.85;
const BAND_MID: f32 = 0.75;

/// A merged candidate during fusion.
struct Fused {
    weight: f32,
    source: Source,
    first_seen: usize,
}

/// Hybrid recommender fusing content, collaborative and popularity
/// signals.
///
/// # Examples
///
/// ```
/// use recomendar::hybrid::HybridCombiner;
/// use recomendar::synthetic;
///
/// let items = synthetic::catalog(20, 5);
/// let interactions = synthetic::interactions(&items, 8, 7, 5);
///
/// let mut combiner = HybridCombiner::new();
/// combiner.fit(&items, &interactions).unwrap();
///
/// let ranked = combiner.recommend(None, Some(items[0].id), 6);
/// assert!(ranked.len() <= 6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HybridCombiner {
    content: ContentSimilarityEngine,
    collaborative: CollaborativeFilter,
    popularity: PopularityScorer,
    user_history: HashMap<u64, usize>,
}

impl HybridCombiner {
    /// Creates an untrained combiner with the default content
    /// configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an untrained combiner with an injected content
    /// configuration.
    #[must_use]
    pub fn with_content_config(config: ContentConfig) -> Self {
        Self {
            content: ContentSimilarityEngine::with_config(config),
            ..Self::default()
        }
    }

    /// Trains all three scorers on one catalog/interaction snapshot.
    ///
    /// # Errors
    ///
    /// Propagates scorer fit failures.
    pub fn fit(&mut self, items: &[Item], interactions: &[Interaction]) -> Result<()> {
        self.popularity.fit(items)?;
        self.content.fit(items)?;

        let categories: Vec<(u64, String)> = items
            .iter()
            .map(|item| (item.id, item.category.clone()))
            .collect();
        self.collaborative.set_item_categories(&categories);
        self.collaborative.fit(interactions)?;

        self.user_history.clear();
        for event in interactions {
            *self.user_history.entry(event.user_id).or_insert(0) += 1;
        }

        info!(
            items = items.len(),
            interactions = interactions.len(),
            users = self.user_history.len(),
            "hybrid combiner fitted"
        );
        Ok(())
    }

    /// The content engine.
    #[must_use]
    pub fn content(&self) -> &ContentSimilarityEngine {
        &self.content
    }

    /// The collaborative filter.
    #[must_use]
    pub fn collaborative(&self) -> &CollaborativeFilter {
        &self.collaborative
    }

    /// Mutable collaborative access for the engine's batched-update
    /// path.
    pub(crate) fn collaborative_mut(&mut self) -> &mut CollaborativeFilter {
        &mut self.collaborative
    }

    /// The popularity scorer.
    #[must_use]
    pub fn popularity(&self) -> &PopularityScorer {
        &self.popularity
    }

    /// Recorded interaction count for a user.
    #[must_use]
    pub fn history_len(&self, user_id: u64) -> usize {
        self.user_history.get(&user_id).copied().unwrap_or(0)
    }

    /// Fused ranked recommendations.
    ///
    /// At least one of `user_id`/`product_id` must be usable — a
    /// product id, or a user with enough recorded history — otherwise
    /// the result is empty with no error.
    /// Output has no duplicate item ids, at most `n_items` entries,
    /// scores in (0, 1] and a reason string per entry.
    #[must_use]
    pub fn recommend(
        &self,
        user_id: Option<u64>,
        product_id: Option<u64>,
        n_items: usize,
    ) -> Vec<RankedItem> {
        if n_items == 0 {
            return Vec::new();
        }

        let per_source = n_items.div_ceil(2);
        let mut fused: HashMap<u64, Fused> = HashMap::new();
        let mut order = 0usize;
        let mut any_source_ran = false;

        if let Some(product_id) = product_id {
            any_source_ran = true;
            let candidates = self.content.recommend(product_id, per_source);
            merge(&mut fused, &candidates, W_CONTENT, &mut order);
        }

        if let Some(user_id) = user_id {
            if self.history_len(user_id) >= MIN_HISTORY {
                any_source_ran = true;
                let candidates = self.collaborative.recommend(user_id, per_source);
                merge(&mut fused, &candidates, W_COLLABORATIVE, &mut order);
            } else {
                debug!(user_id, "insufficient history for collaborative source");
            }
        }

        if !any_source_ran {
            return Vec::new();
        }

        if fused.len() < n_items {
            let candidates = self.popularity.recommend(n_items, &PopularityFilter::new());
            merge(&mut fused, &candidates, W_POPULARITY, &mut order);
        }
        if fused.is_empty() {
            return Vec::new();
        }

        let max_weight = fused
            .values()
            .map(|c| c.weight)
            .fold(f32::NEG_INFINITY, f32::max);

        let mut ranked: Vec<(u64, Fused)> = fused.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.weight
                .partial_cmp(&a.1.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.source.priority().cmp(&b.1.source.priority()))
                .then_with(|| a.1.first_seen.cmp(&b.1.first_seen))
        });
        ranked.truncate(n_items);

        ranked
            .into_iter()
            .map(|(item_id, candidate)| {
                let score = candidate.weight / max_weight;
                RankedItem {
                    item_id,
                    score,
                    source: candidate.source,
                    reason: reason(candidate.source, score),
                }
            })
            .collect()
    }
}

/// Folds one source's candidate list into the fused map: linear rank
/// decay within the list, duplicate ids keep the MAX weight (fixed
/// fusion policy; the max-weight source wins the attribution).
fn merge(
    fused: &mut HashMap<u64, Fused>,
    candidates: &[RecommendationCandidate],
    base_weight: f32,
    order: &mut usize,
) {
    let len = candidates.len();
    for candidate in candidates {
        let decay = (len - candidate.rank) as f32 / len as f32;
        let weight = base_weight * decay;
        match fused.entry(candidate.item_id) {
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                if weight > existing.weight {
                    existing.weight = weight;
                    existing.source = candidate.source;
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(Fused {
                    weight,
                    source: candidate.source,
                    first_seen: *order,
                });
                *order += 1;
            }
        }
    }
}

/// Reason template keyed by (dominant source, weight band).
fn reason(source: Source, score: f32) -> String {
    let text = match source {
        Source::Content => {
            if score > BAND_HIGH {
                "almost identical to what you're viewing"
            } else if score > BAND_MID {
                "very similar to what you're viewing"
            } else {
                "related to what you're viewing"
            }
        }
        Source::Collaborative => {
            if score > BAND_HIGH {
                "a top pick from shoppers like you"
            } else {
                "based on your shopping history"
            }
        }
        Source::Popularity => "trending right now",
    };
    text.to_string()
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
