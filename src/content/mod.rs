//! Content-based similarity over weighted text features.
//!
//! Each item becomes a weighted term blob (name ×6, category ×8,
//! brand ×4, description ×1, detected product type ×5) vectorized
//! with TF-IDF 1–2-grams. A query ranks every other item by cosine
//! similarity squeezed into a bounded base band, then layers the
//! business rules on top: category match, tiered brand match, type
//! match, price proximity and accessory relationships, each step
//! clipped to a rising ceiling so no single rule can saturate the
//! score.

mod config;

pub use config::{AccessoryRule, BrandTier, BrandTiers, CategoryTiers, ContentConfig, TypeRule};

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::data::{Item, RecommendationCandidate, Source};
use crate::error::Result;
use crate::preprocessing::min_max;
use crate::primitives::Matrix;
use crate::text::{cosine_similarity, preprocess, TermVectorizer};

/// Field repetition weights for the term blob.
const NAME_WEIGHT: usize = 6;
const CATEGORY_WEIGHT: usize = 8;
const BRAND_WEIGHT: usize = 4;
const TYPE_WEIGHT: usize = 5;

/// Vectorizer bounds.
const MAX_FEATURES: usize = 1000;
const MIN_DF: usize = 2;
const MAX_DF: f32 = 0.90;

/// Raw cosine is squeezed into [0, BASE_CEILING]; the headroom above
/// belongs to the business-rule bonuses.
const BASE_CEILING: f32 = 0.30;

/// Category-match bonus and its ceiling.
const CATEGORY_BONUS_PREMIUM: f32 = 0.25;
const CATEGORY_BONUS: f32 = 0.20;
const CEILING_AFTER_CATEGORY: f32 = 0.55;

/// Brand-match bonus by (brand tier, query in premium category) and
/// its ceiling.
const BRAND_BONUS_PREMIUM: f32 = 0.20;
const BRAND_BONUS_PREMIUM_STD: f32 = 0.15;
const BRAND_BONUS_HIGH_END: f32 = 0.15;
const BRAND_BONUS_HIGH_END_STD: f32 = 0.10;
const BRAND_BONUS_MID: f32 = 0.10;
const CEILING_AFTER_BRAND: f32 = 0.70;

/// Type-match bonus and its ceiling.
const TYPE_BONUS: f32 = 0.25;
const CEILING_AFTER_TYPE: f32 = 0.85;

/// Price-proximity tiers on relative difference |Δp| / p_query.
const PRICE_TIGHT: f32 = 0.20;
const PRICE_NEAR: f32 = 0.30;
const PRICE_WIDE: f32 = 0.50;
const PRICE_BONUS_TIGHT: f32 = 0.15;
const PRICE_BONUS_NEAR: f32 = 0.13;
const PRICE_BONUS_WIDE: f32 = 0.10;
const PRICE_PENALTY_FACTOR: f32 = 0.60;
const CEILING_AFTER_PRICE: f32 = 0.92;

/// Hard ceiling on the final adjusted score.
const SCORE_CEILING: f32 = 0.95;

/// Selection quotas (same-category-and-type, same-category,
/// same-type) for core component types and for everything else.
const CORE_QUOTAS: (usize, usize, usize) = (4, 1, 1);
const GENERAL_QUOTAS: (usize, usize, usize) = (3, 2, 1);

/// Fitted per-item snapshot used at query time.
#[derive(Debug, Clone)]
struct ItemProfile {
    id: u64,
    /// Lowercased name + description, for accessory keyword matching.
    text: String,
    category: String,
    brand: String,
    price: f32,
    product_type: String,
}

/// Item-to-item recommender over weighted text features.
///
/// State machine: untrained → fitted (one-way; another `fit` rebuilds
/// from scratch). Similarity is computed lazily per query to bound
/// memory — only the term vectors are stored.
///
/// # Examples
///
/// ```
/// use recomendar::content::ContentSimilarityEngine;
/// use recomendar::synthetic;
///
/// let items = synthetic::catalog(12, 3);
/// let mut engine = ContentSimilarityEngine::new();
/// engine.fit(&items).unwrap();
///
/// let similar = engine.recommend(items[0].id, 4);
/// assert!(similar.len() <= 4);
/// assert!(similar.iter().all(|c| c.item_id != items[0].id));
/// ```
#[derive(Debug, Clone)]
pub struct ContentSimilarityEngine {
    config: ContentConfig,
    profiles: Vec<ItemProfile>,
    index: HashMap<u64, usize>,
    vectors: Matrix<f32>,
    fitted: bool,
}

impl Default for ContentSimilarityEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentSimilarityEngine {
    /// Creates an untrained engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ContentConfig::default())
    }

    /// Creates an untrained engine with an injected configuration.
    #[must_use]
    pub fn with_config(config: ContentConfig) -> Self {
        Self {
            config,
            profiles: Vec::new(),
            index: HashMap::new(),
            vectors: Matrix::zeros(0, 0),
            fitted: false,
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ContentConfig {
        &self.config
    }

    /// Number of fitted items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// True when no items are fitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Builds the weighted term blob for one item.
    fn blob(&self, item: &Item, product_type: &str) -> String {
        let mut blob = String::new();
        for _ in 0..NAME_WEIGHT {
            blob.push_str(&item.name);
            blob.push(' ');
        }
        for _ in 0..CATEGORY_WEIGHT {
            blob.push_str(&item.category);
            blob.push(' ');
        }
        for _ in 0..BRAND_WEIGHT {
            blob.push_str(&item.brand);
            blob.push(' ');
        }
        blob.push_str(&item.description);
        blob.push(' ');
        for _ in 0..TYPE_WEIGHT {
            blob.push_str(product_type);
            blob.push(' ');
        }
        preprocess(&blob)
    }

    /// Rebuilds all derived state from an item snapshot.
    ///
    /// Document-frequency pruning that empties the vocabulary (tiny
    /// corpora) triggers one relaxed refit instead of an error.
    ///
    /// # Errors
    ///
    /// Propagates vectorizer failures on non-empty corpora.
    pub fn fit(&mut self, items: &[Item]) -> Result<()> {
        if items.is_empty() {
            self.profiles.clear();
            self.index.clear();
            self.vectors = Matrix::zeros(0, 0);
            self.fitted = false;
            return Ok(());
        }

        let profiles: Vec<ItemProfile> = items
            .iter()
            .map(|item| {
                let product_type = self.config.detect_type(&item.name).to_string();
                ItemProfile {
                    id: item.id,
                    text: format!("{} {}", item.name, item.description).to_lowercase(),
                    category: item.category.clone(),
                    brand: item.brand.clone(),
                    price: item.price_min,
                    product_type,
                }
            })
            .collect();

        let documents: Vec<String> = items
            .iter()
            .zip(&profiles)
            .map(|(item, profile)| self.blob(item, &profile.product_type))
            .collect();

        let mut vectorizer = TermVectorizer::new()
            .with_ngram_range(1, 2)
            .with_max_features(MAX_FEATURES)
            .with_min_df(MIN_DF)
            .with_max_df(MAX_DF);
        vectorizer.fit(&documents)?;

        if vectorizer.vocabulary_size() == 0 {
            warn!(
                items = items.len(),
                "document-frequency pruning emptied the vocabulary, refitting relaxed"
            );
            vectorizer = TermVectorizer::new().with_ngram_range(1, 2).with_max_features(MAX_FEATURES);
            vectorizer.fit(&documents)?;
        }

        self.vectors = vectorizer.transform(&documents)?;
        self.index = profiles
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.id, idx))
            .collect();
        self.profiles = profiles;
        self.fitted = true;

        info!(
            items = self.profiles.len(),
            vocabulary = vectorizer.vocabulary_size(),
            "content model fitted"
        );
        Ok(())
    }

    /// Up to `n_items` most similar items to `item_id`.
    ///
    /// Unknown ids and untrained engines yield an empty list so
    /// callers can fall back to another scorer. The query item never
    /// appears in its own results; every score lies in [0, 0.95].
    #[must_use]
    pub fn recommend(&self, item_id: u64, n_items: usize) -> Vec<RecommendationCandidate> {
        if !self.fitted || n_items == 0 {
            return Vec::new();
        }
        let Some(&query_idx) = self.index.get(&item_id) else {
            debug!(item_id, "unknown item, empty content result");
            return Vec::new();
        };

        let query = &self.profiles[query_idx];
        let query_vec = self.vectors.row_slice(query_idx);

        let candidates: Vec<usize> = (0..self.profiles.len()).filter(|&i| i != query_idx).collect();
        if candidates.is_empty() {
            return Vec::new();
        }

        let raw: Vec<f32> = candidates
            .par_iter()
            .map(|&i| cosine_similarity(query_vec, self.vectors.row_slice(i)).unwrap_or(0.0))
            .collect();

        let base = min_max(&raw);
        let mut scored: Vec<(usize, f32)> = candidates
            .iter()
            .zip(&base)
            .map(|(&idx, &b)| (idx, self.adjust(query, &self.profiles[idx], b * BASE_CEILING)))
            .collect();

        // Renormalize only past the hard ceiling, so the top score
        // lands exactly on it.
        let max_score = scored.iter().map(|(_, s)| *s).fold(f32::NEG_INFINITY, f32::max);
        if max_score > SCORE_CEILING {
            let scale = SCORE_CEILING / max_score;
            for (_, score) in &mut scored {
                *score *= scale;
            }
        }

        self.select_tiered(query, scored, n_items)
    }

    /// Applies the sequential business-rule adjustments to one
    /// candidate's base score.
    fn adjust(&self, query: &ItemProfile, candidate: &ItemProfile, base: f32) -> f32 {
        let premium_category = self.config.is_premium_category(&query.category);
        let mut score = base;

        if candidate.category == query.category {
            score += if premium_category {
                CATEGORY_BONUS_PREMIUM
            } else {
                CATEGORY_BONUS
            };
            score = score.min(CEILING_AFTER_CATEGORY);
        }

        if candidate.brand == query.brand {
            let bonus = match self.config.brand_tier(&query.brand) {
                BrandTier::Premium => {
                    if premium_category {
                        BRAND_BONUS_PREMIUM
                    } else {
                        BRAND_BONUS_PREMIUM_STD
                    }
                }
                BrandTier::HighEnd => {
                    if premium_category {
                        BRAND_BONUS_HIGH_END
                    } else {
                        BRAND_BONUS_HIGH_END_STD
                    }
                }
                BrandTier::Mid => BRAND_BONUS_MID,
                BrandTier::Unranked => 0.0,
            };
            score = (score + bonus).min(CEILING_AFTER_BRAND);
        }

        if candidate.product_type == query.product_type {
            score = (score + TYPE_BONUS).min(CEILING_AFTER_TYPE);
        }

        if query.price > 0.0 {
            let relative = (candidate.price - query.price).abs() / query.price;
            if relative <= PRICE_TIGHT {
                score += PRICE_BONUS_TIGHT;
            } else if relative <= PRICE_NEAR {
                score += PRICE_BONUS_NEAR;
            } else if relative <= PRICE_WIDE {
                score += PRICE_BONUS_WIDE;
            } else {
                score *= PRICE_PENALTY_FACTOR;
            }
            score = score.min(CEILING_AFTER_PRICE);
        }

        if let Some(rule) = self.config.accessory_rule(&query.product_type) {
            let mut boost = if rule.primary.iter().any(|kw| candidate.text.contains(kw.as_str())) {
                rule.primary_boost
            } else if rule.secondary.iter().any(|kw| candidate.text.contains(kw.as_str())) {
                rule.secondary_boost
            } else {
                0.0
            };
            if premium_category {
                boost *= rule.premium_damping;
            }
            score += boost;
        }

        score.min(SCORE_CEILING).max(0.0)
    }

    /// Tiered quota selection: same-category-and-type first, then
    /// same-category, same-type, others; shortfalls fill from the
    /// next tier down.
    fn select_tiered(
        &self,
        query: &ItemProfile,
        scored: Vec<(usize, f32)>,
        n_items: usize,
    ) -> Vec<RecommendationCandidate> {
        let mut tiers: [Vec<(usize, f32)>; 4] = [Vec::new(), Vec::new(), Vec::new(), Vec::new()];
        for (idx, score) in scored {
            let profile = &self.profiles[idx];
            let same_category = profile.category == query.category;
            let same_type = profile.product_type == query.product_type;
            let tier = match (same_category, same_type) {
                (true, true) => 0,
                (true, false) => 1,
                (false, true) => 2,
                (false, false) => 3,
            };
            tiers[tier].push((idx, score));
        }
        for tier in &mut tiers {
            tier.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            });
        }

        let (q1, q2, q3) = if self.config.is_core_type(&query.product_type) {
            CORE_QUOTAS
        } else {
            GENERAL_QUOTAS
        };
        let quotas = [q1.min(n_items), q2, q3, usize::MAX];

        let mut selected: Vec<(usize, f32)> = Vec::new();
        let mut cursors = [0usize; 4];
        for tier in 0..4 {
            let take = quotas[tier].min(n_items.saturating_sub(selected.len()));
            let available = tiers[tier].len();
            let count = take.min(available);
            selected.extend_from_slice(&tiers[tier][..count]);
            cursors[tier] = count;
        }
        // Quota shortfalls: fill leftover slots walking the tiers again.
        for tier in 0..4 {
            while selected.len() < n_items && cursors[tier] < tiers[tier].len() {
                selected.push(tiers[tier][cursors[tier]]);
                cursors[tier] += 1;
            }
        }

        selected.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        selected.truncate(n_items);

        selected
            .into_iter()
            .enumerate()
            .map(|(rank, (idx, score))| RecommendationCandidate {
                item_id: self.profiles[idx].id,
                score,
                source: Source::Content,
                rank,
            })
            .collect()
    }
}
