//! Collaborative filtering over a low-rank factorized interaction
//! matrix.
//!
//! Interactions aggregate into a user×item score matrix (weighted mix
//! of rating, purchases, reviews and views), which is mean-centered
//! and factorized with a truncated SVD. Predictions for unseen items
//! come from the reconstructed low-rank product; live events blend
//! into the matrix with exponential decay and trigger a full
//! refactorization.

use std::collections::HashMap;

use nalgebra::DMatrix;
use tracing::{debug, info};

use crate::data::{Interaction, InteractionKind, RecommendationCandidate, Source};
use crate::error::Result;
use crate::preprocessing::min_max;
use crate::primitives::Matrix;

/// Interaction score weights; they sum to 1.0.
const W_RATING: f32 = 0.4;
const W_PURCHASE: f32 = 0.3;
const W_REVIEW: f32 = 0.2;
const W_VIEW: f32 = 0.1;

/// Rank cap for the factorization.
const MAX_FACTORS: usize = 30;

/// Singular values shrink by 1 / (1 + SHRINKAGE · √user_count):
/// regularization that grows with the user base.
const SHRINKAGE: f32 = 0.05;

/// Exponential-decay blend for live updates: retained share of the
/// old cell value.
const DECAY_RETAIN: f32 = 0.8;

/// Multiplier for items in a user's historically preferred categories.
const CATEGORY_BOOST: f32 = 1.1;

/// How many preferred categories each user keeps.
const TOP_CATEGORIES: usize = 3;

/// Per-(user, item) aggregate built during `fit`.
#[derive(Debug, Clone, Copy, Default)]
struct PairAggregate {
    rating_sum: f32,
    rating_count: u32,
    purchase_count: u32,
    view_sum: f32,
    review_count: u32,
}

/// Latent-factor recommender over user/item interactions.
///
/// # Examples
///
/// ```
/// use recomendar::collaborative::CollaborativeFilter;
/// use recomendar::synthetic;
///
/// let items = synthetic::catalog(15, 3);
/// let interactions = synthetic::interactions(&items, 10, 6, 3);
///
/// let mut filter = CollaborativeFilter::new();
/// filter.fit(&interactions).unwrap();
///
/// let recs = filter.recommend(interactions[0].user_id, 5);
/// assert!(recs.len() <= 5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CollaborativeFilter {
    user_ids: Vec<u64>,
    item_ids: Vec<u64>,
    user_index: HashMap<u64, usize>,
    item_index: HashMap<u64, usize>,
    matrix: Matrix<f32>,
    user_means: Vec<f32>,
    /// users × k; empty when the matrix is degenerate.
    user_factors: Matrix<f32>,
    /// items × k; empty when the matrix is degenerate.
    item_factors: Matrix<f32>,
    item_categories: HashMap<u64, String>,
    user_top_categories: HashMap<u64, Vec<String>>,
}

impl CollaborativeFilter {
    /// Creates an untrained filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wires item categories for the preferred-category boost. Without
    /// this call `recommend` skips the boost entirely.
    pub fn set_item_categories(&mut self, categories: &[(u64, String)]) {
        self.item_categories = categories.iter().cloned().collect();
    }

    /// Number of users in the matrix.
    #[must_use]
    pub fn n_users(&self) -> usize {
        self.user_ids.len()
    }

    /// Number of items in the matrix.
    #[must_use]
    pub fn n_items(&self) -> usize {
        self.item_ids.len()
    }

    /// Fraction of zero cells in the interaction matrix. Exposed for
    /// observability; nothing in the engine consumes it.
    #[must_use]
    pub fn sparsity(&self) -> f32 {
        self.matrix.sparsity()
    }

    /// Direct cell inspection: the interaction score for (user, item),
    /// `None` when either id is unknown.
    #[must_use]
    pub fn interaction_score(&self, user_id: u64, item_id: u64) -> Option<f32> {
        let &row = self.user_index.get(&user_id)?;
        let &col = self.item_index.get(&item_id)?;
        Some(self.matrix.get(row, col))
    }

    /// Builds the interaction matrix and factorizes it.
    ///
    /// Aggregates per (user, item): mean rating, purchase count,
    /// log-damped view and review counts; min-max normalizes each
    /// column across the whole set; combines with the fixed weights
    /// (rating 0.4, purchase 0.3, review 0.2, view 0.1). A degenerate
    /// matrix (fewer than 2 users or 2 items) leaves the factors
    /// empty and every recommendation request returns nothing.
    ///
    /// # Errors
    ///
    /// Infallible today; the `Result` reserves the contract.
    pub fn fit(&mut self, interactions: &[Interaction]) -> Result<()> {
        let mut aggregates: HashMap<(u64, u64), PairAggregate> = HashMap::new();
        for event in interactions {
            let entry = aggregates
                .entry((event.user_id, event.item_id))
                .or_default();
            match event.kind {
                InteractionKind::Rating => {
                    entry.rating_sum += event.magnitude;
                    entry.rating_count += 1;
                    entry.review_count += 1;
                }
                InteractionKind::Purchase => entry.purchase_count += 1,
                InteractionKind::View => entry.view_sum += event.magnitude,
                InteractionKind::Cart => entry.view_sum += event.magnitude,
            }
        }

        let mut pairs: Vec<(u64, u64)> = aggregates.keys().copied().collect();
        pairs.sort_unstable();

        let mut user_ids: Vec<u64> = pairs.iter().map(|p| p.0).collect();
        user_ids.sort_unstable();
        user_ids.dedup();
        let mut item_ids: Vec<u64> = pairs.iter().map(|p| p.1).collect();
        item_ids.sort_unstable();
        item_ids.dedup();

        let ratings: Vec<f32> = pairs
            .iter()
            .map(|p| {
                let a = &aggregates[p];
                if a.rating_count > 0 {
                    a.rating_sum / a.rating_count as f32
                } else {
                    0.0
                }
            })
            .collect();
        let purchases: Vec<f32> = pairs
            .iter()
            .map(|p| aggregates[p].purchase_count as f32)
            .collect();
        let views: Vec<f32> = pairs.iter().map(|p| aggregates[p].view_sum.ln_1p()).collect();
        let reviews: Vec<f32> = pairs
            .iter()
            .map(|p| (aggregates[p].review_count as f32).ln_1p())
            .collect();

        let ratings = min_max(&ratings);
        let purchases = min_max(&purchases);
        let views = min_max(&views);
        let reviews = min_max(&reviews);

        self.user_index = user_ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        self.item_index = item_ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        self.matrix = Matrix::zeros(user_ids.len(), item_ids.len());
        for (idx, (user_id, item_id)) in pairs.iter().enumerate() {
            let score = W_RATING * ratings[idx]
                + W_PURCHASE * purchases[idx]
                + W_REVIEW * reviews[idx]
                + W_VIEW * views[idx];
            let row = self.user_index[user_id];
            let col = self.item_index[item_id];
            self.matrix.set(row, col, score);
        }
        self.user_ids = user_ids;
        self.item_ids = item_ids;

        self.recompute_user_means();
        self.factorize();
        self.rebuild_top_categories(interactions);

        info!(
            users = self.n_users(),
            items = self.n_items(),
            sparsity = self.sparsity(),
            "collaborative model fitted"
        );
        Ok(())
    }

    /// Predicted top items for a user, never including anything the
    /// user already interacted with.
    ///
    /// Unknown users and degenerate factorizations yield an empty
    /// list. Ties break by original column order.
    #[must_use]
    pub fn recommend(&self, user_id: u64, n_items: usize) -> Vec<RecommendationCandidate> {
        if self.user_factors.n_rows() == 0 || n_items == 0 {
            return Vec::new();
        }
        let Some(&row) = self.user_index.get(&user_id) else {
            debug!(user_id, "unknown user, empty collaborative result");
            return Vec::new();
        };

        let k = self.user_factors.n_cols();
        let user_factor = self.user_factors.row_slice(row);
        let preferred = self.user_top_categories.get(&user_id);

        let mut predictions: Vec<(usize, f32)> = Vec::with_capacity(self.item_ids.len());
        for col in 0..self.item_ids.len() {
            // interacted items are masked out entirely
            if self.matrix.get(row, col) > 0.0 {
                continue;
            }
            let item_factor = self.item_factors.row_slice(col);
            let mut pred: f32 = (0..k).map(|f| user_factor[f] * item_factor[f]).sum::<f32>()
                + self.user_means[row];
            if let Some(categories) = preferred {
                if pred > 0.0 {
                    if let Some(category) = self.item_categories.get(&self.item_ids[col]) {
                        if categories.iter().any(|c| c == category) {
                            pred *= CATEGORY_BOOST;
                        }
                    }
                }
            }
            predictions.push((col, pred));
        }

        predictions.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        predictions.truncate(n_items);

        predictions
            .into_iter()
            .enumerate()
            .map(|(rank, (col, score))| RecommendationCandidate {
                item_id: self.item_ids[col],
                score,
                source: Source::Collaborative,
                rank,
            })
            .collect()
    }

    /// Blends one live event into the matrix and refactorizes.
    ///
    /// The cell becomes `0.8·old + 0.2·weight`; a new user or item
    /// first extends the matrix with a zero row/column. The full
    /// refactorization makes this a blocking call whose cost grows
    /// with the matrix — batch high-traffic streams through
    /// [`apply_updates`](Self::apply_updates) instead.
    ///
    /// # Errors
    ///
    /// Infallible today; the `Result` reserves the contract.
    pub fn update(&mut self, user_id: u64, item_id: u64, weight: f32) -> Result<()> {
        self.apply_updates(&[(user_id, item_id, weight)])
    }

    /// Applies a batch of pending updates with a single
    /// refactorization — the debounced path for live traffic.
    ///
    /// # Errors
    ///
    /// Infallible today; the `Result` reserves the contract.
    pub fn apply_updates(&mut self, updates: &[(u64, u64, f32)]) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }

        for &(user_id, item_id, weight) in updates {
            let row = match self.user_index.get(&user_id) {
                Some(&row) => row,
                None => {
                    let row = self.matrix.append_row();
                    self.user_ids.push(user_id);
                    self.user_index.insert(user_id, row);
                    self.user_means.push(0.0);
                    row
                }
            };
            let col = match self.item_index.get(&item_id) {
                Some(&col) => col,
                None => {
                    let col = self.matrix.append_col();
                    self.item_ids.push(item_id);
                    self.item_index.insert(item_id, col);
                    col
                }
            };

            let old = self.matrix.get(row, col);
            self.matrix
                .set(row, col, DECAY_RETAIN * old + (1.0 - DECAY_RETAIN) * weight);
        }

        self.recompute_user_means();
        self.factorize();
        info!(updates = updates.len(), "interaction matrix refactorized");
        Ok(())
    }

    fn recompute_user_means(&mut self) {
        let rows = self.matrix.n_rows();
        self.user_means = (0..rows).map(|row| self.matrix.row(row).mean()).collect();
    }

    /// Truncated SVD of the mean-centered matrix. Degenerate shapes
    /// (fewer than 2 users or items) clear the factors.
    fn factorize(&mut self) {
        let (n_users, n_items) = self.matrix.shape();
        if n_users < 2 || n_items < 2 {
            self.user_factors = Matrix::zeros(0, 0);
            self.item_factors = Matrix::zeros(0, 0);
            return;
        }

        let mut centered = Vec::with_capacity(n_users * n_items);
        for row in 0..n_users {
            let mean = self.user_means[row];
            centered.extend(self.matrix.row_slice(row).iter().map(|v| v - mean));
        }

        let svd = DMatrix::from_row_slice(n_users, n_items, &centered).svd(true, true);
        let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
            self.user_factors = Matrix::zeros(0, 0);
            self.item_factors = Matrix::zeros(0, 0);
            return;
        };
        let sigma = svd.singular_values;

        // Largest singular values first, independent of backend order.
        let mut order: Vec<usize> = (0..sigma.len()).collect();
        order.sort_by(|&a, &b| sigma[b].partial_cmp(&sigma[a]).unwrap_or(std::cmp::Ordering::Equal));
        let k = MAX_FACTORS.min(n_users.min(n_items) - 1).min(order.len());
        let shrink = 1.0 + SHRINKAGE * (n_users as f32).sqrt();

        let mut user_factors = vec![0.0; n_users * k];
        let mut item_factors = vec![0.0; n_items * k];
        for (factor, &src) in order.iter().take(k).enumerate() {
            let shrunk = sigma[src] / shrink;
            for row in 0..n_users {
                user_factors[row * k + factor] = u[(row, src)] * shrunk;
            }
            for col in 0..n_items {
                item_factors[col * k + factor] = v_t[(src, col)];
            }
        }

        self.user_factors =
            Matrix::from_vec(n_users, k, user_factors).unwrap_or_else(|_| Matrix::zeros(0, 0));
        self.item_factors =
            Matrix::from_vec(n_items, k, item_factors).unwrap_or_else(|_| Matrix::zeros(0, 0));
    }

    /// Top interacted categories per user, for the recommend boost.
    fn rebuild_top_categories(&mut self, interactions: &[Interaction]) {
        self.user_top_categories.clear();
        if self.item_categories.is_empty() {
            return;
        }

        let mut counts: HashMap<u64, HashMap<&str, u32>> = HashMap::new();
        for event in interactions {
            if let Some(category) = self.item_categories.get(&event.item_id) {
                *counts
                    .entry(event.user_id)
                    .or_default()
                    .entry(category.as_str())
                    .or_insert(0) += 1;
            }
        }

        for (user_id, per_category) in counts {
            let mut ranked: Vec<(&str, u32)> = per_category.into_iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            self.user_top_categories.insert(
                user_id,
                ranked
                    .into_iter()
                    .take(TOP_CATEGORIES)
                    .map(|(category, _)| category.to_string())
                    .collect(),
            );
        }
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
