//! Input records and ranked outputs.
//!
//! The engine consumes two record shapes from the storage layer — item
//! rows and interaction rows — and emits ranked item lists. No SQL,
//! transport or wire format is part of this contract; everything here
//! is a plain serde-derived struct.

use serde::{Deserialize, Serialize};

/// Engagement counters attached to a catalog item.
///
/// Every field is optional at the source; a missing metric is simply
/// zero, which min-max normalization then treats like any other value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementMetrics {
    /// Number of reviews received.
    pub review_count: u32,
    /// Mean review rating (0 when unreviewed).
    pub avg_rating: f32,
    /// Units sold.
    pub sold_count: u32,
    /// Distinct orders containing the item.
    pub order_count: u32,
    /// Distinct users who viewed the item.
    pub unique_viewers: u32,
    /// Total view events.
    pub total_views: u32,
    /// Days since the item entered the catalog.
    pub days_since_launch: u32,
}

/// An immutable catalog item snapshot, one per training cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Catalog identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Category name.
    pub category: String,
    /// Brand name.
    pub brand: String,
    /// Lowest variant price.
    pub price_min: f32,
    /// Highest variant price.
    pub price_max: f32,
    /// Engagement counters.
    pub metrics: EngagementMetrics,
}

/// The kind of a recorded user/item interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionKind {
    /// Item page view.
    View,
    /// Added to cart.
    Cart,
    /// Review with a rating; the rating value travels in `magnitude`.
    Rating,
    /// Completed purchase.
    Purchase,
}

impl InteractionKind {
    /// Base weight used when folding a live event into the
    /// collaborative matrix (view=1, cart=2, purchase=3; a rating
    /// contributes its own magnitude instead).
    #[must_use]
    pub fn base_weight(self) -> f32 {
        match self {
            InteractionKind::View => 1.0,
            InteractionKind::Cart => 2.0,
            InteractionKind::Rating => 2.0,
            InteractionKind::Purchase => 3.0,
        }
    }
}

/// A single recorded user/item interaction. Append-only at the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// User identifier.
    pub user_id: u64,
    /// Item identifier.
    pub item_id: u64,
    /// Event kind.
    pub kind: InteractionKind,
    /// Event magnitude: rating value for [`InteractionKind::Rating`],
    /// event count for the others (usually 1).
    pub magnitude: f32,
    /// Unix timestamp (seconds).
    pub timestamp: i64,
}

impl Interaction {
    /// Convenience constructor with magnitude 1.
    #[must_use]
    pub fn new(user_id: u64, item_id: u64, kind: InteractionKind, timestamp: i64) -> Self {
        Self {
            user_id,
            item_id,
            kind,
            magnitude: 1.0,
            timestamp,
        }
    }

    /// Convenience constructor for a rating event.
    #[must_use]
    pub fn rating(user_id: u64, item_id: u64, rating: f32, timestamp: i64) -> Self {
        Self {
            user_id,
            item_id,
            kind: InteractionKind::Rating,
            magnitude: rating,
            timestamp,
        }
    }
}

/// Which scorer produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// Content similarity engine.
    Content,
    /// Collaborative filter.
    Collaborative,
    /// Popularity scorer.
    Popularity,
}

impl Source {
    /// Tie-break priority when two candidates carry equal weight:
    /// content > collaborative > popularity.
    #[must_use]
    pub fn priority(self) -> u8 {
        match self {
            Source::Content => 0,
            Source::Collaborative => 1,
            Source::Popularity => 2,
        }
    }
}

/// A scored candidate emitted by one scorer, consumed by the combiner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationCandidate {
    /// Item identifier.
    pub item_id: u64,
    /// Raw score in the producing scorer's own scale.
    pub score: f32,
    /// Producing scorer.
    pub source: Source,
    /// Zero-based rank within the producing scorer's list.
    pub rank: usize,
}

/// One entry of the final ranked output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    /// Item identifier.
    pub item_id: u64,
    /// Fused score in (0, 1].
    pub score: f32,
    /// Dominant source behind the score.
    pub source: Source,
    /// Human-readable justification.
    pub reason: String,
}
