//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use recomendar::prelude::*;
//! ```

pub use crate::collaborative::CollaborativeFilter;
pub use crate::content::{ContentConfig, ContentSimilarityEngine};
pub use crate::data::{
    EngagementMetrics, Interaction, InteractionKind, Item, RankedItem, RecommendationCandidate,
    Source,
};
pub use crate::engine::Recommender;
pub use crate::error::{RecomendarError, Result};
pub use crate::hybrid::HybridCombiner;
pub use crate::popularity::{PopularityFilter, PopularityScorer};
pub use crate::primitives::{Matrix, Vector};
