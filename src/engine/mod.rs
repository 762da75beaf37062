//! Snapshot-owning recommendation service.
//!
//! The reference system kept process-wide model singletons retrained
//! on a timer. [`Recommender`] replaces that with an explicit service
//! object: derived state lives behind a swappable snapshot, `fit`
//! builds the next generation off to the side and publishes it
//! atomically, and live interaction updates flow through a bounded
//! queue that refactorizes the collaborative matrix at most once per
//! flush instead of once per event.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, info};

use crate::content::ContentConfig;
use crate::data::{Interaction, Item, RankedItem};
use crate::error::{RecomendarError, Result};
use crate::hybrid::HybridCombiner;

/// Hard bound on queued updates; past it `queue_update` sheds load.
const QUEUE_CAPACITY: usize = 1024;

/// Queue length that triggers an automatic flush.
const FLUSH_THRESHOLD: usize = 64;

/// Thread-safe recommendation service with copy-on-write snapshots.
///
/// Readers clone the current snapshot `Arc` and compute without any
/// lock held; a concurrent `fit` or flush publishes a fully built
/// replacement, so requests observe either the old or the new state,
/// never a partially built one.
///
/// # Examples
///
/// ```
/// use recomendar::engine::Recommender;
/// use recomendar::synthetic;
///
/// let items = synthetic::catalog(20, 9);
/// let interactions = synthetic::interactions(&items, 10, 7, 9);
///
/// let service = Recommender::new();
/// service.fit(&items, &interactions).unwrap();
///
/// let ranked = service.recommend(None, Some(items[0].id), 5);
/// assert!(ranked.len() <= 5);
/// ```
#[derive(Debug, Default)]
pub struct Recommender {
    snapshot: RwLock<Arc<HybridCombiner>>,
    pending: Mutex<Vec<(u64, u64, f32)>>,
}

impl Recommender {
    /// Creates a service with an untrained snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service whose snapshots carry an injected content
    /// configuration; every refit preserves it.
    #[must_use]
    pub fn with_content_config(config: ContentConfig) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(HybridCombiner::with_content_config(config))),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// The current snapshot. Cheap (`Arc` clone); holders keep the
    /// generation they grabbed even across a concurrent refit.
    #[must_use]
    pub fn snapshot(&self) -> Arc<HybridCombiner> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Retrains everything on a fresh data snapshot and publishes the
    /// result atomically.
    ///
    /// # Errors
    ///
    /// Propagates scorer fit failures; the previous snapshot stays
    /// published when fitting fails.
    pub fn fit(&self, items: &[Item], interactions: &[Interaction]) -> Result<()> {
        let config = self.snapshot().content().config().clone();
        let mut next = HybridCombiner::with_content_config(config);
        next.fit(items, interactions)?;

        let mut guard = self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(next);
        Ok(())
    }

    /// Fused recommendations against the current snapshot.
    #[must_use]
    pub fn recommend(
        &self,
        user_id: Option<u64>,
        product_id: Option<u64>,
        n_items: usize,
    ) -> Vec<RankedItem> {
        self.snapshot().recommend(user_id, product_id, n_items)
    }

    /// Queues a live interaction update.
    ///
    /// Reaching the flush threshold triggers an automatic
    /// [`flush_updates`](Self::flush_updates); a full queue returns
    /// [`RecomendarError::QueueFull`] so callers can shed load
    /// instead of blocking on refactorization.
    ///
    /// # Errors
    ///
    /// [`RecomendarError::QueueFull`] when the queue is at capacity,
    /// or any flush failure.
    pub fn queue_update(&self, user_id: u64, item_id: u64, weight: f32) -> Result<()> {
        let should_flush = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            if pending.len() >= QUEUE_CAPACITY {
                return Err(RecomendarError::QueueFull {
                    capacity: QUEUE_CAPACITY,
                });
            }
            pending.push((user_id, item_id, weight));
            pending.len() >= FLUSH_THRESHOLD
        };

        if should_flush {
            self.flush_updates()?;
        }
        Ok(())
    }

    /// Number of queued, unflushed updates.
    #[must_use]
    pub fn pending_updates(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Drains the queue into the collaborative matrix with a single
    /// refactorization and publishes the updated snapshot.
    ///
    /// # Errors
    ///
    /// Propagates collaborative update failures; queued updates are
    /// consumed either way.
    pub fn flush_updates(&self) -> Result<()> {
        let batch: Vec<(u64, u64, f32)> = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *pending)
        };
        if batch.is_empty() {
            debug!("flush requested with empty queue");
            return Ok(());
        }

        // Copy-on-write: mutate a private clone, then publish it.
        let mut next = (*self.snapshot()).clone();
        next.collaborative_mut().apply_updates(&batch)?;

        let mut guard = self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(next);
        info!(updates = batch.len(), "published updated snapshot");
        Ok(())
    }
}
