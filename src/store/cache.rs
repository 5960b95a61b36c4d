//! Read-mostly cache of the full order collection.
//!
//! The cache holds the last successfully fetched snapshot. The only writer
//! is the refresh path; rotation and scoring only read. Concurrent refresh
//! requests coalesce: whoever loses the race to the refresh gate observes
//! the winner's generation bump and skips its own fetch.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, RwLock};

use crate::api::OrderStore;
use crate::domain::Order;
use crate::error::Result;

pub struct OrderCache {
    store: Arc<dyn OrderStore>,
    snapshot: RwLock<Arc<Vec<Order>>>,
    refresh_gate: Mutex<()>,
    generation: AtomicU64,
}

impl OrderCache {
    /// Empty cache over a store; call [`refresh`](Self::refresh) to load.
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self {
            store,
            snapshot: RwLock::new(Arc::new(Vec::new())),
            refresh_gate: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Current snapshot; cheap clone of an `Arc`.
    pub async fn snapshot(&self) -> Arc<Vec<Order>> {
        self.snapshot.read().await.clone()
    }

    /// Monotonic counter, bumped on every successful refresh.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Refetch the collection and replace the snapshot wholesale.
    ///
    /// On error the last-good snapshot stays in place. A refresh that
    /// arrives while another is in flight waits on the gate and then
    /// returns without fetching again.
    pub async fn refresh(&self) -> Result<()> {
        let observed = self.generation();
        let _gate = self.refresh_gate.lock().await;
        if self.generation() != observed {
            // Someone else refreshed while we waited; their snapshot is
            // at least as fresh as ours would be.
            return Ok(());
        }

        let orders = self.store.fetch_all().await?;
        tracing::debug!(count = orders.len(), "order snapshot refreshed");
        *self.snapshot.write().await = Arc::new(orders);
        self.generation.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
