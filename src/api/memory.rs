//! In-memory [`OrderStore`] for tests and offline demos.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use crate::api::orders::{BULK_CHUNK_SIZE, BulkInsertReport, OrderStore, insert_in_chunks};
use crate::domain::{Order, OrderDraft, OrderPatch, OrderPriority, OrderStatus};
use crate::error::{LineboardError, Result};

/// Order store holding rows in a mutex-guarded vector.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: Mutex<Vec<Order>>,
    next_id: AtomicU64,
    /// Number of completed `fetch_all` calls, for refresh assertions.
    fetch_count: AtomicU64,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing orders.
    pub fn with_orders(orders: Vec<Order>) -> Self {
        Self {
            orders: Mutex::new(orders),
            ..Default::default()
        }
    }

    pub fn fetch_count(&self) -> u64 {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Replace the backing rows, simulating an external writer.
    pub fn replace_all(&self, orders: Vec<Order>) {
        *self.orders.lock().expect("orders lock poisoned") = orders;
    }

    fn materialize(&self, draft: &OrderDraft) -> Order {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        Order {
            id: format!("mem-{}", n),
            company_name: draft.company_name.clone(),
            part_name: draft.part_name.clone(),
            quantity_total: draft.quantity_total,
            quantity_completed: draft.quantity_completed,
            priority: draft.priority,
            status: draft.status,
            created_at: Utc::now(),
        }
    }

    fn apply_patch(order: &mut Order, patch: &OrderPatch) {
        if let Some(ref company_name) = patch.company_name {
            order.company_name = Some(company_name.clone());
        }
        if let Some(ref part_name) = patch.part_name {
            order.part_name = part_name.clone();
        }
        if let Some(quantity_total) = patch.quantity_total {
            order.quantity_total = quantity_total;
        }
        if let Some(quantity_completed) = patch.quantity_completed {
            order.quantity_completed = quantity_completed;
        }
        if let Some(priority) = patch.priority {
            order.priority = priority;
        }
        if let Some(status) = patch.status {
            order.status = status;
        }
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn fetch_all(&self) -> Result<Vec<Order>> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.orders.lock().expect("orders lock poisoned").clone())
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Order> {
        self.orders
            .lock()
            .expect("orders lock poisoned")
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| LineboardError::OrderNotFound(id.to_string()))
    }

    async fn create(&self, draft: &OrderDraft) -> Result<Order> {
        let order = self.materialize(draft);
        self.orders
            .lock()
            .expect("orders lock poisoned")
            .push(order.clone());
        Ok(order)
    }

    async fn update(&self, id: &str, patch: &OrderPatch) -> Result<Order> {
        let mut orders = self.orders.lock().expect("orders lock poisoned");
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| LineboardError::OrderNotFound(id.to_string()))?;
        Self::apply_patch(order, patch);
        Ok(order.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut orders = self.orders.lock().expect("orders lock poisoned");
        let before = orders.len();
        orders.retain(|o| o.id != id);
        if orders.len() == before {
            return Err(LineboardError::OrderNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn update_status(&self, id: &str, status: OrderStatus) -> Result<Order> {
        self.update(
            id,
            &OrderPatch {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    async fn update_priority(&self, id: &str, priority: OrderPriority) -> Result<Order> {
        self.update(
            id,
            &OrderPatch {
                priority: Some(priority),
                ..Default::default()
            },
        )
        .await
    }

    async fn insert_bulk(&self, rows: &[OrderDraft]) -> Result<BulkInsertReport> {
        Ok(insert_in_chunks(rows, BULK_CHUNK_SIZE, |chunk| async move {
            for draft in &chunk {
                self.create(draft).await?;
            }
            Ok(())
        })
        .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(part_name: &str) -> OrderDraft {
        OrderDraft {
            part_name: part_name.to_string(),
            quantity_total: 5,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let store = MemoryOrderStore::new();
        let created = store.create(&draft("Widget")).await.unwrap();

        let fetched = store.fetch_by_id(&created.id).await.unwrap();
        assert_eq!(fetched.part_name, "Widget");

        let all = store.fetch_all().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_by_id_not_found() {
        let store = MemoryOrderStore::new();
        let err = store.fetch_by_id("missing").await.unwrap_err();
        assert!(matches!(err, LineboardError::OrderNotFound(_)));
    }

    #[tokio::test]
    async fn test_update_status_and_priority() {
        let store = MemoryOrderStore::new();
        let created = store.create(&draft("Widget")).await.unwrap();

        let updated = store.update_status(&created.id, OrderStatus::Hold).await.unwrap();
        assert_eq!(updated.status, OrderStatus::Hold);

        let updated = store
            .update_priority(&created.id, OrderPriority::Critical)
            .await
            .unwrap();
        assert_eq!(updated.priority, OrderPriority::Critical);
        // Earlier change survives.
        assert_eq!(updated.status, OrderStatus::Hold);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryOrderStore::new();
        let created = store.create(&draft("Widget")).await.unwrap();
        store.delete(&created.id).await.unwrap();

        assert!(store.fetch_all().await.unwrap().is_empty());
        assert!(store.delete(&created.id).await.is_err());
    }

    #[tokio::test]
    async fn test_insert_bulk() {
        let store = MemoryOrderStore::new();
        let rows: Vec<OrderDraft> = (0..120).map(|i| draft(&format!("Part {}", i))).collect();

        let report = store.insert_bulk(&rows).await.unwrap();
        assert_eq!(report.inserted, 120);
        assert!(report.is_complete());
        assert_eq!(store.fetch_all().await.unwrap().len(), 120);
    }

    #[tokio::test]
    async fn test_fetch_count_tracks_refreshes() {
        let store = MemoryOrderStore::new();
        assert_eq!(store.fetch_count(), 0);
        store.fetch_all().await.unwrap();
        store.fetch_all().await.unwrap();
        assert_eq!(store.fetch_count(), 2);
    }
}
