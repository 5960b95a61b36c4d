//! CRUD operations on the `orders` table.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;

use crate::api::client::ApiClient;
use crate::domain::{Order, OrderDraft, OrderPatch, OrderPriority, OrderStatus};
use crate::error::{LineboardError, Result};

/// Rows per bulk-insert request.
pub const BULK_CHUNK_SIZE: usize = 50;

/// Outcome of a chunked bulk insert; failed chunks are reported, not
/// thrown.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BulkInsertReport {
    pub inserted: usize,
    pub errors: Vec<String>,
}

impl BulkInsertReport {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Order persistence surface consumed by the dashboard and CLI.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Full collection; source-ordered, the dashboard re-sorts anyway.
    async fn fetch_all(&self) -> Result<Vec<Order>>;

    async fn fetch_by_id(&self, id: &str) -> Result<Order>;

    async fn create(&self, draft: &OrderDraft) -> Result<Order>;

    async fn update(&self, id: &str, patch: &OrderPatch) -> Result<Order>;

    async fn delete(&self, id: &str) -> Result<()>;

    async fn update_status(&self, id: &str, status: OrderStatus) -> Result<Order>;

    async fn update_priority(&self, id: &str, priority: OrderPriority) -> Result<Order>;

    /// Chunked insert; continues past failed chunks and returns partial
    /// counts.
    async fn insert_bulk(&self, rows: &[OrderDraft]) -> Result<BulkInsertReport>;
}

/// Run `insert_chunk` over fixed-size chunks, accumulating one labeled
/// error per failed chunk.
pub(crate) async fn insert_in_chunks<F, Fut>(
    rows: &[OrderDraft],
    chunk_size: usize,
    mut insert_chunk: F,
) -> BulkInsertReport
where
    F: FnMut(Vec<OrderDraft>) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut report = BulkInsertReport::default();

    for (index, chunk) in rows.chunks(chunk_size).enumerate() {
        let first_row = index * chunk_size + 1;
        let last_row = first_row + chunk.len() - 1;

        match insert_chunk(chunk.to_vec()).await {
            Ok(()) => report.inserted += chunk.len(),
            Err(err) => {
                tracing::error!(first_row, last_row, error = %err, "bulk insert chunk failed");
                report.errors.push(format!("rows {}-{}: {}", first_row, last_row, err));
            }
        }
    }

    report
}

/// [`OrderStore`] backed by the REST row store.
pub struct RestOrderStore {
    client: Arc<ApiClient>,
}

impl RestOrderStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fetch rows matching `id=eq.{id}`; PostgREST answers with an array.
    async fn fetch_matching(&self, id: &str) -> Result<Vec<Order>> {
        let url = self.client.table_url("orders");
        let id = id.to_string();
        let response = self
            .client
            .execute(|| {
                self.client
                    .request(Method::GET, url.clone())
                    .query(&[("id", format!("eq.{}", id)), ("select", "*".to_string())])
            })
            .await?;
        Ok(response.json().await?)
    }

    /// Apply a patch and return the updated row.
    async fn patch(&self, id: &str, patch: &OrderPatch) -> Result<Order> {
        let url = self.client.table_url("orders");
        let response = self
            .client
            .execute(|| {
                self.client
                    .request(Method::PATCH, url.clone())
                    .query(&[("id", format!("eq.{}", id))])
                    .header("Prefer", "return=representation")
                    .json(patch)
            })
            .await?;
        let rows: Vec<Order> = response.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| LineboardError::OrderNotFound(id.to_string()))
    }

    async fn insert_chunk(&self, chunk: Vec<OrderDraft>) -> Result<()> {
        let url = self.client.table_url("orders");
        self.client
            .execute(|| self.client.request(Method::POST, url.clone()).json(&chunk))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for RestOrderStore {
    async fn fetch_all(&self) -> Result<Vec<Order>> {
        let url = self.client.table_url("orders");
        let response = self
            .client
            .execute(|| {
                self.client.request(Method::GET, url.clone()).query(&[
                    ("select", "*"),
                    ("order", "company_name.asc,priority.desc"),
                ])
            })
            .await?;
        Ok(response.json().await?)
    }

    async fn fetch_by_id(&self, id: &str) -> Result<Order> {
        self.fetch_matching(id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| LineboardError::OrderNotFound(id.to_string()))
    }

    async fn create(&self, draft: &OrderDraft) -> Result<Order> {
        let url = self.client.table_url("orders");
        let response = self
            .client
            .execute(|| {
                self.client
                    .request(Method::POST, url.clone())
                    .header("Prefer", "return=representation")
                    .json(draft)
            })
            .await?;
        let rows: Vec<Order> = response.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| LineboardError::Api {
                status: 500,
                message: "create returned no row".to_string(),
            })
    }

    async fn update(&self, id: &str, patch: &OrderPatch) -> Result<Order> {
        self.patch(id, patch).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let url = self.client.table_url("orders");
        self.client
            .execute(|| {
                self.client
                    .request(Method::DELETE, url.clone())
                    .query(&[("id", format!("eq.{}", id))])
            })
            .await?;
        Ok(())
    }

    async fn update_status(&self, id: &str, status: OrderStatus) -> Result<Order> {
        self.patch(
            id,
            &OrderPatch {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    async fn update_priority(&self, id: &str, priority: OrderPriority) -> Result<Order> {
        self.patch(
            id,
            &OrderPatch {
                priority: Some(priority),
                ..Default::default()
            },
        )
        .await
    }

    async fn insert_bulk(&self, rows: &[OrderDraft]) -> Result<BulkInsertReport> {
        Ok(insert_in_chunks(rows, BULK_CHUNK_SIZE, |chunk| self.insert_chunk(chunk)).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(part_name: &str) -> OrderDraft {
        OrderDraft {
            part_name: part_name.to_string(),
            quantity_total: 1,
            ..Default::default()
        }
    }

    fn drafts(count: usize) -> Vec<OrderDraft> {
        (0..count).map(|i| draft(&format!("Part {}", i))).collect()
    }

    #[tokio::test]
    async fn test_insert_in_chunks_all_succeed() {
        let rows = drafts(120);
        let mut chunk_sizes = Vec::new();
        let report = insert_in_chunks(&rows, 50, |chunk| {
            chunk_sizes.push(chunk.len());
            async { Ok(()) }
        })
        .await;

        assert_eq!(report.inserted, 120);
        assert!(report.is_complete());
        assert_eq!(chunk_sizes, vec![50, 50, 20]);
    }

    #[tokio::test]
    async fn test_insert_in_chunks_partial_failure() {
        // 120 rows, chunk 2 (rows 51-100) fails: 100 inserted, one labeled
        // error.
        let rows = drafts(120);
        let mut calls = 0;
        let report = insert_in_chunks(&rows, 50, |_chunk| {
            calls += 1;
            let fail = calls == 2;
            async move {
                if fail {
                    Err(LineboardError::Api {
                        status: 500,
                        message: "insert failed".to_string(),
                    })
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert_eq!(report.inserted, 100);
        assert!(!report.is_complete());
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("rows 51-100:"), "{}", report.errors[0]);
    }

    #[tokio::test]
    async fn test_insert_in_chunks_labels_short_final_chunk() {
        let rows = drafts(60);
        let report = insert_in_chunks(&rows, 50, |_chunk| async {
            Err(LineboardError::Api {
                status: 500,
                message: "down".to_string(),
            })
        })
        .await;

        assert_eq!(report.inserted, 0);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].starts_with("rows 1-50:"));
        assert!(report.errors[1].starts_with("rows 51-60:"));
    }

    #[tokio::test]
    async fn test_insert_in_chunks_empty_input() {
        let report = insert_in_chunks(&[], 50, |_chunk| async { Ok(()) }).await;
        assert_eq!(report.inserted, 0);
        assert!(report.is_complete());
    }
}
