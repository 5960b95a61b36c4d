//! Queries over the `order_history` audit table.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;

use crate::api::client::ApiClient;
use crate::domain::{ChangeType, OrderChange};
use crate::error::Result;

/// Date-range and field/type filters for audit queries.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    /// Only changes at or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Only changes strictly before this instant.
    pub to: Option<DateTime<Utc>>,
    /// Only changes to this field.
    pub field: Option<String>,
    /// Only changes of this kind.
    pub change_type: Option<ChangeType>,
    /// Only changes to this order.
    pub order_id: Option<String>,
}

impl HistoryFilter {
    /// PostgREST query parameters for this filter, newest first.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("select".to_string(), "*".to_string()),
            ("order".to_string(), "changed_at.desc".to_string()),
        ];
        if let Some(from) = self.from {
            params.push(("changed_at".to_string(), format!("gte.{}", from.to_rfc3339())));
        }
        if let Some(to) = self.to {
            params.push(("changed_at".to_string(), format!("lt.{}", to.to_rfc3339())));
        }
        if let Some(ref field) = self.field {
            params.push(("changed_field".to_string(), format!("eq.{}", field)));
        }
        if let Some(change_type) = self.change_type {
            params.push(("change_type".to_string(), format!("eq.{}", change_type)));
        }
        if let Some(ref order_id) = self.order_id {
            params.push(("order_id".to_string(), format!("eq.{}", order_id)));
        }
        params
    }
}

/// Read surface over the audit table.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn fetch(&self, filter: &HistoryFilter) -> Result<Vec<OrderChange>>;
}

/// [`HistoryStore`] backed by the REST row store.
pub struct RestHistoryStore {
    client: Arc<ApiClient>,
}

impl RestHistoryStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HistoryStore for RestHistoryStore {
    async fn fetch(&self, filter: &HistoryFilter) -> Result<Vec<OrderChange>> {
        let url = self.client.table_url("order_history");
        let query = filter.to_query();
        let response = self
            .client
            .execute(|| self.client.request(Method::GET, url.clone()).query(&query))
            .await?;
        Ok(response.json().await?)
    }
}
