//! Data access against the hosted Postgres row store.
//!
//! Thin REST translation layer: every function maps one CRUD call onto one
//! PostgREST-style request. Transient failures are retried with capped
//! exponential backoff; 4xx rejections are never retried.

pub mod client;
pub mod history;
pub mod memory;
pub mod orders;

pub use client::{ApiClient, BackendConfig};
pub use history::{HistoryFilter, HistoryStore, RestHistoryStore};
pub use memory::MemoryOrderStore;
pub use orders::{BULK_CHUNK_SIZE, BulkInsertReport, OrderStore, RestOrderStore};
