//! Shared order snapshot cache.

pub mod cache;

pub use cache::OrderCache;
