//! Lineboard - a production order board for shop-floor TVs
//!
//! Lineboard keeps a rotating display of manufacturing orders in sync with a
//! PostgREST backend: weighted priority sorting per company, timed
//! page/company rotation, and push-based cache invalidation with a polling
//! backstop.

pub mod api;
pub mod domain;
pub mod error;
pub mod rank;
pub mod realtime;
pub mod recovery;
pub mod rotation;
pub mod store;
pub mod tui;

pub use error::{LineboardError, Result};
