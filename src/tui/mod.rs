//! TV-mode terminal dashboard.

pub mod app;
pub mod views;

pub use app::{DashboardConfig, DashboardSession};
