//! Display-priority ranking for work orders.
//!
//! Orders are scored with an additive point system and sorted descending by
//! score; ties fall back to part-name length (optional) and FIFO order.

pub mod group;
pub mod score;
pub mod sort;

pub use group::{CompanyBuckets, group_by_company};
pub use score::{SortOptions, local_day_start_ms, score};
pub use sort::{weighted_sort, weighted_sort_at};
