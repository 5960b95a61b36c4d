//! Rotation state machine over (company index, page index).
//!
//! States are implicitly `(company_index, page_index)` pairs, with a
//! distinguished "no companies" state where the current company is `None`.
//! Each tick advances one page within the current company, or moves to the
//! next company after its last page. Data refreshes replace the item map
//! wholesale; indices are normalized against the new data immediately, not
//! on the next tick.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::domain::Order;

/// Timer-independent rotation state.
#[derive(Debug)]
pub struct Rotation {
    items: HashMap<String, Vec<Order>>,
    companies: Vec<String>,
    items_per_page: usize,
    company_index: usize,
    page_index: usize,
    last_tick: Instant,
}

/// Snapshot of the visible page, cheap to clone for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationView {
    pub current_company: Option<String>,
    pub current_items: Vec<Order>,
    /// 1-based page number.
    pub current_page: usize,
    pub total_pages: usize,
    /// 0-based, always within `[0, total_companies)` when companies exist.
    pub company_index: usize,
    pub total_companies: usize,
    pub is_last_page: bool,
    /// Time until the next advance, derived from the last tick.
    pub next_company_in: Duration,
    /// Countdown as a percentage: 100 just after a tick, 0 right before one.
    pub progress: f64,
}

impl Rotation {
    /// Create a rotation over pre-sorted per-company item lists.
    ///
    /// `companies` fixes the iteration order; `items_per_page` is clamped to
    /// at least 1.
    pub fn new(items: HashMap<String, Vec<Order>>, companies: Vec<String>, items_per_page: usize) -> Self {
        Self {
            items,
            companies,
            items_per_page: items_per_page.max(1),
            company_index: 0,
            page_index: 0,
            last_tick: Instant::now(),
        }
    }

    pub fn total_companies(&self) -> usize {
        self.companies.len()
    }

    /// Company index normalized into range. Meaningless (0) when there are
    /// no companies.
    pub fn company_index(&self) -> usize {
        if self.companies.is_empty() {
            0
        } else {
            self.company_index % self.companies.len()
        }
    }

    pub fn current_company(&self) -> Option<&str> {
        self.companies.get(self.company_index()).map(String::as_str)
    }

    fn current_company_items(&self) -> &[Order] {
        self.current_company()
            .and_then(|company| self.items.get(company))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Page count for the current company, never zero.
    pub fn total_pages(&self) -> usize {
        let count = self.current_company_items().len();
        (count.div_ceil(self.items_per_page)).max(1)
    }

    /// 1-based page number after clamping against the current item count.
    pub fn current_page(&self) -> usize {
        self.clamped_page_index() + 1
    }

    pub fn is_last_page(&self) -> bool {
        self.current_page() == self.total_pages()
    }

    /// Page index with the reactive clamp applied: a stale index (item
    /// count shrank since the last tick) reads as 0.
    fn clamped_page_index(&self) -> usize {
        if self.page_index >= self.total_pages() {
            0
        } else {
            self.page_index
        }
    }

    /// The visible slice of the current company's items.
    pub fn current_items(&self) -> &[Order] {
        let items = self.current_company_items();
        let start = self.clamped_page_index() * self.items_per_page;
        if start >= items.len() {
            return &[];
        }
        let end = (start + self.items_per_page).min(items.len());
        &items[start..end]
    }

    /// Advance one page, or to the next company after the last page.
    ///
    /// No-op when there are no companies. Records `now` as the last tick
    /// for countdown derivation.
    pub fn tick(&mut self, now: Instant) {
        if self.companies.is_empty() {
            return;
        }

        // Normalize before advancing so a stale index never carries over.
        self.company_index = self.company_index();
        self.page_index = self.clamped_page_index();

        if self.page_index + 1 < self.total_pages() {
            self.page_index += 1;
        } else {
            self.company_index = (self.company_index + 1) % self.companies.len();
            self.page_index = 0;
        }

        self.last_tick = now;
        tracing::debug!(
            company = ?self.current_company(),
            page = self.current_page(),
            total_pages = self.total_pages(),
            "rotation advanced"
        );
    }

    /// Replace the rotation data after a refetch.
    ///
    /// The current position is kept where it is still valid: the company
    /// index wraps modulo the new company count and the page index is
    /// clamped against the new item counts. Rotation never rolls back
    /// because a slow refetch resolved late.
    pub fn set_data(&mut self, items: HashMap<String, Vec<Order>>, companies: Vec<String>) {
        self.items = items;
        self.companies = companies;
        self.company_index = self.company_index();
        self.page_index = self.clamped_page_index();
    }

    /// Countdown toward the next tick; purely observational.
    pub fn remaining(&self, interval: Duration, now: Instant) -> Duration {
        interval.saturating_sub(now.duration_since(self.last_tick))
    }

    /// Snapshot everything the display needs for one frame.
    pub fn view(&self, interval: Duration, now: Instant) -> RotationView {
        let remaining = self.remaining(interval, now);
        let progress = if interval.is_zero() {
            0.0
        } else {
            remaining.as_secs_f64() / interval.as_secs_f64() * 100.0
        };

        RotationView {
            current_company: self.current_company().map(String::from),
            current_items: self.current_items().to_vec(),
            current_page: self.current_page(),
            total_pages: self.total_pages(),
            company_index: self.company_index(),
            total_companies: self.total_companies(),
            is_last_page: self.is_last_page(),
            next_company_in: remaining,
            progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderPriority, OrderStatus};
    use chrono::{TimeZone, Utc};

    fn order(id: &str, company: &str) -> Order {
        Order {
            id: id.to_string(),
            company_name: Some(company.to_string()),
            part_name: "Widget".to_string(),
            quantity_total: 10,
            quantity_completed: 0,
            priority: OrderPriority::Normal,
            status: OrderStatus::Scheduled,
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
        }
    }

    fn items_for(company: &str, count: usize) -> Vec<Order> {
        (0..count).map(|i| order(&format!("{}-{}", company, i), company)).collect()
    }

    fn rotation(companies: &[(&str, usize)], items_per_page: usize) -> Rotation {
        let mut items = HashMap::new();
        let mut keys = Vec::new();
        for (company, count) in companies {
            items.insert(company.to_string(), items_for(company, *count));
            keys.push(company.to_string());
        }
        Rotation::new(items, keys, items_per_page)
    }

    #[test]
    fn test_paging_through_one_company() {
        let mut rot = rotation(&[("A", 4)], 2);
        assert_eq!(rot.total_pages(), 2);
        assert_eq!(rot.current_page(), 1);
        let first: Vec<&str> = rot.current_items().iter().map(|o| o.id.as_str()).collect();
        assert_eq!(first, vec!["A-0", "A-1"]);

        rot.tick(Instant::now());
        assert_eq!(rot.current_page(), 2);
        let second: Vec<&str> = rot.current_items().iter().map(|o| o.id.as_str()).collect();
        assert_eq!(second, vec!["A-2", "A-3"]);
        assert!(rot.is_last_page());
    }

    #[test]
    fn test_company_wrap() {
        let mut rot = rotation(&[("A", 1), ("B", 1)], 4);
        assert_eq!(rot.current_company(), Some("A"));

        rot.tick(Instant::now());
        assert_eq!(rot.current_company(), Some("B"));
        assert_eq!(rot.current_page(), 1);

        rot.tick(Instant::now());
        assert_eq!(rot.current_company(), Some("A"));
    }

    #[test]
    fn test_last_page_advances_to_next_company() {
        let mut rot = rotation(&[("A", 4), ("B", 2)], 2);
        rot.tick(Instant::now()); // A page 2
        rot.tick(Instant::now()); // B page 1
        assert_eq!(rot.current_company(), Some("B"));
        assert_eq!(rot.current_page(), 1);
    }

    #[test]
    fn test_no_companies_is_inert() {
        let mut rot = rotation(&[], 4);
        assert_eq!(rot.current_company(), None);
        assert!(rot.current_items().is_empty());
        assert_eq!(rot.total_pages(), 1);

        rot.tick(Instant::now());
        assert_eq!(rot.current_company(), None);
        assert_eq!(rot.company_index(), 0);
    }

    #[test]
    fn test_company_with_zero_items() {
        let mut rot = rotation(&[("A", 0), ("B", 2)], 4);
        assert_eq!(rot.total_pages(), 1);
        assert!(rot.current_items().is_empty());

        // Rotates away after a single interval.
        rot.tick(Instant::now());
        assert_eq!(rot.current_company(), Some("B"));
    }

    #[test]
    fn test_items_per_page_larger_than_count() {
        let rot = rotation(&[("A", 3)], 10);
        assert_eq!(rot.total_pages(), 1);
        assert_eq!(rot.current_items().len(), 3);
    }

    #[test]
    fn test_items_per_page_clamped_to_one() {
        let rot = rotation(&[("A", 3)], 0);
        assert_eq!(rot.total_pages(), 3);
        assert_eq!(rot.current_items().len(), 1);
    }

    #[test]
    fn test_shrinking_items_clamps_page_immediately() {
        let mut rot = rotation(&[("A", 6)], 2);
        rot.tick(Instant::now());
        rot.tick(Instant::now());
        assert_eq!(rot.current_page(), 3);

        // Refetch shrinks A to a single page: page resets without a tick.
        let mut items = HashMap::new();
        items.insert("A".to_string(), items_for("A", 2));
        rot.set_data(items, vec!["A".to_string()]);

        assert_eq!(rot.current_page(), 1);
        assert_eq!(rot.current_items().len(), 2);
    }

    #[test]
    fn test_company_list_shrinkage_wraps_index() {
        let mut rot = rotation(&[("A", 1), ("B", 1), ("C", 1)], 4);
        rot.tick(Instant::now());
        rot.tick(Instant::now());
        assert_eq!(rot.current_company(), Some("C"));

        // C disappears between ticks; index 2 wraps modulo 2.
        let mut items = HashMap::new();
        items.insert("A".to_string(), items_for("A", 1));
        items.insert("B".to_string(), items_for("B", 1));
        rot.set_data(items, vec!["A".to_string(), "B".to_string()]);

        assert_eq!(rot.company_index(), 0);
        assert_eq!(rot.current_company(), Some("A"));
    }

    #[test]
    fn test_set_data_keeps_valid_position() {
        let mut rot = rotation(&[("A", 4), ("B", 4)], 2);
        rot.tick(Instant::now());
        assert_eq!(rot.current_page(), 2);

        // Same shape: position survives the refresh.
        let mut items = HashMap::new();
        items.insert("A".to_string(), items_for("A", 4));
        items.insert("B".to_string(), items_for("B", 4));
        rot.set_data(items, vec!["A".to_string(), "B".to_string()]);

        assert_eq!(rot.current_company(), Some("A"));
        assert_eq!(rot.current_page(), 2);
    }

    #[test]
    fn test_countdown_progress() {
        let mut rot = rotation(&[("A", 1)], 4);
        let start = Instant::now();
        rot.tick(start);

        let interval = Duration::from_secs(10);
        let view = rot.view(interval, start);
        assert_eq!(view.next_company_in, interval);
        assert!((view.progress - 100.0).abs() < f64::EPSILON);

        let later = start + Duration::from_secs(5);
        let view = rot.view(interval, later);
        assert_eq!(view.next_company_in, Duration::from_secs(5));
        assert!((view.progress - 50.0).abs() < 0.01);

        let past_due = start + Duration::from_secs(15);
        let view = rot.view(interval, past_due);
        assert_eq!(view.next_company_in, Duration::ZERO);
        assert_eq!(view.progress, 0.0);
    }

    #[test]
    fn test_view_snapshot_fields() {
        let rot = rotation(&[("A", 4), ("B", 1)], 2);
        let view = rot.view(Duration::from_secs(10), Instant::now());
        assert_eq!(view.current_company.as_deref(), Some("A"));
        assert_eq!(view.current_items.len(), 2);
        assert_eq!(view.current_page, 1);
        assert_eq!(view.total_pages, 2);
        assert_eq!(view.total_companies, 2);
        assert!(!view.is_last_page);
    }
}
