//! Weighted sorting of order collections.

use std::cmp::Ordering;

use chrono::Local;

use crate::domain::Order;
use crate::rank::score::{SortOptions, local_day_start_ms, score};

/// Sort orders for display, highest score first.
///
/// Returns a new collection; the input is never mutated. Overdue scoring
/// uses "now" truncated to local midnight as the reference.
pub fn weighted_sort(orders: &[Order], options: SortOptions) -> Vec<Order> {
    weighted_sort_at(orders, local_day_start_ms(Local::now()), options)
}

/// [`weighted_sort`] with an explicit reference midnight, for deterministic
/// evaluation.
///
/// Ordering: descending score; on ties, ascending part-name length when
/// `group_by_size` is set; then ascending `created_at` (FIFO). The sort is
/// stable for any remaining ties. Scores are computed once per order, not
/// per comparison.
pub fn weighted_sort_at(orders: &[Order], day_start_ms: i64, options: SortOptions) -> Vec<Order> {
    let mut scored: Vec<(i64, &Order)> = orders
        .iter()
        .map(|order| (score(order, day_start_ms, options), order))
        .collect();

    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .cmp(score_a)
            .then_with(|| {
                if options.group_by_size {
                    a.part_name.len().cmp(&b.part_name.len())
                } else {
                    Ordering::Equal
                }
            })
            .then_with(|| a.created_at.cmp(&b.created_at))
    });

    scored.into_iter().map(|(_, order)| order.clone()).collect()
}
