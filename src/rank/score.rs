//! Priority score calculation for a single order.
//!
//! Orders are weighted by:
//! - Base tier: hold status or critical priority (+1000), else high (+500)
//! - Urgency marker: part name contains "URGENTE" (+100)
//! - Overdue: created before today's local midnight (+800 boosted, else +50)

use chrono::{DateTime, Local, NaiveTime, TimeZone};

use crate::domain::{Order, OrderPriority, OrderStatus};

/// Points for an on-hold or critical order.
/// The base tier is exclusive: an order never collects both this and
/// [`TIER_HIGH`].
pub const TIER_HOLD_OR_CRITICAL: i64 = 1000;
/// Points for a high-priority order outside the top tier.
pub const TIER_HIGH: i64 = 500;
/// Points for the "URGENTE" marker in the part name.
pub const URGENT_BONUS: i64 = 100;
/// Points for an overdue order when old orders are prioritized.
pub const OVERDUE_BOOSTED: i64 = 800;
/// Points for an overdue order otherwise.
pub const OVERDUE_BASE: i64 = 50;

/// Marker substring scanned for case-insensitively in part names.
pub const URGENT_MARKER: &str = "URGENTE";

/// Flags influencing scoring and tie-breaking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortOptions {
    /// Raise the overdue bonus from +50 to +800 so old orders jump tiers.
    pub prioritize_old_orders: bool,
    /// Break score ties by ascending part-name length (shorter first).
    pub group_by_size: bool,
}

/// Millisecond timestamp of local midnight for the day containing `now`.
///
/// Overdue classification uses wall-clock local time at evaluation time;
/// TV units in a different time zone than the backend will classify the
/// same order differently.
pub fn local_day_start_ms(now: DateTime<Local>) -> i64 {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&midnight) {
        chrono::LocalResult::Single(dt) => dt.timestamp_millis(),
        // DST gap/fold at midnight: take the earliest valid interpretation.
        chrono::LocalResult::Ambiguous(earliest, _) => earliest.timestamp_millis(),
        chrono::LocalResult::None => now.timestamp_millis(),
    }
}

/// Calculate the display-priority score for one order.
///
/// `day_start_ms` is the millisecond timestamp of local midnight; orders
/// created strictly before it count as overdue. Higher score = shown first.
/// Pure and infallible for well-formed orders.
pub fn score(order: &Order, day_start_ms: i64, options: SortOptions) -> i64 {
    let mut points = 0;

    // Base tier: highest applicable only, never stacked.
    if order.status == OrderStatus::Hold || order.priority == OrderPriority::Critical {
        points += TIER_HOLD_OR_CRITICAL;
    } else if order.priority == OrderPriority::High {
        points += TIER_HIGH;
    }

    if order.part_name.to_uppercase().contains(URGENT_MARKER) {
        points += URGENT_BONUS;
    }

    if order.created_at.timestamp_millis() < day_start_ms {
        points += if options.prioritize_old_orders {
            OVERDUE_BOOSTED
        } else {
            OVERDUE_BASE
        };
    }

    points
}
