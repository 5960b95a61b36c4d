//! Realtime change-feed subscription with bounded reconnection.
//!
//! [`channel`] holds the retry/disable bookkeeping; [`sync`] runs the
//! server-sent-events subscription task and turns change notifications into
//! cache invalidations.

pub mod channel;
pub mod sync;

pub use channel::{ChannelStatus, MAX_REALTIME_RETRIES, SubscriptionState};
pub use sync::{ChangeNotification, RealtimeSync};
