//! Subscription lifecycle state for the realtime channel.
//!
//! The channel either works (`SUBSCRIBED` resets everything) or it fails in
//! one of a few ways; after enough consecutive failures the session stops
//! resubscribing for good and the dashboard rides on the polling backstop.

/// Consecutive abnormal closures tolerated before resubscription is
/// disabled for the rest of the session.
pub const MAX_REALTIME_RETRIES: u32 = 5;

/// Lifecycle status reported by the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    /// Channel established successfully.
    Subscribed,
    /// Channel-level failure.
    ChannelError,
    /// Subscription attempt timed out.
    TimedOut,
    /// Channel closed; abnormal unless caused by our own teardown.
    Closed,
}

/// Retry bookkeeping, one per mounted dashboard session.
#[derive(Debug, Default)]
pub struct SubscriptionState {
    retry_count: u32,
    disabled: bool,
}

impl SubscriptionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Permanently latched once the retry cap is hit.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Whether another subscription attempt is allowed.
    pub fn should_resubscribe(&self) -> bool {
        !self.disabled
    }

    /// Apply one lifecycle status.
    ///
    /// `tearing_down` marks a closure caused by our own intentional
    /// teardown; such a `Closed` is ignored rather than counted as a
    /// failure.
    pub fn on_status(&mut self, status: ChannelStatus, tearing_down: bool) {
        match status {
            ChannelStatus::Subscribed => {
                if self.retry_count > 0 || self.disabled {
                    tracing::info!(retries = self.retry_count, "realtime channel recovered");
                }
                self.retry_count = 0;
                self.disabled = false;
            }
            ChannelStatus::ChannelError | ChannelStatus::TimedOut => {
                self.record_failure(status);
            }
            ChannelStatus::Closed => {
                if tearing_down {
                    tracing::debug!("ignoring CLOSED from own teardown");
                } else {
                    self.record_failure(status);
                }
            }
        }
    }

    fn record_failure(&mut self, status: ChannelStatus) {
        self.retry_count += 1;
        tracing::warn!(
            status = ?status,
            retry_count = self.retry_count,
            "realtime channel closed abnormally"
        );
        if self.retry_count >= MAX_REALTIME_RETRIES {
            self.disabled = true;
            tracing::warn!(
                max_retries = MAX_REALTIME_RETRIES,
                "realtime disabled for this session, falling back to polling"
            );
        }
    }
}
