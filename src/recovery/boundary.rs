//! Fault boundary with bounded automatic recovery.
//!
//! Isolates a failing subsystem and retries it with exponential backoff
//! (`base * 2^attempt`), giving up after a fixed attempt cap. Past the cap
//! only an explicit reset brings the subsystem back.

use std::time::{Duration, Instant};

/// Default cap on automatic retry attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default base delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(2);

/// Where the boundary currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryState {
    /// Subsystem running normally.
    Healthy,
    /// A fault was caught; a retry is scheduled.
    Failed { attempt: u32 },
    /// Attempt cap exhausted; waiting for an explicit reset.
    Exhausted,
}

/// Component-local recovery state machine.
#[derive(Debug)]
pub struct FaultBoundary {
    state: BoundaryState,
    next_retry_at: Option<Instant>,
    base_delay: Duration,
    max_attempts: u32,
}

impl Default for FaultBoundary {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS)
    }
}

impl FaultBoundary {
    pub fn new(base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            state: BoundaryState::Healthy,
            next_retry_at: None,
            base_delay,
            max_attempts,
        }
    }

    pub fn state(&self) -> BoundaryState {
        self.state
    }

    pub fn is_healthy(&self) -> bool {
        self.state == BoundaryState::Healthy
    }

    /// Delay before retry number `attempt` (0-based): `base * 2^attempt`.
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.pow(attempt)
    }

    /// Record a caught fault.
    ///
    /// Healthy moves to Failed with the first retry scheduled; repeated
    /// faults climb the backoff ladder until the cap exhausts the
    /// boundary.
    pub fn record_fault(&mut self, now: Instant) {
        let attempt = match self.state {
            BoundaryState::Healthy => 0,
            BoundaryState::Failed { attempt } => attempt + 1,
            BoundaryState::Exhausted => return,
        };

        if attempt >= self.max_attempts {
            tracing::warn!(max_attempts = self.max_attempts, "fault boundary exhausted");
            self.state = BoundaryState::Exhausted;
            self.next_retry_at = None;
            return;
        }

        let delay = self.retry_delay(attempt);
        tracing::warn!(attempt, delay_secs = delay.as_secs(), "fault caught, retry scheduled");
        self.state = BoundaryState::Failed { attempt };
        self.next_retry_at = Some(now + delay);
    }

    /// Whether the scheduled retry may run yet.
    pub fn retry_due(&self, now: Instant) -> bool {
        matches!(self.state, BoundaryState::Failed { .. })
            && self.next_retry_at.is_some_and(|at| now >= at)
    }

    /// Record a successful retry.
    pub fn record_success(&mut self) {
        self.state = BoundaryState::Healthy;
        self.next_retry_at = None;
    }

    /// Explicit reset; the only way out of Exhausted.
    pub fn reset(&mut self) {
        self.state = BoundaryState::Healthy;
        self.next_retry_at = None;
    }
}
