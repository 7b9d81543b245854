//! Opt-in reconnect policy for the chat session.
//!
//! A disabled policy (the default) means a dropped connection stays
//! dropped until the caller opens again. When enabled, attempt `n` waits
//! `base_delay * 2^n`, capped at `max_delay`; with jitter the wait is drawn
//! uniformly from the upper half of that window.

use std::time::Duration;

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Reopen attempts allowed after a drop. Zero disables reconnecting.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

impl ReconnectPolicy {
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            max_attempts: 0,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            jitter: true,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.max_attempts > 0
    }

    /// Whether zero-based attempt `attempt` may still run.
    #[must_use]
    pub fn allows(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Capped exponential delay before attempt `attempt`, without jitter.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(attempt))
            .min(self.max_delay)
    }

    /// Delay actually slept before attempt `attempt`.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let ceiling = self.backoff(attempt);
        if !self.jitter {
            return ceiling;
        }
        let ceiling_ms = u64::try_from(ceiling.as_millis()).unwrap_or(u64::MAX);
        let floor_ms = ceiling_ms / 2;
        Duration::from_millis(rand::rng().random_range(floor_ms..=ceiling_ms))
    }
}

#[cfg(test)]
#[path = "reconnect_test.rs"]
mod tests;
