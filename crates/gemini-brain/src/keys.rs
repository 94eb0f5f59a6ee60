//! API key routing and retry policy.
//!
//! Rate limiting for the fast backend is owned by the deployment, not
//! this crate. [`GeminiBrain`](crate::GeminiBrain) consumes the
//! [`KeyRouter`] contract: which key to present on each attempt, how
//! many attempts one request gets, and how long to wait after a
//! throttled or failed call.

use std::time::Duration;

/// Supplies API keys and retry policy for the fast backend.
///
/// Implementations must guarantee a bounded attempt count, exponential
/// or server-directed backoff, and a secondary-key substitution path
/// when the primary key is throttled.
pub trait KeyRouter: Send + Sync {
    /// Key to present on the given attempt (0-based).
    fn key_for_attempt(&self, attempt: u32) -> &str;

    /// Attempts allowed for one request.
    fn max_attempts(&self) -> u32;

    /// Delay before the next attempt.
    ///
    /// `retry_after` carries the server's Retry-After value when the
    /// response supplied one; implementations should prefer it.
    fn backoff(&self, attempt: u32, retry_after: Option<Duration>) -> Duration;
}

/// Longest delay a [`StaticKeyRouter`] will wait between attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(8);

/// A fixed primary key with an optional secondary fallback.
///
/// Attempt 0 uses the primary key; every later attempt uses the
/// secondary when one is configured. Backoff doubles per attempt from a
/// base delay unless the server named its own delay.
#[derive(Debug, Clone)]
pub struct StaticKeyRouter {
    primary: String,
    secondary: Option<String>,
    max_attempts: u32,
    base_delay: Duration,
}

impl StaticKeyRouter {
    /// Create a router over the given keys.
    pub fn new(
        primary: impl Into<String>,
        secondary: Option<String>,
        max_attempts: u32,
        base_delay: Duration,
    ) -> Self {
        Self {
            primary: primary.into(),
            secondary,
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }
}

impl KeyRouter for StaticKeyRouter {
    fn key_for_attempt(&self, attempt: u32) -> &str {
        if attempt == 0 {
            return &self.primary;
        }
        self.secondary.as_deref().unwrap_or(&self.primary)
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn backoff(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        if let Some(server_delay) = retry_after {
            return server_delay.min(MAX_BACKOFF);
        }
        let doubled = self
            .base_delay
            .saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX));
        doubled.min(MAX_BACKOFF)
    }
}
