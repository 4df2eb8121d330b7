//! Retry policy for the primary-key synthesis fallback path.
//!
//! When the relational store lacks `RETURNING` support, primary-key
//! synthesis falls back to read-max, insert, retry-on-unique-violation.
//! That loop needs bounded backoff so a contended table doesn't spin.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 4, base_delay: Duration::from_millis(20), max_delay: Duration::from_millis(500) }
    }
}

impl RetryConfig {
    /// Exponential backoff delay before attempt number `attempt` (0-indexed),
    /// capped at `max_delay`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let scaled = self.base_delay.saturating_mul(1 << attempt.min(16));
        scaled.min(self.max_delay)
    }
}

/// Whether `e` is a unique-constraint violation (SQLite's
/// `"UNIQUE constraint failed"` message), as opposed to a genuine
/// connectivity or syntax error that retrying cannot fix.
#[must_use]
pub fn is_unique_violation(e: &libsql::Error) -> bool {
    e.to_string().contains("UNIQUE constraint failed")
}
