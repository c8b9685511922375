// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::time::{Duration, Instant};

/// Simple timeout utility for the log polling loops.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use subtec_l2_harness::Deadline;
///
/// let deadline = Deadline::new(Duration::from_secs(10));
///
/// loop {
///     if deadline.is_expired() {
///         panic!("Timeout: operation did not complete");
///     }
///     // ... do work ...
/// #   break; // For doctest
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Instant,
}

impl Deadline {
    /// Creates a new deadline that expires after the given duration.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            expires_at: Instant::now() + timeout,
        }
    }

    /// Returns `true` if the deadline has expired.
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use subtec_l2_harness::Deadline;
    ///
    /// let deadline = Deadline::new(Duration::from_millis(1));
    /// std::thread::sleep(Duration::from_millis(2));
    /// assert!(deadline.is_expired());
    /// ```
    #[must_use]
    pub fn is_expired(&self) -> bool { Instant::now() >= self.expires_at }

    #[must_use]
    pub fn has_time_remaining(&self) -> bool { !self.is_expired() }

    /// Time left before expiry, saturating at zero.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

/// Floor for [`PollPolicy::interval`], so a zero interval does not re-read the log in a
/// tight loop.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long a polling wait may take, and how often it re-reads the log.
///
/// The log is always checked at least once, even with a zero `timeout`. Between checks
/// the poller sleeps for `interval` (never less than [`MIN_POLL_INTERVAL`]), clipped to
/// whatever is left of the `timeout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl PollPolicy {
    #[must_use]
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    #[must_use]
    pub fn from_secs(timeout_secs: u64, interval_secs: u64) -> Self {
        Self::new(
            Duration::from_secs(timeout_secs),
            Duration::from_secs(interval_secs),
        )
    }

    /// Check once, never wait. Used for logs that are already a stable snapshot.
    #[must_use]
    pub fn once() -> Self { Self::new(Duration::ZERO, Duration::ZERO) }

    /// Run `check` until it returns `Ok`, or the timeout elapses. Returns the last
    /// result seen, so a failure carries the diagnostic from the final attempt.
    pub async fn poll<T, E>(&self, mut check: impl FnMut() -> Result<T, E>) -> Result<T, E> {
        let deadline = Deadline::new(self.timeout);
        loop {
            let result = check();
            if result.is_ok() || deadline.is_expired() {
                return result;
            }
            let nap = self.interval.max(MIN_POLL_INTERVAL).min(deadline.remaining());
            tracing::trace!(message = "poll: not yet, sleeping", nap = ?nap);
            tokio::time::sleep(nap).await;
        }
    }
}
