//! Timestamp type used throughout the workspace.
//!
//! Timestamps are Unix epoch seconds (UTC), matching the representation the
//! ledger emits in its events.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Get the current system time as a `Timestamp`.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before Unix epoch")
            .as_secs();
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Seconds elapsed since this timestamp (relative to `now`).
    ///
    /// Saturates to zero if this timestamp lies in the future.
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }

    /// Seconds by which this timestamp lies ahead of `now` (zero if not).
    pub fn ahead_of(&self, now: Timestamp) -> u64 {
        self.0.saturating_sub(now.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_saturates() {
        let early = Timestamp::new(100);
        let late = Timestamp::new(250);
        assert_eq!(early.elapsed_since(late), 150);
        assert_eq!(late.elapsed_since(early), 0);
    }

    #[test]
    fn ahead_of_saturates() {
        let early = Timestamp::new(100);
        let late = Timestamp::new(250);
        assert_eq!(late.ahead_of(early), 150);
        assert_eq!(early.ahead_of(late), 0);
    }
}
