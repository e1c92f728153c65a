//! Time source abstraction.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeZone, Utc};

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current unix time in seconds
    fn timestamp(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock with one-second resolution, for tests and replay
pub struct FixedClock {
    seconds: AtomicI64,
}

impl FixedClock {
    /// Clock frozen at the given unix timestamp
    pub fn at(timestamp: i64) -> Self {
        Self {
            seconds: AtomicI64::new(timestamp),
        }
    }

    pub fn set(&self, timestamp: i64) {
        self.seconds.store(timestamp, Ordering::SeqCst);
    }

    /// Move the clock by `seconds` (negative moves it back)
    pub fn advance(&self, seconds: i64) {
        self.seconds.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.timestamp(), 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    fn timestamp(&self) -> i64 {
        self.seconds.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for FixedClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedClock")
            .field("seconds", &self.timestamp())
            .finish()
    }
}
