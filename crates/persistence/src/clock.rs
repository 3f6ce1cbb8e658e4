//! Time source for audit stamps.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

/// Source of audit timestamps.
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock truncated to microseconds and forced strictly increasing.
///
/// Microseconds match the precision of PostgreSQL `timestamptz`, so a stamp
/// reads back exactly as it was written. Two calls never return the same
/// instant, even when the wall clock stalls or steps backwards.
#[derive(Debug, Default)]
pub struct SystemClock {
    last_micros: AtomicI64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let wall = Utc::now().timestamp_micros();
        let previous = self
            .last_micros
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(wall.max(last + 1))
            })
            .unwrap_or(wall);
        let issued = wall.max(previous + 1);
        DateTime::from_timestamp_micros(issued).unwrap_or_else(Utc::now)
    }
}
