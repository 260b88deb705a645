//! Wall-clock timestamps.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const USECS_PER_SEC: u32 = 1_000_000;

/// A wall-clock instant with microsecond resolution.
///
/// Ordering is by seconds, then microseconds. The textual form is
/// `<secs>.<usecs>` with the fraction always rendered as six digits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp {
    secs: u64,
    usecs: u32,
}

impl Timestamp {
    /// Creates a timestamp, carrying whole seconds out of `usecs`.
    pub fn new(secs: u64, usecs: u32) -> Self {
        Self {
            secs: secs.saturating_add(u64::from(usecs / USECS_PER_SEC)),
            usecs: usecs % USECS_PER_SEC,
        }
    }

    /// Returns the current time.
    pub fn now() -> Self {
        Self::from_datetime(&Utc::now()).unwrap_or_default()
    }

    /// Converts a UTC date-time. Instants before the epoch are rejected.
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Option<Self> {
        let secs = u64::try_from(dt.timestamp()).ok()?;
        Some(Self::new(secs, dt.timestamp_subsec_micros()))
    }

    /// Converts to a UTC date-time.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.secs).ok()?;
        Utc.timestamp_opt(secs, self.usecs * 1_000).single()
    }

    /// Seconds since the epoch.
    #[inline]
    pub fn secs(&self) -> u64 {
        self.secs
    }

    /// Sub-second part in microseconds.
    #[inline]
    pub fn usecs(&self) -> u32 {
        self.usecs
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.secs, self.usecs)
    }
}
