//! Wall-clock sampling and day keys.
//!
//! All state transitions take an explicit `DateTime<FixedOffset>`: the instant
//! plus the UTC offset in force when it was sampled. The day key is the
//! calendar date in that offset, so a device time-zone change mid-day moves
//! the day boundary with it.

use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Which calendar the daily override lock follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayBoundary {
    /// Local wall-clock date (device time zone).
    #[default]
    Local,
    /// UTC date.
    Utc,
}

/// Calendar-date key (`YYYY-MM-DD`) for an instant observed at `offset`.
pub fn day_key(at: DateTime<Utc>, offset: FixedOffset) -> String {
    offset
        .from_utc_datetime(&at.naive_utc())
        .format("%Y-%m-%d")
        .to_string()
}

/// Day key of an already-offset instant.
pub fn day_key_of(now: &DateTime<FixedOffset>) -> String {
    now.format("%Y-%m-%d").to_string()
}

/// Source of "now" for the shell.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// The real clock, sampled in the configured calendar.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    boundary: DayBoundary,
}

impl SystemClock {
    pub fn new(boundary: DayBoundary) -> Self {
        Self { boundary }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        match self.boundary {
            DayBoundary::Local => Local::now().fixed_offset(),
            DayBoundary::Utc => Utc::now().fixed_offset(),
        }
    }
}

/// A clock pinned to a starting instant that advances with tokio's clock.
/// Under `tokio::time::pause()` it moves only when the runtime's time does.
#[derive(Debug, Clone)]
pub struct AnchoredClock {
    anchor: DateTime<FixedOffset>,
    started: tokio::time::Instant,
}

impl AnchoredClock {
    pub fn new(anchor: DateTime<FixedOffset>) -> Self {
        Self {
            anchor,
            started: tokio::time::Instant::now(),
        }
    }
}

impl Clock for AnchoredClock {
    fn now(&self) -> DateTime<FixedOffset> {
        let elapsed = self.started.elapsed();
        let elapsed = chrono::Duration::from_std(elapsed).unwrap_or_else(|_| chrono::Duration::zero());
        self.anchor + elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_key_follows_offset() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 23, 30, 0).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();

        assert_eq!(day_key(at, utc), "2026-03-01");
        assert_eq!(day_key(at, plus_two), "2026-03-02");
        assert_eq!(day_key(at, minus_five), "2026-03-01");
    }

    #[test]
    fn test_day_key_of_matches_day_key() {
        let offset = FixedOffset::east_opt(9 * 3600).unwrap();
        let now = offset.with_ymd_and_hms(2026, 7, 4, 0, 15, 0).unwrap();
        assert_eq!(day_key_of(&now), "2026-07-04");
        assert_eq!(day_key(now.with_timezone(&Utc), offset), "2026-07-04");
    }

    #[tokio::test(start_paused = true)]
    async fn test_anchored_clock_tracks_tokio_time() {
        let anchor = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 1, 1, 12, 0, 0)
            .unwrap();
        let clock = AnchoredClock::new(anchor);
        tokio::time::advance(std::time::Duration::from_secs(90)).await;
        assert_eq!(clock.now() - anchor, chrono::Duration::seconds(90));
    }
}
