//! # Temporal Types — UTC Timestamps and the Ledger Clock
//!
//! Defines [`Timestamp`], a UTC-only timestamp truncated to seconds, and the
//! [`Clock`] seam through which the escrow ledger learns the current time.
//!
//! Deadlines are evaluated lazily: nothing in the workspace schedules work
//! against a timestamp. An operation asks its clock for "now" once and
//! compares.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Timelike, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// Serializes as RFC 3339 with a `Z` suffix (e.g. `2026-01-15T12:00:00Z`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// Create a timestamp from a `DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 string, accepting any offset and converting to UTC.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let dt = DateTime::parse_from_rfc3339(s.trim()).map_err(|e| {
            ValidationError::InvalidTimestamp {
                value: s.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self::from_utc(dt.with_timezone(&Utc)))
    }

    /// Create a timestamp from Unix epoch seconds.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, ValidationError> {
        DateTime::from_timestamp(secs, 0)
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidTimestamp {
                value: secs.to_string(),
                reason: "outside the representable range".to_string(),
            })
    }

    /// Unix epoch seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Shift by a signed number of seconds. `None` if the result leaves the
    /// representable range.
    pub fn checked_add_secs(&self, secs: i64) -> Option<Timestamp> {
        TimeDelta::try_seconds(secs)
            .and_then(|delta| self.0.checked_add_signed(delta))
            .map(Self)
    }

    /// Render as ISO 8601 with Z suffix.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_utc(dt)
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of the caller-visible current time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// The current time.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
///
/// Cloning shares the underlying instant, so a test can hand one clone to a
/// ledger and keep another to advance time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    /// Start the clock at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Jump to an absolute instant.
    pub fn set(&self, to: Timestamp) {
        *self.now.lock() = to;
    }

    /// Move forward (or backward, for negative `secs`). Saturates at the
    /// current value if the shift would leave the representable range.
    pub fn advance(&self, secs: i64) {
        let mut now = self.now.lock();
        if let Some(next) = now.checked_add_secs(secs) {
            *now = next;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    #[test]
    fn now_has_no_subseconds() {
        assert_eq!(Timestamp::now().as_datetime().nanosecond(), 0);
    }

    #[test]
    fn from_utc_truncates() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 15, 12, 30, 45).unwrap();
        let ts = Timestamp::from_utc(dt.with_nanosecond(999_999_999).unwrap());
        assert_eq!(ts.to_iso8601(), "2026-01-15T12:30:45Z");
    }

    #[test]
    fn parse_converts_offsets_to_utc() {
        assert_eq!(ts("2026-01-15T17:00:00+05:00").to_iso8601(), "2026-01-15T12:00:00Z");
        assert_eq!(ts("2026-01-15T12:00:00.75Z").to_iso8601(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Timestamp::parse("tomorrow").is_err());
        assert!(Timestamp::parse("2026-01-15").is_err());
    }

    #[test]
    fn epoch_roundtrip() {
        let t = ts("2026-01-15T12:00:00Z");
        assert_eq!(Timestamp::from_epoch_secs(t.epoch_secs()).unwrap(), t);
        assert!(Timestamp::from_epoch_secs(i64::MAX).is_err());
    }

    #[test]
    fn checked_add_secs_moves_both_ways() {
        let t = ts("2026-01-15T12:00:00Z");
        assert_eq!(t.checked_add_secs(3600).unwrap(), ts("2026-01-15T13:00:00Z"));
        assert_eq!(t.checked_add_secs(-3600).unwrap(), ts("2026-01-15T11:00:00Z"));
        assert!(t.checked_add_secs(i64::MAX).is_none());
    }

    #[test]
    fn ordering_follows_time() {
        assert!(ts("2026-01-15T12:00:00Z") < ts("2026-01-15T12:00:01Z"));
    }

    #[test]
    fn serde_uses_rfc3339() {
        let t = ts("2026-01-15T12:00:00Z");
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("2026-01-15T12:00:00"));
        assert_eq!(serde_json::from_str::<Timestamp>(&json).unwrap(), t);
    }

    #[test]
    fn manual_clock_is_shared_between_clones() {
        let clock = ManualClock::new(ts("2026-01-15T12:00:00Z"));
        let handle = clock.clone();
        handle.advance(60);
        assert_eq!(clock.now(), ts("2026-01-15T12:01:00Z"));
        handle.set(ts("2030-01-01T00:00:00Z"));
        assert_eq!(clock.now(), ts("2030-01-01T00:00:00Z"));
    }

    #[test]
    fn manual_clock_ignores_out_of_range_advance() {
        let clock = ManualClock::new(ts("2026-01-15T12:00:00Z"));
        clock.advance(i64::MAX);
        assert_eq!(clock.now(), ts("2026-01-15T12:00:00Z"));
    }

    #[test]
    fn system_clock_tracks_wall_time() {
        let before = Timestamp::now();
        let observed = SystemClock.now();
        assert!(observed >= before);
    }
}
