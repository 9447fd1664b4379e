// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and the injected clock.
//!
//! Calendar days are anchored on UTC: an activity at 23:30 in California is
//! counted on the following UTC date.

use chrono::{DateTime, Days, NaiveDate, SecondsFormat, Utc};
use std::sync::Mutex;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
///
/// The fixed width format sorts lexicographically in time order, which the
/// Firestore range queries on `occurred_at` rely on.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Calendar date (UTC) a timestamp falls on.
pub fn utc_day(timestamp: DateTime<Utc>) -> NaiveDate {
    timestamp.date_naive()
}

/// First day of an inclusive lookback of `days` calendar days ending at `today`.
///
/// A lookback of 14 days ending on 2024-01-14 starts on 2024-01-01.
pub fn lookback_start(today: NaiveDate, days: u32) -> NaiveDate {
    let back = u64::from(days.saturating_sub(1));
    today.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN)
}

/// Midnight UTC at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Serde adapter storing timestamps as `format_utc_rfc3339` strings.
pub mod rfc3339_utc {
    use super::format_utc_rfc3339;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_utc_rfc3339(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Source of "now". Production code uses [`SystemClock`]; tests pin time
/// with [`FixedClock`] so day boundaries are deterministic.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Current UTC calendar day.
    fn today(&self) -> NaiveDate {
        utc_day(self.now())
    }
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that returns a settable instant.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Clock pinned to noon UTC on `date`.
    pub fn at_noon(date: NaiveDate) -> Self {
        Self::new(start_of_day(date) + chrono::Duration::hours(12))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_format_uses_z_suffix() {
        let ts = DateTime::parse_from_rfc3339("2024-01-15T10:30:00+00:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_utc_rfc3339(ts), "2024-01-15T10:30:00Z");
    }

    #[test]
    fn test_utc_day_rolls_over_for_late_pacific_sessions() {
        // 23:30 PST on Jan 2 is 07:30 UTC on Jan 3.
        let ts = DateTime::parse_from_rfc3339("2024-01-02T23:30:00-08:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(utc_day(ts), date("2024-01-03"));
    }

    #[test]
    fn test_lookback_start_is_inclusive() {
        assert_eq!(lookback_start(date("2024-01-14"), 14), date("2024-01-01"));
        assert_eq!(lookback_start(date("2024-01-14"), 1), date("2024-01-14"));
        assert_eq!(lookback_start(date("2024-03-01"), 2), date("2024-02-29"));
    }

    #[test]
    fn test_fixed_clock_today() {
        let clock = FixedClock::at_noon(date("2024-01-03"));
        assert_eq!(clock.today(), date("2024-01-03"));

        clock.set(start_of_day(date("2024-01-04")));
        assert_eq!(clock.today(), date("2024-01-04"));
    }

    #[test]
    fn test_rfc3339_serde_round_trip() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Doc {
            #[serde(with = "rfc3339_utc")]
            at: DateTime<Utc>,
        }

        let json = r#"{"at":"2024-01-15T10:30:00Z"}"#;
        let doc: Doc = serde_json::from_str(json).unwrap();
        assert_eq!(serde_json::to_string(&doc).unwrap(), json);
    }
}
