// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cached per-user streak counter.
//!
//! This is a denormalized view of the activity log so dashboards can read
//! the streak in one document fetch. The activity log stays the source of
//! truth; see `services::streak` for how drift is detected and repaired.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Streak counters for one user.
///
/// Stored at: `streak_states/{user_id}`
///
/// Only the streak engine writes this document, and always as a whole
/// document replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StreakState {
    pub user_id: String,
    /// Consecutive days with activity, ending today
    #[serde(default)]
    pub current_streak: u32,
    /// Best streak ever observed; never decreases
    #[serde(default)]
    pub longest_streak: u32,
    /// Most recent UTC date with activity
    #[serde(default)]
    pub last_activity_date: Option<NaiveDate>,
    #[serde(with = "crate::time_utils::rfc3339_utc")]
    pub updated_at: DateTime<Utc>,
}

impl StreakState {
    /// Whether the persisted counters satisfy `longest >= current`.
    pub fn is_well_formed(&self) -> bool {
        self.longest_streak >= self.current_streak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_counters_default_to_zero() {
        // Rows written before the counters existed.
        let json = r#"{"user_id":"u1","updated_at":"2024-01-03T12:00:00Z"}"#;
        let state: StreakState = serde_json::from_str(json).unwrap();

        assert_eq!(state.current_streak, 0);
        assert_eq!(state.longest_streak, 0);
        assert_eq!(state.last_activity_date, None);
        assert!(state.is_well_formed());
    }

    #[test]
    fn test_last_activity_date_serializes_as_iso_date() {
        let state = StreakState {
            user_id: "u1".to_string(),
            current_streak: 3,
            longest_streak: 5,
            last_activity_date: NaiveDate::from_ymd_opt(2024, 1, 3),
            updated_at: DateTime::from_timestamp(1_704_283_200, 0).unwrap(),
        };

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["last_activity_date"], "2024-01-03");
        assert_eq!(value["updated_at"], "2024-01-03T12:00:00Z");
    }
}
