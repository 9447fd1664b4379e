// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use streak_tracker::config::Config;
use streak_tracker::db::{ActivityLogWriter, FirestoreDb, MemoryStore};
use streak_tracker::models::{ActivityRecord, StreakState};
use streak_tracker::routes::create_router;
use streak_tracker::time_utils::FixedClock;
use streak_tracker::AppState;

/// Reference "today" used across tests.
#[allow(dead_code)]
pub const TODAY: &str = "2024-01-03";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

#[allow(dead_code)]
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

#[allow(dead_code)]
pub fn parse_time(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid RFC3339")
        .with_timezone(&Utc)
}

/// Activity record at 09:00 UTC on `day`.
#[allow(dead_code)]
pub fn activity(user_id: &str, activity_id: &str, day: &str) -> ActivityRecord {
    ActivityRecord {
        activity_id: activity_id.to_string(),
        user_id: user_id.to_string(),
        sport_type: "Run".to_string(),
        occurred_at: parse_time(&format!("{}T09:00:00Z", day)),
    }
}

/// Append one activity per listed day. Relogging a day is a no-op.
#[allow(dead_code)]
pub async fn log_days(log: &dyn ActivityLogWriter, user_id: &str, days: &[&str]) {
    for day in days {
        log.append(&activity(user_id, &format!("{}-{}", user_id, day), day))
            .await
            .expect("append activity");
    }
}

#[allow(dead_code)]
pub fn cached_state(user_id: &str, current: u32, longest: u32) -> StreakState {
    StreakState {
        user_id: user_id.to_string(),
        current_streak: current,
        longest_streak: longest,
        last_activity_date: None,
        updated_at: parse_time("2024-01-01T00:00:00Z"),
    }
}

/// Test app over an in-memory store with the clock at noon on [`TODAY`].
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<FixedClock>,
}

#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::at_noon(date(TODAY)));
    let state = Arc::new(AppState::with_backend(
        Config::test_default(),
        store.clone(),
        clock.clone(),
    ));

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
        clock,
    }
}

/// Create a test JWT token.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    streak_tracker::middleware::auth::create_jwt(user_id, signing_key)
        .expect("Failed to create JWT")
}
