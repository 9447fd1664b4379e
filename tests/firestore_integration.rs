// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running and
//! FIRESTORE_EMULATOR_HOST to point at it. Without it they are skipped.

use std::sync::Arc;
use streak_tracker::db::{ActivityLogReader, ActivityLogWriter, FirestoreDb, StreakStateStore};
use streak_tracker::services::StreakEngine;
use streak_tracker::time_utils::FixedClock;

mod common;
use common::{activity, date, log_days, parse_time, test_db};

/// Generate a unique user ID for test isolation.
fn unique_user_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("test-user-{}", nanos)
}

// ═══════════════════════════════════════════════════════════════════════════
// ACTIVITY LOG TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_list_dates_collapses_sessions_per_day() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();

    // Two sessions on the same UTC day plus one just before midnight
    db.append(&activity(&user_id, "a1", "2024-01-02")).await.unwrap();
    let mut evening = activity(&user_id, "a2", "2024-01-02");
    evening.occurred_at = parse_time("2024-01-02T23:59:59Z");
    db.append(&evening).await.unwrap();
    let mut after_midnight = activity(&user_id, "a3", "2024-01-03");
    after_midnight.occurred_at = parse_time("2024-01-03T00:00:00Z");
    db.append(&after_midnight).await.unwrap();

    let dates = db.list_dates(&user_id, date("2024-01-01")).await.unwrap();
    let dates: Vec<_> = dates.into_iter().collect();
    assert_eq!(dates, vec![date("2024-01-02"), date("2024-01-03")]);
}

#[tokio::test]
async fn test_list_dates_respects_lower_bound() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();
    log_days(&db, &user_id, &["2023-12-30", "2023-12-31", "2024-01-01"]).await;

    let dates = db.list_dates(&user_id, date("2023-12-31")).await.unwrap();
    assert_eq!(dates.len(), 2);
    assert!(!dates.contains(&date("2023-12-30")));
}

#[tokio::test]
async fn test_append_is_idempotent_and_isolated_per_user() {
    require_emulator!();

    let db = test_db().await;
    let user_a = unique_user_id();
    let user_b = unique_user_id();

    let record = activity(&user_a, "shared-id", "2024-01-02");
    db.append(&record).await.unwrap();
    db.append(&record).await.unwrap();
    db.append(&activity(&user_b, "shared-id", "2024-01-03"))
        .await
        .unwrap();

    let a_dates = db.list_dates(&user_a, date("2024-01-01")).await.unwrap();
    let b_dates = db.list_dates(&user_b, date("2024-01-01")).await.unwrap();
    assert_eq!(a_dates.into_iter().collect::<Vec<_>>(), vec![date("2024-01-02")]);
    assert_eq!(b_dates.into_iter().collect::<Vec<_>>(), vec![date("2024-01-03")]);
}

#[tokio::test]
async fn test_reappend_keeps_first_write() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();

    db.append(&activity(&user_id, "a1", "2024-01-02")).await.unwrap();

    // Same activity ID resubmitted with a different time.
    let rewritten = activity(&user_id, "a1", "2024-01-03");
    db.append(&rewritten).await.unwrap();

    let dates = db.list_dates(&user_id, date("2024-01-01")).await.unwrap();
    assert_eq!(dates.into_iter().collect::<Vec<_>>(), vec![date("2024-01-02")]);
}

// ═══════════════════════════════════════════════════════════════════════════
// STREAK STATE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_streak_state_upsert_replaces_record() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_user_id();

    assert!(db.get(&user_id).await.unwrap().is_none());

    let mut state = common::cached_state(&user_id, 3, 5);
    state.last_activity_date = Some(date("2024-01-02"));
    db.upsert(&state).await.unwrap();

    let fetched = db.get(&user_id).await.unwrap().unwrap();
    assert_eq!(fetched, state);

    let mut replacement = common::cached_state(&user_id, 0, 5);
    replacement.updated_at = parse_time("2024-01-05T08:00:00Z");
    db.upsert(&replacement).await.unwrap();

    let fetched = db.get(&user_id).await.unwrap().unwrap();
    assert_eq!(fetched, replacement);
    assert_eq!(fetched.last_activity_date, None);
}

#[tokio::test]
async fn test_engine_reconciles_against_firestore() {
    require_emulator!();

    let db = Arc::new(test_db().await);
    let user_id = unique_user_id();
    log_days(&*db, &user_id, &["2024-01-01", "2024-01-02", "2024-01-03"]).await;

    let config = streak_tracker::config::Config::test_default();
    let clock = Arc::new(FixedClock::at_noon(date(common::TODAY)));
    let engine = StreakEngine::new(db.clone(), db.clone(), clock, &config.streak);

    let read = engine.read(&user_id, date(common::TODAY)).await.unwrap();
    assert_eq!(read.state.current_streak, 3);
    assert_eq!(read.state.longest_streak, 3);

    let stored = db.get(&user_id).await.unwrap().unwrap();
    assert_eq!(stored.current_streak, 3);
    assert_eq!(stored.last_activity_date, Some(date(common::TODAY)));
}

// ═══════════════════════════════════════════════════════════════════════════
// OFFLINE MODE
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_mock_db_reports_offline() {
    use streak_tracker::error::StoreError;

    let db = FirestoreDb::new_mock();

    assert_eq!(db.get("u1").await, Err(StoreError::Offline));
    assert_eq!(
        db.append(&activity("u1", "a1", "2024-01-01")).await,
        Err(StoreError::Offline)
    );
}
