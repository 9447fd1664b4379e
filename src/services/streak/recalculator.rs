// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authoritative streak recompute from activity history.
//!
//! Runs only after the validator detects drift (or on explicit request).
//! The new state is derived entirely from the immutable activity log plus
//! the previous `longest_streak`, then written as a whole-record replace.
//! Two concurrent recomputes for one user therefore write the same value
//! and the last write wins harmlessly.

use crate::db::{with_timeout, ActivityLogReader, StreakStateStore};
use crate::error::StreakError;
use crate::models::StreakState;
use crate::services::streak::calculator::{current_streak, last_activity_date, longest_run};
use crate::time_utils::{lookback_start, Clock};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

/// Recomputes and persists a user's streak from bounded full history.
pub struct FullRecalculator {
    log: Arc<dyn ActivityLogReader>,
    store: Arc<dyn StreakStateStore>,
    clock: Arc<dyn Clock>,
    horizon_days: u32,
    store_timeout: Duration,
}

impl FullRecalculator {
    pub fn new(
        log: Arc<dyn ActivityLogReader>,
        store: Arc<dyn StreakStateStore>,
        clock: Arc<dyn Clock>,
        horizon_days: u32,
        store_timeout: Duration,
    ) -> Self {
        Self {
            log,
            store,
            clock,
            horizon_days,
            store_timeout,
        }
    }

    /// Recompute a user's streak, reading the previous state first.
    ///
    /// If the previous state can't be read, nothing is written: writing
    /// without it could lower `longest_streak`.
    pub async fn reconcile(&self, user_id: &str, today: NaiveDate) -> Result<StreakState, StreakError> {
        let previous = with_timeout(self.store_timeout, self.store.get(user_id))
            .await
            .map_err(StreakError::Reconciliation)?;

        self.reconcile_from(user_id, today, previous.as_ref()).await
    }

    /// Recompute a user's streak given the state the caller already read.
    pub async fn reconcile_from(
        &self,
        user_id: &str,
        today: NaiveDate,
        previous: Option<&StreakState>,
    ) -> Result<StreakState, StreakError> {
        let since = lookback_start(today, self.horizon_days);

        let dates = with_timeout(self.store_timeout, self.log.list_dates(user_id, since))
            .await
            .map_err(|e| {
                tracing::warn!(user_id, error = %e, "History fetch failed, streak left unchanged");
                StreakError::Reconciliation(e)
            })?;

        let state = recompute(user_id, &dates, today, previous, self.clock.now());

        with_timeout(self.store_timeout, self.store.upsert(&state))
            .await
            .map_err(|e| {
                tracing::warn!(user_id, error = %e, "Streak upsert failed");
                StreakError::Reconciliation(e)
            })?;

        tracing::info!(
            user_id,
            %since,
            history_days = dates.len(),
            previous_current = previous.map(|p| p.current_streak),
            current_streak = state.current_streak,
            longest_streak = state.longest_streak,
            "Streak reconciled"
        );

        Ok(state)
    }
}

/// Build the reconciled state from history. Pure.
///
/// `longest_streak` is `max(previous, current)` extended with the longest
/// run visible in `dates` (up to `today`). The extra term lets a newly
/// created row reflect runs that ended before the first read, and it never
/// lowers the result, so `longest_streak` still never decreases.
pub fn recompute(
    user_id: &str,
    dates: &BTreeSet<NaiveDate>,
    today: NaiveDate,
    previous: Option<&StreakState>,
    now: DateTime<Utc>,
) -> StreakState {
    let current = current_streak(dates, today);
    let previous_longest = previous.map(|p| p.longest_streak).unwrap_or(0);
    let history: BTreeSet<NaiveDate> = dates.range(..=today).copied().collect();

    StreakState {
        user_id: user_id.to_string(),
        current_streak: current,
        longest_streak: previous_longest.max(current).max(longest_run(&history)),
        last_activity_date: last_activity_date(dates, today),
        updated_at: now,
    }
}
