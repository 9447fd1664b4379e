// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Read path: serve the cached streak after a cheap drift check.
//!
//! Every read costs one state fetch plus one fetch of the recent window,
//! issued concurrently.
//! The window can only measure runs up to its own length; when the run
//! fills the window, a longer cached value is checked against its last
//! activity date instead.

use crate::db::{with_timeout, ActivityLogReader, StreakStateStore};
use crate::error::StreakError;
use crate::models::StreakState;
use crate::services::streak::calculator::current_streak;
use crate::services::streak::recalculator::FullRecalculator;
use crate::time_utils::lookback_start;
use chrono::NaiveDate;
use futures_util::future::join;
use std::sync::Arc;
use std::time::Duration;

/// How a read was satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Cached state was consistent and served without a write.
    Validated,
    /// Drift (or a missing row) was repaired by a full recompute.
    Reconciled,
    /// The previously cached state was served because a fetch or
    /// recompute failed. It may be stale.
    Degraded(StreakError),
}

/// A streak read result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakRead {
    pub state: StreakState,
    pub outcome: ReadOutcome,
}

/// Why a read needs a full recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drift {
    /// No cached row yet.
    Missing,
    /// Cached and windowed values differ by more than the tolerance.
    Exceeded { cached: u32, windowed: u32 },
}

/// Compare a cached counter against the windowed recompute.
///
/// A cached value within `tolerance` of the windowed value is always
/// consistent. A run that fills the window may extend past it, so a cached
/// value longer than the window is also accepted when it was computed at
/// most `tolerance` days ago.
pub fn detect_drift(
    cached: Option<&StreakState>,
    windowed: u32,
    today: NaiveDate,
    window_days: u32,
    tolerance: u32,
) -> Option<Drift> {
    let Some(cached) = cached else {
        return Some(Drift::Missing);
    };

    if cached.current_streak.abs_diff(windowed) <= tolerance {
        return None;
    }

    // A nonzero cached streak was computed on its last activity day, so it
    // trails the true value by the days elapsed since then.
    let saturated = windowed >= window_days && cached.current_streak > window_days;
    let lag = cached.last_activity_date.map(|d| (today - d).num_days());
    let fresh = lag.is_some_and(|lag| (0..=i64::from(tolerance)).contains(&lag));

    (!(saturated && fresh)).then_some(Drift::Exceeded {
        cached: cached.current_streak,
        windowed,
    })
}

/// Validates cached streaks and delegates to the recalculator on drift.
pub struct ConsistencyValidator {
    log: Arc<dyn ActivityLogReader>,
    store: Arc<dyn StreakStateStore>,
    recalculator: Arc<FullRecalculator>,
    window_days: u32,
    tolerance: u32,
    store_timeout: Duration,
}

impl ConsistencyValidator {
    pub fn new(
        log: Arc<dyn ActivityLogReader>,
        store: Arc<dyn StreakStateStore>,
        recalculator: Arc<FullRecalculator>,
        window_days: u32,
        tolerance: u32,
        store_timeout: Duration,
    ) -> Self {
        Self {
            log,
            store,
            recalculator,
            window_days,
            tolerance,
            store_timeout,
        }
    }

    /// Read a user's streak as of `today`.
    ///
    /// Only fails when no cached state is available to fall back on.
    pub async fn read(&self, user_id: &str, today: NaiveDate) -> Result<StreakRead, StreakError> {
        let since = lookback_start(today, self.window_days);
        let (cached, recent) = join(
            with_timeout(self.store_timeout, self.store.get(user_id)),
            with_timeout(self.store_timeout, self.log.list_dates(user_id, since)),
        )
        .await;

        let cached = cached.map_err(|e| {
            tracing::warn!(user_id, error = %e, "Streak state fetch failed");
            StreakError::TransientRead(e)
        })?;

        let recent = match recent {
            Ok(dates) => dates,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Recent activity fetch failed");
                return serve_cached(cached, StreakError::TransientRead(e));
            }
        };

        let windowed = current_streak(&recent, today);

        let drift = detect_drift(
            cached.as_ref(),
            windowed,
            today,
            self.window_days,
            self.tolerance,
        );

        match (drift, cached) {
            (None, Some(state)) => {
                tracing::debug!(user_id, windowed, "Cached streak validated");
                Ok(StreakRead {
                    state,
                    outcome: ReadOutcome::Validated,
                })
            }
            (drift, cached) => {
                tracing::info!(user_id, ?drift, windowed, "Streak drift detected");

                match self
                    .recalculator
                    .reconcile_from(user_id, today, cached.as_ref())
                    .await
                {
                    Ok(state) => Ok(StreakRead {
                        state,
                        outcome: ReadOutcome::Reconciled,
                    }),
                    Err(e) => serve_cached(cached, e),
                }
            }
        }
    }
}

/// Fall back to the cached state if there is one.
fn serve_cached(cached: Option<StreakState>, error: StreakError) -> Result<StreakRead, StreakError> {
    match cached {
        Some(state) => {
            tracing::warn!(
                user_id = %state.user_id,
                error = %error,
                "Serving possibly stale cached streak"
            );
            Ok(StreakRead {
                state,
                outcome: ReadOutcome::Degraded(error),
            })
        }
        None => Err(error),
    }
}
