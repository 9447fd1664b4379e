// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity logging service.
//!
//! Handles the write workflow:
//! 1. Validate the submitted session
//! 2. Append it to the activity log
//! 3. Recompute the user's streak in the background so the cached counter
//!    converges without waiting for the next drift check

use crate::db::{with_timeout, ActivityLogWriter};
use crate::error::{AppError, Result};
use crate::models::ActivityRecord;
use crate::services::streak::StreakEngine;
use crate::time_utils::{lookback_start, utc_day, Clock};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use validator::Validate;

/// Allowed clock skew for sessions reported slightly in the future.
const MAX_FUTURE_SKEW_MINUTES: i64 = 5;

/// A completed session submitted by a client.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LogActivityRequest {
    /// Client-generated ID; resubmitting the same ID is a no-op.
    #[validate(length(min = 1, max = 128))]
    pub activity_id: String,
    #[validate(length(min = 1, max = 64))]
    pub sport_type: String,
    /// Completion time; defaults to now.
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Appends activities and nudges the streak engine.
#[derive(Clone)]
pub struct ActivityLogger {
    writer: Arc<dyn ActivityLogWriter>,
    engine: StreakEngine,
    clock: Arc<dyn Clock>,
    history_horizon_days: u32,
    store_timeout: Duration,
}

impl ActivityLogger {
    pub fn new(
        writer: Arc<dyn ActivityLogWriter>,
        engine: StreakEngine,
        clock: Arc<dyn Clock>,
        history_horizon_days: u32,
        store_timeout: Duration,
    ) -> Self {
        Self {
            writer,
            engine,
            clock,
            history_horizon_days,
            store_timeout,
        }
    }

    /// Validate and store a session for `user_id`.
    pub async fn log_activity(
        &self,
        user_id: &str,
        request: LogActivityRequest,
    ) -> Result<ActivityRecord> {
        request
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let now = self.clock.now();
        let occurred_at = request.occurred_at.unwrap_or(now);
        check_occurred_at(occurred_at, now, self.history_horizon_days)?;

        let record = ActivityRecord {
            activity_id: request.activity_id,
            user_id: user_id.to_string(),
            sport_type: request.sport_type,
            occurred_at,
        };

        with_timeout(self.store_timeout, self.writer.append(&record)).await?;

        tracing::info!(
            user_id,
            activity_id = %record.activity_id,
            sport_type = %record.sport_type,
            day = %utc_day(occurred_at),
            "Activity logged"
        );

        let engine = self.engine.clone();
        let user_id = user_id.to_string();
        let today = utc_day(now);
        tokio::spawn(async move {
            if let Err(e) = engine.reconcile(&user_id, today).await {
                tracing::warn!(user_id, error = %e, "Background streak refresh failed");
            }
        });

        Ok(record)
    }
}

/// Reject sessions in the future or older than the history horizon.
///
/// Sessions beyond the horizon would never be seen by a recompute.
fn check_occurred_at(occurred_at: DateTime<Utc>, now: DateTime<Utc>, horizon_days: u32) -> Result<()> {
    if occurred_at > now + chrono::Duration::minutes(MAX_FUTURE_SKEW_MINUTES) {
        return Err(AppError::BadRequest(
            "occurred_at must not be in the future".to_string(),
        ));
    }

    if utc_day(occurred_at) < lookback_start(utc_day(now), horizon_days) {
        return Err(AppError::BadRequest(format!(
            "occurred_at must be within the last {} days",
            horizon_days
        )));
    }

    Ok(())
}
