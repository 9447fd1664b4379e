// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::db::with_timeout;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{ActivityRecord, StreakState};
use crate::services::streak::{ReadOutcome, StreakRead};
use crate::services::LogActivityRequest;
use crate::time_utils::{format_utc_rfc3339, lookback_start, utc_day};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const DEFAULT_ACTIVITY_DAYS: u32 = 14;
const MAX_ACTIVITY_DAYS: u32 = 366;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/streak", get(get_streak))
        .route("/api/streak/reconcile", post(reconcile_streak))
        .route("/api/activities", get(get_activity_days).post(log_activity))
}

// ─── Streak ──────────────────────────────────────────────────

/// Streak response.
#[derive(Serialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StreakResponse {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_activity_date: Option<String>,
    pub updated_at: String,
    /// "validated", "reconciled", or "stale"
    pub status: String,
}

impl StreakResponse {
    fn new(state: StreakState, status: &str) -> Self {
        Self {
            current_streak: state.current_streak,
            longest_streak: state.longest_streak,
            last_activity_date: state.last_activity_date.map(|d| d.to_string()),
            updated_at: format_utc_rfc3339(state.updated_at),
            status: status.to_string(),
        }
    }
}

impl From<StreakRead> for StreakResponse {
    fn from(read: StreakRead) -> Self {
        let status = match read.outcome {
            ReadOutcome::Validated => "validated",
            ReadOutcome::Reconciled => "reconciled",
            ReadOutcome::Degraded(_) => "stale",
        };
        Self::new(read.state, status)
    }
}

/// Get current user's streak as of the server's UTC date.
///
/// Serves the cached counter (2 reads) unless drift is detected.
async fn get_streak(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StreakResponse>> {
    let today = state.engine.today();

    tracing::debug!(user_id = %user.user_id, %today, "Fetching streak");

    let read = state.engine.read(&user.user_id, today).await?;
    Ok(Json(read.into()))
}

/// Force a full recompute of the current user's streak.
async fn reconcile_streak(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StreakResponse>> {
    tracing::info!(user_id = %user.user_id, "User-requested streak reconcile");

    let reconciled = state
        .engine
        .reconcile(&user.user_id, state.engine.today())
        .await?;
    Ok(Json(StreakResponse::new(reconciled, "reconciled")))
}

// ─── Activities ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ActivityDaysQuery {
    #[serde(default = "default_days")]
    days: u32,
}

fn default_days() -> u32 {
    DEFAULT_ACTIVITY_DAYS
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityDaysResponse {
    pub since: String,
    /// Distinct UTC dates with activity, oldest first
    pub dates: Vec<String>,
}

/// List the days the current user was active.
async fn get_activity_days(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ActivityDaysQuery>,
) -> Result<Json<ActivityDaysResponse>> {
    if params.days == 0 || params.days > MAX_ACTIVITY_DAYS {
        return Err(AppError::BadRequest(format!(
            "'days' must be between 1 and {}",
            MAX_ACTIVITY_DAYS
        )));
    }

    let since = lookback_start(state.engine.today(), params.days);
    let dates = with_timeout(
        state.config.streak.store_timeout,
        state.activity_log.list_dates(&user.user_id, since),
    )
    .await?;

    Ok(Json(ActivityDaysResponse {
        since: since.to_string(),
        dates: dates.iter().map(|d| d.to_string()).collect(),
    }))
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityResponse {
    pub activity_id: String,
    pub sport_type: String,
    pub occurred_at: String,
    /// UTC date the session counts toward
    pub day: String,
}

impl From<ActivityRecord> for ActivityResponse {
    fn from(record: ActivityRecord) -> Self {
        Self {
            day: utc_day(record.occurred_at).to_string(),
            occurred_at: format_utc_rfc3339(record.occurred_at),
            activity_id: record.activity_id,
            sport_type: record.sport_type,
        }
    }
}

/// Log a completed session for the current user.
async fn log_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<LogActivityRequest>,
) -> Result<(StatusCode, Json<ActivityResponse>)> {
    let record = state
        .activity_logger
        .log_activity(&user.user_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(record.into())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_degraded_read_reports_stale() {
        let read = StreakRead {
            state: StreakState {
                user_id: "u1".to_string(),
                current_streak: 2,
                longest_streak: 4,
                last_activity_date: Some(date("2024-01-03")),
                updated_at: chrono::DateTime::from_timestamp(1_704_283_200, 0).unwrap(),
            },
            outcome: ReadOutcome::Degraded(crate::error::StreakError::TransientRead(
                crate::error::StoreError::Offline,
            )),
        };

        let response = StreakResponse::from(read);
        assert_eq!(response.status, "stale");
        assert_eq!(response.last_activity_date.as_deref(), Some("2024-01-03"));
        assert_eq!(response.updated_at, "2024-01-03T12:00:00Z");
    }
}
