// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Streak consistency engine.
//!
//! `streak_states` caches each user's current streak so dashboards can read
//! it cheaply. The activity log is the source of truth. Each read:
//! 1. Fetches the cached state and the last few weeks of activity dates
//! 2. Recomputes a windowed streak and compares it to the cached value
//! 3. Serves the cache if they agree within tolerance (no write)
//! 4. Otherwise recomputes from full history and replaces the cached row
//!
//! Failures degrade to serving the previously cached value.

pub mod calculator;
pub mod recalculator;
pub mod validator;

pub use calculator::{current_streak, longest_run};
pub use recalculator::FullRecalculator;
pub use validator::{ConsistencyValidator, Drift, ReadOutcome, StreakRead};

use crate::config::StreakSettings;
use crate::db::{ActivityLogReader, StreakStateStore};
use crate::error::StreakError;
use crate::models::StreakState;
use crate::time_utils::Clock;
use chrono::NaiveDate;
use std::sync::Arc;

/// Entry point for reading and repairing streaks.
///
/// Holds no per-user state, so one instance serves all requests
/// concurrently.
#[derive(Clone)]
pub struct StreakEngine {
    validator: Arc<ConsistencyValidator>,
    recalculator: Arc<FullRecalculator>,
    clock: Arc<dyn Clock>,
}

impl StreakEngine {
    pub fn new(
        log: Arc<dyn ActivityLogReader>,
        store: Arc<dyn StreakStateStore>,
        clock: Arc<dyn Clock>,
        settings: &StreakSettings,
    ) -> Self {
        let recalculator = Arc::new(FullRecalculator::new(
            log.clone(),
            store.clone(),
            clock.clone(),
            settings.history_horizon_days,
            settings.store_timeout,
        ));
        let validator = Arc::new(ConsistencyValidator::new(
            log,
            store,
            recalculator.clone(),
            settings.validation_window_days,
            settings.drift_tolerance_days,
            settings.store_timeout,
        ));

        Self {
            validator,
            recalculator,
            clock,
        }
    }

    /// Today's UTC date according to the engine's clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Validated read of a user's streak as of `today`.
    pub async fn read(&self, user_id: &str, today: NaiveDate) -> Result<StreakRead, StreakError> {
        self.validator.read(user_id, today).await
    }

    /// Force a full recompute as of `today`.
    pub async fn reconcile(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<StreakState, StreakError> {
        self.recalculator.reconcile(user_id, today).await
    }
}
