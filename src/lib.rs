// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Streak-Tracker: consecutive-day activity streaks for a fitness app
//!
//! This crate provides the backend API for logging completed activity
//! sessions and serving each user's current and longest streak from a
//! cached counter that is checked against the activity log on every read.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{ActivityLogReader, ActivityLogWriter, StreakStateStore};
use services::{ActivityLogger, StreakEngine};
use std::sync::Arc;
use time_utils::Clock;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub engine: StreakEngine,
    pub activity_log: Arc<dyn ActivityLogReader>,
    pub activity_logger: ActivityLogger,
}

impl AppState {
    /// Wire the engine and services over the given storage backends.
    pub fn new(
        config: Config,
        reader: Arc<dyn ActivityLogReader>,
        writer: Arc<dyn ActivityLogWriter>,
        store: Arc<dyn StreakStateStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let engine = StreakEngine::new(reader.clone(), store, clock.clone(), &config.streak);
        let activity_logger = ActivityLogger::new(
            writer,
            engine.clone(),
            clock,
            config.streak.history_horizon_days,
            config.streak.store_timeout,
        );

        Self {
            config,
            engine,
            activity_log: reader,
            activity_logger,
        }
    }

    /// Wire everything over one backend implementing all storage traits.
    pub fn with_backend<B>(config: Config, backend: Arc<B>, clock: Arc<dyn Clock>) -> Self
    where
        B: ActivityLogReader + ActivityLogWriter + StreakStateStore + 'static,
    {
        Self::new(config, backend.clone(), backend.clone(), backend, clock)
    }
}
