// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Cloud Run injects secrets as environment variables via secret bindings,
//! so everything is read from the process environment (or `.env` locally).

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which backend holds activity records and streak state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    /// Process-local maps, for local development.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::Invalid("STORE_BACKEND", s.to_string())),
        }
    }
}

/// Tunables for drift detection and repair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakSettings {
    /// Days of recent activity fetched on every read to detect drift.
    pub validation_window_days: u32,
    /// Days of history fetched when recomputing after drift.
    pub history_horizon_days: u32,
    /// Largest |cached - windowed| difference served without a recompute.
    pub drift_tolerance_days: u32,
    /// Upper bound on any single store call.
    pub store_timeout: Duration,
}

impl Default for StreakSettings {
    fn default() -> Self {
        Self {
            validation_window_days: 14,
            history_horizon_days: 730,
            drift_tolerance_days: 1,
            store_timeout: Duration::from_millis(2000),
        }
    }
}

impl StreakSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.validation_window_days == 0 {
            return Err(ConfigError::Invalid(
                "STREAK_VALIDATION_WINDOW_DAYS",
                "must be at least 1".to_string(),
            ));
        }
        if self.history_horizon_days < self.validation_window_days {
            return Err(ConfigError::Invalid(
                "STREAK_HISTORY_HORIZON_DAYS",
                "must not be shorter than the validation window".to_string(),
            ));
        }
        if self.store_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "STORE_TIMEOUT_MS",
                "must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    pub store_backend: StoreBackend,
    pub streak: StreakSettings,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            store_backend: StoreBackend::Memory,
            streak: StreakSettings::default(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = StreakSettings::default();
        let streak = StreakSettings {
            validation_window_days: parse_var(
                "STREAK_VALIDATION_WINDOW_DAYS",
                defaults.validation_window_days,
            )?,
            history_horizon_days: parse_var(
                "STREAK_HISTORY_HORIZON_DAYS",
                defaults.history_horizon_days,
            )?,
            drift_tolerance_days: parse_var(
                "STREAK_DRIFT_TOLERANCE_DAYS",
                defaults.drift_tolerance_days,
            )?,
            store_timeout: Duration::from_millis(parse_var(
                "STORE_TIMEOUT_MS",
                defaults.store_timeout.as_millis() as u64,
            )?),
        };
        streak.validate()?;

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: parse_var("PORT", 8080)?,
            store_backend: match env::var("STORE_BACKEND") {
                Ok(v) => v.parse()?,
                Err(_) => StoreBackend::Firestore,
            },
            streak,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }
}

/// Parse an optional environment variable, falling back to `default` when unset.
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
