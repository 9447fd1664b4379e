// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! The streak engine only sees the two boundary traits below. Firestore
//! backs them in production; [`MemoryStore`] backs them in local
//! development and tests.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::models::{ActivityRecord, StreakState};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;

/// Collection names as constants.
pub mod collections {
    pub const ACTIVITIES: &str = "activities";
    /// Cached streak counters (keyed by user_id)
    pub const STREAK_STATES: &str = "streak_states";
}

/// Read-only view of the append-only activity log.
#[async_trait]
pub trait ActivityLogReader: Send + Sync {
    /// Distinct UTC dates with at least one activity on or after `since`.
    async fn list_dates(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<BTreeSet<NaiveDate>, StoreError>;
}

/// Append path for the activity log. The streak engine never uses this.
#[async_trait]
pub trait ActivityLogWriter: Send + Sync {
    /// Store an activity. Writing the same `activity_id` twice is a no-op.
    async fn append(&self, record: &ActivityRecord) -> Result<(), StoreError>;
}

/// Persisted streak counters, one record per user.
#[async_trait]
pub trait StreakStateStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<StreakState>, StoreError>;

    /// Replace the record for `state.user_id`. Atomic per key.
    async fn upsert(&self, state: &StreakState) -> Result<(), StoreError>;
}

/// Run a store call, failing with [`StoreError::Timeout`] after `limit`.
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| StoreError::Timeout(limit))?
}
