// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory activity log and streak state store.
//!
//! Used for `STORE_BACKEND=memory` and by tests. Supports injected
//! latency and failures so the degraded read paths can be exercised.

use crate::db::{ActivityLogReader, ActivityLogWriter, StreakStateStore};
use crate::error::StoreError;
use crate::models::{ActivityRecord, StreakState};
use crate::time_utils::utc_day;
use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Process-local store implementing every storage trait.
#[derive(Default)]
pub struct MemoryStore {
    /// user_id -> activity_id -> record
    activities: DashMap<String, HashMap<String, ActivityRecord>>,
    states: DashMap<String, StreakState>,
    upserts: AtomicUsize,
    faults: Faults,
}

#[derive(Default)]
struct Faults {
    activity_reads: AtomicBool,
    state_reads: AtomicBool,
    upserts: AtomicBool,
    latency_ms: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a streak state directly, bypassing the write counter.
    pub fn seed_state(&self, state: StreakState) {
        self.states.insert(state.user_id.clone(), state);
    }

    /// Current stored state, without faults or latency.
    pub fn state(&self, user_id: &str) -> Option<StreakState> {
        self.states.get(user_id).map(|s| s.clone())
    }

    /// Number of successful `upsert` calls.
    pub fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub fn fail_activity_reads(&self, fail: bool) {
        self.faults.activity_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_state_reads(&self, fail: bool) {
        self.faults.state_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_upserts(&self, fail: bool) {
        self.faults.upserts.store(fail, Ordering::SeqCst);
    }

    /// Delay every store call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.faults
            .latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    async fn simulate(&self, failing: &AtomicBool, what: &str) -> Result<(), StoreError> {
        let latency = self.faults.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("injected {} failure", what)));
        }
        Ok(())
    }
}

#[async_trait]
impl ActivityLogReader for MemoryStore {
    async fn list_dates(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<BTreeSet<NaiveDate>, StoreError> {
        self.simulate(&self.faults.activity_reads, "activity read")
            .await?;

        Ok(self
            .activities
            .get(user_id)
            .map(|records| {
                records
                    .values()
                    .map(|r| utc_day(r.occurred_at))
                    .filter(|d| *d >= since)
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl ActivityLogWriter for MemoryStore {
    async fn append(&self, record: &ActivityRecord) -> Result<(), StoreError> {
        self.activities
            .entry(record.user_id.clone())
            .or_default()
            .entry(record.activity_id.clone())
            .or_insert_with(|| record.clone());
        Ok(())
    }
}

#[async_trait]
impl StreakStateStore for MemoryStore {
    async fn get(&self, user_id: &str) -> Result<Option<StreakState>, StoreError> {
        self.simulate(&self.faults.state_reads, "state read").await?;
        Ok(self.state(user_id))
    }

    async fn upsert(&self, state: &StreakState) -> Result<(), StoreError> {
        self.simulate(&self.faults.upserts, "upsert").await?;
        self.states.insert(state.user_id.clone(), state.clone());
        self.upserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
