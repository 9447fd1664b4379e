// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Activities (append-only session log)
//! - Streak states (cached counters, one document per user)

use crate::db::{collections, ActivityLogReader, ActivityLogWriter, StreakStateStore};
use crate::error::StoreError;
use crate::models::{ActivityRecord, StreakState};
use crate::time_utils::{format_utc_rfc3339, start_of_day, utc_day};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, StoreError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            StoreError::Unavailable(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, StoreError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // ExternalJwtFunctionSource provides a dummy token without a custom
        // TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            StoreError::Unavailable(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return [`StoreError::Offline`].
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, StoreError> {
        self.client.as_ref().ok_or(StoreError::Offline)
    }

    // ─── Activity Operations ─────────────────────────────────────

    /// Get activities for a user that occurred on or after `since` (UTC).
    pub async fn get_activities_since(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<ActivityRecord>, StoreError> {
        let user_id = user_id.to_string();
        let since = format_utc_rfc3339(start_of_day(since));

        self.get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id.clone()),
                    q.field("occurred_at").greater_than_or_equal(since.clone()),
                ])
            })
            .order_by([("occurred_at", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    /// Create an activity record, keyed by user and activity ID.
    ///
    /// Activities are immutable: if the document already exists the first
    /// write is kept and the append succeeds as a no-op.
    pub async fn insert_activity(&self, record: &ActivityRecord) -> Result<(), StoreError> {
        let doc_id = format!("{}_{}", record.user_id, record.activity_id);
        let result: firestore::FirestoreResult<ActivityRecord> = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::ACTIVITIES)
            .document_id(&doc_id)
            .object(record)
            .execute()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(firestore::errors::FirestoreError::DataConflictError(_)) => {
                tracing::debug!(
                    user_id = %record.user_id,
                    activity_id = %record.activity_id,
                    "Activity already logged"
                );
                Ok(())
            }
            Err(e) => Err(StoreError::Unavailable(e.to_string())),
        }
    }

    // ─── Streak State Operations ─────────────────────────────────

    /// Get the cached streak document for a user.
    ///
    /// Stored in `streak_states` collection, keyed by user_id.
    pub async fn get_streak_state(&self, user_id: &str) -> Result<Option<StreakState>, StoreError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::STREAK_STATES)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    /// Replace the cached streak document for a user.
    ///
    /// A single-document write without an update mask replaces every
    /// field, so concurrent writers never leave a mixed document.
    pub async fn set_streak_state(&self, state: &StreakState) -> Result<(), StoreError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::STREAK_STATES)
            .document_id(&state.user_id)
            .object(state)
            .execute()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ActivityLogReader for FirestoreDb {
    async fn list_dates(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<BTreeSet<NaiveDate>, StoreError> {
        let activities = self.get_activities_since(user_id, since).await?;
        Ok(activities
            .iter()
            .map(|a| utc_day(a.occurred_at))
            .filter(|d| *d >= since)
            .collect())
    }
}

#[async_trait]
impl ActivityLogWriter for FirestoreDb {
    async fn append(&self, record: &ActivityRecord) -> Result<(), StoreError> {
        self.insert_activity(record).await
    }
}

#[async_trait]
impl StreakStateStore for FirestoreDb {
    async fn get(&self, user_id: &str) -> Result<Option<StreakState>, StoreError> {
        self.get_streak_state(user_id).await
    }

    async fn upsert(&self, state: &StreakState) -> Result<(), StoreError> {
        self.set_streak_state(state).await
    }
}
