// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Completed activity session model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored activity record in Firestore.
///
/// Records are append-only: once written they are never edited. Only the
/// UTC calendar date of `occurred_at` matters for streaks, so several
/// sessions on the same day count once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Unique activity ID (also used as document ID)
    pub activity_id: String,
    /// Owning user
    pub user_id: String,
    /// Sport type (Run, Ride, Yoga, etc.)
    pub sport_type: String,
    /// When the session was completed (RFC3339, UTC)
    #[serde(with = "crate::time_utils::rfc3339_utc")]
    pub occurred_at: DateTime<Utc>,
}
