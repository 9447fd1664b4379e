// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pure streak arithmetic over sets of activity dates.
//!
//! Nothing here reads the clock or touches a store; "today" is always
//! passed in by the caller.

use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Consecutive days with activity ending at `today`.
///
/// A day without activity yet is not part of a live streak, so this
/// returns 0 whenever `today` itself is missing from `dates`, even if
/// every earlier day is present.
pub fn current_streak(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut count = 0;
    let mut cursor = Some(today);

    while let Some(day) = cursor.filter(|d| dates.contains(d)) {
        count += 1;
        cursor = day.pred_opt();
    }

    count
}

/// Longest run of consecutive days anywhere in `dates`.
pub fn longest_run(dates: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;

    for &day in dates {
        run = match prev.and_then(|p| p.succ_opt()) {
            Some(next) if next == day => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(day);
    }

    longest
}

/// Most recent activity date on or before `today`.
pub fn last_activity_date(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> Option<NaiveDate> {
    dates.range(..=today).next_back().copied()
}
