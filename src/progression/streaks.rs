//! Streak tracking system
//!
//! Streaks are counted in UTC calendar days. A day without qualifying
//! activity ends the run; the next active day starts again from one.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ledger::{ActivityKind, ActivityLedger};

/// Calendar day bucket for a timestamp
pub fn day_of(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}

/// Info for a single streak
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakInfo {
    pub current: u32,
    pub best: u32,
    pub last_activity_day: Option<NaiveDate>,
}

impl StreakInfo {
    /// Compute the streak of `kinds` as seen on `today`
    pub fn from_ledger(ledger: &ActivityLedger, kinds: &[ActivityKind], today: NaiveDate) -> Self {
        let days = active_days(ledger, kinds);
        Self {
            current: run_ending_on(&days, today),
            best: longest_run(&days),
            last_activity_day: days.iter().next_back().copied(),
        }
    }

    /// Active if there was activity today or yesterday
    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.last_activity_day
            .is_some_and(|last| (today - last).num_days() <= 1)
    }
}

/// Distinct days carrying at least one qualifying record
pub fn active_days(ledger: &ActivityLedger, kinds: &[ActivityKind]) -> BTreeSet<NaiveDate> {
    ledger
        .qualifying(kinds)
        .map(|r| day_of(r.occurred_at))
        .collect()
}

/// Length of the consecutive run that ends exactly on `today`
pub fn run_ending_on(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut count = 0;
    let mut day = today;
    while days.contains(&day) {
        count += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    count
}

/// Longest consecutive run anywhere in `days`
pub fn longest_run(days: &BTreeSet<NaiveDate>) -> u32 {
    let mut best = 0;
    let mut current = 0;
    let mut prev: Option<NaiveDate> = None;

    for &day in days {
        current = match prev {
            Some(p) if p.succ_opt() == Some(day) => current + 1,
            _ => 1,
        };
        best = best.max(current);
        prev = Some(day);
    }
    best
}
