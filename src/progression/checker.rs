//! Achievement checking logic
//!
//! Measures how far each condition kind has progressed against the current
//! ledger and level. Grants never count toward any condition.

use chrono::{DateTime, Duration, Utc};

use super::definitions::Condition;
use super::ledger::ActivityLedger;
use super::levels::LevelState;
use super::streaks::{active_days, day_of, run_ending_on};

/// Snapshot a condition is checked against
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    pub ledger: &'a ActivityLedger,
    pub level: &'a LevelState,
    /// Evaluation time: anchors recency windows and the streak day
    pub now: DateTime<Utc>,
}

/// Progress a condition has reached, capped at `max_progress`.
///
/// Returns `None` for manual conditions, which only move when a
/// collaborator reports them.
pub fn measure(condition: &Condition, max_progress: u32, ctx: &CheckContext<'_>) -> Option<u32> {
    let raw = match condition {
        Condition::LevelThreshold { level } => {
            if ctx.level.level >= u64::from(*level) {
                u64::from(max_progress)
            } else {
                0
            }
        }
        Condition::CountOfKind { kinds, window_days } => {
            let window = window_days.map(|days| window_start(ctx.now, days)..=ctx.now);
            ctx.ledger.count_matching(kinds, window)
        }
        Condition::Streak { kinds } => {
            let days = active_days(ctx.ledger, kinds);
            u64::from(run_ending_on(&days, day_of(ctx.now)))
        }
        Condition::Manual => return None,
    };
    Some(raw.min(u64::from(max_progress)) as u32)
}

/// Start of a trailing window of `days` calendar days ending at `now`
fn window_start(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(days))
}

/// Whether `condition` may lower progress between evaluations
pub fn can_regress(condition: &Condition) -> bool {
    matches!(
        condition,
        Condition::Streak { .. }
            | Condition::CountOfKind {
                window_days: Some(_),
                ..
            }
    )
}
