//! Achievement registry
//!
//! Holds the live unlock/progress state of every catalog entry. The registry
//! never writes to the ledger itself: unlocks are handed back to the caller,
//! which pays out the grant.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::Catalog;
use super::checker::{can_regress, measure, CheckContext};
use super::definitions::AchievementDefinition;
use crate::error::{ProgressionError, Result};

/// Mutable state of one achievement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementState {
    pub progress: u32,
    /// Once set, never cleared
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl AchievementState {
    fn unlock(&mut self, max_progress: u32, now: DateTime<Utc>) {
        self.progress = max_progress;
        self.unlocked = true;
        self.unlocked_at = Some(now);
    }
}

/// What happened to an achievement during a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Progress moved without unlocking
    Progressed,
    Unlocked,
}

/// Definition paired with its current state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementStatus {
    pub definition: AchievementDefinition,
    pub state: AchievementState,
}

impl AchievementStatus {
    /// Completion percentage, truncated so only a finished achievement shows 100
    pub fn percent(&self) -> u8 {
        progress_percent(self.state.progress, self.definition.max_progress)
    }
}

pub(crate) fn progress_percent(progress: u32, max_progress: u32) -> u8 {
    if max_progress == 0 {
        return 0;
    }
    (u64::from(progress.min(max_progress)) * 100 / u64::from(max_progress)) as u8
}

#[derive(Debug, Clone)]
pub struct AchievementRegistry {
    catalog: Arc<Catalog>,
    states: HashMap<String, AchievementState>,
}

impl AchievementRegistry {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let states = catalog
            .definitions()
            .iter()
            .map(|d| (d.id.clone(), AchievementState::default()))
            .collect();
        Self { catalog, states }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn state(&self, id: &str) -> Option<&AchievementState> {
        self.states.get(id)
    }

    /// Pair a definition with its state (missing state reads as fresh)
    pub fn status_of(&self, definition: &AchievementDefinition) -> AchievementStatus {
        AchievementStatus {
            definition: definition.clone(),
            state: self.states.get(&definition.id).cloned().unwrap_or_default(),
        }
    }

    pub fn status(&self, id: &str) -> Result<AchievementStatus> {
        let definition = self
            .catalog
            .get(id)
            .ok_or_else(|| ProgressionError::unknown_achievement(id))?;
        Ok(self.status_of(definition))
    }

    /// Every achievement in catalog order
    pub fn statuses(&self) -> Vec<AchievementStatus> {
        self.catalog
            .definitions()
            .iter()
            .map(|d| self.status_of(d))
            .collect()
    }

    /// Re-check every locked, measurable achievement.
    ///
    /// Returns the ids whose state changed, in catalog order.
    pub fn evaluate(&mut self, ctx: &CheckContext<'_>) -> Vec<(String, Transition)> {
        let mut changed = Vec::new();

        for def in self.catalog.definitions() {
            let state = self.states.entry(def.id.clone()).or_default();
            if state.unlocked {
                continue;
            }
            let Some(measured) = measure(&def.condition, def.max_progress, ctx) else {
                continue;
            };

            let progress = if can_regress(&def.condition) {
                measured
            } else {
                measured.max(state.progress)
            };
            if progress == state.progress {
                continue;
            }

            if progress >= def.max_progress {
                state.unlock(def.max_progress, ctx.now);
                changed.push((def.id.clone(), Transition::Unlocked));
            } else {
                state.progress = progress;
                changed.push((def.id.clone(), Transition::Progressed));
            }
        }

        changed
    }

    /// Record an unlock decided outside the engine.
    ///
    /// Returns false when the achievement was already unlocked.
    pub fn force_unlock(&mut self, id: &str, now: DateTime<Utc>) -> Result<bool> {
        let def = self
            .catalog
            .get(id)
            .ok_or_else(|| ProgressionError::unknown_achievement(id))?;
        let state = self.states.entry(def.id.clone()).or_default();
        if state.unlocked {
            return Ok(false);
        }
        state.unlock(def.max_progress, now);
        Ok(true)
    }

    /// Raise the progress of a manual achievement.
    ///
    /// Progress is capped at `max_progress` and never lowered; a report that
    /// does not raise it is a no-op.
    pub fn report_progress(
        &mut self,
        id: &str,
        progress: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<Transition>> {
        let def = self
            .catalog
            .get(id)
            .ok_or_else(|| ProgressionError::unknown_achievement(id))?;
        if !def.condition.is_manual() {
            return Err(ProgressionError::invalid_argument(format!(
                "Achievement '{}' is measured by the engine and cannot take reported progress",
                id
            )));
        }
        let progress = u32::try_from(progress).map_err(|_| {
            ProgressionError::invalid_argument(format!(
                "Progress must be non-negative, got {}",
                progress
            ))
        })?;

        let state = self.states.entry(def.id.clone()).or_default();
        let progress = progress.min(def.max_progress);
        if state.unlocked || progress <= state.progress {
            return Ok(None);
        }

        if progress >= def.max_progress {
            state.unlock(def.max_progress, now);
            Ok(Some(Transition::Unlocked))
        } else {
            state.progress = progress;
            Ok(Some(Transition::Progressed))
        }
    }

    pub(crate) fn snapshot(&self) -> HashMap<String, AchievementState> {
        self.states.clone()
    }

    pub(crate) fn restore(&mut self, states: HashMap<String, AchievementState>) {
        self.states = states;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::levels::compute_level;
    use crate::progression::{
        AchievementCategory, ActivityKind, ActivityLedger, Condition, Reward,
    };
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, day, 7, 0, 0).unwrap()
    }

    fn registry() -> AchievementRegistry {
        let defs = vec![
            AchievementDefinition::new(
                "three-workouts",
                "Three Workouts",
                "Complete 3 workouts",
                AchievementCategory::Milestone,
                3,
                Reward::xp(50),
                Condition::count(&[ActivityKind::Workout]),
            ),
            AchievementDefinition::new(
                "level-2",
                "Level 2",
                "Reach level 2",
                AchievementCategory::Milestone,
                4,
                Reward::xp(10),
                Condition::LevelThreshold { level: 2 },
            ),
            AchievementDefinition::new(
                "pullup",
                "Pull-up",
                "Do a pull-up",
                AchievementCategory::Lifting,
                2,
                Reward::with_coins(300, 150),
                Condition::Manual,
            ),
        ];
        AchievementRegistry::new(Catalog::new(defs).unwrap().shared())
    }

    fn check(registry: &mut AchievementRegistry, ledger: &ActivityLedger, now: DateTime<Utc>) -> Vec<(String, Transition)> {
        let level = compute_level(ledger.total_xp());
        registry.evaluate(&CheckContext { ledger, level: &level, now })
    }

    #[test]
    fn test_count_progresses_then_unlocks() {
        let mut reg = registry();
        let mut ledger = ActivityLedger::new();

        ledger.append_at(ActivityKind::Workout, 10, "w1", None, at(1)).unwrap();
        let changes = check(&mut reg, &ledger, at(1));
        assert_eq!(changes, vec![("three-workouts".to_string(), Transition::Progressed)]);
        assert_eq!(reg.status("three-workouts").unwrap().percent(), 33);

        ledger.append_at(ActivityKind::Workout, 10, "w2", None, at(1)).unwrap();
        check(&mut reg, &ledger, at(1));
        assert_eq!(reg.status("three-workouts").unwrap().percent(), 66);

        ledger.append_at(ActivityKind::Workout, 10, "w3", None, at(2)).unwrap();
        let changes = check(&mut reg, &ledger, at(2));
        assert_eq!(changes, vec![("three-workouts".to_string(), Transition::Unlocked)]);
        let state = reg.state("three-workouts").unwrap();
        assert!(state.unlocked);
        assert_eq!(state.unlocked_at, Some(at(2)));
        assert_eq!(reg.status("three-workouts").unwrap().percent(), 100);

        // Unlocked entries are left alone
        ledger.append_at(ActivityKind::Workout, 10, "w4", None, at(3)).unwrap();
        assert!(check(&mut reg, &ledger, at(3)).is_empty());
        assert_eq!(reg.state("three-workouts").unwrap().unlocked_at, Some(at(2)));
    }

    #[test]
    fn test_level_threshold_has_no_intermediate_progress() {
        let mut reg = registry();
        let mut ledger = ActivityLedger::new();
        ledger.append_at(ActivityKind::Cardio, 99, "run", None, at(1)).unwrap();
        assert!(check(&mut reg, &ledger, at(1)).is_empty());
        assert_eq!(reg.state("level-2").unwrap().progress, 0);

        ledger.append_at(ActivityKind::Cardio, 1, "run", None, at(1)).unwrap();
        let changes = check(&mut reg, &ledger, at(1));
        assert_eq!(changes, vec![("level-2".to_string(), Transition::Unlocked)]);
        assert_eq!(reg.state("level-2").unwrap().progress, 4);
    }

    #[test]
    fn test_force_unlock() {
        let mut reg = registry();
        assert!(reg.force_unlock("pullup", at(4)).unwrap());
        assert!(!reg.force_unlock("pullup", at(5)).unwrap());
        let state = reg.state("pullup").unwrap();
        assert_eq!(state.progress, 2);
        assert_eq!(state.unlocked_at, Some(at(4)));

        let err = reg.force_unlock("missing", at(4)).unwrap_err();
        assert!(matches!(err, ProgressionError::InvalidArgument(_)));
    }

    #[test]
    fn test_report_progress_is_monotonic_and_manual_only() {
        let mut reg = registry();
        assert_eq!(reg.report_progress("pullup", 1, at(1)).unwrap(), Some(Transition::Progressed));
        assert_eq!(reg.report_progress("pullup", 0, at(1)).unwrap(), None);
        assert_eq!(reg.state("pullup").unwrap().progress, 1);
        assert_eq!(reg.report_progress("pullup", 9, at(2)).unwrap(), Some(Transition::Unlocked));
        assert_eq!(reg.state("pullup").unwrap().progress, 2);
        assert_eq!(reg.report_progress("pullup", 2, at(3)).unwrap(), None);

        assert!(reg.report_progress("three-workouts", 1, at(1)).is_err());
        assert!(reg.report_progress("pullup", -1, at(1)).is_err());
    }

    #[test]
    fn test_progress_percent_truncates() {
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 66);
        assert_eq!(progress_percent(3, 3), 100);
        assert_eq!(progress_percent(5, 3), 100);
    }
}
