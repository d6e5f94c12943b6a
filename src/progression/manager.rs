//! Progression Manager - the single entry point for progression state
//!
//! Owns one user's ledger and achievement state. Every mutating call runs as
//! one transaction: append, recompute the level, re-check achievements, pay
//! grants for unlocks, and repeat until nothing else changes. A failing call
//! rolls back to where it started.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::catalog::Catalog;
use super::checker::CheckContext;
use super::clock::{Clock, SystemClock};
use super::definitions::{AchievementCategory, RewardTier};
use super::ledger::{ActivityKind, ActivityLedger, ActivityRecord};
use super::levels::{compute_level, LevelState, LevelUp, XpRewards};
use super::registry::{AchievementRegistry, AchievementStatus, Transition};
use super::streaks::{day_of, StreakInfo};
use crate::error::{ProgressionError, Result};

/// Result of reporting an activity
#[derive(Debug, Clone, Serialize)]
pub struct ActivityOutcome {
    pub record: ActivityRecord,
    /// Grant records paid out for unlocks, in unlock order
    pub grants: Vec<ActivityRecord>,
    pub level: LevelState,
    pub level_up: Option<LevelUp>,
    /// Achievements whose state changed, in the order they changed
    pub changed: Vec<AchievementStatus>,
}

/// Result of an externally signaled unlock or progress report
#[derive(Debug, Clone, Serialize)]
pub struct UnlockOutcome {
    pub grants: Vec<ActivityRecord>,
    pub level: LevelState,
    pub level_up: Option<LevelUp>,
    pub changed: Vec<AchievementStatus>,
}

impl ActivityOutcome {
    /// Achievements that unlocked during this call
    pub fn unlocked(&self) -> impl Iterator<Item = &AchievementStatus> {
        self.changed.iter().filter(|s| s.state.unlocked)
    }
}

impl UnlockOutcome {
    pub fn unlocked(&self) -> impl Iterator<Item = &AchievementStatus> {
        self.changed.iter().filter(|s| s.state.unlocked)
    }
}

/// Grants and changes accumulated while settling one transaction
struct Settlement {
    grants: Vec<ActivityRecord>,
    changed: Vec<String>,
}

/// Per-user progression facade
pub struct ProgressionManager {
    ledger: ActivityLedger,
    registry: AchievementRegistry,
    xp_rewards: XpRewards,
    clock: Box<dyn Clock>,
}

impl ProgressionManager {
    /// Create a manager over a shared, already validated catalog
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            ledger: ActivityLedger::new(),
            registry: AchievementRegistry::new(catalog),
            xp_rewards: XpRewards::default(),
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_xp_rewards(mut self, rewards: XpRewards) -> Self {
        self.xp_rewards = rewards;
        self
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        self.registry.catalog()
    }

    pub fn ledger(&self) -> &ActivityLedger {
        &self.ledger
    }

    pub fn xp_rewards(&self) -> &XpRewards {
        &self.xp_rewards
    }

    // ========================================
    // MUTATIONS
    // ========================================

    /// Report an activity stamped with the manager's clock
    pub fn record_activity(
        &mut self,
        kind: ActivityKind,
        xp: i64,
        label: impl Into<String>,
        note: Option<String>,
    ) -> Result<ActivityOutcome> {
        let now = self.clock.now();
        self.record_activity_at(kind, xp, label, note, now)
    }

    /// Report an activity worth the configured default XP for its kind
    pub fn record_default(
        &mut self,
        kind: ActivityKind,
        label: impl Into<String>,
        note: Option<String>,
    ) -> Result<ActivityOutcome> {
        let xp = self
            .xp_rewards
            .for_kind(kind)
            .ok_or_else(|| reserved_kind_error(kind))?;
        let xp = i64::try_from(xp).map_err(|_| {
            ProgressionError::invalid_argument(format!("Configured XP for {} is out of range", kind))
        })?;
        self.record_activity(kind, xp, label, note)
    }

    /// Report an activity that happened at `occurred_at`.
    ///
    /// Conditions are evaluated as of `occurred_at`.
    pub fn record_activity_at(
        &mut self,
        kind: ActivityKind,
        xp: i64,
        label: impl Into<String>,
        note: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> Result<ActivityOutcome> {
        if kind.is_grant() {
            return Err(reserved_kind_error(kind));
        }
        let label = label.into();
        let before = self.current_level();

        let (record, settlement) = self.transaction(|this| {
            let record = this.ledger.append_at(kind, xp, label, note, occurred_at)?;
            debug!(id = %record.id, kind = %record.kind, xp = record.xp, "Activity recorded");
            let pending = this.evaluate(occurred_at);
            let settlement = this.settle(pending, occurred_at)?;
            Ok((record, settlement))
        })?;

        let level = self.current_level();
        let level_up = self.level_up(&before, &level);
        Ok(ActivityOutcome {
            record,
            grants: settlement.grants,
            level,
            level_up,
            changed: self.statuses_for(&settlement.changed),
        })
    }

    /// Record an unlock decided by a collaborator.
    ///
    /// Unlocking an already unlocked achievement changes nothing.
    pub fn force_unlock(&mut self, id: &str) -> Result<UnlockOutcome> {
        let now = self.clock.now();
        let before = self.current_level();

        let settlement = self.transaction(|this| {
            let initial = if this.registry.force_unlock(id, now)? {
                vec![(id.to_string(), Transition::Unlocked)]
            } else {
                Vec::new()
            };
            this.settle(initial, now)
        })?;

        Ok(self.unlock_outcome(&before, settlement))
    }

    /// Raise the reported progress of a manual achievement
    pub fn report_progress(&mut self, id: &str, progress: i64) -> Result<UnlockOutcome> {
        let now = self.clock.now();
        let before = self.current_level();

        let settlement = self.transaction(|this| {
            let initial = match this.registry.report_progress(id, progress, now)? {
                Some(transition) => vec![(id.to_string(), transition)],
                None => Vec::new(),
            };
            this.settle(initial, now)
        })?;

        Ok(self.unlock_outcome(&before, settlement))
    }

    /// Run `f`, restoring the ledger and achievement state if it fails
    fn transaction<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let ledger_len = self.ledger.len();
        let states = self.registry.snapshot();
        let result = f(self);
        if result.is_err() {
            self.ledger.truncate(ledger_len);
            self.registry.restore(states);
        }
        result
    }

    /// Pay out every unlock in `pending` and keep re-checking until stable.
    ///
    /// Grants never match count or streak conditions and each achievement
    /// unlocks at most once, so this terminates.
    fn settle(
        &mut self,
        mut pending: Vec<(String, Transition)>,
        now: DateTime<Utc>,
    ) -> Result<Settlement> {
        let mut settlement = Settlement {
            grants: Vec::new(),
            changed: Vec::new(),
        };

        loop {
            let mut paid = false;
            for (id, transition) in pending {
                if !settlement.changed.contains(&id) {
                    settlement.changed.push(id.clone());
                }
                if transition == Transition::Unlocked {
                    settlement.grants.push(self.pay_reward(&id, now)?);
                    paid = true;
                }
            }
            if !paid {
                break;
            }
            pending = self.evaluate(now);
        }

        Ok(settlement)
    }

    fn evaluate(&mut self, now: DateTime<Utc>) -> Vec<(String, Transition)> {
        let level = compute_level(self.ledger.total_xp());
        let ctx = CheckContext {
            ledger: &self.ledger,
            level: &level,
            now,
        };
        self.registry.evaluate(&ctx)
    }

    /// Append the grant record for a freshly unlocked achievement
    fn pay_reward(&mut self, id: &str, now: DateTime<Utc>) -> Result<ActivityRecord> {
        let catalog = Arc::clone(self.registry.catalog());
        let def = catalog
            .get(id)
            .ok_or_else(|| ProgressionError::unknown_achievement(id))?;

        let grant = self.ledger.push(
            ActivityKind::AchievementGrant,
            def.reward.xp,
            format!("Achievement: {}", def.name),
            Some(def.description.clone()),
            now,
        )?;
        info!(
            achievement = %def.id,
            xp = def.reward.xp,
            coins = def.reward.coins.unwrap_or(0),
            "Achievement unlocked"
        );
        Ok(grant)
    }

    fn level_up(&self, before: &LevelState, after: &LevelState) -> Option<LevelUp> {
        let level_up = LevelUp::between(before, after);
        if let Some(up) = &level_up {
            info!(
                old_level = up.old_level,
                new_level = up.new_level,
                title = %up.new_title,
                "Level up"
            );
        }
        level_up
    }

    fn unlock_outcome(&self, before: &LevelState, settlement: Settlement) -> UnlockOutcome {
        let level = self.current_level();
        UnlockOutcome {
            level_up: self.level_up(before, &level),
            level,
            changed: self.statuses_for(&settlement.changed),
            grants: settlement.grants,
        }
    }

    fn statuses_for(&self, ids: &[String]) -> Vec<AchievementStatus> {
        ids.iter()
            .filter_map(|id| self.registry.status(id).ok())
            .collect()
    }

    // ========================================
    // QUERIES
    // ========================================

    pub fn current_level(&self) -> LevelState {
        compute_level(self.ledger.total_xp())
    }

    /// Most recent `limit` records, newest first
    pub fn recent_activity(&self, limit: i64) -> Vec<ActivityRecord> {
        self.ledger.recent(limit)
    }

    pub fn achievement(&self, id: &str) -> Result<AchievementStatus> {
        self.registry.status(id)
    }

    pub fn achievements(&self) -> Vec<AchievementStatus> {
        self.registry.statuses()
    }

    pub fn achievements_by_category(&self, category: AchievementCategory) -> Vec<AchievementStatus> {
        self.catalog()
            .by_category(category)
            .into_iter()
            .map(|d| self.registry.status_of(d))
            .collect()
    }

    pub fn achievements_by_tier(&self, tier: RewardTier) -> Vec<AchievementStatus> {
        self.catalog()
            .by_tier(tier)
            .into_iter()
            .map(|d| self.registry.status_of(d))
            .collect()
    }

    /// Completion percentage (0-100) of one achievement
    pub fn achievement_progress(&self, id: &str) -> Result<u8> {
        Ok(self.registry.status(id)?.percent())
    }

    pub fn unlocked_achievements(&self) -> Vec<AchievementStatus> {
        self.achievements()
            .into_iter()
            .filter(|s| s.state.unlocked)
            .collect()
    }

    pub fn locked_achievements(&self) -> Vec<AchievementStatus> {
        self.achievements()
            .into_iter()
            .filter(|s| !s.state.unlocked)
            .collect()
    }

    pub fn unlocked_count(&self) -> usize {
        self.unlocked_achievements().len()
    }

    pub fn achievement_count(&self) -> usize {
        self.catalog().len()
    }

    /// Secondary currency earned from unlocked achievements
    pub fn total_coins(&self) -> u64 {
        self.unlocked_achievements()
            .iter()
            .filter_map(|s| s.definition.reward.coins)
            .sum()
    }

    /// Daily training streak as of the manager's clock
    pub fn training_streak(&self) -> StreakInfo {
        StreakInfo::from_ledger(
            &self.ledger,
            ActivityKind::training(),
            day_of(self.clock.now()),
        )
    }
}

fn reserved_kind_error(kind: ActivityKind) -> ProgressionError {
    ProgressionError::invalid_argument(format!(
        "Activity kind '{}' is reserved for achievement rewards",
        kind
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::{ActivityId, AchievementDefinition, Condition, ManualClock, Reward};
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap()
    }

    fn catalog(defs: Vec<AchievementDefinition>) -> Arc<Catalog> {
        Catalog::new(defs).unwrap().shared()
    }

    fn three_workouts() -> AchievementDefinition {
        AchievementDefinition::new(
            "three-workouts",
            "Three Workouts",
            "Complete 3 workouts",
            AchievementCategory::Milestone,
            3,
            Reward::xp(50),
            Condition::count(&[ActivityKind::Workout]),
        )
    }

    fn manager(defs: Vec<AchievementDefinition>) -> (ProgressionManager, ManualClock) {
        let clock = ManualClock::new(start());
        let manager = ProgressionManager::new(catalog(defs)).with_clock(clock.clone());
        (manager, clock)
    }

    #[test]
    fn test_count_of_kind_boundary() {
        let (mut m, _) = manager(vec![three_workouts()]);

        let out = m.record_activity(ActivityKind::Workout, 10, "w1", None).unwrap();
        assert_eq!(m.achievement_progress("three-workouts").unwrap(), 33);
        assert!(out.grants.is_empty());
        assert_eq!(out.changed.len(), 1);

        m.record_activity(ActivityKind::Workout, 10, "w2", None).unwrap();
        assert_eq!(m.achievement_progress("three-workouts").unwrap(), 66);
        assert!(m.unlocked_achievements().is_empty());

        let out = m.record_activity(ActivityKind::Workout, 10, "w3", None).unwrap();
        assert_eq!(m.achievement_progress("three-workouts").unwrap(), 100);
        assert_eq!(out.unlocked().count(), 1);
        assert_eq!(out.grants.len(), 1);
        assert_eq!(out.grants[0].kind, ActivityKind::AchievementGrant);
        assert_eq!(out.level.total_xp, 80);
    }

    #[test]
    fn test_reward_feeds_back_into_level() {
        let big = AchievementDefinition::new(
            "big",
            "Big",
            "Ten workouts",
            AchievementCategory::Milestone,
            10,
            Reward::xp(500),
            Condition::count(&[ActivityKind::Workout]),
        );
        let (mut m, _) = manager(vec![big]);
        for _ in 0..9 {
            m.record_activity(ActivityKind::Workout, 100, "lift", None).unwrap();
        }
        m.record_activity(ActivityKind::Cardio, 50, "run", None).unwrap();
        assert_eq!(m.current_level().total_xp, 950);

        let out = m.record_activity(ActivityKind::Workout, 0, "lift", None).unwrap();
        assert_eq!(out.level.total_xp, 1450);
        assert_eq!(out.level, compute_level(1450));
        assert_eq!(out.level.level, 13);
        let up = out.level_up.unwrap();
        assert_eq!((up.old_level, up.new_level), (10, 13));
    }

    #[test]
    fn test_grant_can_chain_into_level_threshold() {
        let level_5 = AchievementDefinition::new(
            "level-5",
            "Level 5",
            "Reach level 5",
            AchievementCategory::Milestone,
            1,
            Reward::xp(25),
            Condition::LevelThreshold { level: 5 },
        );
        let first = AchievementDefinition::new(
            "first",
            "First",
            "First workout",
            AchievementCategory::Milestone,
            1,
            Reward::xp(400),
            Condition::count(&[ActivityKind::Workout]),
        );
        let (mut m, _) = manager(vec![level_5, first]);

        let out = m.record_activity(ActivityKind::Workout, 10, "lift", None).unwrap();
        let ids: Vec<_> = out.changed.iter().map(|s| s.definition.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "level-5"]);
        assert_eq!(out.grants.len(), 2);
        assert_eq!(out.level.total_xp, 10 + 400 + 25);
        assert_eq!(m.ledger().len(), 3);
    }

    #[test]
    fn test_failed_call_leaves_state_untouched() {
        let (mut m, _) = manager(vec![three_workouts()]);
        m.record_activity(ActivityKind::Workout, 10, "w1", None).unwrap();
        let before = m.current_level();

        let err = m.record_activity(ActivityKind::Workout, -1, "bad", None).unwrap_err();
        assert!(matches!(err, ProgressionError::InvalidArgument(_)));
        assert_eq!(m.current_level(), before);
        assert_eq!(m.ledger().len(), 1);
        assert_eq!(m.achievement("three-workouts").unwrap().state.progress, 1);

        assert!(m
            .record_activity(ActivityKind::AchievementGrant, 10, "sneaky", None)
            .is_err());
        assert_eq!(m.ledger().len(), 1);
    }

    #[test]
    fn test_overflowing_grant_rolls_back_whole_call() {
        let huge = AchievementDefinition::new(
            "huge",
            "Huge",
            "Any workout",
            AchievementCategory::Milestone,
            1,
            Reward::xp(u64::MAX),
            Condition::count(&[ActivityKind::Workout]),
        );
        let (mut m, _) = manager(vec![huge]);
        let err = m.record_activity(ActivityKind::Workout, 1, "lift", None).unwrap_err();
        assert!(matches!(err, ProgressionError::InvalidArgument(_)));
        assert!(m.ledger().is_empty());
        assert!(!m.achievement("huge").unwrap().state.unlocked);

        // The discarded id is handed out again
        let out = m.record_activity(ActivityKind::Cardio, 1, "run", None).unwrap();
        assert_eq!(out.record.id, ActivityId(1));
    }

    #[test]
    fn test_streak_reset_after_missed_day() {
        let week = AchievementDefinition::new(
            "week",
            "Week",
            "Train 7 days in a row",
            AchievementCategory::Consistency,
            7,
            Reward::xp(300),
            Condition::streak(ActivityKind::training()),
        );
        let (mut m, clock) = manager(vec![week]);

        for _ in 1..=5 {
            m.record_activity(ActivityKind::Workout, 100, "lift", None).unwrap();
            clock.advance(Duration::days(1));
        }
        assert_eq!(m.achievement("week").unwrap().state.progress, 5);

        // Day 6 skipped
        clock.advance(Duration::days(1));
        m.record_activity(ActivityKind::Workout, 100, "lift", None).unwrap();
        let status = m.achievement("week").unwrap();
        assert_eq!(status.state.progress, 1);
        assert!(!status.state.unlocked);
        assert_eq!(m.training_streak().best, 5);
    }

    #[test]
    fn test_force_unlock_pays_once() {
        let squat = AchievementDefinition::new(
            "bodyweight-squat",
            "Bodyweight Squat",
            "Squat your body weight",
            AchievementCategory::Lifting,
            1,
            Reward::with_coins(500, 250),
            Condition::Manual,
        );
        let (mut m, _) = manager(vec![squat]);

        let out = m.force_unlock("bodyweight-squat").unwrap();
        assert_eq!(out.grants.len(), 1);
        assert_eq!(out.level.total_xp, 500);
        assert_eq!(m.total_coins(), 250);

        let again = m.force_unlock("bodyweight-squat").unwrap();
        assert!(again.grants.is_empty());
        assert!(again.changed.is_empty());
        assert_eq!(m.current_level().total_xp, 500);

        assert!(m.force_unlock("unknown").is_err());
        assert!(m.achievement_progress("unknown").is_err());
    }

    #[test]
    fn test_queries_are_idempotent() {
        let (mut m, _) = manager(vec![three_workouts()]);
        m.record_activity(ActivityKind::Workout, 40, "w1", None).unwrap();
        assert_eq!(m.current_level(), m.current_level());
        assert_eq!(m.recent_activity(5), m.recent_activity(5));
        assert_eq!(m.locked_achievements().len(), 1);
        assert_eq!(m.achievement_count(), 1);
    }

    #[test]
    fn test_record_default_uses_xp_table() {
        let (m, _) = manager(vec![]);
        let mut m = m.with_xp_rewards(XpRewards {
            workout: 120,
            ..XpRewards::default()
        });
        let out = m.record_default(ActivityKind::Workout, "lift", None).unwrap();
        assert_eq!(out.record.xp, 120);
        let out = m.record_default(ActivityKind::ProgressPhoto, "photo", None).unwrap();
        assert_eq!(out.record.xp, 50);
        assert!(m
            .record_default(ActivityKind::AchievementGrant, "x", None)
            .is_err());
    }
}
