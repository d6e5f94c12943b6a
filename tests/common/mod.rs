//! Shared test utilities for progression integration tests

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use fitxp::progression::{
    AchievementCategory, AchievementDefinition, Catalog, Condition, ManualClock,
    ProgressionManager, Reward,
};

/// Fixed starting instant so day arithmetic is stable
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap()
}

/// Manager over `definitions` driven by a manual clock at `start()`
pub fn manager_with(definitions: Vec<AchievementDefinition>) -> (ProgressionManager, ManualClock) {
    let catalog = Arc::new(Catalog::new(definitions).expect("Failed to build catalog"));
    let clock = ManualClock::new(start());
    let manager = ProgressionManager::new(catalog).with_clock(clock.clone());
    (manager, clock)
}

/// Manager over the built-in catalog
pub fn builtin_manager() -> (ProgressionManager, ManualClock) {
    let clock = ManualClock::new(start());
    let catalog = Catalog::builtin().expect("Built-in catalog is invalid").shared();
    let manager = ProgressionManager::new(catalog).with_clock(clock.clone());
    (manager, clock)
}

/// Minimal definition with an XP-only reward
pub fn def(id: &str, max_progress: u32, xp: u64, condition: Condition) -> AchievementDefinition {
    AchievementDefinition::new(
        id,
        id,
        "",
        AchievementCategory::Milestone,
        max_progress,
        Reward::xp(xp),
        condition,
    )
}
