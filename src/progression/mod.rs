//! Progression system: Activity ledger, XP, Levels, Streaks, and Achievements
//!
//! # Architecture
//!
//! ```text
//!   caller ──► ProgressionManager::record_activity
//!                 │
//!                 ├─► ActivityLedger::append
//!                 ├─► compute_level(total_xp)
//!                 ├─► AchievementRegistry::evaluate
//!                 └─► grant records for unlocks ──► (re-check until stable)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let catalog = Catalog::builtin()?.shared();
//! let mut progress = ProgressionManager::new(catalog);
//!
//! let outcome = progress.record_activity(ActivityKind::Workout, 100, "Leg day", None)?;
//! for unlocked in outcome.unlocked() {
//!     println!("Unlocked {}", unlocked.definition.name);
//! }
//! ```

mod catalog;
mod checker;
mod clock;
mod definitions;
mod ledger;
mod levels;
mod manager;
mod registry;
mod streaks;

pub use catalog::Catalog;
pub use checker::CheckContext;
pub use clock::{Clock, ManualClock, SystemClock};
pub use definitions::{
    builtin_definitions, AchievementCategory, AchievementDefinition, Condition, Reward, RewardTier,
};
pub use ledger::{ActivityId, ActivityKind, ActivityLedger, ActivityRecord};
pub use levels::{compute_level, level_badge, level_title, xp_required_for, LevelState, LevelUp, XpRewards};
pub use manager::{ActivityOutcome, ProgressionManager, UnlockOutcome};
pub use registry::{AchievementRegistry, AchievementState, AchievementStatus, Transition};
pub use streaks::StreakInfo;
