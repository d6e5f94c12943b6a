//! Achievement definitions and metadata
//!
//! Every achievement declares exactly one unlock condition and a reward
//! that is fixed when the definition is built.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ledger::ActivityKind;

/// Achievement category for grouping in UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AchievementCategory {
    Milestone,
    Consistency,
    Cardio,
    BodyComposition,
    Technique,
    Lifting,
}

impl AchievementCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Milestone => "Milestones",
            Self::Consistency => "Consistency",
            Self::Cardio => "Cardio",
            Self::BodyComposition => "Body Composition",
            Self::Technique => "Technique",
            Self::Lifting => "Lifting",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Milestone => "milestone",
            Self::Consistency => "consistency",
            Self::Cardio => "cardio",
            Self::BodyComposition => "body-composition",
            Self::Technique => "technique",
            Self::Lifting => "lifting",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "milestone" => Some(Self::Milestone),
            "consistency" => Some(Self::Consistency),
            "cardio" => Some(Self::Cardio),
            "body-composition" | "composition" => Some(Self::BodyComposition),
            "technique" => Some(Self::Technique),
            "lifting" => Some(Self::Lifting),
            _ => None,
        }
    }

    pub fn all() -> &'static [AchievementCategory] {
        &[
            Self::Milestone,
            Self::Consistency,
            Self::Cardio,
            Self::BodyComposition,
            Self::Technique,
            Self::Lifting,
        ]
    }
}

impl fmt::Display for AchievementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty tier with a standard XP payout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardTier {
    Easy,
    Medium,
    Hard,
    Legendary,
}

impl RewardTier {
    pub const fn xp(&self) -> u64 {
        match self {
            Self::Easy => 200,
            Self::Medium => 300,
            Self::Hard => 400,
            Self::Legendary => 500,
        }
    }
}

/// One-time payout on unlock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reward {
    pub xp: u64,
    /// Secondary currency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coins: Option<u64>,
}

impl Reward {
    pub const fn xp(xp: u64) -> Self {
        Self { xp, coins: None }
    }

    pub const fn with_coins(xp: u64, coins: u64) -> Self {
        Self {
            xp,
            coins: Some(coins),
        }
    }

    pub const fn tier(tier: RewardTier) -> Self {
        Self::xp(tier.xp())
    }
}

/// What has to happen for an achievement to unlock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Condition {
    /// Player level reaches `level`
    LevelThreshold { level: u32 },
    /// Number of matching activities, optionally within the last `window_days`
    CountOfKind {
        kinds: Vec<ActivityKind>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        window_days: Option<u32>,
    },
    /// Consecutive days with at least one matching activity
    Streak { kinds: Vec<ActivityKind> },
    /// Decided by a collaborator and reported through `force_unlock`
    Manual,
}

impl Condition {
    pub fn count(kinds: &[ActivityKind]) -> Self {
        Self::CountOfKind {
            kinds: kinds.to_vec(),
            window_days: None,
        }
    }

    pub fn count_within(kinds: &[ActivityKind], window_days: u32) -> Self {
        Self::CountOfKind {
            kinds: kinds.to_vec(),
            window_days: Some(window_days),
        }
    }

    pub fn streak(kinds: &[ActivityKind]) -> Self {
        Self::Streak {
            kinds: kinds.to_vec(),
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, Self::Manual)
    }
}

/// Achievement definition with all metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: AchievementCategory,
    pub max_progress: u32,
    pub reward: Reward,
    pub condition: Condition,
    /// Difficulty tag, used for grouping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<RewardTier>,
}

impl AchievementDefinition {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        category: AchievementCategory,
        max_progress: u32,
        reward: Reward,
        condition: Condition,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            category,
            max_progress,
            reward,
            condition,
            tier: None,
        }
    }

    pub fn with_tier(mut self, tier: RewardTier) -> Self {
        self.tier = Some(tier);
        self
    }
}

/// Built-in catalog
pub fn builtin_definitions() -> Vec<AchievementDefinition> {
    use AchievementCategory as Cat;
    use ActivityKind as Kind;
    use RewardTier::*;

    let training = ActivityKind::training();

    vec![
        // === MILESTONE ===
        AchievementDefinition::new(
            "first-workout",
            "First Workout",
            "Complete your first workout",
            Cat::Milestone,
            1,
            Reward::tier(Easy),
            Condition::count(&[Kind::Workout]),
        )
        .with_tier(Easy),
        AchievementDefinition::new(
            "fitness-test",
            "Fitness Check",
            "Complete a fitness test",
            Cat::Milestone,
            1,
            Reward::tier(Medium),
            Condition::count(&[Kind::FitnessTest]),
        )
        .with_tier(Medium),
        AchievementDefinition::new(
            "complete-profile",
            "Complete Profile",
            "Fill in all of your personal information",
            Cat::Milestone,
            1,
            Reward::tier(Easy),
            Condition::Manual,
        )
        .with_tier(Easy),
        AchievementDefinition::new(
            "legendary-athlete",
            "Legendary Athlete",
            "Reach level 50",
            Cat::Milestone,
            1,
            Reward::tier(Legendary),
            Condition::LevelThreshold { level: 50 },
        )
        .with_tier(Legendary),
        // === CONSISTENCY ===
        AchievementDefinition::new(
            "week-consistency",
            "Getting the Hang of It",
            "Train 3 days within one week",
            Cat::Consistency,
            3,
            Reward::with_coins(100, 50),
            Condition::count_within(training, 7),
        ),
        AchievementDefinition::new(
            "three-day-streak",
            "Early Consistency",
            "Train 3 days in a row",
            Cat::Consistency,
            3,
            Reward::with_coins(150, 75),
            Condition::streak(training),
        ),
        AchievementDefinition::new(
            "workout-streak-7",
            "Weekly Constancy",
            "Train 7 days in a row",
            Cat::Consistency,
            7,
            Reward::tier(Medium),
            Condition::streak(training),
        )
        .with_tier(Medium),
        AchievementDefinition::new(
            "workout-streak-30",
            "Fitness Master",
            "Train 30 days in a row",
            Cat::Consistency,
            30,
            Reward::tier(Hard),
            Condition::streak(training),
        )
        .with_tier(Hard),
        AchievementDefinition::new(
            "first-month",
            "Month of Constancy",
            "Train at least 3 times a week for 4 weeks running",
            Cat::Consistency,
            4,
            Reward::with_coins(300, 150),
            Condition::Manual,
        ),
        AchievementDefinition::new(
            "class-participant",
            "Active Participant",
            "Join 5 guided classes",
            Cat::Consistency,
            5,
            Reward::tier(Medium),
            Condition::count(&[Kind::Class]),
        )
        .with_tier(Medium),
        // === CARDIO ===
        AchievementDefinition::new(
            "weekly-cardio",
            "Athlete's Heart",
            "Complete 3 cardio sessions within one week",
            Cat::Cardio,
            3,
            Reward::with_coins(200, 100),
            Condition::count_within(&[Kind::Cardio], 7),
        ),
        AchievementDefinition::new(
            "cardio-master",
            "Cardio Master",
            "Complete 10 cardio sessions",
            Cat::Cardio,
            10,
            Reward::tier(Hard),
            Condition::count(&[Kind::Cardio]),
        )
        .with_tier(Hard),
        // === BODY COMPOSITION ===
        AchievementDefinition::new(
            "measurement-tracker",
            "Progress Tracker",
            "Log your body measurements",
            Cat::BodyComposition,
            1,
            Reward::tier(Easy),
            Condition::count(&[Kind::BodyMeasurement]),
        )
        .with_tier(Easy),
        AchievementDefinition::new(
            "photo-progress",
            "Visual Progress",
            "Upload a progress photo",
            Cat::BodyComposition,
            1,
            Reward::tier(Medium),
            Condition::count(&[Kind::ProgressPhoto]),
        )
        .with_tier(Medium),
        AchievementDefinition::new(
            "waist-reduction",
            "Wasp Waist",
            "Reduce your waist measurement by 2 cm",
            Cat::BodyComposition,
            2,
            Reward::with_coins(250, 125),
            Condition::Manual,
        ),
        AchievementDefinition::new(
            "glute-increase",
            "Steel Glutes",
            "Increase your glute measurement by 2 cm",
            Cat::BodyComposition,
            2,
            Reward::with_coins(250, 125),
            Condition::Manual,
        ),
        AchievementDefinition::new(
            "weight-loss-strength",
            "Lean and Strong",
            "Lose body weight over 6 weeks while your lifts keep rising",
            Cat::BodyComposition,
            6,
            Reward::with_coins(500, 250),
            Condition::Manual,
        ),
        // === TECHNIQUE ===
        AchievementDefinition::new(
            "rest-pause",
            "Advanced Technique I",
            "Use the rest-pause technique in at least one exercise",
            Cat::Technique,
            1,
            Reward::with_coins(200, 100),
            Condition::Manual,
        ),
        AchievementDefinition::new(
            "pyramid-ascending",
            "Ascending Pyramid",
            "Program an ascending pyramid set in at least one exercise",
            Cat::Technique,
            1,
            Reward::with_coins(200, 100),
            Condition::Manual,
        ),
        AchievementDefinition::new(
            "first-hiit",
            "HIIT Rookie",
            "Finish your first high-intensity interval session",
            Cat::Technique,
            1,
            Reward::with_coins(300, 150),
            Condition::Manual,
        ),
        AchievementDefinition::new(
            "form-check",
            "Form Focus",
            "Submit 3 form checks",
            Cat::Technique,
            3,
            Reward::tier(Easy),
            Condition::count(&[Kind::FormCheck]),
        )
        .with_tier(Easy),
        // === LIFTING ===
        AchievementDefinition::new(
            "first-squat",
            "First Squat",
            "Perform a free barbell back squat with good technique",
            Cat::Lifting,
            1,
            Reward::with_coins(400, 200),
            Condition::Manual,
        ),
        AchievementDefinition::new(
            "bodyweight-squat",
            "Bodyweight Squat",
            "Squat your own body weight with good technique",
            Cat::Lifting,
            1,
            Reward::with_coins(500, 250),
            Condition::Manual,
        ),
        AchievementDefinition::new(
            "first-deadlift",
            "First Deadlift",
            "Perform a free barbell deadlift with good technique",
            Cat::Lifting,
            1,
            Reward::with_coins(400, 200),
            Condition::Manual,
        ),
        AchievementDefinition::new(
            "first-bench",
            "First Bench Press",
            "Perform a flat barbell bench press with good technique",
            Cat::Lifting,
            1,
            Reward::with_coins(400, 200),
            Condition::Manual,
        ),
        AchievementDefinition::new(
            "first-pushup",
            "First Push-up",
            "Perform a push-up with good technique",
            Cat::Lifting,
            1,
            Reward::with_coins(200, 100),
            Condition::Manual,
        ),
        AchievementDefinition::new(
            "first-pullup",
            "First Pull-up",
            "Perform a pull-up with good technique",
            Cat::Lifting,
            1,
            Reward::with_coins(300, 150),
            Condition::Manual,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_rewards() {
        assert_eq!(Reward::tier(RewardTier::Easy).xp, 200);
        assert_eq!(Reward::tier(RewardTier::Legendary).xp, 500);
        assert_eq!(Reward::tier(RewardTier::Hard).coins, None);
    }

    #[test]
    fn test_category_parse() {
        for category in AchievementCategory::all() {
            assert_eq!(AchievementCategory::from_str(category.as_str()), Some(*category));
        }
        assert_eq!(
            AchievementCategory::from_str("composition"),
            Some(AchievementCategory::BodyComposition)
        );
    }

    #[test]
    fn test_condition_serde_shape() {
        let cond = Condition::count_within(&[ActivityKind::Cardio], 7);
        let json = serde_json::to_value(&cond).unwrap();
        assert_eq!(json["type"], "count-of-kind");
        assert_eq!(json["kinds"][0], "cardio");
        assert_eq!(json["window_days"], 7);

        let manual: Condition = serde_json::from_str(r#"{"type":"manual"}"#).unwrap();
        assert!(manual.is_manual());
    }

    #[test]
    fn test_builtin_ids_are_unique() {
        let defs = builtin_definitions();
        let mut ids: Vec<_> = defs.iter().map(|d| d.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), defs.len());
    }
}
