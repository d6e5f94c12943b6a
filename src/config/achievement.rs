//! `[[achievement]]` catalog entries

use serde::{Deserialize, Serialize};

use crate::error::ProgressionError;
use crate::progression::{AchievementCategory, AchievementDefinition, Condition, Reward, RewardTier};

/// Achievement as written in config.toml
///
/// The reward is either an explicit `reward_xp` or a difficulty `tier`;
/// `reward_xp` wins when both are given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementToml {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: AchievementCategory,
    #[serde(default = "default_max_progress")]
    pub max_progress: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_xp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<RewardTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coins: Option<u64>,
    pub condition: Condition,
}

fn default_max_progress() -> i64 {
    1
}

impl AchievementToml {
    /// Resolve the reward and bounds into a catalog definition
    pub fn to_definition(&self) -> Result<AchievementDefinition, ProgressionError> {
        let max_progress = u32::try_from(self.max_progress)
            .ok()
            .filter(|&m| m > 0)
            .ok_or_else(|| {
                ProgressionError::invalid_definition(
                    &self.id,
                    format!("max_progress must be at least 1, got {}", self.max_progress),
                )
            })?;

        let xp = match (self.reward_xp, self.tier) {
            (Some(xp), _) => xp,
            (None, Some(tier)) => tier.xp(),
            (None, None) => {
                return Err(ProgressionError::invalid_definition(
                    &self.id,
                    "reward needs either reward_xp or tier",
                ))
            }
        };

        let mut definition = AchievementDefinition::new(
            self.id.clone(),
            self.name.clone(),
            self.description.clone(),
            self.category,
            max_progress,
            Reward {
                xp,
                coins: self.coins,
            },
            self.condition.clone(),
        );
        definition.tier = self.tier;
        Ok(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> AchievementToml {
        AchievementToml {
            id: "squat".to_string(),
            name: "Squat".to_string(),
            description: String::new(),
            category: AchievementCategory::Lifting,
            max_progress: 1,
            reward_xp: None,
            tier: Some(RewardTier::Hard),
            coins: None,
            condition: Condition::Manual,
        }
    }

    #[test]
    fn test_tier_resolves_to_xp() {
        let def = entry().to_definition().unwrap();
        assert_eq!(def.reward.xp, 400);
        assert_eq!(def.tier, Some(RewardTier::Hard));
    }

    #[test]
    fn test_explicit_xp_wins_over_tier() {
        let mut e = entry();
        e.reward_xp = Some(42);
        let def = e.to_definition().unwrap();
        assert_eq!(def.reward.xp, 42);
        assert_eq!(def.tier, Some(RewardTier::Hard));

        e.tier = None;
        assert_eq!(e.to_definition().unwrap().tier, None);
    }

    #[test]
    fn test_rejects_bad_bounds_and_missing_reward() {
        let mut e = entry();
        e.max_progress = 0;
        assert!(matches!(
            e.to_definition(),
            Err(ProgressionError::InvalidDefinition { .. })
        ));

        let mut e = entry();
        e.tier = None;
        assert!(matches!(
            e.to_definition(),
            Err(ProgressionError::InvalidDefinition { .. })
        ));
    }
}
