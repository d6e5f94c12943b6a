//! Validated, immutable achievement catalog
//!
//! A catalog is built once and shared between any number of per-user
//! managers through an `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use super::definitions::{
    builtin_definitions, AchievementCategory, AchievementDefinition, Condition, RewardTier,
};
use super::ledger::ActivityKind;
use crate::error::{ProgressionError, Result};

#[derive(Debug, Clone)]
pub struct Catalog {
    definitions: Vec<AchievementDefinition>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Validate and register a set of definitions, preserving their order
    pub fn new(definitions: Vec<AchievementDefinition>) -> Result<Self> {
        let mut index = HashMap::with_capacity(definitions.len());
        for (pos, def) in definitions.iter().enumerate() {
            validate(def)?;
            if index.insert(def.id.clone(), pos).is_some() {
                return Err(ProgressionError::invalid_definition(
                    &def.id,
                    "duplicate achievement id",
                ));
            }
        }
        Ok(Self { definitions, index })
    }

    /// The built-in fitness catalog
    pub fn builtin() -> Result<Self> {
        Self::new(builtin_definitions())
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn get(&self, id: &str) -> Option<&AchievementDefinition> {
        self.index.get(id).map(|&pos| &self.definitions[pos])
    }

    /// Definitions in registration order
    pub fn definitions(&self) -> &[AchievementDefinition] {
        &self.definitions
    }

    pub fn by_category(&self, category: AchievementCategory) -> Vec<&AchievementDefinition> {
        self.definitions
            .iter()
            .filter(|d| d.category == category)
            .collect()
    }

    /// Definitions tagged with `tier`, in registration order
    pub fn by_tier(&self, tier: RewardTier) -> Vec<&AchievementDefinition> {
        self.definitions
            .iter()
            .filter(|d| d.tier == Some(tier))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Total XP on offer across all achievements
    pub fn total_reward_xp(&self) -> u64 {
        self.definitions.iter().map(|d| d.reward.xp).sum()
    }
}

fn validate(def: &AchievementDefinition) -> Result<()> {
    let fail = |reason: &str| Err(ProgressionError::invalid_definition(&def.id, reason));

    if def.id.trim().is_empty() {
        return fail("id must not be blank");
    }
    if def.max_progress == 0 {
        return fail("max_progress must be at least 1");
    }

    match &def.condition {
        Condition::LevelThreshold { level } if *level == 0 => {
            fail("level threshold must be at least 1")
        }
        Condition::CountOfKind { kinds, window_days } => {
            if *window_days == Some(0) {
                return fail("window_days must be at least 1");
            }
            validate_kinds(def, kinds)
        }
        Condition::Streak { kinds } => validate_kinds(def, kinds),
        _ => Ok(()),
    }
}

fn validate_kinds(def: &AchievementDefinition, kinds: &[ActivityKind]) -> Result<()> {
    if kinds.is_empty() {
        return Err(ProgressionError::invalid_definition(
            &def.id,
            "condition must name at least one activity kind",
        ));
    }
    if kinds.iter().any(|k| k.is_grant()) {
        return Err(ProgressionError::invalid_definition(
            &def.id,
            "achievement grants cannot satisfy a condition",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::Reward;

    fn def(id: &str, max_progress: u32, condition: Condition) -> AchievementDefinition {
        AchievementDefinition::new(
            id,
            id,
            "test",
            AchievementCategory::Milestone,
            max_progress,
            Reward::xp(10),
            condition,
        )
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::builtin().unwrap();
        assert!(!catalog.is_empty());
        assert!(catalog.get("legendary-athlete").is_some());
        assert!(catalog.get("nope").is_none());
        assert!(!catalog.by_category(AchievementCategory::Lifting).is_empty());
    }

    #[test]
    fn test_zero_max_progress_is_invalid_definition() {
        let err = Catalog::new(vec![def("broken", 0, Condition::Manual)]).unwrap_err();
        assert_eq!(
            err,
            ProgressionError::InvalidDefinition {
                id: "broken".to_string(),
                reason: "max_progress must be at least 1".to_string(),
            }
        );
    }

    #[test]
    fn test_rejects_duplicates_and_bad_conditions() {
        let dup = Catalog::new(vec![
            def("a", 1, Condition::Manual),
            def("a", 1, Condition::Manual),
        ]);
        assert!(matches!(dup, Err(ProgressionError::InvalidDefinition { .. })));

        let cases = [
            def("grant", 1, Condition::count(&[ActivityKind::AchievementGrant])),
            def("empty", 1, Condition::streak(&[])),
            def("level", 1, Condition::LevelThreshold { level: 0 }),
            def("window", 1, Condition::count_within(&[ActivityKind::Cardio], 0)),
            def("  ", 1, Condition::Manual),
        ];
        for case in cases {
            assert!(
                matches!(Catalog::new(vec![case.clone()]), Err(ProgressionError::InvalidDefinition { .. })),
                "expected {} to be rejected",
                case.id
            );
        }
    }

    #[test]
    fn test_preserves_registration_order() {
        let catalog = Catalog::new(vec![
            def("z", 1, Condition::Manual),
            def("a", 1, Condition::Manual),
        ])
        .unwrap();
        let ids: Vec<_> = catalog.definitions().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a"]);
        assert_eq!(catalog.total_reward_xp(), 20);
    }
}
