//! Catalog command implementation

use anyhow::{bail, Result};

use fitxp::config::Config;
use fitxp::progression::{ActivityKind, AchievementCategory, AchievementDefinition, Condition};

/// List the active achievement catalog
pub fn catalog_command(config: &Config, category: Option<String>, json: bool) -> Result<()> {
    let catalog = config.catalog()?;

    let definitions: Vec<&AchievementDefinition> = match category {
        Some(name) => {
            let Some(category) = AchievementCategory::from_str(&name.to_lowercase()) else {
                let known: Vec<_> = AchievementCategory::all().iter().map(|c| c.as_str()).collect();
                bail!("Unknown category: {}\nExpected one of: {}", name, known.join(", "));
            };
            catalog.by_category(category)
        }
        None => catalog.definitions().iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&definitions)?);
        return Ok(());
    }

    if definitions.is_empty() {
        println!("No achievements found.");
        return Ok(());
    }

    println!("Achievements ({}):\n", definitions.len());

    for def in definitions {
        print!("  {} [{}] {} - {} XP", def.id, def.category, def.name, def.reward.xp);
        if let Some(coins) = def.reward.coins {
            print!(" + {} coins", coins);
        }
        println!();

        if !def.description.is_empty() {
            println!("    {}", def.description);
        }
        println!("    Unlocks: {}", describe_condition(&def.condition, def.max_progress));
        println!();
    }

    Ok(())
}

fn describe_condition(condition: &Condition, max_progress: u32) -> String {
    match condition {
        Condition::LevelThreshold { level } => format!("reach level {}", level),
        Condition::CountOfKind {
            kinds,
            window_days: Some(days),
        } => format!("{} x {} within {} days", max_progress, kind_list(kinds), days),
        Condition::CountOfKind { kinds, .. } => format!("{} x {}", max_progress, kind_list(kinds)),
        Condition::Streak { kinds } => format!("{} day {} streak", max_progress, kind_list(kinds)),
        Condition::Manual => "awarded by coach or app".to_string(),
    }
}

fn kind_list(kinds: &[ActivityKind]) -> String {
    kinds.iter().map(|k| k.as_str()).collect::<Vec<_>>().join("/")
}
