//! Configuration loading and management

mod achievement;
mod io;
mod settings;

pub use achievement::AchievementToml;
pub use io::write_atomic;
pub use settings::Settings;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::progression::{Catalog, ProgressionManager, XpRewards};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub settings: Settings,

    /// Default XP per activity kind
    #[serde(default)]
    pub xp: XpRewards,

    /// Custom achievement catalog (replaces the built-in one when non-empty)
    #[serde(default, rename = "achievement", skip_serializing_if = "Vec::is_empty")]
    pub achievements: Vec<AchievementToml>,
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config")
    }

    /// Build the validated catalog this configuration describes
    pub fn catalog(&self) -> Result<Catalog> {
        if self.achievements.is_empty() {
            return Catalog::builtin().context("Built-in catalog failed validation");
        }

        let definitions = self
            .achievements
            .iter()
            .map(AchievementToml::to_definition)
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid [[achievement]] entry")?;
        Catalog::new(definitions).context("Invalid achievement catalog")
    }

    /// Create a fresh per-user manager over `catalog` with the configured XP table
    pub fn manager(&self, catalog: std::sync::Arc<Catalog>) -> ProgressionManager {
        ProgressionManager::new(catalog).with_xp_rewards(self.xp.clone())
    }
}
