//! Init command implementation

use anyhow::{bail, Result};
use std::path::PathBuf;

use fitxp::config::{write_atomic, Config};

/// Default configuration content for fitxp init
pub const DEFAULT_CONFIG: &str = r#"# fitxp Configuration
# ===================
#
# Controls the XP a reported activity is worth by default and, optionally,
# the achievement catalog used instead of the built-in one.

# ============================================================================
# SETTINGS
# ============================================================================
#
#   recent_limit - Entries shown by recent activity listings (default: 10)

[settings]
recent_limit = 10

# ============================================================================
# XP - Default reward per activity kind
# ============================================================================
#
# Used when an activity is reported without an explicit XP amount.
# "achievement-grant" is reserved for rewards and cannot be configured.

[xp]
workout = 100
cardio = 100
class = 100
fitness-test = 100
body-measurement = 50
progress-photo = 50
form-check = 30
profile-update = 10

# ============================================================================
# ACHIEVEMENTS - Custom catalog (optional)
# ============================================================================
#
# Declaring any [[achievement]] replaces the built-in catalog entirely.
#
# Fields:
#   id, name, description
#   category     - milestone, consistency, cardio, body-composition, technique, lifting
#   max_progress - Progress needed to unlock (default: 1)
#   reward_xp    - XP granted on unlock, or
#   tier         - easy (200), medium (300), hard (400), legendary (500)
#   coins        - Optional secondary currency
#   condition    - One of:
#                    { type = "level-threshold", level = 20 }
#                    { type = "count-of-kind", kinds = ["cardio"], window_days = 7 }
#                    { type = "streak", kinds = ["workout", "cardio", "class"] }
#                    { type = "manual" }
#
# [[achievement]]
# id = "weekly-cardio"
# name = "Weekly Cardio"
# description = "Complete 3 cardio sessions in a week"
# category = "cardio"
# max_progress = 3
# tier = "medium"
# condition = { type = "count-of-kind", kinds = ["cardio"], window_days = 7 }
"#;

/// Write the default configuration file
pub fn init_command(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    // Default to global config path
    let config_path = config_path.unwrap_or_else(Config::global_config_path);

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    write_atomic(&config_path, DEFAULT_CONFIG)?;
    println!("Created: {}", config_path.display());

    Ok(())
}
