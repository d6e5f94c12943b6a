//! Settings configuration types

use serde::{Deserialize, Serialize};

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Number of entries shown by "recent activity" listings
    #[serde(default = "default_recent_limit")]
    pub recent_limit: i64,
}

fn default_recent_limit() -> i64 {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
        }
    }
}
