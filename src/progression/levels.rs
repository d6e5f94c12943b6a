//! XP and Level system
//!
//! Levels follow a stepped schedule: the XP needed to climb out of a level
//! depends on the level being climbed, not on the total.

use serde::{Deserialize, Serialize};

use super::ledger::ActivityKind;

/// A run of consecutive levels sharing one per-level XP requirement
#[derive(Debug, Clone, Copy)]
struct LevelBand {
    /// Number of levels in the band (None = open-ended)
    levels: Option<u32>,
    xp_per_level: u64,
}

/// Bands in climbing order: levels 1-10, 11-20, then 21 onwards
const LEVEL_BANDS: &[LevelBand] = &[
    LevelBand {
        levels: Some(10),
        xp_per_level: 100,
    },
    LevelBand {
        levels: Some(10),
        xp_per_level: 200,
    },
    LevelBand {
        levels: None,
        xp_per_level: 300,
    },
];

/// XP required to advance out of `level`
pub fn xp_required_for(level: u64) -> u64 {
    let mut first = 1u64;
    for band in LEVEL_BANDS {
        match band.levels {
            Some(count) if level >= first + u64::from(count) => first += u64::from(count),
            _ => return band.xp_per_level,
        }
    }
    LEVEL_BANDS[LEVEL_BANDS.len() - 1].xp_per_level
}

/// Derived level position for a cumulative XP total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelState {
    pub level: u64,
    /// XP earned inside the current level
    pub xp_into_level: u64,
    /// XP the current level requires to advance
    pub xp_to_next_level: u64,
    pub progress_percent: u8,
    pub total_xp: u64,
}

impl LevelState {
    /// XP still missing before the next level
    pub fn xp_remaining(&self) -> u64 {
        self.xp_to_next_level - self.xp_into_level
    }

    pub fn title(&self) -> &'static str {
        level_title(self.level)
    }

    pub fn badge(&self) -> Option<&'static str> {
        level_badge(self.level)
    }
}

/// Map cumulative XP to a level.
///
/// Whole bands are consumed at once and the open-ended band is solved by
/// division; the result is identical to climbing one level at a time.
pub fn compute_level(total_xp: u64) -> LevelState {
    let mut level: u64 = 1;
    let mut remaining = total_xp;

    for band in LEVEL_BANDS {
        match band.levels {
            Some(count) => {
                let band_cost = band.xp_per_level * u64::from(count);
                if remaining < band_cost {
                    let climbed = remaining / band.xp_per_level;
                    level += climbed;
                    remaining -= climbed * band.xp_per_level;
                    return finish(level, remaining, band.xp_per_level, total_xp);
                }
                level += u64::from(count);
                remaining -= band_cost;
            }
            None => {
                let climbed = remaining / band.xp_per_level;
                level += climbed;
                remaining -= climbed * band.xp_per_level;
                return finish(level, remaining, band.xp_per_level, total_xp);
            }
        }
    }

    finish(level, remaining, xp_required_for(level), total_xp)
}

fn finish(level: u64, xp_into_level: u64, xp_to_next_level: u64, total_xp: u64) -> LevelState {
    LevelState {
        level,
        xp_into_level,
        xp_to_next_level,
        progress_percent: rounded_percent(xp_into_level, xp_to_next_level),
        total_xp,
    }
}

/// round(100 * part / whole), half away from zero
fn rounded_percent(part: u64, whole: u64) -> u8 {
    if whole == 0 {
        return 100;
    }
    let scaled = (u128::from(part) * 200 + u128::from(whole)) / (u128::from(whole) * 2);
    scaled.min(100) as u8
}

/// Display title for a level
pub fn level_title(level: u64) -> &'static str {
    match level {
        0..=4 => "Rookie",
        5..=9 => "Committed",
        10..=14 => "Strong",
        15..=19 => "Disciplined",
        20..=24 => "Relentless",
        25..=29 => "Legendary",
        30..=39 => "Champion",
        40..=49 => "Titan",
        _ => "Infinite",
    }
}

/// Badge earned once a level milestone is reached
pub fn level_badge(level: u64) -> Option<&'static str> {
    match level {
        100.. => Some("Diamond"),
        50.. => Some("Gold"),
        25.. => Some("Silver"),
        10.. => Some("Bronze"),
        _ => None,
    }
}

/// A level up event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    pub old_level: u64,
    pub new_level: u64,
    pub new_title: String,
}

impl LevelUp {
    /// Compare two states and report a level up if one happened
    pub fn between(before: &LevelState, after: &LevelState) -> Option<Self> {
        (after.level > before.level).then(|| LevelUp {
            old_level: before.level,
            new_level: after.level,
            new_title: after.title().to_string(),
        })
    }
}

/// Default XP for each reportable activity kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct XpRewards {
    pub workout: u64,
    pub cardio: u64,
    pub class: u64,
    pub fitness_test: u64,
    pub body_measurement: u64,
    pub progress_photo: u64,
    pub form_check: u64,
    pub profile_update: u64,
}

impl Default for XpRewards {
    fn default() -> Self {
        Self {
            workout: 100,
            cardio: 100,
            class: 100,
            fitness_test: 100,
            body_measurement: 50,
            progress_photo: 50,
            form_check: 30,
            profile_update: 10,
        }
    }
}

impl XpRewards {
    /// XP for `kind`; grants carry their own amount and map to None
    pub fn for_kind(&self, kind: ActivityKind) -> Option<u64> {
        match kind {
            ActivityKind::Workout => Some(self.workout),
            ActivityKind::Cardio => Some(self.cardio),
            ActivityKind::Class => Some(self.class),
            ActivityKind::FitnessTest => Some(self.fitness_test),
            ActivityKind::BodyMeasurement => Some(self.body_measurement),
            ActivityKind::ProgressPhoto => Some(self.progress_photo),
            ActivityKind::FormCheck => Some(self.form_check),
            ActivityKind::ProfileUpdate => Some(self.profile_update),
            ActivityKind::AchievementGrant => None,
        }
    }
}
