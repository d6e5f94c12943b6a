//! Activity ledger
//!
//! Append-only record of every XP-granting event, including the grants
//! produced by unlocked achievements.

use std::fmt;
use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ProgressionError, Result};

/// Kind of activity that produced XP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityKind {
    Workout,
    Cardio,
    Class,
    FitnessTest,
    BodyMeasurement,
    ProgressPhoto,
    FormCheck,
    ProfileUpdate,
    /// XP paid out for an unlocked achievement
    AchievementGrant,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workout => "workout",
            Self::Cardio => "cardio",
            Self::Class => "class",
            Self::FitnessTest => "fitness-test",
            Self::BodyMeasurement => "body-measurement",
            Self::ProgressPhoto => "progress-photo",
            Self::FormCheck => "form-check",
            Self::ProfileUpdate => "profile-update",
            Self::AchievementGrant => "achievement-grant",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "workout" => Some(Self::Workout),
            "cardio" => Some(Self::Cardio),
            "class" => Some(Self::Class),
            "fitness-test" => Some(Self::FitnessTest),
            "body-measurement" => Some(Self::BodyMeasurement),
            "progress-photo" => Some(Self::ProgressPhoto),
            "form-check" => Some(Self::FormCheck),
            "profile-update" => Some(Self::ProfileUpdate),
            "achievement-grant" => Some(Self::AchievementGrant),
            _ => None,
        }
    }

    /// All kinds a caller may report (everything except grants)
    pub fn reportable() -> &'static [ActivityKind] {
        &[
            Self::Workout,
            Self::Cardio,
            Self::Class,
            Self::FitnessTest,
            Self::BodyMeasurement,
            Self::ProgressPhoto,
            Self::FormCheck,
            Self::ProfileUpdate,
        ]
    }

    /// Training sessions: the kinds that keep a streak alive
    pub fn training() -> &'static [ActivityKind] {
        &[Self::Workout, Self::Cardio, Self::Class]
    }

    pub fn is_grant(&self) -> bool {
        matches!(self, Self::AchievementGrant)
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ledger-assigned record identifier, starting at 1.
///
/// Ids are positional. A call that fails is rolled back before any of its
/// records are returned, so the next record reuses the discarded id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(pub u64);

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single immutable ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: ActivityId,
    pub kind: ActivityKind,
    pub xp: u64,
    pub occurred_at: DateTime<Utc>,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Append-only activity log with a running XP total
#[derive(Debug, Clone, Default)]
pub struct ActivityLedger {
    records: Vec<ActivityRecord>,
    total_xp: u64,
}

impl ActivityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record stamped with the current time
    pub fn append(
        &mut self,
        kind: ActivityKind,
        xp: i64,
        label: impl Into<String>,
        note: Option<String>,
    ) -> Result<ActivityRecord> {
        self.append_at(kind, xp, label, note, Utc::now())
    }

    /// Append a record with an explicit timestamp.
    ///
    /// Fails without touching the ledger when `xp` is negative or when the
    /// running total would overflow.
    pub fn append_at(
        &mut self,
        kind: ActivityKind,
        xp: i64,
        label: impl Into<String>,
        note: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> Result<ActivityRecord> {
        let xp = u64::try_from(xp).map_err(|_| {
            ProgressionError::invalid_argument(format!("XP must be non-negative, got {}", xp))
        })?;
        self.push(kind, xp, label.into(), note, occurred_at)
    }

    pub(crate) fn push(
        &mut self,
        kind: ActivityKind,
        xp: u64,
        label: String,
        note: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> Result<ActivityRecord> {
        let total_xp = self.total_xp.checked_add(xp).ok_or_else(|| {
            ProgressionError::invalid_argument(format!(
                "Adding {} XP overflows the ledger total of {}",
                xp, self.total_xp
            ))
        })?;

        let record = ActivityRecord {
            id: ActivityId(self.records.len() as u64 + 1),
            kind,
            xp,
            occurred_at,
            label,
            note,
        };
        self.records.push(record.clone());
        self.total_xp = total_xp;
        Ok(record)
    }

    pub fn total_xp(&self) -> u64 {
        self.total_xp
    }

    /// Most recent `limit` records, newest first
    pub fn recent(&self, limit: i64) -> Vec<ActivityRecord> {
        let Ok(limit) = usize::try_from(limit) else {
            return Vec::new();
        };
        self.records.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ActivityRecord> {
        self.records.iter()
    }

    /// Non-grant records whose kind is in `kinds`, optionally limited to
    /// those that occurred inside `window` (both ends inclusive)
    pub fn count_matching(
        &self,
        kinds: &[ActivityKind],
        window: Option<RangeInclusive<DateTime<Utc>>>,
    ) -> u64 {
        self.qualifying(kinds)
            .filter(|r| window.as_ref().map_or(true, |w| w.contains(&r.occurred_at)))
            .count() as u64
    }

    /// Non-grant records whose kind is in `kinds`
    pub(crate) fn qualifying<'a>(
        &'a self,
        kinds: &'a [ActivityKind],
    ) -> impl Iterator<Item = &'a ActivityRecord> + 'a {
        self.records
            .iter()
            .filter(move |r| !r.kind.is_grant() && kinds.contains(&r.kind))
    }

    /// Drop every record past `len`, restoring an earlier snapshot
    pub(crate) fn truncate(&mut self, len: usize) {
        if len >= self.records.len() {
            return;
        }
        self.records.truncate(len);
        self.total_xp = self.records.iter().map(|r| r.xp).sum();
    }
}
