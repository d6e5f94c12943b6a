//! Replay command implementation
//!
//! Feeds a JSON script of activities and collaborator decisions through a
//! fresh progression manager and reports what each step unlocked.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use fitxp::config::Config;
use fitxp::progression::{
    ActivityKind, Clock, LevelState, LevelUp, ManualClock, ProgressionManager, StreakInfo,
};

/// One entry of a replay script
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Step {
    /// Report an activity; `xp` falls back to the configured default
    Activity {
        kind: ActivityKind,
        #[serde(default)]
        xp: Option<i64>,
        #[serde(default)]
        label: String,
        #[serde(default)]
        note: Option<String>,
        #[serde(default)]
        at: Option<DateTime<Utc>>,
    },
    ForceUnlock {
        id: String,
        #[serde(default)]
        at: Option<DateTime<Utc>>,
    },
    Progress {
        id: String,
        progress: i64,
        #[serde(default)]
        at: Option<DateTime<Utc>>,
    },
}

impl Step {
    fn at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Activity { at, .. } | Self::ForceUnlock { at, .. } | Self::Progress { at, .. } => {
                *at
            }
        }
    }
}

/// What a single step changed
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub total_xp: u64,
    pub unlocked: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_up: Option<LevelUp>,
}

/// Final state after the whole script ran
#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    pub steps: Vec<StepReport>,
    pub level: LevelState,
    pub unlocked: usize,
    pub achievements: usize,
    pub coins: u64,
    pub streak: StreakInfo,
    /// Whether the streak still counts as of the last step
    pub streak_active: bool,
    pub recent: Vec<String>,
}

/// Parse a script file
pub fn load_script(path: &Path) -> Result<Vec<Step>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read replay script: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse replay script: {}", path.display()))
}

/// Run `steps` against a fresh manager built from `config`
pub fn replay(config: &Config, steps: &[Step], start: DateTime<Utc>) -> Result<ReplaySummary> {
    let catalog = config.catalog()?.shared();
    let clock = ManualClock::new(start);
    let mut manager = config.manager(catalog).with_clock(clock.clone());

    let mut reports = Vec::with_capacity(steps.len());
    for (index, step) in steps.iter().enumerate() {
        let number = index + 1;
        if let Some(at) = step.at() {
            clock.set(at);
        }
        let report = run_step(&mut manager, step, number)
            .with_context(|| format!("Step {} failed", number))?;
        reports.push(report);
    }

    let recent = manager
        .recent_activity(config.settings.recent_limit)
        .into_iter()
        .map(|r| format!("{} {} {} (+{} XP)", r.id, r.kind, r.label, r.xp))
        .collect();

    let streak = manager.training_streak();
    let streak_active = streak.is_active(clock.now().date_naive());

    Ok(ReplaySummary {
        steps: reports,
        level: manager.current_level(),
        unlocked: manager.unlocked_count(),
        achievements: manager.achievement_count(),
        coins: manager.total_coins(),
        streak,
        streak_active,
        recent,
    })
}

fn run_step(manager: &mut ProgressionManager, step: &Step, number: usize) -> Result<StepReport> {
    let (level_up, unlocked) = match step {
        Step::Activity {
            kind,
            xp,
            label,
            note,
            ..
        } => {
            let outcome = match xp {
                Some(xp) => manager.record_activity(*kind, *xp, label.as_str(), note.clone())?,
                None => manager.record_default(*kind, label.as_str(), note.clone())?,
            };
            let unlocked = names(outcome.unlocked());
            (outcome.level_up, unlocked)
        }
        Step::ForceUnlock { id, .. } => {
            let outcome = manager.force_unlock(id)?;
            let unlocked = names(outcome.unlocked());
            (outcome.level_up, unlocked)
        }
        Step::Progress { id, progress, .. } => {
            let outcome = manager.report_progress(id, *progress)?;
            let unlocked = names(outcome.unlocked());
            (outcome.level_up, unlocked)
        }
    };

    Ok(StepReport {
        step: number,
        total_xp: manager.ledger().total_xp(),
        unlocked,
        level_up,
    })
}

fn names<'a>(
    statuses: impl Iterator<Item = &'a fitxp::progression::AchievementStatus>,
) -> Vec<String> {
    statuses.map(|s| s.definition.name.clone()).collect()
}

/// Replay a script file and print the result
pub fn replay_command(config: &Config, file: &Path, json: bool) -> Result<()> {
    let steps = load_script(file)?;
    let summary = replay(config, &steps, Utc::now())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    for report in &summary.steps {
        for name in &report.unlocked {
            println!("  [step {}] Unlocked: {}", report.step, name);
        }
        if let Some(up) = &report.level_up {
            println!(
                "  [step {}] Level up! {} -> {} ({})",
                report.step, up.old_level, up.new_level, up.new_title
            );
        }
    }

    let level = &summary.level;
    println!();
    println!(
        "Level {} - {} ({}/{} XP, {}%)",
        level.level,
        level.title(),
        level.xp_into_level,
        level.xp_to_next_level,
        level.progress_percent
    );
    println!("Total XP: {}", level.total_xp);
    println!(
        "Achievements: {}/{} unlocked, {} coins",
        summary.unlocked, summary.achievements, summary.coins
    );
    println!(
        "Training streak: {} days (best {}){}{}",
        summary.streak.current,
        summary.streak.best,
        last_day(summary.streak.last_activity_day),
        if summary.streak_active { "" } else { ", lapsed" }
    );

    if !summary.recent.is_empty() {
        println!("\nRecent activity:");
        for line in &summary.recent {
            println!("  {}", line);
        }
    }

    Ok(())
}

fn last_day(day: Option<NaiveDate>) -> String {
    day.map(|d| format!(", last {}", d)).unwrap_or_default()
}
