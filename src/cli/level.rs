//! Level command implementation

use anyhow::Result;

use fitxp::progression::compute_level;

/// Show the level reached with `total_xp`
pub fn level_command(total_xp: u64, json: bool) -> Result<()> {
    let state = compute_level(total_xp);

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    println!("Level {} - {}", state.level, state.title());
    println!(
        "  {}/{} XP into level ({}%)",
        state.xp_into_level, state.xp_to_next_level, state.progress_percent
    );
    println!("  {} XP to level {}", state.xp_remaining(), state.level + 1);
    println!("  Total: {} XP", state.total_xp);
    if let Some(badge) = state.badge() {
        println!("  Badge: {}", badge);
    }

    Ok(())
}
