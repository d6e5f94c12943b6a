use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use fitxp::config::Config;

mod cli;

#[derive(Parser)]
#[command(name = "fitxp")]
#[command(about = "Experience, levels and achievements for fitness activity")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.fitxp/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the level reached with a cumulative XP total
    Level {
        /// Cumulative XP
        total_xp: u64,

        /// Print the level state as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the active achievement catalog
    Catalog {
        /// Only show achievements in this category
        #[arg(long)]
        category: Option<String>,

        /// Print definitions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay a JSON activity script through a fresh progression
    Replay {
        /// Script file (JSON array of steps)
        file: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize a new ~/.fitxp/config.toml configuration file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Level { total_xp, json } => {
            cli::level::level_command(total_xp, json)?;
        }
        Commands::Catalog { category, json } => {
            let config = Config::load(cli.config.as_deref())?;
            cli::catalog::catalog_command(&config, category, json)?;
        }
        Commands::Replay { file, json } => {
            let config = Config::load(cli.config.as_deref())?;
            cli::replay::replay_command(&config, &file, json)?;
        }
        Commands::Init { force } => {
            cli::init::init_command(cli.config, force)?;
        }
    }

    Ok(())
}
