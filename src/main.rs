use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use roadmap::config::RoadmapConfig;

mod cmd;

#[derive(Parser)]
#[command(name = "roadmap")]
#[command(version, about = "Hierarchical roadmap tracker with derived progress and status")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Path to roadmap.toml. Defaults to <project-dir>/roadmap.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the roadmap API and the static front-end
    Serve {
        /// Port to serve on (overrides roadmap.toml and PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Open the browser after the server starts
        #[arg(long)]
        open: bool,

        /// Enable dev mode (bind all interfaces, CORS permissive)
        #[arg(long)]
        dev: bool,
    },
    /// Create the data file with the sample roadmap
    Init {
        /// Overwrite an existing data file
        #[arg(long)]
        force: bool,
    },
    /// Show overall and per-axis progress
    Status,
    /// List items whose status disagrees with their progress
    Check,
    /// Export the roadmap as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Backfill status and weight fields on older data files
    Migrate {
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default roadmap.toml file
    Init,
}

/// Load `<project-dir>/.env` when present. Existing variables win.
fn load_dotenv(project_dir: &Path) -> Result<()> {
    let env_file = project_dir.join(".env");
    if env_file.is_file() {
        dotenvy::from_path(&env_file)
            .with_context(|| format!("Failed to load {}", env_file.display()))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    load_dotenv(&project_dir)?;
    let config = RoadmapConfig::new(project_dir, cli.config.clone())?;
    let _log_guard = roadmap::logging::init(&config, cli.verbose)?;

    for warning in config.validate() {
        tracing::warn!("{}", warning);
    }

    match cli.command {
        Commands::Serve { port, open, dev } => {
            cmd::cmd_serve(config.with_port(port), open, dev).await?
        }
        Commands::Init { force } => cmd::cmd_init(&config, force)?,
        Commands::Status => cmd::cmd_status(&config)?,
        Commands::Check => cmd::cmd_check(&config)?,
        Commands::Export { output } => cmd::cmd_export(&config, output.as_deref())?,
        Commands::Migrate { dry_run } => cmd::cmd_migrate(&config, dry_run)?,
        Commands::Config { command } => cmd::cmd_config(&config, command)?,
    }

    Ok(())
}
