mod commands;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use calmirror_core::Settings;
use calmirror_core::provider::SubprocessProvider;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "calmirror")]
#[command(about = "Mirror events between your work and life calendars")]
struct Cli {
    /// Config file (default: ~/.config/calmirror/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run both sync directions once
    Sync {
        /// Log what would change without writing to any calendar
        #[arg(long)]
        dry_run: bool,
    },
    /// Check that the configured calendars are reachable
    Check,
    /// Write a config template
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Sync { dry_run } => {
            let mut settings = load_settings(cli.config.as_deref())?;
            settings.dry_run |= dry_run;
            let provider = connect(&settings)?;
            commands::sync::run(&provider, &settings).await
        }
        Commands::Check => {
            let settings = load_settings(cli.config.as_deref())?;
            let provider = connect(&settings)?;
            commands::check::run(&provider, &settings).await
        }
        Commands::Init => commands::init::run(cli.config.as_deref()),
    }
}

/// Log level comes from `CALMIRROR_LOG` (default: info).
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("CALMIRROR_LOG").unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(path: Option<&std::path::Path>) -> Result<Settings> {
    Settings::load(path).map_err(|e| {
        anyhow::anyhow!(
            "{}\n\n\
            Create a config file with:\n  \
            calmirror init",
            e
        )
    })
}

fn connect(settings: &Settings) -> Result<SubprocessProvider> {
    let provider = SubprocessProvider::from_name(&settings.provider, (&settings.remote).into())?;
    tracing::debug!("Using provider '{}'", provider.name());
    Ok(provider)
}
