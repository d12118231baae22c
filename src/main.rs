use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use vigil::cli::commands::{init, show};
use vigil::cli::{Cli, Commands};
use vigil::logging;
use vigil::{SessionError, Settings};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Init { force } => {
            logging::init();
            init::run_init(*force)
        }
        Commands::Config => {
            let settings = load_settings(&cli)?;
            init::run_config(&settings)
        }
        Commands::Show => {
            let settings = load_settings(&cli)?;
            show::run_show(&settings, &guardfile(&cli, &settings))
        }
    }
}

/// Load layered settings with command-line overrides and start logging.
fn load_settings(cli: &Cli) -> Result<Settings> {
    let settings = Settings::load_with(cli.config.as_deref(), &cli.session_overrides())
        .map_err(SessionError::from)
        .context("Failed to load settings")?;
    logging::init_with_config(&settings.logging);
    Ok(settings)
}

fn guardfile(cli: &Cli, settings: &Settings) -> PathBuf {
    cli.guardfile
        .clone()
        .unwrap_or_else(|| settings.guardfile.clone())
}
