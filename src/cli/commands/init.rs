//! Init and Config commands.

use anyhow::{Result, anyhow};
use std::path::Path;

use crate::config::{CONFIG_DIR, CONFIG_FILE, Settings};

/// Run init command - create configuration file.
pub fn run_init(force: bool) -> Result<()> {
    let config_path = Path::new(CONFIG_DIR).join(CONFIG_FILE);

    if config_path.exists() && !force {
        eprintln!(
            "Configuration file already exists at: {}",
            config_path.display()
        );
        eprintln!("Use --force to overwrite");
        return Err(anyhow!("configuration already initialized"));
    }

    let path = Settings::init_config_file(force).map_err(|e| anyhow!("{e}"))?;
    println!("Created configuration file at: {}", path.display());
    println!("Edit this file to customize your settings.");
    Ok(())
}

/// Run config command - display current configuration.
pub fn run_config(config: &Settings) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}
