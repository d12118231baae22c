//! Configuration module for vigil.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file (`.vigil/settings.toml`)
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `VIGIL_` and use double
//! underscores to separate nested levels:
//! - `VIGIL_SESSION__LATENCY=0.5` sets `session.latency`
//! - `VIGIL_SESSION__FORCE_POLLING=true` sets `session.force_polling`
//! - `VIGIL_LOGGING__DEFAULT=debug` sets `logging.default`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::session::SessionOptions;

/// Directory holding the settings file, searched from the cwd upwards.
pub const CONFIG_DIR: &str = ".vigil";
pub const CONFIG_FILE: &str = "settings.toml";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Guardfile evaluated at startup
    #[serde(default = "default_guardfile")]
    pub guardfile: PathBuf,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Session defaults, overridden by command-line options
    #[serde(default)]
    pub session: SessionOptions,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level for all modules
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_guardfile() -> PathBuf {
    PathBuf::from("Guardfile.toml")
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            guardfile: default_guardfile(),
            logging: LoggingConfig::default(),
            session: SessionOptions::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        Self::load_with(None, &SessionOptions::default())
    }

    /// Load configuration, layering command-line session overrides on top.
    ///
    /// `config` replaces the workspace settings file when given. Only the
    /// keys present in `overrides` take effect.
    pub fn load_with(
        config: Option<&Path>,
        overrides: &SessionOptions,
    ) -> Result<Self, Box<figment::Error>> {
        let config_path = match config {
            Some(path) => path.to_path_buf(),
            None => Self::find_workspace_config()
                .unwrap_or_else(|| Path::new(CONFIG_DIR).join(CONFIG_FILE)),
        };

        Self::figment(&config_path)
            .merge(Serialized::default("session", overrides))
            .extract()
            .map_err(Box::new)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref()).extract().map_err(Box::new)
    }

    fn figment(config_path: &Path) -> Figment {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(config_path))
            // Double underscore separates nesting levels, single underscore
            // stays inside field names
            .merge(Env::prefixed("VIGIL_").map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".")
                    .into()
            }))
    }

    /// Find the settings file by looking for a .vigil directory
    /// from the current directory up to the root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(CONFIG_DIR);
            if config_dir.is_dir() {
                return Some(config_dir.join(CONFIG_FILE));
            }
        }

        None
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file in the current directory
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = Path::new(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        Settings::default().save(&config_path)?;
        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.version, 1);
        assert_eq!(settings.guardfile, PathBuf::from("Guardfile.toml"));
        assert_eq!(settings.logging.default, "warn");
        assert_eq!(settings.session, SessionOptions::default());
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        let toml_content = r#"
version = 2
guardfile = "config/Guardfile.toml"

[logging]
default = "info"

[logging.modules]
session = "debug"

[session]
watchdir = ["app", "lib"]
latency = 0.25
clear = true
"#;

        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.version, 2);
        assert_eq!(settings.guardfile, PathBuf::from("config/Guardfile.toml"));
        assert_eq!(settings.logging.default, "info");
        assert_eq!(settings.logging.modules["session"], "debug");
        assert_eq!(
            settings.session.watchdir,
            vec![PathBuf::from("app"), PathBuf::from("lib")]
        );
        assert_eq!(settings.session.latency, Some(0.25));
        assert_eq!(settings.session.clear, Some(true));
        assert_eq!(settings.session.force_polling, None);
    }

    #[test]
    fn test_partial_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        fs::write(&config_path, "[session]\nforce_polling = true\n").unwrap();

        let settings = Settings::load_from(&config_path).unwrap();

        assert_eq!(settings.session.force_polling, Some(true));
        // Default values should still be present
        assert_eq!(settings.version, 1);
        assert_eq!(settings.logging.default, "warn");
        assert!(settings.session.watchdir.is_empty());
    }

    #[test]
    fn test_cli_overrides_win_over_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        fs::write(
            &config_path,
            "[session]\nwatchdir = [\"app\"]\nlatency = 0.25\nplugin = [\"rspec\"]\n",
        )
        .unwrap();

        let overrides = SessionOptions {
            latency: Some(1.5),
            group: vec!["backend".to_string()],
            ..Default::default()
        };
        let settings = Settings::load_with(Some(&config_path), &overrides).unwrap();

        assert_eq!(settings.session.latency, Some(1.5));
        assert_eq!(settings.session.group, vec!["backend"]);
        // Keys absent from the command line keep the file values
        assert_eq!(settings.session.watchdir, vec![PathBuf::from("app")]);
        assert_eq!(settings.session.plugin, vec!["rspec"]);
    }

    #[test]
    fn test_save_settings() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        let mut settings = Settings::default();
        settings.session.force_polling = Some(true);
        settings.logging.default = "debug".to_string();

        settings.save(&config_path).unwrap();

        let loaded = Settings::load_from(&config_path).unwrap();
        assert_eq!(loaded.session.force_polling, Some(true));
        assert_eq!(loaded.logging.default, "debug");
    }

    #[test]
    fn test_invalid_session_value() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.toml");

        fs::write(&config_path, "[session]\nlatency = \"soon\"\n").unwrap();

        assert!(Settings::load_from(&config_path).is_err());
    }
}
