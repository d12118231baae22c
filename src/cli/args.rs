//! CLI argument parsing using clap.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

use crate::session::SessionOptions;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// File-watching automation session
#[derive(Parser, Debug)]
#[command(
    name = "vigil",
    version = env!("CARGO_PKG_VERSION"),
    about = "Resolve watch directories, plugins and groups for a watch session",
    next_line_help = true,
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory to watch (repeatable, defaults to the current directory)
    #[arg(short = 'w', long = "watchdir", value_name = "DIR", global = true)]
    pub watchdir: Vec<PathBuf>,

    /// Only run the named plugin (repeatable)
    #[arg(short = 'P', long = "plugin", value_name = "NAME", global = true)]
    pub plugin: Vec<String>,

    /// Only run plugins in the named group (repeatable)
    #[arg(short = 'g', long = "group", value_name = "NAME", global = true)]
    pub group: Vec<String>,

    /// Clear output between runs unless the guardfile says otherwise
    #[arg(short = 'c', long, global = true)]
    pub clear: bool,

    /// Force the listener to poll for changes
    #[arg(long, global = true)]
    pub force_polling: bool,

    /// Listener latency in seconds
    #[arg(short = 'l', long, global = true)]
    pub latency: Option<f64>,

    /// Guardfile to evaluate (overrides settings)
    #[arg(short = 'G', long, global = true)]
    pub guardfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize project
    #[command(about = "Set up .vigil directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration settings
    #[command(about = "Display merged settings")]
    Config,

    /// Evaluate the guardfile and print the resolved session
    #[command(
        about = "Print listener arguments and resolved plugin/group scope as JSON",
        after_help = "Examples:\n  vigil show\n  vigil show -w src -w lib --latency 0.5\n  vigil show -P rspec -g backend"
    )]
    Show,
}

impl Cli {
    /// Session options given on the command line.
    ///
    /// Flags that were not passed stay absent so they do not mask settings
    /// from the config file or environment.
    pub fn session_overrides(&self) -> SessionOptions {
        SessionOptions {
            watchdir: self.watchdir.clone(),
            force_polling: self.force_polling.then_some(true),
            latency: self.latency,
            plugin: self.plugin.clone(),
            group: self.group.clone(),
            clear: self.clear.then_some(true),
            guardfile_contents: None,
        }
    }
}
