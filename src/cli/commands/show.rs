//! Show command: evaluate the guardfile and print the resolved session.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::Settings;
use crate::session::{Session, SessionOptions, TomlEvaluator};

/// Build the session for `settings`, reading the guardfile at `guardfile`.
///
/// A missing guardfile evaluates as empty; requested plugins and groups that
/// nothing declared are reported as warnings, not errors.
pub fn build_session(settings: &Settings, guardfile: &Path) -> Result<Session> {
    let guardfile_contents = match settings.session.guardfile_contents.clone() {
        Some(contents) => Some(contents),
        None if guardfile.exists() => Some(
            std::fs::read_to_string(guardfile)
                .with_context(|| format!("Failed to read {}", guardfile.display()))?,
        ),
        None => {
            tracing::warn!("No guardfile at {}", guardfile.display());
            None
        }
    };

    let options = SessionOptions {
        guardfile_contents,
        ..settings.session.clone()
    };
    let mut session = Session::new(options).context("Invalid session options")?;
    session
        .evaluate(&TomlEvaluator)
        .with_context(|| format!("Failed to evaluate {}", guardfile.display()))?;

    for name in session.scope().plugins().unmatched() {
        tracing::warn!("Plugin '{name}' was requested but not declared in the guardfile");
    }
    for name in session.scope().groups().unmatched() {
        tracing::warn!("Group '{name}' was requested but not declared in the guardfile");
    }

    Ok(session)
}

/// Run show command - print the session summary as JSON.
pub fn run_show(settings: &Settings, guardfile: &Path) -> Result<()> {
    let session = build_session(settings, guardfile)?;
    let json = serde_json::to_string_pretty(&session.summary())?;
    println!("{json}");
    Ok(())
}
