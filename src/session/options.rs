//! The options snapshot a session is built from.
//!
//! Options arrive either through the layered [`Settings`](crate::config::Settings)
//! or as a loose mapping handed over by a front-end. Only the keys below are
//! interpreted; anything else is ignored.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

use super::error::{SessionError, SessionResult};

/// Recognized session options.
///
/// Absent keys stay absent (`None` or empty) so later layers can tell
/// "not given" apart from "given as false".
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct SessionOptions {
    /// Directories to watch. Empty means the current working directory.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub watchdir: Vec<PathBuf>,

    /// Ask the listener to poll instead of using native events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_polling: Option<bool>,

    /// Listener latency in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<f64>,

    /// Plugin names requested on the command line.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugin: Vec<String>,

    /// Group names requested on the command line.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group: Vec<String>,

    /// Command-line default for output clearing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear: Option<bool>,

    /// Raw guardfile text, handed untouched to the evaluator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardfile_contents: Option<String>,
}

/// The part of the options consumed by a guardfile evaluator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvaluatorOptions {
    pub guardfile_contents: Option<String>,
}

impl SessionOptions {
    /// Build options from a loose mapping.
    ///
    /// Each recognized key is checked on its own so a wrongly typed value is
    /// reported against the key that carried it. `watchdir` also accepts a
    /// single path instead of a list.
    pub fn from_value(value: Value) -> SessionResult<Self> {
        let Value::Object(map) = value else {
            return Err(SessionError::invalid("options", "expected a mapping"));
        };

        let mut options = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "watchdir" => {
                    let value = match value {
                        Value::String(_) => Value::Array(vec![value]),
                        other => other,
                    };
                    options.watchdir = field(&key, value)?;
                }
                "force_polling" => options.force_polling = field(&key, value)?,
                "latency" => options.latency = field(&key, value)?,
                "plugin" => options.plugin = field(&key, value)?,
                "group" => options.group = field(&key, value)?,
                "clear" => options.clear = field(&key, value)?,
                "guardfile_contents" => options.guardfile_contents = field(&key, value)?,
                _ => crate::debug_event!("session", "unrecognized option", "{key}"),
            }
        }

        Ok(options)
    }

    pub fn evaluator_options(&self) -> EvaluatorOptions {
        EvaluatorOptions {
            guardfile_contents: self.guardfile_contents.clone(),
        }
    }
}

fn field<T: DeserializeOwned>(key: &str, value: Value) -> SessionResult<T> {
    serde_json::from_value(value).map_err(|e| SessionError::invalid(key, e.to_string()))
}
