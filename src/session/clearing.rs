//! Tri-state output clearing flag.

use serde::{Deserialize, Serialize};

/// Whether output is cleared between runs.
///
/// `Unset` and `Off` both read as "do not clear"; they stay distinct so
/// callers can tell a guardfile decision apart from no decision at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClearingState {
    #[default]
    Unset,
    On,
    Off,
}

impl ClearingState {
    /// Initial state from an optional command-line default.
    pub fn from_default(clear: Option<bool>) -> Self {
        match clear {
            Some(true) => ClearingState::On,
            Some(false) => ClearingState::Off,
            None => ClearingState::Unset,
        }
    }

    /// Apply a guardfile decision. Last write wins.
    pub fn set(&mut self, on: bool) {
        *self = if on { ClearingState::On } else { ClearingState::Off };
    }

    pub fn is_on(self) -> bool {
        self == ClearingState::On
    }
}
