//! Guardfile ignore rules.
//!
//! `ignore` patterns suppress change notifications for matching paths;
//! `ignore!` patterns force matching paths back in.

use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;

use super::error::{SessionError, SessionResult};

/// A compiled path pattern.
///
/// Two patterns are equal when their source text is equal.
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> SessionResult<Self> {
        Regex::new(source)
            .map(Pattern)
            .map_err(|e| SessionError::invalid("ignore", e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.0.is_match(path)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.0.as_str())
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Pattern {}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Compile a list of pattern sources, stopping at the first invalid one.
pub fn compile<S: AsRef<str>>(sources: &[S]) -> SessionResult<Vec<Pattern>> {
    sources.iter().map(|s| Pattern::new(s.as_ref())).collect()
}

/// The two ordered ignore sequences. Both start empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IgnoreRules {
    ignore: Vec<Pattern>,
    ignore_bang: Vec<Pattern>,
}

impl IgnoreRules {
    pub fn ignore(&self) -> &[Pattern] {
        &self.ignore
    }

    pub fn ignore_bang(&self) -> &[Pattern] {
        &self.ignore_bang
    }

    /// Replace the ignore sequence.
    pub fn set_ignore(&mut self, patterns: Vec<Pattern>) {
        self.ignore = patterns;
    }

    /// Replace the force-include sequence.
    pub fn set_ignore_bang(&mut self, patterns: Vec<Pattern>) {
        self.ignore_bang = patterns;
    }

    /// True when an ignore pattern matches and no `ignore!` pattern does.
    pub fn is_ignored(&self, path: &str) -> bool {
        self.ignore.iter().any(|p| p.is_match(path))
            && !self.ignore_bang.iter().any(|p| p.is_match(path))
    }
}
