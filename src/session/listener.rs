//! Listener argument computation.
//!
//! Turns the configured watch directories and tuning options into the
//! `[:to, dir1, dir2, …, {options}]` form the filesystem listener subscribes
//! with. Normalization is purely syntactic: nothing here touches the disk.

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};

use super::error::{SessionError, SessionResult};

/// How absolute paths are rooted on the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle {
    /// Rooted at `/`.
    Posix,
    /// Rooted at a drive letter (`C:/`), forward slashes kept.
    Drive(char),
}

impl PathStyle {
    /// Style of the running platform, taking the drive letter from `cwd`.
    pub fn native(cwd: &Path) -> Self {
        if cfg!(windows) {
            let drive = cwd
                .to_str()
                .and_then(|s| drive_letter(s.as_bytes()))
                .unwrap_or('C');
            PathStyle::Drive(drive)
        } else {
            PathStyle::Posix
        }
    }
}

/// Tuning options forwarded to the listener.
///
/// Only keys that were explicitly supplied are serialized, in the order
/// `force_polling`, `latency`, so the listener applies its own defaults for
/// the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListenerOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_polling: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<f64>,
}

impl ListenerOptions {
    pub fn is_empty(&self) -> bool {
        self.force_polling.is_none() && self.latency.is_none()
    }
}

/// One positional listener argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ListenerArg {
    /// The leading `:to` marker.
    To,
    Dir(String),
    Options(ListenerOptions),
}

/// Normalized listener arguments, computed once per session.
#[derive(Debug, Clone, PartialEq)]
pub struct ListenerArgs {
    dirs: Vec<String>,
    options: ListenerOptions,
}

impl ListenerArgs {
    /// Normalized watch directories, in configured order.
    pub fn dirs(&self) -> &[String] {
        &self.dirs
    }

    pub fn options(&self) -> &ListenerOptions {
        &self.options
    }

    /// Positional form: `[To, Dir.., Options]`.
    pub fn to_args(&self) -> Vec<ListenerArg> {
        let mut args = Vec::with_capacity(self.dirs.len() + 2);
        args.push(ListenerArg::To);
        args.extend(self.dirs.iter().cloned().map(ListenerArg::Dir));
        args.push(ListenerArg::Options(self.options.clone()));
        args
    }
}

impl Serialize for ListenerArgs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.dirs.len() + 2))?;
        seq.serialize_element("to")?;
        for dir in &self.dirs {
            seq.serialize_element(dir)?;
        }
        seq.serialize_element(&self.options)?;
        seq.end()
    }
}

/// Build listener arguments relative to the process working directory.
pub fn build(watchdirs: &[PathBuf], options: ListenerOptions) -> SessionResult<ListenerArgs> {
    let cwd = std::env::current_dir()
        .map_err(|e| SessionError::invalid("watchdir", format!("no working directory: {e}")))?;
    let style = PathStyle::native(&cwd);
    build_in(watchdirs, options, &cwd, style)
}

/// Build listener arguments against an explicit working directory and style.
///
/// An empty `watchdirs` watches `cwd` alone.
pub fn build_in(
    watchdirs: &[PathBuf],
    options: ListenerOptions,
    cwd: &Path,
    style: PathStyle,
) -> SessionResult<ListenerArgs> {
    if let Some(latency) = options.latency
        && (!latency.is_finite() || latency < 0.0)
    {
        return Err(SessionError::invalid(
            "latency",
            format!("expected a non-negative number, got {latency}"),
        ));
    }

    let cwd = separators(path_text(cwd)?, style);
    let base = match split_root(&cwd, style) {
        Some((root, rest)) => clean(&root, rest),
        None => {
            return Err(SessionError::invalid(
                "watchdir",
                format!("working directory {cwd} is not absolute"),
            ));
        }
    };

    let dirs = if watchdirs.is_empty() {
        vec![base]
    } else {
        watchdirs
            .iter()
            .map(|dir| normalize(dir, &base, style))
            .collect::<SessionResult<Vec<_>>>()?
    };

    Ok(ListenerArgs { dirs, options })
}

/// Make `path` absolute against `base` and fold `.`/`..` segments.
fn normalize(path: &Path, base: &str, style: PathStyle) -> SessionResult<String> {
    let text = separators(path_text(path)?, style);

    match split_root(&text, style) {
        Some((root, rest)) => Ok(clean(&root, rest)),
        None => {
            let joined = format!("{base}/{text}");
            Ok(match split_root(&joined, style) {
                Some((root, rest)) => clean(&root, rest),
                None => joined.clone(),
            })
        }
    }
}

fn separators(text: String, style: PathStyle) -> String {
    match style {
        PathStyle::Posix => text,
        PathStyle::Drive(_) => text.replace('\\', "/"),
    }
}

fn path_text(path: &Path) -> SessionResult<String> {
    let text = path.to_str().ok_or_else(|| {
        SessionError::invalid("watchdir", format!("{} is not valid UTF-8", path.display()))
    })?;
    if text.is_empty() {
        return Err(SessionError::invalid("watchdir", "empty path"));
    }
    if text.contains('\0') {
        return Err(SessionError::invalid("watchdir", "path contains a NUL byte"));
    }
    Ok(text.to_string())
}

/// Split an absolute path into its root and the remainder.
///
/// Returns `None` for relative paths. On drive-letter platforms a bare `/`
/// root is anchored at the style's drive.
fn split_root(text: &str, style: PathStyle) -> Option<(String, &str)> {
    match style {
        PathStyle::Posix => text.strip_prefix('/').map(|rest| ("/".to_string(), rest)),
        PathStyle::Drive(default) => {
            if let Some(drive) = drive_letter(text.as_bytes()) {
                Some((format!("{drive}:/"), &text[2..]))
            } else {
                text.strip_prefix('/')
                    .map(|rest| (format!("{default}:/"), rest))
            }
        }
    }
}

fn drive_letter(bytes: &[u8]) -> Option<char> {
    match bytes {
        [letter, b':', ..] if letter.is_ascii_alphabetic() => Some(*letter as char),
        _ => None,
    }
}

fn clean(root: &str, rest: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in rest.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    format!("{root}{}", parts.join("/"))
}
