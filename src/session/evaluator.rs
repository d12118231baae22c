//! Guardfile evaluation.
//!
//! An [`Evaluator`] runs the guardfile and calls back into the session for
//! every declaration. Closures work as evaluators, which is how most tests
//! drive a session. [`TomlEvaluator`] reads the declarative TOML guardfile
//! the bundled binary understands:
//!
//! ```toml
//! clearing = true
//! ignore = ["^tmp/"]
//! ignore_bang = ["^tmp/keep"]
//!
//! [[group]]
//! name = "backend"
//! options = { halt_on_fail = true }
//!
//! [[group.plugin]]
//! name = "rspec"
//! options = { cmd = "bundle exec rspec" }
//!
//! [[plugin]]
//! name = "livereload"
//! ```
//!
//! Declarations happen in file order. Top-level plugins join the `default`
//! group; a `[[group.plugin]]` belongs to the group header above it.

use serde::Deserialize;
use toml::Spanned;

use super::Session;
use super::error::SessionResult;
use super::ignore;
use super::scope::DeclOptions;

/// Something that can evaluate guardfile contents against a session.
pub trait Evaluator {
    fn evaluate(&self, contents: Option<&str>, session: &mut Session) -> SessionResult<()>;
}

impl<F> Evaluator for F
where
    F: Fn(&mut Session) -> SessionResult<()>,
{
    fn evaluate(&self, _contents: Option<&str>, session: &mut Session) -> SessionResult<()> {
        self(session)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct GuardfileDoc {
    clearing: Option<bool>,
    ignore: Option<Vec<String>>,
    ignore_bang: Option<Vec<String>>,
    #[serde(default)]
    group: Vec<Spanned<GroupDecl>>,
    #[serde(default)]
    plugin: Vec<Spanned<PluginDecl>>,
}

enum Declaration {
    Group(GroupDecl),
    Plugin(PluginDecl),
}

/// Merge top-level groups and plugins back into file order.
///
/// TOML collects `[[group]]` and `[[plugin]]` headers into separate arrays;
/// the header offsets are the only record of how they interleave.
fn file_order(
    groups: Vec<Spanned<GroupDecl>>,
    plugins: Vec<Spanned<PluginDecl>>,
) -> Vec<Declaration> {
    let mut tagged: Vec<(usize, Declaration)> = groups
        .into_iter()
        .map(|g| (g.span().start, Declaration::Group(g.into_inner())))
        .chain(
            plugins
                .into_iter()
                .map(|p| (p.span().start, Declaration::Plugin(p.into_inner()))),
        )
        .collect();
    tagged.sort_by_key(|(start, _)| *start);
    tagged.into_iter().map(|(_, decl)| decl).collect()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GroupDecl {
    name: String,
    #[serde(default)]
    options: DeclOptions,
    #[serde(default)]
    plugin: Vec<PluginDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PluginDecl {
    name: String,
    #[serde(default)]
    options: DeclOptions,
}

/// Evaluates TOML guardfiles.
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlEvaluator;

impl Evaluator for TomlEvaluator {
    fn evaluate(&self, contents: Option<&str>, session: &mut Session) -> SessionResult<()> {
        let Some(contents) = contents else {
            crate::debug_event!("guardfile", "no contents");
            return Ok(());
        };
        let doc: GuardfileDoc = toml::from_str(contents)?;

        if let Some(on) = doc.clearing {
            session.clearing(on);
        }
        if let Some(patterns) = doc.ignore {
            session.set_guardfile_ignore(ignore::compile(&patterns)?);
        }
        if let Some(patterns) = doc.ignore_bang {
            session.set_guardfile_ignore_bang(ignore::compile(&patterns)?);
        }

        for declaration in file_order(doc.group, doc.plugin) {
            match declaration {
                Declaration::Group(group) => {
                    session.declare_group(&group.name, group.options)?;
                    for plugin in group.plugin {
                        session.declare_plugin(&plugin.name, Some(&group.name), plugin.options)?;
                    }
                }
                Declaration::Plugin(plugin) => {
                    session.declare_plugin(&plugin.name, None, plugin.options)?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionError, SessionOptions};

    fn evaluated(contents: &str, options: SessionOptions) -> SessionResult<Session> {
        let mut session = Session::new(SessionOptions {
            guardfile_contents: Some(contents.to_string()),
            ..options
        })?;
        session.evaluate(&TomlEvaluator)?;
        Ok(session)
    }

    #[test]
    fn test_declarations_in_file_order() {
        let session = evaluated(
            r#"
[[group]]
name = "backend"

[[group.plugin]]
name = "rspec"

[[group]]
name = "frontend"

[[group.plugin]]
name = "jasmine"

[[plugin]]
name = "livereload"
"#,
            SessionOptions::default(),
        )
        .unwrap();

        assert_eq!(session.cmdline_groups(), vec!["backend", "frontend", "default"]);
        assert_eq!(session.cmdline_plugins(), vec!["rspec", "jasmine", "livereload"]);
        assert_eq!(session.scope().plugins().get("jasmine").unwrap().group, "frontend");
    }

    #[test]
    fn test_interleaved_declarations_keep_file_order() {
        let session = evaluated(
            r#"
[[plugin]]
name = "first"

[[group]]
name = "g"

[[group.plugin]]
name = "second"

[[plugin]]
name = "third"

[[group]]
name = "h"

[[group.plugin]]
name = "fourth"
"#,
            SessionOptions::default(),
        )
        .unwrap();

        assert_eq!(
            session.cmdline_plugins(),
            vec!["first", "second", "third", "fourth"]
        );
        assert_eq!(session.cmdline_groups(), vec!["default", "g", "h"]);
        assert_eq!(session.scope().plugins().get("third").unwrap().group, "default");
        assert_eq!(session.scope().plugins().get("fourth").unwrap().group, "h");
    }

    #[test]
    fn test_clearing_and_ignores() {
        let session = evaluated(
            r#"
clearing = true
ignore = ["^tmp/", "\\.log$"]
ignore_bang = ["^tmp/keep"]
"#,
            SessionOptions {
                clear: Some(false),
                ..Default::default()
            },
        )
        .unwrap();

        assert!(session.is_clearing());
        let ignore: Vec<&str> = session.guardfile_ignore().iter().map(|p| p.as_str()).collect();
        assert_eq!(ignore, vec!["^tmp/", r"\.log$"]);
        assert_eq!(session.guardfile_ignore_bang().len(), 1);
    }

    #[test]
    fn test_plugin_options_are_kept() {
        let session = evaluated(
            r#"
[[plugin]]
name = "rspec"
options = { cmd = "bundle exec rspec", all_on_start = false }
"#,
            SessionOptions::default(),
        )
        .unwrap();

        let rspec = session.scope().plugins().get("rspec").unwrap();
        assert_eq!(rspec.options["cmd"], "bundle exec rspec");
        assert_eq!(rspec.options["all_on_start"], false);
    }

    #[test]
    fn test_malformed_guardfile_is_an_evaluation_error() {
        let err = evaluated("[[plugin]]\nnom = 'x'", SessionOptions::default()).unwrap_err();
        assert!(matches!(err, SessionError::Evaluation { .. }));
    }

    #[test]
    fn test_invalid_ignore_pattern() {
        let err = evaluated("ignore = ['(']", SessionOptions::default()).unwrap_err();
        assert!(matches!(err, SessionError::InvalidOption { .. }));
    }

    #[test]
    fn test_missing_contents_declares_nothing() {
        let mut session = Session::new(SessionOptions::default()).unwrap();
        session.evaluate(&TomlEvaluator).unwrap();
        assert!(session.is_evaluated());
        assert!(session.cmdline_plugins().is_empty());
    }
}
