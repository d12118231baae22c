//! Runtime session state.
//!
//! A [`Session`] merges the command-line options snapshot with everything the
//! guardfile declares: plugins, groups, clearing and ignore rules. It is built
//! once at startup, evaluated once, and replaced wholesale on reload.
//!
//! # Lifecycle
//!
//! ```text
//! SessionOptions ──> Session::new ──> listener args (fixed)
//!                         │
//!                 Session::evaluate(evaluator)
//!                         │  declare_plugin / declare_group
//!                         │  clearing / set_guardfile_ignore(_bang)
//!                         v
//!                  resolved plugin/group scope
//! ```

mod clearing;
mod error;
pub mod evaluator;
pub mod ignore;
pub mod listener;
mod options;
pub mod scope;
mod shared;

use serde::Serialize;
use std::path::Path;

pub use clearing::ClearingState;
pub use error::{SessionError, SessionResult};
pub use evaluator::{Evaluator, TomlEvaluator};
pub use ignore::{IgnoreRules, Pattern};
pub use listener::{ListenerArg, ListenerArgs, ListenerOptions, PathStyle};
pub use options::{EvaluatorOptions, SessionOptions};
pub use scope::{DEFAULT_GROUP, DeclOptions, Group, Plugin, ScopeResolver};
pub use shared::SharedSession;

/// The per-process aggregate of merged runtime configuration.
#[derive(Debug, Clone)]
pub struct Session {
    options: SessionOptions,
    listener_args: ListenerArgs,
    scope: ScopeResolver,
    clearing: ClearingState,
    ignore: IgnoreRules,
    evaluated: bool,
}

impl Session {
    /// Build a session against the process working directory.
    ///
    /// Listener arguments are computed here and never change afterwards.
    pub fn new(options: SessionOptions) -> SessionResult<Self> {
        let listener_args = listener::build(&options.watchdir, listener_options(&options))?;
        Ok(Self::from_parts(options, listener_args))
    }

    /// Build a session against an explicit working directory and path style.
    pub fn with_cwd(options: SessionOptions, cwd: &Path, style: PathStyle) -> SessionResult<Self> {
        let listener_args =
            listener::build_in(&options.watchdir, listener_options(&options), cwd, style)?;
        Ok(Self::from_parts(options, listener_args))
    }

    fn from_parts(options: SessionOptions, listener_args: ListenerArgs) -> Self {
        crate::debug_event!(
            "session",
            "created",
            "dirs={:?} plugins={:?} groups={:?}",
            listener_args.dirs(),
            options.plugin,
            options.group
        );
        Self {
            scope: ScopeResolver::new(options.plugin.clone(), options.group.clone()),
            clearing: ClearingState::from_default(options.clear),
            ignore: IgnoreRules::default(),
            evaluated: false,
            listener_args,
            options,
        }
    }

    /// Run the guardfile through `evaluator`.
    ///
    /// A session is evaluated exactly once; use [`Session::reload`] to
    /// evaluate again into a fresh instance. Declarations are staged on a
    /// copy and committed only when the evaluator succeeds, so a failed
    /// pass leaves the session as it was.
    pub fn evaluate<E: Evaluator + ?Sized>(&mut self, evaluator: &E) -> SessionResult<()> {
        if self.evaluated {
            return Err(SessionError::Evaluation {
                reason: "session already evaluated; reload into a new session instead".into(),
            });
        }

        let mut staged = self.clone();
        evaluator.evaluate(self.options.guardfile_contents.as_deref(), &mut staged)?;
        staged.evaluated = true;
        *self = staged;

        for name in self.scope.plugins().unmatched() {
            crate::debug_event!("session", "plugin not declared", "{name}");
        }
        for name in self.scope.groups().unmatched() {
            crate::debug_event!("session", "group not declared", "{name}");
        }
        crate::log_event!(
            "session",
            "evaluated",
            "{} plugins, {} groups in scope",
            self.scope.plugins().scope_names().len(),
            self.scope.groups().scope_names().len()
        );
        Ok(())
    }

    /// Build a replacement session from the same options and evaluate it.
    ///
    /// The live session is left untouched; the caller swaps the result in.
    pub fn reload<E: Evaluator + ?Sized>(&self, evaluator: &E) -> SessionResult<Session> {
        let mut fresh = Self::from_parts(self.options.clone(), self.listener_args.clone());
        fresh.evaluate(evaluator)?;
        crate::log_event!("session", "reloaded");
        Ok(fresh)
    }

    pub fn is_evaluated(&self) -> bool {
        self.evaluated
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn evaluator_options(&self) -> EvaluatorOptions {
        self.options.evaluator_options()
    }

    pub fn listener_args(&self) -> &ListenerArgs {
        &self.listener_args
    }

    /// Set clearing from the guardfile. Overrides any command-line default.
    pub fn clearing(&mut self, on: bool) {
        self.clearing.set(on);
        crate::debug_event!("session", "clearing", "{:?}", self.clearing);
    }

    pub fn clearing_state(&self) -> ClearingState {
        self.clearing
    }

    /// True only when clearing is explicitly on.
    pub fn is_clearing(&self) -> bool {
        self.clearing.is_on()
    }

    pub fn guardfile_ignore(&self) -> &[Pattern] {
        self.ignore.ignore()
    }

    pub fn set_guardfile_ignore(&mut self, patterns: Vec<Pattern>) {
        self.ignore.set_ignore(patterns);
    }

    pub fn guardfile_ignore_bang(&self) -> &[Pattern] {
        self.ignore.ignore_bang()
    }

    pub fn set_guardfile_ignore_bang(&mut self, patterns: Vec<Pattern>) {
        self.ignore.set_ignore_bang(patterns);
    }

    pub fn ignore_rules(&self) -> &IgnoreRules {
        &self.ignore
    }

    /// Declare a group from the guardfile.
    pub fn declare_group(&mut self, name: &str, options: DeclOptions) -> SessionResult<&Group> {
        if name.is_empty() {
            return Err(SessionError::invalid("group", "group name is empty"));
        }
        Ok(self.scope.declare_group(Group::new(name, options)))
    }

    /// Declare a plugin from the guardfile, in `group` or the default group.
    pub fn declare_plugin(
        &mut self,
        name: &str,
        group: Option<&str>,
        options: DeclOptions,
    ) -> SessionResult<&Plugin> {
        if name.is_empty() {
            return Err(SessionError::invalid("plugin", "plugin name is empty"));
        }
        let group = group.unwrap_or(DEFAULT_GROUP);
        Ok(self.scope.declare_plugin(Plugin::new(name, group, options)))
    }

    pub fn scope(&self) -> &ScopeResolver {
        &self.scope
    }

    /// Names of plugins in the resolved scope, in declaration order.
    ///
    /// Empty until the guardfile declared matching plugins.
    pub fn cmdline_plugins(&self) -> Vec<&str> {
        self.scope.plugins().scope_names()
    }

    /// Names of groups in the resolved scope, in declaration order.
    pub fn cmdline_groups(&self) -> Vec<&str> {
        self.scope.groups().scope_names()
    }

    /// Plugins in the resolved scope.
    pub fn plugins(&self) -> impl Iterator<Item = &Plugin> {
        self.scope.plugins().scope()
    }

    /// Groups in the resolved scope.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.scope.groups().scope()
    }

    /// Serializable snapshot for display.
    pub fn summary(&self) -> SessionSummary<'_> {
        SessionSummary {
            listener_args: &self.listener_args,
            clearing: self.clearing,
            ignore: self.ignore.ignore(),
            ignore_bang: self.ignore.ignore_bang(),
            plugins: self.plugins().collect(),
            groups: self.groups().collect(),
            unmatched_plugins: self.scope.plugins().unmatched(),
            unmatched_groups: self.scope.groups().unmatched(),
        }
    }
}

fn listener_options(options: &SessionOptions) -> ListenerOptions {
    ListenerOptions {
        force_polling: options.force_polling,
        latency: options.latency,
    }
}

/// Borrowed view of a session, as printed by `vigil show`.
#[derive(Debug, Serialize)]
pub struct SessionSummary<'a> {
    pub listener_args: &'a ListenerArgs,
    pub clearing: ClearingState,
    pub ignore: &'a [Pattern],
    pub ignore_bang: &'a [Pattern],
    pub plugins: Vec<&'a Plugin>,
    pub groups: Vec<&'a Group>,
    pub unmatched_plugins: Vec<&'a str>,
    pub unmatched_groups: Vec<&'a str>,
}
