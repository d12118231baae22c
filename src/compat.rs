//! Legacy call surface.
//!
//! Older plugins and guardfiles call into a handful of entry points that have
//! since moved. [`Legacy`] keeps them working: every call reports a
//! deprecation notice through a [`Notifier`] and forwards to the current
//! session API. A deprecated call never fails because it is deprecated.

use parking_lot::Mutex;

use crate::session::{
    DeclOptions, EvaluatorOptions, Pattern, Plugin, Session, SessionOptions, SessionResult,
};

pub const GUARDS: &str = "`guards` is deprecated; use `plugins` to list the plugins in scope";
pub const ADD_GUARD: &str = "`add_guard` is deprecated; declare the plugin with `declare_plugin`";
pub const OPTIONS: &str = "`options` is deprecated; read the session options instead";
pub const CLEARING: &str = "`clearing?` is deprecated; use `Session::is_clearing`";
pub const IGNORE: &str = "`ignore` is deprecated; use `Session::guardfile_ignore`";
pub const IGNORE_BANG: &str = "`ignore!` is deprecated; use `Session::guardfile_ignore_bang`";
pub const EVALUATOR: &str =
    "`evaluator` is deprecated; evaluate a session with an `Evaluator` instead";

/// Receives user-facing deprecation notices.
pub trait Notifier {
    fn deprecation(&self, message: &str);
}

/// Reports notices as warnings on the `compat` log target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn deprecation(&self, message: &str) {
        tracing::warn!(target: "compat", "{message}");
    }
}

/// Collects notices in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn deprecation(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

/// Legacy entry points bound to one session.
pub struct Legacy<'a, N: Notifier> {
    session: &'a mut Session,
    notifier: &'a N,
}

impl<'a, N: Notifier> Legacy<'a, N> {
    pub fn new(session: &'a mut Session, notifier: &'a N) -> Self {
        Self { session, notifier }
    }

    /// Plugins in scope, optionally only those declared in `group`.
    pub fn guards(&self, group: Option<&str>) -> Vec<&Plugin> {
        self.notifier.deprecation(GUARDS);
        self.session
            .plugins()
            .filter(|p| group.is_none_or(|g| p.group == g))
            .collect()
    }

    pub fn add_guard(&mut self, name: &str, group: Option<&str>) -> SessionResult<&Plugin> {
        self.notifier.deprecation(ADD_GUARD);
        self.session.declare_plugin(name, group, DeclOptions::new())
    }

    pub fn options(&self) -> &SessionOptions {
        self.notifier.deprecation(OPTIONS);
        self.session.options()
    }

    pub fn is_clearing(&self) -> bool {
        self.notifier.deprecation(CLEARING);
        self.session.is_clearing()
    }

    pub fn guardfile_ignore(&self) -> &[Pattern] {
        self.notifier.deprecation(IGNORE);
        self.session.guardfile_ignore()
    }

    pub fn guardfile_ignore_bang(&self) -> &[Pattern] {
        self.notifier.deprecation(IGNORE_BANG);
        self.session.guardfile_ignore_bang()
    }

    pub fn evaluator_options(&self) -> EvaluatorOptions {
        self.notifier.deprecation(EVALUATOR);
        self.session.evaluator_options()
    }
}
