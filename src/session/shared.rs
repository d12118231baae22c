//! Swappable handle to the live session.
//!
//! Readers (the listener thread, plugin dispatch) clone out an `Arc` and keep
//! working with that snapshot; a reload swaps in a fully evaluated
//! replacement in one step.

use parking_lot::RwLock;
use std::sync::Arc;

use super::Session;
use super::error::SessionResult;
use super::evaluator::Evaluator;

#[derive(Debug)]
pub struct SharedSession {
    inner: RwLock<Arc<Session>>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: RwLock::new(Arc::new(session)),
        }
    }

    /// The session currently in effect.
    pub fn current(&self) -> Arc<Session> {
        self.inner.read().clone()
    }

    /// Swap in `session`, returning the one it replaced.
    pub fn replace(&self, session: Session) -> Arc<Session> {
        self.swap(Arc::new(session))
    }

    fn swap(&self, session: Arc<Session>) -> Arc<Session> {
        std::mem::replace(&mut *self.inner.write(), session)
    }

    /// Re-evaluate the guardfile into a new session and swap it in.
    ///
    /// Returns the session this call built, even if another writer has
    /// replaced it since. On error the current session stays in place.
    pub fn reload<E: Evaluator + ?Sized>(&self, evaluator: &E) -> SessionResult<Arc<Session>> {
        let fresh = Arc::new(self.current().reload(evaluator)?);
        self.swap(Arc::clone(&fresh));
        Ok(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{DeclOptions, PathStyle, SessionError, SessionOptions};
    use std::path::Path;

    fn evaluated(plugins: &[&str]) -> Session {
        let mut session =
            Session::with_cwd(SessionOptions::default(), Path::new("/work"), PathStyle::Posix)
                .unwrap();
        let names: Vec<String> = plugins.iter().map(|s| s.to_string()).collect();
        session
            .evaluate(&|s: &mut Session| -> SessionResult<()> {
                for name in &names {
                    s.declare_plugin(name, None, DeclOptions::new())?;
                }
                Ok(())
            })
            .unwrap();
        session
    }

    #[test]
    fn test_replace_swaps_atomically() {
        let shared = SharedSession::new(evaluated(&["rspec"]));
        let before = shared.current();

        let old = shared.replace(evaluated(&["rubocop"]));

        assert_eq!(old.cmdline_plugins(), vec!["rspec"]);
        // Readers holding the old snapshot keep seeing it
        assert_eq!(before.cmdline_plugins(), vec!["rspec"]);
        assert_eq!(shared.current().cmdline_plugins(), vec!["rubocop"]);
    }

    #[test]
    fn test_failed_reload_keeps_current() {
        let shared = SharedSession::new(evaluated(&["rspec"]));

        let result = shared.reload(&|_: &mut Session| -> SessionResult<()> {
            Err(SessionError::Evaluation {
                reason: "syntax error".into(),
            })
        });

        assert!(result.is_err());
        assert_eq!(shared.current().cmdline_plugins(), vec!["rspec"]);
    }

    #[test]
    fn test_reload_is_visible_to_readers() {
        let shared = SharedSession::new(evaluated(&["rspec"]));

        let reloaded = shared
            .reload(&|s: &mut Session| -> SessionResult<()> {
                s.clearing(true);
                Ok(())
            })
            .unwrap();

        assert!(reloaded.is_clearing());
        assert!(shared.current().is_clearing());
        assert!(shared.current().cmdline_plugins().is_empty());
    }

    #[test]
    fn test_reload_returns_the_session_it_built() {
        let shared = SharedSession::new(evaluated(&["rspec"]));

        let reloaded = shared
            .reload(&|s: &mut Session| -> SessionResult<()> {
                s.declare_plugin("rubocop", None, DeclOptions::new())?;
                Ok(())
            })
            .unwrap();
        // Another writer swaps in before the caller looks at the result
        shared.replace(evaluated(&["jasmine"]));

        assert_eq!(reloaded.cmdline_plugins(), vec!["rubocop"]);
        assert_eq!(shared.current().cmdline_plugins(), vec!["jasmine"]);
        assert!(!Arc::ptr_eq(&reloaded, &shared.current()));
    }
}
