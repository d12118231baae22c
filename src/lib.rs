//! Session configuration and scope resolution for a file-watching
//! automation tool.
//!
//! Command-line options and guardfile declarations are merged into one
//! [`Session`]: the listener arguments handed to the filesystem watcher, the
//! plugin and group scope handed to the runner, and the clearing and ignore
//! rules consulted between runs.

pub mod cli;
pub mod compat;
pub mod config;
pub mod logging;
pub mod session;

pub use config::Settings;
pub use session::{
    ClearingState, Evaluator, ListenerArgs, Session, SessionError, SessionOptions,
    SessionResult, SharedSession, TomlEvaluator,
};
