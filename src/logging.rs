//! Logging setup and event macros.
//!
//! Timestamped compact output with per-module levels taken from the
//! `[logging]` table of `settings.toml`:
//!
//! ```toml
//! [logging]
//! default = "warn"
//!
//! [logging.modules]
//! vigil = "debug"
//! ```
//!
//! `RUST_LOG` takes precedence over the config:
//! ```bash
//! RUST_LOG=debug vigil show
//! RUST_LOG=compat=warn,vigil=trace vigil show
//! ```

use std::sync::Once;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Compact time format: HH:MM:SS.mmm
struct CompactTime;

impl FormatTime for CompactTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

/// Filter directive string for a logging config: the default level followed
/// by `module=level` pairs, sorted so the result is stable.
pub fn filter_directives(config: &LoggingConfig) -> String {
    let mut modules: Vec<_> = config.modules.iter().collect();
    modules.sort();

    let mut directives = config.default.clone();
    for (module, level) in modules {
        directives.push_str(&format!(",{module}={level}"));
    }
    directives
}

/// Initialize logging. Only the first call takes effect.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init_with_config(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(filter_directives(config))
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_timer(CompactTime)
            .with_level(true)
            .with_filter(filter);

        tracing_subscriber::registry().with(fmt_layer).init();
    });
}

/// Initialize logging with `LoggingConfig::default()` (`warn`).
pub fn init() {
    init_with_config(&LoggingConfig::default());
}

/// Log an event with component context.
///
/// # Examples
/// ```ignore
/// log_event!("session", "evaluated", "{} plugins", count);
/// log_event!("session", "reloaded");
/// ```
#[macro_export]
macro_rules! log_event {
    ($component:expr, $event:expr) => {
        tracing::info!("[{}] {}", $component, $event)
    };
    ($component:expr, $event:expr, $($arg:tt)*) => {
        tracing::info!("[{}] {}: {}", $component, $event, format!($($arg)*))
    };
}

/// Debug-only event logging.
///
/// # Examples
/// ```ignore
/// debug_event!("scope", "plugin declared", "{name}");
/// ```
#[macro_export]
macro_rules! debug_event {
    ($component:expr, $event:expr) => {
        tracing::debug!("[{}] {}", $component, $event)
    };
    ($component:expr, $event:expr, $($arg:tt)*) => {
        tracing::debug!("[{}] {}: {}", $component, $event, format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives_default_only() {
        assert_eq!(filter_directives(&LoggingConfig::default()), "warn");
    }

    #[test]
    fn test_filter_directives_with_modules() {
        let mut config = LoggingConfig::default();
        config.default = "info".to_string();
        config.modules.insert("vigil::session".to_string(), "trace".to_string());
        config.modules.insert("compat".to_string(), "error".to_string());

        assert_eq!(
            filter_directives(&config),
            "info,compat=error,vigil::session=trace"
        );
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
        crate::debug_event!("logging", "initialized");
    }
}
