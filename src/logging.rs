//! Logging for the index, watcher and server.
//!
//! Lines go to stderr as `HH:MM:SS.mmm LEVEL target: [component] event: details`,
//! so stdout stays free for command output such as `index --json`.
//!
//! # Configuration
//!
//! ```toml
//! [logging]
//! default = "info"
//!
//! [logging.modules]
//! "wikidex::watcher" = "debug"   # every dispatched and debounced event
//! ```
//!
//! `RUST_LOG` replaces the configured filter:
//! ```bash
//! RUST_LOG=debug wikidex serve
//! RUST_LOG=wikidex::watcher=trace wikidex watch
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

/// Install the stderr subscriber for `wikidex`.
///
/// Only the first call installs anything. `RUST_LOG`, when set, replaces the
/// filter built from `[logging]`.
pub fn init_with_config(config: &LoggingConfig) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(filter_directives(config))
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_timer(CompactTime)
            .with_level(true)
            .with_writer(std::io::stderr)
            .with_filter(filter);

        tracing_subscriber::registry().with(fmt_layer).init();
    });
}

/// Filter string for a config: the default level, then `,module=level`
/// per override.
pub fn filter_directives(config: &LoggingConfig) -> String {
    let mut filter_str = config.default.clone();
    for (module, level) in &config.modules {
        filter_str.push_str(&format!(",{module}={level}"));
    }
    filter_str
}

/// Log an event with component context: `[component] event: details`.
///
/// # Examples
/// ```ignore
/// log_event!("watcher", "update", "{}", relative);
/// log_event!("index", "rebuilt");
/// ```
#[macro_export]
macro_rules! log_event {
    ($handler:expr, $event:expr) => {
        tracing::info!("[{}] {}", $handler, $event)
    };
    ($handler:expr, $event:expr, $($arg:tt)*) => {
        tracing::info!("[{}] {}: {}", $handler, $event, format!($($arg)*))
    };
}

/// [`log_event!`] at debug level.
///
/// # Examples
/// ```ignore
/// debug_event!("broadcast", "sent", "update hp.md to 2 subscribers");
/// ```
#[macro_export]
macro_rules! debug_event {
    ($handler:expr, $event:expr) => {
        tracing::debug!("[{}] {}", $handler, $event)
    };
    ($handler:expr, $event:expr, $($arg:tt)*) => {
        tracing::debug!("[{}] {}: {}", $handler, $event, format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives_default_only() {
        assert_eq!(filter_directives(&LoggingConfig::default()), "info");
    }

    #[test]
    fn test_filter_directives_with_modules() {
        let mut config = LoggingConfig {
            default: "warn".to_string(),
            ..Default::default()
        };
        config
            .modules
            .insert("wikidex::watcher".to_string(), "debug".to_string());
        config
            .modules
            .insert("tower_http".to_string(), "info".to_string());

        assert_eq!(
            filter_directives(&config),
            "warn,tower_http=info,wikidex::watcher=debug"
        );
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        init_with_config(&LoggingConfig::default());
    }
}
