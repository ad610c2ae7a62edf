//! Tracing subscriber setup
//!
//! The library only emits `tracing` events. Applications that do not install
//! their own subscriber can call [`init_tracing`] once at startup.

use crate::policy::Level as MetricsLevel;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted for a `tracing` filter directive
pub const LOG_FILTER_ENV: &str = "UMAMI_LOG";

/// Install a formatted subscriber at the given maximum level.
///
/// `UMAMI_LOG` takes precedence when set. Returns `false` if a global
/// subscriber was already installed.
pub fn init_tracing(max_level: Level) -> bool {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(max_level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .try_init()
        .is_ok()
}

/// Same as [`init_tracing`] but emits newline-delimited JSON
pub fn init_json_tracing(max_level: Level) -> bool {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(max_level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

/// Log verbosity that matches a metrics level.
///
/// Handy when one knob drives both metrics and logs.
pub fn tracing_level_for(level: MetricsLevel) -> Level {
    match level {
        MetricsLevel::Disabled | MetricsLevel::Critical => Level::ERROR,
        MetricsLevel::Important => Level::INFO,
        MetricsLevel::Debug => Level::DEBUG,
        MetricsLevel::Verbose => Level::TRACE,
    }
}
