//! Centralised tracing initialisation for evalloop hosts.
//!
//! Call [`init_tracing`] once at program start to configure the global
//! subscriber with an `EnvFilter` and optional JSON formatting.
//!
//! Subsequent calls are silently ignored (the global subscriber can only be
//! set once per process).

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable selecting JSON log output when set to `json`.
pub const LOG_FORMAT_ENV: &str = "EVALLOOP_LOG_FORMAT";

/// Initialise the global tracing subscriber.
///
/// * `json`: when `true`, emit newline-delimited JSON log lines.
/// * `level`: default verbosity when `RUST_LOG` is not set.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing(json: bool, level: Level) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init()
            .is_ok()
    }
}

/// Initialise tracing, picking the format from `EVALLOOP_LOG_FORMAT`.
pub fn init_tracing_from_env(level: Level) -> bool {
    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    init_tracing(json, level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_ignored() {
        let _ = init_tracing(false, Level::WARN);
        assert!(!init_tracing(true, Level::DEBUG));
    }
}
