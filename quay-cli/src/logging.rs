//! Logging setup for the CLI.
//!
//! - `--debug` / `QUAY_DEBUG=true` - debug-level logs plus wire tracing
//! - `QUAY_LOG=<filter>` - explicit `tracing-subscriber` filter directive
//! - `QUAY_LOG_FORMAT=json|compact` - output format (default: compact)
//!
//! Logs are written to stderr.

use std::env;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding an explicit filter directive.
pub const LOG_ENV: &str = "QUAY_LOG";

/// Build the filter for the given debug setting.
pub fn filter(debug: bool) -> EnvFilter {
    filter_from(env::var(LOG_ENV).ok().as_deref(), debug)
}

fn filter_from(directive: Option<&str>, debug: bool) -> EnvFilter {
    if let Some(filter) = directive.and_then(|d| EnvFilter::try_new(d).ok()) {
        return filter;
    }

    if debug {
        EnvFilter::new("quay=debug,quay_postgres=debug,quay_cli=debug")
    } else {
        EnvFilter::new("warn")
    }
}

/// Install the global subscriber. Subsequent calls are no-ops.
pub fn init(verbose: bool) {
    let filter = filter(verbose);
    let json = env::var("QUAY_LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let result = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init()
    };

    if result.is_ok() {
        tracing::debug!(debug = verbose, "Logging initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_is_quiet() {
        assert_eq!(filter_from(None, false).to_string(), "warn");
    }

    #[test]
    fn test_debug_filter_covers_crates() {
        let filter = filter_from(None, true).to_string();
        assert!(filter.contains("quay_postgres=debug"));
        assert!(filter.contains("quay_cli=debug"));
    }

    #[test]
    fn test_explicit_directive_wins() {
        assert_eq!(filter_from(Some("info"), true).to_string(), "info");
        assert_eq!(filter_from(Some("quay=loud"), false).to_string(), "warn");
    }
}
