//! Logging setup for the `pbac` binary.
//!
//! Filter directives come from `PBAC_LOG`, then `RUST_LOG`, then the
//! configured `logging.level`. Logs go to stderr so command output on stdout
//! stays machine-readable.
use std::env;
use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

/// Environment variable holding `pbac`-specific filter directives.
pub const LOG_ENV: &str = "PBAC_LOG";

static LOG_RELOAD_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Pick the filter directives in effect: the first non-blank of `pbac_log`
/// and `rust_log`, else `level`.
pub fn resolve_directives(
    pbac_log: Option<String>,
    rust_log: Option<String>,
    level: &str,
) -> String {
    [pbac_log, rust_log]
        .into_iter()
        .flatten()
        .map(|directives| directives.trim().to_string())
        .find(|directives| !directives.is_empty())
        .unwrap_or_else(|| level.to_string())
}

fn directives_for(level: &str) -> String {
    resolve_directives(env::var(LOG_ENV).ok(), env::var("RUST_LOG").ok(), level)
}

pub fn init_tracing_with_level(level: &str) {
    let base_filter = EnvFilter::try_new(directives_for(level))
        .unwrap_or_else(|_| EnvFilter::new(level));

    let (reload_layer, handle) = reload::Layer::new(base_filter);
    let _ = LOG_RELOAD_HANDLE.set(handle);

    let _ = tracing_subscriber::registry()
        .with(reload_layer)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Swap in the configured level once configuration is loaded. Directives
/// from the environment still take precedence.
pub fn apply_logging_level(level: &str) {
    let Some(handle) = LOG_RELOAD_HANDLE.get() else {
        return;
    };

    let directives = directives_for(level);
    match EnvFilter::try_new(&directives) {
        Ok(filter) => {
            let _ = handle.modify(|f| *f = filter);
        }
        Err(e) => tracing::warn!(directives, error = %e, "Ignoring invalid log filter"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pbac_log_wins_over_rust_log() {
        let directives = resolve_directives(
            Some("pbac_core=trace".to_string()),
            Some("debug".to_string()),
            "warn",
        );
        assert_eq!(directives, "pbac_core=trace");
    }

    #[test]
    fn test_rust_log_wins_over_configured_level() {
        let directives = resolve_directives(None, Some("debug".to_string()), "warn");
        assert_eq!(directives, "debug");
    }

    #[test]
    fn test_blank_env_falls_back_to_level() {
        let directives = resolve_directives(Some("  ".to_string()), Some(String::new()), "info");
        assert_eq!(directives, "info");
        assert!(EnvFilter::try_new(directives).is_ok());
    }
}
