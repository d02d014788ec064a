//! File-based tracing setup. Log output never goes to the terminal the
//! REPL is drawing on.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Env var that, when set, replaces the verbosity-derived filter.
pub const LOG_ENV: &str = "SCHOLAR_LOG";

pub fn filter_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => concat!(
            "info,scholar=debug,scholar_application=debug,",
            "scholar_infrastructure=debug,scholar_interaction=debug"
        ),
        _ => "trace",
    }
}

/// Installs the global subscriber writing to a daily rolling file in `log_dir`.
///
/// The returned guard flushes buffered lines on drop, so keep it alive for
/// the whole process.
pub fn init(log_dir: &Path, verbose: u8) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let appender = tracing_appender::rolling::daily(log_dir, "scholar.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(filter_for(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(filter_for(0), "warn");
        assert!(filter_for(1).contains("scholar_application=debug"));
        assert_eq!(filter_for(5), "trace");
    }
}
