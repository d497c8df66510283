// Logging initialization
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Keeps the subscriber installed; logging is torn down when it is dropped.
pub struct LogGuard {
    _guard: DefaultGuard,
}

/// Installs the logging sink for the current thread.
///
/// Without `log_file`, events go to stderr and only when `verbose` is set.
/// With `log_file`, events at info level (debug when `verbose`) are appended
/// to that file.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<LogGuard> {
    let (level_filter, level) = match (verbose, log_file.is_some()) {
        (true, _) => (LevelFilter::DEBUG, "debug"),
        (false, true) => (LevelFilter::INFO, "info"),
        (false, false) => (LevelFilter::OFF, "off"),
    };
    let app_filter = Targets::new().with_target("kopilka", level_filter);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (stderr_layer, file_layer) = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            let layer = fmt::layer().with_ansi(false).with_writer(Mutex::new(file));
            (None, Some(layer))
        }
        None => (Some(fmt::layer().pretty().without_time()), None),
    };

    let guard = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .with(app_filter)
        .with(env_filter)
        .set_default();

    Ok(LogGuard { _guard: guard })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_logging_writes_events() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("kopilka.log");
        {
            let _guard = init_logging(false, Some(&path))?;
            tracing::info!(target: "kopilka", "report started");
        }
        let contents = std::fs::read_to_string(&path)?;
        assert!(contents.contains("report started"));
        Ok(())
    }
}
