use std::fs::File;
use std::path::{Path, PathBuf};

use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Environment variable that overrides the configured filter.
pub const LOG_ENV: &str = "ELMLAND_LOG";

/// Install the global tracing subscriber.
///
/// `ELMLAND_LOG` takes precedence over `config.filter`. When `config.file`
/// is set, output goes to `{file}.{timestamp}.{pid}` so that concurrent
/// processes never share a file; if that file cannot be created, logging
/// falls back to stderr.
///
/// Calling this more than once is harmless; only the first call installs.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file = config.file.as_deref().and_then(|path| {
        let unique = unique_log_path(path);
        match File::create(&unique) {
            Ok(file) => Some(file),
            Err(err) => {
                eprintln!("Warning: failed to create log file {}: {err}", unique.display());
                None
            }
        }
    });

    let registry = tracing_subscriber::registry().with(filter);
    let result = match file {
        Some(file) => registry
            .with(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_timer(UtcTime::rfc_3339()),
            )
            .try_init(),
        None => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(config.ansi)
                    .with_target(true)
                    .with_timer(UtcTime::rfc_3339()),
            )
            .try_init(),
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

fn unique_log_path(path: &Path) -> PathBuf {
    let pid = std::process::id();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    PathBuf::from(format!("{}.{}.{}", path.display(), timestamp, pid))
}
