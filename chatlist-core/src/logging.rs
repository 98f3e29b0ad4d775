//! Logging setup for applications embedding the core.
//!
//! Console output through an env-filtered `fmt` subscriber, plus an optional
//! daily-rolling log file (one file per day, as the desktop app expects).

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// With a `log_dir`, log lines go to a daily-rolling `chatlist.log.*` file in
/// that directory (created if missing); without one they go to stderr. The
/// returned guard must be kept alive for the lifetime of the application or
/// buffered file output is lost.
///
/// Call once at startup; a second call returns an error from the subscriber
/// registry.
pub fn init(log_dir: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::from_default_env()
        .add_directive("chatlist_core=debug".parse()?)
        .add_directive(tracing::Level::INFO.into());

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, "chatlist.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to set subscriber: {e}"))?;

            tracing::info!(dir = %dir.display(), "Logging to daily file");
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .try_init()
                .map_err(|e| anyhow::anyhow!("Failed to set subscriber: {e}"))?;
            Ok(None)
        }
    }
}
