use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// `<cache dir>/skinner-sync/skinner-sync.log`, if the platform has a cache dir.
pub fn default_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("skinner-sync").join("skinner-sync.log"))
}

/// Initialize tracing with file output.
///
/// Returns a guard that must be held for the lifetime of the process to
/// ensure logs are flushed. Returns `None`, leaving logging off, when the
/// log directory can't be created.
pub fn init(log_path: &Path, verbosity: u8) -> Option<WorkerGuard> {
    let parent = log_path.parent()?;
    std::fs::create_dir_all(parent).ok()?;
    let file_appender = tracing_appender::rolling::never(parent, log_path.file_name()?);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::new(format!("skinner_sync={level}")))
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    Some(guard)
}
