mod daemon;
mod event;
mod launch;
mod logging;
mod notify;
mod theme;
mod time;

#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;
use tracing::{info, warn};

use daemon::Daemon;
use event::Trigger;
use launch::{CommandSpec, ProcessLauncher};
use notify::WatchMode;

#[derive(Parser)]
#[command(name = "skinner-sync", version)]
#[command(about = "Keep skinner's theme in step with the system light/dark appearance")]
struct Cli {
    /// Theme command: a name looked up on PATH, or a path
    #[arg(long, default_value = "skinner")]
    command: String,
    /// Run the command through this launcher, e.g. /usr/bin/env
    #[arg(long)]
    launcher: Option<String>,
    /// How to receive appearance and wake notifications
    #[arg(long, value_enum, default_value_t = WatchMode::Auto)]
    watch: WatchMode,
    /// Seconds between samples in poll mode
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..=86_400))]
    poll_interval: u64,
    /// Sync once and exit with the command's status
    #[arg(long)]
    once: bool,
    /// Log file [default: <cache dir>/skinner-sync/skinner-sync.log]
    #[arg(long)]
    log_file: Option<PathBuf>,
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Extra arguments passed after `activate <theme>`
    #[arg(last = true)]
    extra: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let guard = cli
        .log_file
        .clone()
        .or_else(logging::default_path)
        .and_then(|path| logging::init(&path, cli.verbose));

    let command = CommandSpec {
        command: cli.command,
        launcher: cli.launcher,
        extra_args: cli.extra,
    };
    let appearance = theme::system_appearance();
    let daemon = Daemon::new(Arc::clone(&appearance), Arc::new(ProcessLauncher), command);

    if cli.once {
        let outcome = daemon.sync(Trigger::Startup);
        info!(%outcome, "one-shot sync finished");
        let status = outcome.status();
        drop(guard);
        std::process::exit(status);
    }

    let mut source = notify::system_notifications(
        cli.watch,
        appearance,
        Duration::from_secs(cli.poll_interval),
    )?;

    tokio::select! {
        result = daemon.run(source.as_mut()) => {
            result?;
            bail!("notification sources closed");
        }
        _ = shutdown_signal() => {
            info!("terminated");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    () = interrupt() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "could not listen for SIGTERM");
                interrupt().await;
            }
        }
    }
    #[cfg(not(unix))]
    interrupt().await;
}

/// Resolves on Ctrl-C. Never resolves if the handler can't be installed, so
/// the daemon keeps running until it is killed.
async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn poll_interval_is_bounded() {
        assert!(Cli::try_parse_from(["skinner-sync", "--poll-interval", "0"]).is_err());
        assert!(Cli::try_parse_from(["skinner-sync", "--poll-interval", "86401"]).is_err());
        let cli = Cli::try_parse_from(["skinner-sync", "--poll-interval", "86400"]).unwrap();
        assert_eq!(cli.poll_interval, 86_400);
    }

    #[test]
    fn trailing_args_are_collected() {
        let cli = Cli::try_parse_from(["skinner-sync", "--", "--quiet"]).unwrap();
        assert_eq!(cli.extra, ["--quiet"]);
    }
}
