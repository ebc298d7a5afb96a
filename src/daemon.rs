use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use futures::{StreamExt, stream};
use tracing::{debug, error, info, warn};

use crate::event::{EventKind, Trigger};
use crate::launch::{CommandSpec, LAUNCH_FAILURE_STATUS, LaunchError, Launcher};
use crate::notify::NotificationSource;
use crate::theme::{Appearance, AppearanceSource, Theme};

/// Result of one sync.
#[derive(Debug)]
pub enum Outcome {
    /// The appearance matched neither theme; nothing was launched.
    Skipped,
    /// The command ran. `code` is `None` if it was killed by a signal.
    Exited { theme: Theme, code: Option<i32> },
    LaunchFailed { theme: Theme, error: LaunchError },
}

impl Outcome {
    /// Exit status in shell terms.
    pub fn status(&self) -> i32 {
        match self {
            Outcome::Skipped => 0,
            Outcome::Exited { code, .. } => code.unwrap_or(-1),
            Outcome::LaunchFailed { .. } => LAUNCH_FAILURE_STATUS,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Skipped => f.write_str("skipped, appearance unresolved"),
            Outcome::Exited { theme, code: Some(code) } => write!(f, "{theme}: exit {code}"),
            Outcome::Exited { theme, code: None } => write!(f, "{theme}: killed by signal"),
            Outcome::LaunchFailed { theme, error } => write!(f, "{theme}: {error}"),
        }
    }
}

/// Keeps the external command's theme in step with the system appearance.
pub struct Daemon {
    appearance: Arc<dyn AppearanceSource>,
    launcher: Arc<dyn Launcher>,
    command: CommandSpec,
    /// Syncs scheduled for the next loop turn.
    deferred: VecDeque<Trigger>,
}

impl Daemon {
    pub fn new(appearance: Arc<dyn AppearanceSource>, launcher: Arc<dyn Launcher>, command: CommandSpec) -> Self {
        Self {
            appearance,
            launcher,
            command,
            deferred: VecDeque::new(),
        }
    }

    /// Read the appearance and, if it resolves, run the command to completion.
    ///
    /// Never fails: launch errors and non-zero exits are logged and reported
    /// in the outcome.
    pub fn sync(&self, trigger: Trigger) -> Outcome {
        let appearance = match self.appearance.current() {
            Ok(raw) => {
                let appearance = Appearance::parse(&raw);
                debug!(%trigger, raw = %raw, ?appearance, "read appearance");
                appearance
            }
            Err(e) => {
                warn!(%trigger, error = %format!("{e:#}"), "could not read appearance");
                Appearance::Unknown
            }
        };

        let Some(theme) = appearance.theme() else {
            info!(%trigger, "appearance unresolved, leaving theme alone");
            return Outcome::Skipped;
        };
        let invocation = self.command.invocation(theme);

        debug!(%trigger, %invocation, "launching");
        match self.launcher.run(&invocation) {
            Ok(code) => {
                if code == Some(0) {
                    info!(%trigger, %theme, "theme activated");
                } else {
                    warn!(%trigger, %theme, ?code, "theme command failed");
                }
                Outcome::Exited { theme, code }
            }
            Err(error) => {
                error!(%trigger, %theme, %error, "could not launch theme command");
                Outcome::LaunchFailed { theme, error }
            }
        }
    }

    /// React to one notification.
    ///
    /// A wake syncs immediately. An appearance change is deferred to the next
    /// loop turn, since the new value may not be readable yet while the
    /// notification is being delivered.
    pub fn handle(&mut self, kind: EventKind) -> Option<Outcome> {
        let trigger = Trigger::Event(kind);
        match kind {
            EventKind::Wake => Some(self.sync(trigger)),
            EventKind::AppearanceChanged => {
                self.deferred.push_back(trigger);
                None
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.deferred.len()
    }

    /// Run syncs deferred by earlier handlers, oldest first.
    pub fn run_deferred(&mut self) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(self.deferred.len());
        while let Some(trigger) = self.deferred.pop_front() {
            outcomes.push(self.sync(trigger));
        }
        outcomes
    }

    /// Sync once, subscribe, then service notifications.
    ///
    /// Only returns when every subscription has ended.
    pub async fn run(mut self, source: &mut dyn NotificationSource) -> Result<()> {
        self.sync(Trigger::Startup);

        let changes = source.subscribe(EventKind::AppearanceChanged)?;
        let wakes = source.subscribe(EventKind::Wake)?;
        let mut events = stream::select(changes, wakes);
        info!("listening for appearance and wake notifications");

        loop {
            if self.pending() > 0 {
                tokio::task::yield_now().await;
                self.run_deferred();
            }
            let Some(kind) = events.next().await else {
                break;
            };
            debug!(?kind, "notification");
            self.handle(kind);
        }

        warn!("all notification subscriptions ended");
        Ok(())
    }
}
