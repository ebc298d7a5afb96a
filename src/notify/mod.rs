#[cfg(not(target_os = "macos"))]
mod monitor;
mod poll;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::ValueEnum;
use futures::stream::BoxStream;
use tracing::warn;

use crate::event::EventKind;
use crate::theme::AppearanceSource;
use crate::time::system_clock;

#[cfg(not(target_os = "macos"))]
pub use monitor::MonitorSource;
pub use poll::PollingSource;

/// Occurrences of one subscribed notification. Ends only if the underlying
/// facility goes away.
pub type EventStream = BoxStream<'static, EventKind>;

/// Publish/subscribe access to system notifications.
pub trait NotificationSource {
    fn subscribe(&mut self, kind: EventKind) -> Result<EventStream>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WatchMode {
    /// Native notifications where available, polling otherwise
    Auto,
    /// gsettings and logind signals (Linux)
    Monitor,
    /// Sample the appearance and wall clock on an interval
    Poll,
}

pub fn system_notifications(
    mode: WatchMode,
    appearance: Arc<dyn AppearanceSource>,
    interval: Duration,
) -> Result<Box<dyn NotificationSource>> {
    match mode {
        WatchMode::Poll => Ok(Box::new(PollingSource::new(
            appearance,
            system_clock(),
            interval,
        ))),
        #[cfg(not(target_os = "macos"))]
        WatchMode::Auto => Ok(Box::new(Fallback::new(
            Box::new(MonitorSource),
            Box::new(PollingSource::new(appearance, system_clock(), interval)),
        ))),
        #[cfg(not(target_os = "macos"))]
        WatchMode::Monitor => Ok(Box::new(MonitorSource)),
        #[cfg(target_os = "macos")]
        WatchMode::Auto => Ok(Box::new(PollingSource::new(
            appearance,
            system_clock(),
            interval,
        ))),
        #[cfg(target_os = "macos")]
        WatchMode::Monitor => {
            anyhow::bail!("--watch monitor needs gsettings and dbus-monitor; use poll on macOS")
        }
    }
}

/// Subscribes through `primary`, switching to `fallback` for any kind the
/// primary can't deliver.
#[cfg_attr(target_os = "macos", allow(dead_code))]
pub struct Fallback {
    primary: Box<dyn NotificationSource>,
    fallback: Box<dyn NotificationSource>,
}

#[cfg_attr(target_os = "macos", allow(dead_code))]
impl Fallback {
    pub fn new(primary: Box<dyn NotificationSource>, fallback: Box<dyn NotificationSource>) -> Self {
        Self { primary, fallback }
    }
}

impl NotificationSource for Fallback {
    fn subscribe(&mut self, kind: EventKind) -> Result<EventStream> {
        match self.primary.subscribe(kind) {
            Ok(events) => Ok(events),
            Err(e) => {
                warn!(?kind, error = %format!("{e:#}"), "native notifications unavailable, polling instead");
                self.fallback.subscribe(kind)
            }
        }
    }
}
