use std::process::Stdio;

use anyhow::{Context, Result};
use futures::{StreamExt, stream};
use tokio::process::Command;
use tokio_util::codec::{FramedRead, LinesCodec};
use tracing::{debug, warn};

use super::{EventStream, NotificationSource};
use crate::event::EventKind;
use crate::theme::gnome;

/// logind broadcasts `PrepareForSleep(true)` before suspend and
/// `PrepareForSleep(false)` after resume.
const SLEEP_MATCH: &str =
    "type='signal',interface='org.freedesktop.login1.Manager',member='PrepareForSleep'";

/// Notifications read from long-running system monitors: `gsettings monitor`
/// for the colour scheme and `dbus-monitor` for logind sleep signals.
pub struct MonitorSource;

impl NotificationSource for MonitorSource {
    fn subscribe(&mut self, kind: EventKind) -> Result<EventStream> {
        match kind {
            EventKind::AppearanceChanged => {
                let mut command = Command::new("gsettings");
                command.args(["monitor", gnome::SCHEMA, gnome::KEY]);
                line_events(command, kind, |_| true)
            }
            EventKind::Wake => {
                let mut command = Command::new("dbus-monitor");
                command.args(["--system", SLEEP_MATCH]);
                line_events(command, kind, is_resume)
            }
        }
    }
}

fn is_resume(line: &str) -> bool {
    line.trim() == "boolean false"
}

/// Spawn `command` and emit `kind` for every stdout line `accept` takes.
///
/// The child is killed when the stream is dropped.
fn line_events(mut command: Command, kind: EventKind, accept: fn(&str) -> bool) -> Result<EventStream> {
    let program = command.as_std().get_program().to_string_lossy().into_owned();
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to spawn {program}"))?;
    let stdout = child
        .stdout
        .take()
        .with_context(|| format!("{program} stdout was not captured"))?;
    debug!(program = %program, pid = ?child.id(), ?kind, "monitor started");

    let lines = FramedRead::new(stdout, LinesCodec::new());
    let events = stream::unfold((child, lines), move |(child, mut lines)| {
        let program = program.clone();
        async move {
            loop {
                let next = lines.next().await;
                match next {
                    Some(Ok(line)) if accept(&line) => return Some((kind, (child, lines))),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(program = %program, error = %e, "unreadable monitor output");
                        break;
                    }
                    None => break,
                }
            }
            warn!(program = %program, ?kind, "monitor exited");
            None
        }
    });
    Ok(events.boxed())
}
