//! Fakes for the daemon's collaborators.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use futures::StreamExt;
use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};

use crate::event::EventKind;
use crate::launch::{Invocation, LaunchError, Launcher};
use crate::notify::{EventStream, NotificationSource};
use crate::theme::AppearanceSource;

/// Returns the given values in order, then keeps repeating the last one.
pub struct ScriptedAppearance {
    values: Mutex<VecDeque<String>>,
    reads: AtomicUsize,
}

impl ScriptedAppearance {
    pub fn new(values: &[&str]) -> Self {
        assert!(!values.is_empty(), "script needs at least one appearance");
        Self {
            values: Mutex::new(values.iter().map(|v| v.to_string()).collect()),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl AppearanceSource for ScriptedAppearance {
    fn current(&self) -> Result<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let mut values = self.values.lock().unwrap();
        if values.len() > 1 {
            Ok(values.pop_front().unwrap())
        } else {
            Ok(values[0].clone())
        }
    }
}

pub struct BrokenAppearance;

impl AppearanceSource for BrokenAppearance {
    fn current(&self) -> Result<String> {
        Err(anyhow!("appearance service unavailable"))
    }
}

/// Records invocations instead of running them. Queued results are handed
/// out first; after that every run exits 0.
#[derive(Default)]
pub struct RecordingLauncher {
    calls: Mutex<Vec<Invocation>>,
    results: Mutex<VecDeque<Result<Option<i32>, LaunchError>>>,
}

impl RecordingLauncher {
    pub fn push_result(&self, result: Result<Option<i32>, LaunchError>) {
        self.results.lock().unwrap().push_back(result);
    }

    pub fn results_left(&self) -> usize {
        self.results.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }
}

impl Launcher for RecordingLauncher {
    fn run(&self, invocation: &Invocation) -> Result<Option<i32>, LaunchError> {
        self.calls.lock().unwrap().push(invocation.clone());
        self.results.lock().unwrap().pop_front().unwrap_or(Ok(Some(0)))
    }
}

/// A notification facility that isn't installed.
pub struct FailingSource;

impl NotificationSource for FailingSource {
    fn subscribe(&mut self, kind: EventKind) -> Result<EventStream> {
        Err(anyhow!("no notification facility for {kind:?}"))
    }
}

/// Notifications fed by the test through channels. Each subscription notes
/// how many launches had happened when it was made.
pub struct ChannelSource {
    receivers: Vec<(EventKind, UnboundedReceiver<EventKind>)>,
    launcher: Arc<RecordingLauncher>,
    subscriptions: Vec<(EventKind, usize)>,
}

impl ChannelSource {
    /// Returns the source with senders for appearance changes and wakes.
    pub fn new(
        launcher: Arc<RecordingLauncher>,
    ) -> (Self, UnboundedSender<EventKind>, UnboundedSender<EventKind>) {
        let (changes_tx, changes_rx) = unbounded();
        let (wakes_tx, wakes_rx) = unbounded();
        let source = Self {
            receivers: vec![
                (EventKind::AppearanceChanged, changes_rx),
                (EventKind::Wake, wakes_rx),
            ],
            launcher,
            subscriptions: Vec::new(),
        };
        (source, changes_tx, wakes_tx)
    }

    pub fn subscriptions(&self) -> Vec<(EventKind, usize)> {
        self.subscriptions.clone()
    }
}

impl NotificationSource for ChannelSource {
    fn subscribe(&mut self, kind: EventKind) -> Result<EventStream> {
        let index = self
            .receivers
            .iter()
            .position(|(k, _)| *k == kind)
            .ok_or_else(|| anyhow!("already subscribed to {kind:?}"))?;
        let (_, receiver) = self.receivers.remove(index);
        self.subscriptions.push((kind, self.launcher.calls().len()));
        Ok(receiver.boxed())
    }
}
