use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, TimeDelta, Utc};
use futures::{StreamExt, stream};
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{debug, info};

use super::{EventStream, NotificationSource};
use crate::event::EventKind;
use crate::theme::{Appearance, AppearanceSource};
use crate::time::{Clock, format_gap};

/// Wall-clock drift past the monotonic clock larger than this many intervals
/// is treated as sleep.
const WAKE_FACTOR: u32 = 3;

/// Synthesizes notifications by sampling. Appearance changes come from
/// re-reading the appearance source; wakes from the wall clock running ahead
/// of the runtime's monotonic timer, which stops while the host sleeps.
pub struct PollingSource {
    appearance: Arc<dyn AppearanceSource>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl PollingSource {
    pub fn new(appearance: Arc<dyn AppearanceSource>, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            appearance,
            clock,
            interval,
        }
    }

    fn appearance_changes(&self) -> EventStream {
        let mut ticks = interval(self.interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let state = (ticks, ChangeDetector::default(), Arc::clone(&self.appearance));
        stream::unfold(state, |(mut ticks, mut detector, source)| async move {
            loop {
                ticks.tick().await;
                let appearance = match source.current() {
                    Ok(raw) => Appearance::parse(&raw),
                    Err(e) => {
                        debug!(error = %format!("{e:#}"), "appearance sample failed");
                        continue;
                    }
                };
                if detector.observe(appearance) {
                    debug!(?appearance, "appearance changed");
                    return Some((EventKind::AppearanceChanged, (ticks, detector, source)));
                }
            }
        })
        .boxed()
    }

    fn wakes(&self) -> EventStream {
        let mut ticks = interval(self.interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let threshold = wake_threshold(self.interval);
        let clock = Arc::clone(&self.clock);
        let detector = WakeDetector::new(clock.now(), Instant::now(), threshold);
        stream::unfold((ticks, detector, clock), |(mut ticks, mut detector, clock)| async move {
            loop {
                ticks.tick().await;
                if let Some(slept) = detector.observe(clock.now(), Instant::now()) {
                    info!(slept = %format_gap(slept), "wall clock ran ahead, assuming wake");
                    return Some((EventKind::Wake, (ticks, detector, clock)));
                }
            }
        })
        .boxed()
    }
}

impl NotificationSource for PollingSource {
    fn subscribe(&mut self, kind: EventKind) -> Result<EventStream> {
        Ok(match kind {
            EventKind::AppearanceChanged => self.appearance_changes(),
            EventKind::Wake => self.wakes(),
        })
    }
}

fn wake_threshold(interval: Duration) -> TimeDelta {
    interval
        .checked_mul(WAKE_FACTOR)
        .and_then(|limit| TimeDelta::from_std(limit).ok())
        .unwrap_or(TimeDelta::MAX)
}

/// Fires when a sample differs from the one before it. The first sample
/// only sets the baseline.
#[derive(Debug, Default)]
struct ChangeDetector {
    last: Option<Appearance>,
}

impl ChangeDetector {
    fn observe(&mut self, appearance: Appearance) -> bool {
        let changed = self.last.is_some_and(|last| last != appearance);
        self.last = Some(appearance);
        changed
    }
}

/// Compares wall-clock progress with monotonic progress between samples.
/// Both advance together while the process is merely busy; only the wall
/// clock advances while the host sleeps.
#[derive(Debug)]
struct WakeDetector {
    last_wall: DateTime<Utc>,
    last_mono: Instant,
    threshold: TimeDelta,
}

impl WakeDetector {
    fn new(wall: DateTime<Utc>, mono: Instant, threshold: TimeDelta) -> Self {
        Self {
            last_wall: wall,
            last_mono: mono,
            threshold,
        }
    }

    /// Returns the time unaccounted for by the monotonic clock when it
    /// exceeds the threshold.
    fn observe(&mut self, wall: DateTime<Utc>, mono: Instant) -> Option<TimeDelta> {
        let wall_gap = wall - self.last_wall;
        let mono_gap = TimeDelta::from_std(mono.saturating_duration_since(self.last_mono))
            .unwrap_or(TimeDelta::MAX);
        self.last_wall = wall;
        self.last_mono = mono;
        let drift = wall_gap - mono_gap;
        (drift > self.threshold).then_some(drift)
    }
}
