use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

/// Wall clock. Unlike the runtime's monotonic timer it keeps running while
/// the host sleeps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

#[cfg(test)]
pub struct ManualClock(std::sync::Mutex<DateTime<Utc>>);

#[cfg(test)]
impl ManualClock {
    pub fn at(timestamp: i64) -> Self {
        use chrono::TimeZone;
        Self(std::sync::Mutex::new(Utc.timestamp_opt(timestamp, 0).unwrap()))
    }

    pub fn advance(&self, secs: i64) {
        *self.0.lock().unwrap() += TimeDelta::seconds(secs);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

/// Coarse human form of a gap, for log lines.
pub fn format_gap(gap: TimeDelta) -> String {
    if gap.num_minutes() < 1 {
        format!("{}s", gap.num_seconds())
    } else if gap.num_hours() < 1 {
        format!("{}m", gap.num_minutes())
    } else if gap.num_hours() < 24 {
        format!("{}h", gap.num_hours())
    } else {
        format!("{}d", gap.num_days())
    }
}
