use std::fmt;

/// System notifications the daemon reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The interface theme changed (`AppleInterfaceThemeChangedNotification`
    /// on macOS, `color-scheme` on GNOME).
    AppearanceChanged,
    /// The host or its displays woke from sleep.
    Wake,
}

/// Why a sync ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Startup,
    Event(EventKind),
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Startup => f.write_str("startup"),
            Trigger::Event(EventKind::AppearanceChanged) => f.write_str("appearance change"),
            Trigger::Event(EventKind::Wake) => f.write_str("wake"),
        }
    }
}
