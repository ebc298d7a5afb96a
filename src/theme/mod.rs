mod detect;

use std::fmt;

#[cfg(not(target_os = "macos"))]
pub(crate) use detect::gnome;
pub use detect::{AppearanceSource, system_appearance};

/// OS-reported interface appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Appearance {
    Light,
    Dark,
    Unknown,
}

impl Appearance {
    /// Classify a raw appearance string from the OS.
    ///
    /// Matching is case-insensitive and "dark" wins over "light", so a name
    /// like `NSAppearanceNameDarkAqua` or `Dark Aqua` is always dark.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.to_lowercase();
        if raw.contains("dark") {
            Appearance::Dark
        } else if raw.contains("light") {
            Appearance::Light
        } else {
            Appearance::Unknown
        }
    }

    /// The theme to activate, or `None` when the appearance is unresolved.
    pub fn theme(self) -> Option<Theme> {
        match self {
            Appearance::Light => Some(Theme::Light),
            Appearance::Dark => Some(Theme::Dark),
            Appearance::Unknown => None,
        }
    }
}

/// Theme name passed to the external command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_names_resolve_dark() {
        for raw in ["Dark", "dark aqua", "NSAppearanceNameDarkAqua", "'prefer-dark'", "DARK"] {
            assert_eq!(Appearance::parse(raw), Appearance::Dark, "{raw}");
        }
    }

    #[test]
    fn light_names_resolve_light() {
        for raw in ["Light", "light", "'prefer-LIGHT'", "NSAppearanceNameVibrantLight"] {
            assert_eq!(Appearance::parse(raw), Appearance::Light, "{raw}");
        }
    }

    #[test]
    fn dark_is_checked_before_light() {
        assert_eq!(Appearance::parse("light-on-dark"), Appearance::Dark);
    }

    #[test]
    fn anything_else_is_unknown() {
        for raw in ["", "NSAppearanceNameAqua", "default", "high contrast"] {
            assert_eq!(Appearance::parse(raw), Appearance::Unknown, "{raw}");
        }
        assert_eq!(Appearance::Unknown.theme(), None);
    }

    #[test]
    fn theme_renders_lowercase() {
        assert_eq!(Appearance::Dark.theme().map(Theme::as_str), Some("dark"));
        assert_eq!(Theme::Light.to_string(), "light");
    }
}
