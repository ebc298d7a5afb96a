use std::sync::Arc;

use anyhow::Result;

/// Read access to the OS appearance setting.
pub trait AppearanceSource: Send + Sync {
    /// The raw appearance string, e.g. `Dark` or `prefer-light`.
    fn current(&self) -> Result<String>;
}

/// Appearance source for the platform we were built for.
pub fn system_appearance() -> Arc<dyn AppearanceSource> {
    #[cfg(target_os = "macos")]
    {
        Arc::new(macos::Defaults)
    }
    #[cfg(not(target_os = "macos"))]
    {
        Arc::new(gnome::Settings)
    }
}

#[cfg(target_os = "macos")]
mod macos {
    use std::process::Command;

    use anyhow::{Context, Result};

    use super::AppearanceSource;

    /// `AppleInterfaceStyle` only exists in the global domain while dark
    /// mode is on; a failed read means the system is light.
    pub struct Defaults;

    impl AppearanceSource for Defaults {
        fn current(&self) -> Result<String> {
            let output = Command::new("defaults")
                .args(["read", "-g", "AppleInterfaceStyle"])
                .output()
                .context("Failed to run defaults")?;
            if output.status.success() {
                Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
            } else {
                Ok("Light".to_string())
            }
        }
    }
}

#[cfg(not(target_os = "macos"))]
pub(crate) mod gnome {
    use std::process::Command;

    use anyhow::{Context, Result, bail};

    use super::AppearanceSource;

    pub const SCHEMA: &str = "org.gnome.desktop.interface";
    pub const KEY: &str = "color-scheme";

    pub struct Settings;

    impl AppearanceSource for Settings {
        fn current(&self) -> Result<String> {
            let output = Command::new("gsettings")
                .args(["get", SCHEMA, KEY])
                .output()
                .context("Failed to run gsettings")?;
            if !output.status.success() {
                bail!(
                    "gsettings exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
            Ok(color_scheme(&String::from_utf8_lossy(&output.stdout)))
        }
    }

    /// Strip GVariant quoting. GNOME renders its `default` scheme light.
    pub fn color_scheme(raw: &str) -> String {
        let value = raw.trim().trim_matches('\'');
        if value == "default" {
            "light".to_string()
        } else {
            value.to_string()
        }
    }

}
