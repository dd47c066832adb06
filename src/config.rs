//! Harness settings persistence.
//!
//! Settings are merged in precedence order: global config file, then a local
//! override file in the working directory, then command-line flags. Only the
//! fields a layer actually sets override the layers below it.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Debounce window used when no layer configures one, matching the widget
/// wrapper's historical default.
pub const DEFAULT_DELAY_MS: u64 = 500;

/// Persistent harness settings. Every field is optional so a layer can stay
/// silent about the fields it does not care about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Debounce window in milliseconds.
    pub delay_ms: Option<u64>,
    /// Number of follower instances created in watch mode.
    pub followers: Option<usize>,
    /// Write debug events to this file.
    pub debug_log: Option<PathBuf>,
}

impl Settings {
    /// Overlay `other` (higher precedence) onto these settings.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            delay_ms: other.delay_ms.or(self.delay_ms),
            followers: other.followers.or(self.followers),
            debug_log: other.debug_log.clone().or_else(|| self.debug_log.clone()),
        }
    }

    /// The configured debounce window, falling back to the default.
    pub fn effective_delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms.unwrap_or(DEFAULT_DELAY_MS))
    }

    /// The configured follower count, falling back to a single follower.
    pub fn effective_followers(&self) -> usize {
        self.followers.unwrap_or(1)
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("tandem").join("config.json");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("tandem")
                .join("config.json");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("tandem").join("config.json");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("tandem")
                .join("config.json");
        }
    }

    PathBuf::from(".tandemrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".tandemrc")
}

/// Load settings from `path`; a missing file reads as defaults.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config {}", path.display()))
}

/// Save settings to `path`, creating parent directories as needed.
///
/// # Errors
/// Returns an error if the directory or file cannot be written.
pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
        }
    }
    let body = serde_json::to_string_pretty(settings).context("Failed to encode settings")?;
    fs::write(path, format!("{body}\n"))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

/// Remove a saved settings file. Missing files are fine.
///
/// # Errors
/// Returns an error if the file exists but cannot be removed.
pub fn clear_settings(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}
