//! Persisted theme preference
//!
//! The only state qrforge keeps between runs is a single light/dark flag. It
//! decides how terminal previews are drawn.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Terminal colour theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark ink on a light background
    #[default]
    Light,
    /// Light ink on a dark background
    Dark,
}

impl Theme {
    /// Parse `light` / `dark` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    /// The other theme
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Whether this is the dark theme
    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => f.write_str("light"),
            Self::Dark => f.write_str("dark"),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredPreferences {
    theme: Option<Theme>,
}

/// File-backed preference store
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    /// Use an explicit preferences file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use the explicit path if given, else the per-user default location.
    pub fn open(explicit: Option<&Path>) -> Option<Self> {
        explicit
            .map(Path::to_path_buf)
            .or_else(Self::default_path)
            .map(Self::new)
    }

    /// `$XDG_CONFIG_HOME/qrforge/preferences.toml`, falling back to `~/.config`.
    pub fn default_path() -> Option<PathBuf> {
        let base = env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
        Some(base.join("qrforge").join("preferences.toml"))
    }

    /// Location of the preferences file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved theme if any, else the system preference, else light.
    ///
    /// Unreadable or malformed files are treated as "nothing saved".
    pub fn load_theme(&self) -> Theme {
        self.saved_theme()
            .unwrap_or_else(|| if system_prefers_dark() { Theme::Dark } else { Theme::Light })
    }

    fn saved_theme(&self) -> Option<Theme> {
        let contents = fs::read_to_string(&self.path).ok()?;
        match toml::from_str::<StoredPreferences>(&contents) {
            Ok(stored) => stored.theme,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), "Ignoring malformed preferences: {e}");
                None
            }
        }
    }

    /// Persist `theme`.
    pub fn save_theme(&self, theme: Theme) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let stored = StoredPreferences { theme: Some(theme) };
        let contents = toml::to_string(&stored)
            .map_err(|e| Error::Other(format!("Failed to serialise preferences: {e}")))?;
        fs::write(&self.path, contents)?;
        tracing::debug!(path = %self.path.display(), %theme, "Saved theme preference");
        Ok(())
    }
}

/// Terminal background hint from `COLORFGBG` ("fg;bg").
fn system_prefers_dark() -> bool {
    env::var("COLORFGBG")
        .ok()
        .as_deref()
        .and_then(background_is_dark)
        .unwrap_or(false)
}

fn background_is_dark(colorfgbg: &str) -> Option<bool> {
    let bg = colorfgbg.rsplit(';').next()?.trim().parse::<u8>().ok()?;
    Some(matches!(bg, 0..=6 | 8))
}
