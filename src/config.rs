//! qrforge runtime configuration handling

use crate::error::{Error, Result};
use crate::loader::source::DEFAULT_FALLBACK_URL;
use crate::render::{DEFAULT_SIZE, ErrorCorrection, RenderOptions};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration structure persisted to disk or environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QrforgeConfig {
    /// Default render options
    pub render: RenderDefaults,
    /// Capability loading configuration
    pub loader: LoaderOptions,
    /// Logging configuration
    pub logging: LoggingOptions,
    /// Preference storage configuration
    pub preferences: PreferenceOptions,
}

impl QrforgeConfig {
    /// Load configuration from an explicit path or fall back to discovered defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit_path {
            Self::from_file(path)?
        } else if let Some(path) = Self::discover_file()? {
            tracing::info!("Using configuration file: {}", path.display());
            Self::from_file(&path)?
        } else {
            tracing::debug!("No qrforge.toml / qrforge.yaml found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Attempt to locate a configuration file in common locations.
    fn discover_file() -> Result<Option<PathBuf>> {
        let cwd =
            env::current_dir().map_err(|e| Error::Config(format!("Failed to read cwd: {e}")))?;
        for candidate in ["qrforge.toml", "qrforge.yaml", "qrforge.yml"] {
            let path = cwd.join(candidate);
            if path.exists() {
                return Ok(Some(path));
            }
        }

        if let Some(xdg_config) = env::var_os("XDG_CONFIG_HOME") {
            let base = PathBuf::from(xdg_config).join("qrforge");
            for candidate in ["config.toml", "config.yaml"] {
                let path = base.join(candidate);
                if path.exists() {
                    return Ok(Some(path));
                }
            }
        }

        Ok(None)
    }

    /// Read configuration from a concrete file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
            .as_str()
        {
            "toml" => toml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse TOML {}: {e}", path.display()))
            }),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse YAML {}: {e}", path.display()))
            }),
            other => Err(Error::Config(format!(
                "Unsupported config format '{}', expected toml/yaml",
                other
            ))),
        }
    }

    /// Apply environment variable overrides after file/default loading.
    fn apply_env_overrides(&mut self) {
        self.render.apply_env_overrides();
        self.loader.apply_env_overrides();
        self.logging.apply_env_overrides();
        self.preferences.apply_env_overrides();
    }
}

/// Defaults for size and error correction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderDefaults {
    /// Edge length in pixels
    pub size: u32,
    /// Error correction letter (L/M/Q/H); anything else means M
    pub level: String,
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            level: "M".to_string(),
        }
    }
}

impl RenderDefaults {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(size) = env::var("QRFORGE_SIZE") {
            if let Ok(parsed) = size.parse::<u32>() {
                self.size = parsed;
            }
        }
        if let Ok(level) = env::var("QRFORGE_LEVEL") {
            self.level = level;
        }
    }

    /// Resolve into concrete render options.
    pub fn to_render_options(&self) -> RenderOptions {
        RenderOptions {
            size: self.size.max(1),
            level: ErrorCorrection::parse_or_default(&self.level),
        }
    }
}

/// Where the primary channel acquires the capability from
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PrimarySource {
    /// Bundled `qrcode` renderer
    #[default]
    Native,
    /// Remote render service at `primary_url`
    Remote,
    /// No primary channel; the fallback is used right away
    Disabled,
}

impl PrimarySource {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "native" => Some(Self::Native),
            "remote" => Some(Self::Remote),
            "disabled" | "off" | "none" => Some(Self::Disabled),
            _ => None,
        }
    }
}

/// Capability loading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderOptions {
    /// Primary acquisition channel
    pub primary: PrimarySource,
    /// Service URL when `primary = "remote"`
    pub primary_url: Option<String>,
    /// Fallback render service location
    pub fallback_url: String,
    /// Per-request timeout for remote sources, in seconds
    pub request_timeout_secs: u64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            primary: PrimarySource::Native,
            primary_url: None,
            fallback_url: DEFAULT_FALLBACK_URL.to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl LoaderOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(primary) = env::var("QRFORGE_PRIMARY") {
            match PrimarySource::parse(&primary) {
                Some(parsed) => self.primary = parsed,
                None => tracing::warn!(value = %primary, "Ignoring unknown QRFORGE_PRIMARY"),
            }
        }
        if let Ok(url) = env::var("QRFORGE_PRIMARY_URL") {
            self.primary_url = Some(url);
        }
        if let Ok(url) = env::var("QRFORGE_FALLBACK_URL") {
            self.fallback_url = url;
        }
        if let Ok(timeout) = env::var("QRFORGE_REQUEST_TIMEOUT") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.request_timeout_secs = value.max(1);
            }
        }
    }

    /// Request timeout for remote sources
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Structured logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Default log level (overridable via `QRFORGE_LOG_LEVEL`)
    pub level: String,
    /// Optional log file path for teeing structured logs
    pub file: Option<PathBuf>,
    /// Force ANSI colors in stderr logging
    pub color: bool,
    /// Optional log rotation strategy applied to `file`
    pub rotation: Option<LogRotation>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            color: true,
            rotation: None,
        }
    }
}

impl LoggingOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("QRFORGE_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(file) = env::var("QRFORGE_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
        if let Ok(color) = env::var("QRFORGE_LOG_COLOR") {
            match color.to_ascii_lowercase().as_str() {
                "0" | "false" | "off" => self.color = false,
                "1" | "true" | "on" => self.color = true,
                _ => {}
            }
        }
        if let Ok(rotation) = env::var("QRFORGE_LOG_ROTATION") {
            if let Some(parsed) = LogRotation::parse(&rotation) {
                self.rotation = Some(parsed);
            }
        }
    }
}

/// Supported log rotation policies for file sinks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate log files once per hour
    Hourly,
    /// Rotate log files once per day
    Daily,
}

impl LogRotation {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}

/// Where the theme preference is stored
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceOptions {
    /// Explicit preferences file; defaults to the per-user config directory
    pub state_file: Option<PathBuf>,
}

impl PreferenceOptions {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(path) = env::var("QRFORGE_PREFERENCES") {
            if path.trim().is_empty() {
                self.state_file = None;
            } else {
                self.state_file = Some(PathBuf::from(path));
            }
        }
    }
}
