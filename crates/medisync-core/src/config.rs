//! TOML-based sync configuration.
//!
//! Stores everything the calendar adapter needs to talk to the remote
//! service:
//! - Target calendar identifier
//! - Path of the service credential file
//! - Timezone attached to event timestamps
//! - Reminder lead time
//!
//! Configuration is stored at `~/.config/medisync/config.toml`, but a
//! `SyncConfig` can just as well be built in code and handed to
//! [`crate::CalendarClient::new`] -- nothing in the crate reads the file
//! behind the caller's back.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Base URL of the Google Calendar v3 API.
pub const GOOGLE_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Timezone attached to event timestamps unless configured otherwise.
pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

/// Reminder lead time in minutes unless configured otherwise.
pub const DEFAULT_REMINDER_MINUTES: u32 = 10;

/// Sync configuration.
///
/// Serialized to/from TOML at `~/.config/medisync/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Identifier of the shared calendar events are written to.
    #[serde(default)]
    pub calendar_id: String,
    /// Path of the service credential JSON file.
    #[serde(default)]
    pub credential_path: PathBuf,
    /// IANA timezone name attached to event start/end timestamps.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Popup reminder lead time, minutes before the event.
    #[serde(default = "default_reminder_minutes")]
    pub reminder_minutes: u32,
    /// Calendar API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

// Default functions
fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}
fn default_reminder_minutes() -> u32 {
    DEFAULT_REMINDER_MINUTES
}
fn default_api_base() -> String {
    GOOGLE_API_BASE.to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            calendar_id: String::new(),
            credential_path: PathBuf::new(),
            timezone: default_timezone(),
            reminder_minutes: default_reminder_minutes(),
            api_base: default_api_base(),
        }
    }
}

impl SyncConfig {
    /// Build a configuration in code with the two required values.
    pub fn new(calendar_id: impl Into<String>, credential_path: impl Into<PathBuf>) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            credential_path: credential_path.into(),
            ..Self::default()
        }
    }

    /// Check that the required values are present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingValue` naming the first missing field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.calendar_id.trim().is_empty() {
            return Err(ConfigError::MissingValue("calendar_id"));
        }
        if self.credential_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingValue("credential_path"));
        }
        Ok(())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed, or
    /// if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                ConfigError::LoadFailed {
                    path,
                    message: e.to_string(),
                }
                .into()
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Load from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| {
            ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

/// Returns `~/.config/medisync[-dev]/` based on MEDISYNC_ENV.
///
/// Set MEDISYNC_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("MEDISYNC_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("medisync-dev")
    } else {
        base_dir.join("medisync")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
