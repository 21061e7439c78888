//! Core error types for medisync-core.
//!
//! This module defines the error hierarchy using thiserror. The two remote
//! failure classes the rest of the crate cares about are kept distinct:
//! [`AuthError`] is terminal for an adapter operation, while a
//! [`CalendarError`] on a single event is logged and skipped by the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for medisync-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Credential / token errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Remote calendar API errors
    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Missing required configuration value
    #[error("Missing required configuration value: {0}")]
    MissingValue(&'static str),
}

/// Authentication-specific errors. Any of these aborts the whole adapter
/// operation; the caller treats it as "nothing could be done".
#[derive(Error, Debug)]
pub enum AuthError {
    /// Credential file missing or unreadable
    #[error("Cannot read credential file {path}: {message}")]
    CredentialFile { path: PathBuf, message: String },

    /// Credential file is not valid JSON or misses required fields
    #[error("Malformed credential file {path}: {source}")]
    MalformedCredential {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Token endpoint rejected the stored credential
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    /// Token endpoint unreachable
    #[error("Token endpoint error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Remote calendar API errors for a single event operation.
#[derive(Error, Debug)]
pub enum CalendarError {
    /// The API answered with an error status or error body
    #[error("Calendar API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Create/update response carried no event identifier
    #[error("Missing event id in response")]
    MissingEventId,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
