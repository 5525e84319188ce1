//! Domain error types

use thiserror::Error;

use super::capture::InvalidStateTransition;
use super::recording::RecordingRejected;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration format: \"{input}\". Expected format: <number>ms, <number>s, <number>m or a combination (e.g., 250ms, 30s, 2m30s)")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}

/// Errors raised by the capture session lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("Microphone not available. Please enable the microphone again.")]
    StreamUnavailable,

    #[error("Recording error: {0}")]
    EncodeFailure(String),

    #[error("{0}")]
    EmptyOrTooShortRecording(#[from] RecordingRejected),

    #[error("No recording in progress")]
    NotRecording,

    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),
}
