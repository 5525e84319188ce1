//! Capture lifecycle states

use std::fmt;

use thiserror::Error;

/// Capture session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    /// Microphone granted, not recording
    Armed,
    Recording,
    Paused,
    Stopping,
}

impl CaptureState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Armed => "armed",
            Self::Recording => "recording",
            Self::Paused => "paused",
            Self::Stopping => "stopping",
        }
    }

    /// Whether a take is in progress (recording, paused or finishing)
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Recording | Self::Paused | Self::Stopping)
    }

    /// Status line shown to the user for this state
    pub const fn status_message(&self) -> &'static str {
        match self {
            Self::Idle => "Ready to record",
            Self::Armed => "Microphone ready. Ready to record",
            Self::Recording => "Recording...",
            Self::Paused => "Recording paused",
            Self::Stopping => "Processing...",
        }
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: CaptureState,
    pub action: String,
}
