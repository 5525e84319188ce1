//! Microphone port interfaces

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

use super::analyser::AnalysisTap;
use crate::domain::capture::AudioConstraints;

/// Microphone acquisition errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MicrophoneError {
    #[error("Microphone access denied. Please allow microphone access.")]
    PermissionDenied,

    #[error("No microphone found. Please connect a microphone.")]
    DeviceNotFound,

    #[error("Microphone is already in use by another application.")]
    DeviceBusy,

    #[error("Audio capture is not supported here: {0}")]
    Unsupported(String),
}

/// Result of a permission pre-check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionState {
    Granted,
    Prompt,
    Denied,
}

impl PermissionState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Prompt => "prompt",
            Self::Denied => "denied",
        }
    }
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Message delivered to stream subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum StreamPacket {
    /// Interleaved samples in [-1, 1]
    Samples(Vec<f32>),
    /// The capture backend failed; the stream is no longer active
    Fault(String),
}

/// An open microphone source.
///
/// Subscribers receive every captured block until they drop their receiver.
pub trait InputStream: Send + Sync {
    /// Whether the capture thread is still delivering audio
    fn is_active(&self) -> bool;

    /// Constraints the stream was opened with
    fn constraints(&self) -> AudioConstraints;

    fn sample_rate(&self) -> u32;

    fn channels(&self) -> u16;

    /// Tap over the most recent mono samples
    fn analyser(&self) -> Arc<dyn AnalysisTap>;

    /// Register a new subscriber
    fn subscribe(&self) -> mpsc::UnboundedReceiver<StreamPacket>;

    /// Stop capturing. Idempotent.
    fn release(&self);
}

/// Stream shared between the capture session and the visualizer
pub type SharedStream = Arc<dyn InputStream>;

/// Port for acquiring the microphone
#[async_trait]
pub trait PermissionGate: Send + Sync {
    /// Report whether access is granted without opening anything
    async fn permission_state(&self) -> PermissionState;

    /// Open the microphone, or return the stream already open.
    ///
    /// # Arguments
    /// * `constraints` - Processing flags applied when a new stream is opened
    async fn request_access(
        &self,
        constraints: AudioConstraints,
    ) -> Result<SharedStream, MicrophoneError>;

    /// The stream currently held, if any
    fn current_stream(&self) -> Option<SharedStream>;

    /// Release the held stream. Idempotent.
    fn release(&self);
}
