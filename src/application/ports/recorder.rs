//! Media recorder port interfaces

use thiserror::Error;
use tokio::sync::mpsc;

use super::microphone::SharedStream;
use crate::domain::recording::{Duration, MimeType};

/// Recorder errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecorderError {
    #[error("Unsupported recording format: {0}")]
    UnsupportedType(String),

    #[error("Failed to start recording: {0}")]
    StartFailed(String),
}

/// Notifications emitted by a running recorder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    /// Encoded bytes collected since the previous chunk
    Data(Vec<u8>),
    /// Final notification; nothing follows
    Stopped,
    /// The recorder failed and has stopped
    Error(String),
}

/// Commands accepted by a running recorder
pub trait RecorderControl: Send + Sync {
    /// Emit whatever is buffered as a chunk now
    fn request_data(&self);

    fn pause(&self);

    fn resume(&self);

    /// Flush remaining data, then emit `Stopped`
    fn stop(&self);

    /// Negotiated output type
    fn mime_type(&self) -> MimeType;
}

/// A started recorder: its controls plus the event channel
pub struct RecorderHandle {
    pub control: Box<dyn RecorderControl>,
    pub events: mpsc::UnboundedReceiver<RecorderEvent>,
}

/// Port for the platform recorder that turns a stream into encoded chunks
pub trait MediaRecorder: Send + Sync {
    /// Whether the recorder can produce the given MIME type
    fn is_type_supported(&self, mime_type: &str) -> bool;

    /// Type produced when no preference is given
    fn default_mime_type(&self) -> MimeType;

    /// Start recording `stream`, emitting a chunk every `timeslice`.
    /// Must be called from within a tokio runtime.
    fn start(
        &self,
        stream: SharedStream,
        mime_type: Option<&MimeType>,
        timeslice: Duration,
    ) -> Result<RecorderHandle, RecorderError>;
}
