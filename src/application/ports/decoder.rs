//! Audio decoder port

use thiserror::Error;

use crate::domain::audio::PcmBuffer;
use crate::domain::recording::MimeType;

/// Transcoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscodeError {
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to decode audio: {0}")]
    DecodeFailure(String),
}

/// Port for decoding a containerized blob into planar PCM
pub trait AudioDecoder: Send + Sync {
    /// Whether `decode` can handle this type
    fn supports(&self, mime_type: &MimeType) -> bool;

    fn decode(&self, bytes: &[u8], mime_type: &MimeType) -> Result<PcmBuffer, TranscodeError>;
}
