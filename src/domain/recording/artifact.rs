//! Finished recording value object and acceptance policy

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use super::duration::Duration;
use super::mime::MimeType;

/// Why a finished take was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecordingRejected {
    #[error("No audio data recorded. Please try again.")]
    Empty,

    #[error("Recording too short ({size} bytes, {duration_ms}ms). Please record for longer.")]
    TooShort { size: usize, duration_ms: u64 },
}

/// Minimum size/length a take needs before it is worth uploading.
///
/// A take is rejected when it is empty, or when it is both smaller than
/// `min_size_bytes` and shorter than `min_duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingPolicy {
    pub min_size_bytes: usize,
    pub min_duration: Duration,
}

impl RecordingPolicy {
    pub const fn new(min_size_bytes: usize, min_duration: Duration) -> Self {
        Self {
            min_size_bytes,
            min_duration,
        }
    }

    pub fn validate(&self, size: usize, duration: Duration) -> Result<(), RecordingRejected> {
        if size == 0 {
            return Err(RecordingRejected::Empty);
        }
        if size < self.min_size_bytes && duration < self.min_duration {
            return Err(RecordingRejected::TooShort {
                size,
                duration_ms: duration.as_millis(),
            });
        }
        Ok(())
    }
}

impl Default for RecordingPolicy {
    fn default() -> Self {
        Self::new(1024, Duration::from_millis(500))
    }
}

/// Build the upload filename for a take started at `created_at`
pub fn recording_filename(created_at: DateTime<Utc>, extension: &str) -> String {
    let timestamp = created_at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("voice_recording_{}.{}", timestamp, extension)
}

/// Human-readable byte size with two decimals above one kilobyte
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

/// Immutable payload produced by a finished take
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingArtifact {
    data: Vec<u8>,
    mime_type: MimeType,
    created_at: DateTime<Utc>,
    duration: Duration,
}

impl RecordingArtifact {
    pub fn new(
        data: Vec<u8>,
        mime_type: MimeType,
        created_at: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        Self {
            data,
            mime_type,
            created_at,
            duration,
        }
    }

    /// Same take with a re-encoded payload (e.g. after WAV transcoding)
    pub fn with_payload(self, data: Vec<u8>, mime_type: MimeType) -> Self {
        Self {
            data,
            mime_type,
            ..self
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn mime_type(&self) -> &MimeType {
        &self.mime_type
    }

    pub fn extension(&self) -> &'static str {
        self.mime_type.extension()
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn filename(&self) -> String {
        recording_filename(self.created_at, self.extension())
    }

    pub fn human_readable_size(&self) -> String {
        format_file_size(self.data.len() as u64)
    }
}

impl fmt::Display for RecordingArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {})",
            self.filename(),
            self.human_readable_size(),
            self.duration.format_clock()
        )
    }
}
