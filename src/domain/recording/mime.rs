//! Recording MIME type value objects

use std::fmt;

/// Recorder formats probed in order at every start; the first one the
/// platform recorder supports wins.
pub const PREFERRED_MIME_TYPES: [&str; 5] = [
    "audio/webm",
    "audio/webm;codecs=opus",
    "audio/ogg;codecs=opus",
    "audio/mp4",
    "audio/wav",
];

/// A negotiated content type, kept verbatim (parameters included)
/// because it is echoed back on upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MimeType(String);

impl MimeType {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    /// Canonical WAV type
    pub fn wav() -> Self {
        Self::new("audio/wav")
    }

    /// Full type string including parameters
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Type without parameters, lowercased (`audio/webm;codecs=opus` -> `audio/webm`)
    pub fn essence(&self) -> String {
        self.0
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }

    /// File extension for an uploaded recording.
    /// Anything that is neither WAV nor WebM falls back to `webm`.
    pub fn extension(&self) -> &'static str {
        let lower = self.0.to_ascii_lowercase();
        if lower.contains("wav") {
            "wav"
        } else {
            "webm"
        }
    }

    /// Whether this is already a WAV container
    pub fn is_wav(&self) -> bool {
        self.0.to_ascii_lowercase().contains("wav")
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MimeType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Audio container families the transcoder knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    Wav,
    Flac,
    Ogg,
    Mp3,
    Webm,
    Mp4,
}

impl AudioFormat {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Flac => "flac",
            Self::Ogg => "ogg",
            Self::Mp3 => "mp3",
            Self::Webm => "webm",
            Self::Mp4 => "mp4",
        }
    }

    /// Canonical MIME type for the container
    pub const fn mime_str(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Flac => "audio/flac",
            Self::Ogg => "audio/ogg",
            Self::Mp3 => "audio/mpeg",
            Self::Webm => "audio/webm",
            Self::Mp4 => "audio/mp4",
        }
    }

    /// Classify a MIME type by its essence
    pub fn from_mime(mime: &MimeType) -> Option<Self> {
        match mime.essence().as_str() {
            "audio/wav" | "audio/wave" | "audio/x-wav" | "audio/vnd.wave" => Some(Self::Wav),
            "audio/flac" | "audio/x-flac" => Some(Self::Flac),
            "audio/ogg" | "application/ogg" => Some(Self::Ogg),
            "audio/mpeg" | "audio/mp3" => Some(Self::Mp3),
            "audio/webm" | "video/webm" => Some(Self::Webm),
            "audio/mp4" | "audio/m4a" | "audio/x-m4a" | "video/mp4" => Some(Self::Mp4),
            _ => None,
        }
    }

    /// Classify a file extension (without the dot, any case)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "wav" | "wave" => Some(Self::Wav),
            "flac" => Some(Self::Flac),
            "ogg" | "oga" | "opus" => Some(Self::Ogg),
            "mp3" => Some(Self::Mp3),
            "webm" | "weba" => Some(Self::Webm),
            "mp4" | "m4a" => Some(Self::Mp4),
            _ => None,
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
