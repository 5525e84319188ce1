//! Container transcoding use case

use crate::domain::audio::encode_wav;
use crate::domain::recording::MimeType;

use super::ports::{AudioDecoder, TranscodeError};

/// Turns a containerized recording into canonical 16-bit PCM WAV
pub struct Transcoder<D>
where
    D: AudioDecoder,
{
    decoder: D,
}

impl<D> Transcoder<D>
where
    D: AudioDecoder,
{
    /// Create a new transcoder over a decoder
    pub fn new(decoder: D) -> Self {
        Self { decoder }
    }

    /// Whether `to_wav` can handle this type
    pub fn supports(&self, mime_type: &MimeType) -> bool {
        self.decoder.supports(mime_type)
    }

    /// Decode `source` and re-encode it as WAV.
    ///
    /// The result is exactly `44 + 2 * channels * frames` bytes; nothing is
    /// produced when decoding fails.
    pub fn to_wav(&self, source: &[u8], mime_type: &MimeType) -> Result<Vec<u8>, TranscodeError> {
        if !self.decoder.supports(mime_type) {
            return Err(TranscodeError::UnsupportedFormat(mime_type.to_string()));
        }
        let pcm = self.decoder.decode(source, mime_type)?;
        tracing::debug!(
            channels = pcm.channel_count(),
            sample_rate = pcm.sample_rate(),
            frames = pcm.frames(),
            "decoded recording"
        );
        Ok(encode_wav(&pcm))
    }
}
