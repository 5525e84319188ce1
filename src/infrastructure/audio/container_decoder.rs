//! Container decoder adapter
//!
//! WAV is read with hound. FLAC, Ogg/Vorbis and MP3 go through rodio's
//! decoders. Opus, WebM and MP4 are not decodable here.

use std::io::Cursor;

use hound::{SampleFormat, WavReader};
use rodio::{Decoder, Source};

use crate::application::ports::{AudioDecoder, TranscodeError};
use crate::domain::audio::PcmBuffer;
use crate::domain::recording::{AudioFormat, MimeType};

/// Decoder for the containers the transcoder accepts
#[derive(Debug, Default, Clone, Copy)]
pub struct ContainerDecoder;

impl ContainerDecoder {
    pub fn new() -> Self {
        Self
    }

    fn decode_with_hound(bytes: &[u8]) -> Result<PcmBuffer, TranscodeError> {
        let reader = WavReader::new(Cursor::new(bytes))
            .map_err(|e| TranscodeError::DecodeFailure(e.to_string()))?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|e| TranscodeError::DecodeFailure(e.to_string()))?,
            SampleFormat::Int => {
                if !(1..=32).contains(&spec.bits_per_sample) {
                    return Err(TranscodeError::DecodeFailure(format!(
                        "unsupported bit depth {}",
                        spec.bits_per_sample
                    )));
                }
                let scale = (1u64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()
                    .map_err(|e| TranscodeError::DecodeFailure(e.to_string()))?
            }
        };

        if samples.is_empty() {
            return Err(TranscodeError::DecodeFailure("no audio frames decoded".into()));
        }
        PcmBuffer::from_interleaved(&samples, spec.channels, spec.sample_rate)
            .map_err(|e| TranscodeError::DecodeFailure(e.to_string()))
    }

    fn decode_with_rodio(bytes: &[u8]) -> Result<PcmBuffer, TranscodeError> {
        let decoder = Decoder::new(Cursor::new(bytes.to_vec()))
            .map_err(|e| TranscodeError::DecodeFailure(e.to_string()))?;
        let channels = decoder.channels();
        let sample_rate = decoder.sample_rate();
        let samples: Vec<f32> = decoder.convert_samples::<f32>().collect();
        if samples.is_empty() {
            return Err(TranscodeError::DecodeFailure("no audio frames decoded".into()));
        }
        PcmBuffer::from_interleaved(&samples, channels, sample_rate)
            .map_err(|e| TranscodeError::DecodeFailure(e.to_string()))
    }
}

impl AudioDecoder for ContainerDecoder {
    fn supports(&self, mime_type: &MimeType) -> bool {
        if mime_type.as_str().to_ascii_lowercase().contains("opus") {
            return false;
        }
        matches!(
            AudioFormat::from_mime(mime_type),
            Some(AudioFormat::Wav | AudioFormat::Flac | AudioFormat::Ogg | AudioFormat::Mp3)
        )
    }

    fn decode(&self, bytes: &[u8], mime_type: &MimeType) -> Result<PcmBuffer, TranscodeError> {
        if bytes.is_empty() {
            return Err(TranscodeError::DecodeFailure("empty input".into()));
        }
        match AudioFormat::from_mime(mime_type) {
            Some(AudioFormat::Wav) => Self::decode_with_hound(bytes),
            Some(AudioFormat::Flac | AudioFormat::Ogg | AudioFormat::Mp3) => {
                Self::decode_with_rodio(bytes)
            }
            _ => Err(TranscodeError::UnsupportedFormat(mime_type.to_string())),
        }
    }
}
