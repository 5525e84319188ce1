//! Submit recording use case

use thiserror::Error;

use crate::domain::recording::{MimeType, RecordingArtifact, UploadReceipt};

use super::ports::{ApiError, AudioDecoder, RecordingsApi, TranscodeError};
use super::transcode::Transcoder;

/// Errors from the submit use case
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Conversion failed: {0}")]
    Transcode(#[from] TranscodeError),

    #[error("Upload failed: {0}")]
    Upload(#[from] ApiError),
}

/// Output from the submit use case
#[derive(Debug, Clone)]
pub struct SubmitOutput {
    /// What the server stored
    pub receipt: UploadReceipt,
    /// The payload that was actually sent
    pub artifact: RecordingArtifact,
    /// Whether the payload was re-encoded to WAV first
    pub converted: bool,
}

/// Uploads a finished take, converting it to WAV first when enabled
pub struct SubmitRecordingUseCase<A, D>
where
    A: RecordingsApi,
    D: AudioDecoder,
{
    api: A,
    transcoder: Transcoder<D>,
    convert_to_wav: bool,
}

impl<A, D> SubmitRecordingUseCase<A, D>
where
    A: RecordingsApi,
    D: AudioDecoder,
{
    /// Create a new use case instance
    pub fn new(api: A, transcoder: Transcoder<D>, convert_to_wav: bool) -> Self {
        Self {
            api,
            transcoder,
            convert_to_wav,
        }
    }

    /// Convert (when enabled and possible) and upload the take.
    ///
    /// Types the decoder cannot read are sent as recorded.
    pub async fn execute(&self, artifact: RecordingArtifact) -> Result<SubmitOutput, SubmitError> {
        let (artifact, converted) = self.prepare(artifact)?;
        let receipt = self.api.upload(&artifact).await?;
        tracing::info!(
            filename = %receipt.filename,
            size = receipt.size,
            "recording uploaded"
        );
        Ok(SubmitOutput {
            receipt,
            artifact,
            converted,
        })
    }

    fn prepare(
        &self,
        artifact: RecordingArtifact,
    ) -> Result<(RecordingArtifact, bool), TranscodeError> {
        if !self.convert_to_wav {
            return Ok((artifact, false));
        }
        if !self.transcoder.supports(artifact.mime_type()) {
            tracing::debug!(mime_type = %artifact.mime_type(), "no decoder, uploading as recorded");
            return Ok((artifact, false));
        }
        let wav = self.transcoder.to_wav(artifact.data(), artifact.mime_type())?;
        Ok((artifact.with_payload(wav, MimeType::wav()), true))
    }
}
