//! Recording upload and listing adapter

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use super::client::ApiClient;
use crate::application::ports::{ApiError, RecordingsApi};
use crate::domain::recording::{RecordingArtifact, RecordingEntry, UploadReceipt};

/// Multipart field carrying the audio file
pub const UPLOAD_FIELD: &str = "audio";

#[async_trait]
impl RecordingsApi for ApiClient {
    async fn upload(&self, artifact: &RecordingArtifact) -> Result<UploadReceipt, ApiError> {
        let filename = artifact.filename();
        let part = Part::bytes(artifact.data().to_vec())
            .file_name(filename.clone())
            .mime_str(artifact.mime_type().as_str())
            .map_err(|e| ApiError::Request(format!("Invalid content type: {}", e)))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        tracing::info!(
            %filename,
            size = artifact.size_bytes(),
            path = %self.upload_path(),
            "uploading recording"
        );
        self.send_json(self.post(self.upload_path()).multipart(form))
            .await
    }

    async fn list(&self) -> Result<Vec<RecordingEntry>, ApiError> {
        self.send_json(self.get("/recordings")).await
    }
}
