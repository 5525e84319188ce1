//! Records returned by the upload service

use serde::{Deserialize, Serialize};

/// Acknowledgement returned after a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default, alias = "s3_key", alias = "key")]
    pub storage_key: Option<String>,
    #[serde(default, alias = "upload_timestamp")]
    pub timestamp: Option<String>,
}

/// One entry of the stored recordings listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingEntry {
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub date: Option<String>,
}
