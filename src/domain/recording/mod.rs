//! Recording domain module

mod artifact;
mod duration;
mod mime;
mod remote;

pub use artifact::{
    format_file_size, recording_filename, RecordingArtifact, RecordingPolicy, RecordingRejected,
};
pub use duration::Duration;
pub use mime::{AudioFormat, MimeType, PREFERRED_MIME_TYPES};
pub use remote::{RecordingEntry, UploadReceipt};
