//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod analyser;
pub mod api;
pub mod canvas;
pub mod clock;
pub mod config;
pub mod decoder;
pub mod microphone;
pub mod recorder;

// Re-export common types
pub use analyser::AnalysisTap;
pub use api::{AdminApi, ApiError, AuthApi, RecordingsApi};
pub use canvas::Canvas;
pub use clock::Clock;
pub use config::ConfigStore;
pub use decoder::{AudioDecoder, TranscodeError};
pub use microphone::{
    InputStream, MicrophoneError, PermissionGate, PermissionState, SharedStream, StreamPacket,
};
pub use recorder::{
    MediaRecorder, RecorderControl, RecorderError, RecorderEvent, RecorderHandle,
};
