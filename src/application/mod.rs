//! Application layer - Use cases and port interfaces
//!
//! Contains the core business operations and trait definitions
//! for external system interactions.

pub mod admin;
pub mod auth;
pub mod capture;
pub mod ports;
pub mod transcode;
pub mod upload;
pub mod visualizer;

// Re-export use cases
pub use admin::{AdminConsole, AdminError};
pub use auth::{AuthError, AuthService};
pub use capture::{select_mime_type, CaptureSettings, CaptureUpdate, VoiceRecorder};
pub use transcode::Transcoder;
pub use upload::{SubmitError, SubmitOutput, SubmitRecordingUseCase};
pub use visualizer::{render_frame, Visualizer};
