//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod account;
pub mod audio;
pub mod capture;
pub mod config;
pub mod error;
pub mod recording;
pub mod visualizer;

// Re-export common types
pub use account::{Credentials, SessionRecord, User};
pub use capture::{AudioConstraints, CaptureSession, CaptureState, StartOutcome};
pub use config::AppConfig;
pub use error::*;
pub use recording::{Duration, MimeType, RecordingArtifact, RecordingPolicy};
pub use visualizer::VisualizerMode;
