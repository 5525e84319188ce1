//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with the audio backend, the remote HTTP API and the filesystem.

pub mod audio;
pub mod clock;
pub mod config;
pub mod http;
pub mod render;

// Re-export adapters
pub use audio::{ContainerDecoder, CpalPermissionGate, SampleAnalyser, WavMediaRecorder};
pub use clock::SystemClock;
pub use config::XdgConfigStore;
pub use http::{ApiClient, SessionFile};
pub use render::TextCanvas;
