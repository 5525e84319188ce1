//! Voicedrop - push-to-talk voice recorder with upload
//!
//! This crate records voice notes from the microphone, shows a live
//! waveform or spectrum while recording, converts takes to 16-bit PCM WAV
//! and uploads them to a session-authenticated recording service.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Capture state machine, recording policy, WAV codec, visualizer geometry
//! - **Application**: Use cases and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, rodio, reqwest, XDG config)
//! - **CLI**: Command-line interface, argument parsing, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
