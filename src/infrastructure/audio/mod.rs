//! Audio capture, recording and decoding adapters

mod analyser;
mod container_decoder;
mod cpal_microphone;
mod wav_recorder;

pub use analyser::SampleAnalyser;
pub use container_decoder::ContainerDecoder;
pub use cpal_microphone::{
    classify_backend_error, gate_noise, AutoGain, CpalInputStream, CpalPermissionGate,
};
pub use wav_recorder::{StreamingWavEncoder, WavMediaRecorder};
