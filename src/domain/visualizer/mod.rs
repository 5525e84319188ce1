//! Live visualizer domain module

mod analysis;
mod frame;

pub use analysis::{
    frequency_bytes, time_domain_bytes, DEFAULT_FFT_SIZE, MAX_DECIBELS, MIN_DECIBELS,
};
pub use frame::{
    spectrum_bars, waveform_points, Bar, Rgb, VisualizerFrame, VisualizerMode,
    VisualizerModeParseError, BACKGROUND, WAVE_COLOR, WAVE_LINE_WIDTH,
};
