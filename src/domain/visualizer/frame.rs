//! Visualizer frames and their drawing geometry

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error when parsing a visualizer mode
#[derive(Debug, Clone, Error)]
#[error("Invalid visualizer mode: \"{0}\". Expected one of: waveform, spectrum, off")]
pub struct VisualizerModeParseError(pub String);

/// What the live display draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisualizerMode {
    #[default]
    Waveform,
    Spectrum,
    Off,
}

impl VisualizerMode {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Waveform => "waveform",
            Self::Spectrum => "spectrum",
            Self::Off => "off",
        }
    }

    /// Bins read from the analyser per frame
    pub const fn bin_count(&self) -> usize {
        match self {
            Self::Waveform => 1024,
            Self::Spectrum => 128,
            Self::Off => 0,
        }
    }
}

impl FromStr for VisualizerMode {
    type Err = VisualizerModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "waveform" | "wave" => Ok(Self::Waveform),
            "spectrum" | "bars" => Ok(Self::Spectrum),
            "off" | "none" => Ok(Self::Off),
            _ => Err(VisualizerModeParseError(s.to_string())),
        }
    }
}

impl fmt::Display for VisualizerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Surface colour after every clear
pub const BACKGROUND: Rgb = Rgb(240, 240, 240);

/// Waveform stroke colour
pub const WAVE_COLOR: Rgb = Rgb(59, 130, 246);

/// Waveform stroke width
pub const WAVE_LINE_WIDTH: f32 = 2.0;

/// One tick's worth of analyser bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualizerFrame {
    pub mode: VisualizerMode,
    pub bytes: Vec<u8>,
}

/// A filled spectrum bar in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: Rgb,
}

/// Polyline through the time-domain bytes.
/// Starts at x = 0, steps `width / bins`, and ends at the vertical centre
/// of the right edge.
pub fn waveform_points(bytes: &[u8], width: f32, height: f32) -> Vec<(f32, f32)> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let slice = width / bytes.len() as f32;
    let mut points: Vec<(f32, f32)> = bytes
        .iter()
        .enumerate()
        .map(|(i, &b)| {
            let v = f32::from(b) / 128.0;
            (i as f32 * slice, v * height / 2.0)
        })
        .collect();
    points.push((width, height / 2.0));
    points
}

/// Bars for the frequency bytes, left to right, stopping at the right edge
pub fn spectrum_bars(bytes: &[u8], width: f32, height: f32) -> Vec<Bar> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let bar_width = width / bytes.len() as f32 * 2.5;
    let mut x = 0.0;
    let mut bars = Vec::new();
    for &b in bytes {
        if x >= width {
            break;
        }
        let bar_height = f32::from(b) / 255.0 * height * 0.8;
        let red = (bar_height + 100.0).clamp(0.0, 255.0) as u8;
        bars.push(Bar {
            x,
            y: height - bar_height,
            width: bar_width,
            height: bar_height,
            color: Rgb(red, 50, 150),
        });
        x += bar_width + 1.0;
    }
    bars
}
