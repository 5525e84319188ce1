//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::capture::AudioConstraints;
use crate::domain::recording::Duration;
use crate::domain::visualizer::VisualizerMode;

/// Default API base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default upload endpoint path
pub const DEFAULT_UPLOAD_PATH: &str = "/api/audio/upload";

/// Microphone processing configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConfig {
    pub echo_cancellation: Option<bool>,
    pub noise_suppression: Option<bool>,
    pub auto_gain_control: Option<bool>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_url: Option<String>,
    pub upload_path: Option<String>,
    pub convert_to_wav: Option<bool>,
    pub timeslice: Option<String>,
    pub visualizer: Option<String>,
    pub max_duration: Option<String>,
    pub audio: Option<AudioConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            api_url: Some(DEFAULT_API_URL.to_string()),
            upload_path: Some(DEFAULT_UPLOAD_PATH.to_string()),
            convert_to_wav: Some(true),
            timeslice: Some(Duration::default_timeslice().to_string()),
            visualizer: Some(VisualizerMode::default().to_string()),
            max_duration: Some(Duration::default_max_duration().to_string()),
            audio: Some(AudioConfig {
                echo_cancellation: Some(true),
                noise_suppression: Some(true),
                auto_gain_control: Some(true),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            api_url: other.api_url.or(self.api_url),
            upload_path: other.upload_path.or(self.upload_path),
            convert_to_wav: other.convert_to_wav.or(self.convert_to_wav),
            timeslice: other.timeslice.or(self.timeslice),
            visualizer: other.visualizer.or(self.visualizer),
            max_duration: other.max_duration.or(self.max_duration),
            audio: Self::merge_audio_config(self.audio, other.audio),
        }
    }

    /// Merge audio config sections
    fn merge_audio_config(
        base: Option<AudioConfig>,
        other: Option<AudioConfig>,
    ) -> Option<AudioConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(AudioConfig {
                echo_cancellation: o.echo_cancellation.or(b.echo_cancellation),
                noise_suppression: o.noise_suppression.or(b.noise_suppression),
                auto_gain_control: o.auto_gain_control.or(b.auto_gain_control),
            }),
        }
    }

    /// Get API base URL without a trailing slash
    pub fn api_url_or_default(&self) -> String {
        self.api_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string()
    }

    /// Get upload path, always starting with '/'
    pub fn upload_path_or_default(&self) -> String {
        let path = self
            .upload_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_UPLOAD_PATH);
        if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        }
    }

    /// Get convert_to_wav setting, or true if not set
    pub fn convert_to_wav_or_default(&self) -> bool {
        self.convert_to_wav.unwrap_or(true)
    }

    /// Get timeslice as parsed Duration, or default if not set/invalid
    pub fn timeslice_or_default(&self) -> Duration {
        self.timeslice
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_timeslice)
    }

    /// Get max_duration as parsed Duration, or default if not set/invalid
    pub fn max_duration_or_default(&self) -> Duration {
        self.max_duration
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_max_duration)
    }

    /// Get visualizer mode, or waveform if not set/invalid
    pub fn visualizer_or_default(&self) -> VisualizerMode {
        self.visualizer
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Get microphone constraints; unset flags default to enabled
    pub fn constraints_or_default(&self) -> AudioConstraints {
        let audio = self.audio.clone().unwrap_or_default();
        AudioConstraints {
            echo_cancellation: audio.echo_cancellation.unwrap_or(true),
            noise_suppression: audio.noise_suppression.unwrap_or(true),
            auto_gain_control: audio.auto_gain_control.unwrap_or(true),
        }
    }
}
