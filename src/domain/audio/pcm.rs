//! Planar floating point PCM

use thiserror::Error;

/// Rejected channel layout
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PcmLayoutError {
    #[error("audio has no channels")]
    NoChannels,

    #[error("sample rate must be positive")]
    ZeroSampleRate,

    #[error("channel {channel} has {actual} frames, expected {expected}")]
    RaggedChannels {
        channel: usize,
        expected: usize,
        actual: usize,
    },
}

/// Decoded audio: one `f32` vector per channel at the native sample rate.
/// All channels hold the same number of frames.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl PcmBuffer {
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self, PcmLayoutError> {
        if channels.is_empty() {
            return Err(PcmLayoutError::NoChannels);
        }
        if sample_rate == 0 {
            return Err(PcmLayoutError::ZeroSampleRate);
        }
        let expected = channels[0].len();
        if let Some((channel, data)) = channels
            .iter()
            .enumerate()
            .find(|(_, data)| data.len() != expected)
        {
            return Err(PcmLayoutError::RaggedChannels {
                channel,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            channels,
            sample_rate,
        })
    }

    /// Split interleaved samples into planar channels.
    /// A trailing partial frame is dropped.
    pub fn from_interleaved(
        samples: &[f32],
        channel_count: u16,
        sample_rate: u32,
    ) -> Result<Self, PcmLayoutError> {
        let count = usize::from(channel_count);
        if count == 0 {
            return Err(PcmLayoutError::NoChannels);
        }
        let frames = samples.len() / count;
        let mut channels = vec![Vec::with_capacity(frames); count];
        for frame in samples.chunks_exact(count) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }
        Self::new(channels, sample_rate)
    }

    pub fn channel_count(&self) -> u16 {
        u16::try_from(self.channels.len()).unwrap_or(u16::MAX)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of sample frames per channel
    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Interleave frame by frame: `L0 R0 L1 R1 ...`
    pub fn interleave(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.frames() * self.channels.len());
        for frame in 0..self.frames() {
            for channel in &self.channels {
                out.push(channel[frame]);
            }
        }
        out
    }
}

/// Convert a float sample to signed 16-bit.
/// Clamps to [-1, 1], scales negatives by 32768 and the rest by 32767,
/// then truncates toward zero.
pub fn quantize_sample(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}
