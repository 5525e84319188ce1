//! RIFF/WAVE serialization
//!
//! Only writing lives here; reading goes through `hound` in the decoder adapter.

use super::pcm::{quantize_sample, PcmBuffer};

/// Size of the canonical PCM header
pub const WAV_HEADER_LEN: usize = 44;

/// Size placeholder used while a stream's final length is unknown
pub const STREAMING_SIZE: u32 = 0xFFFF_FFFF;

const FORMAT_PCM: u16 = 1;

/// Parameters of a 16-bit PCM WAV stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavDescriptor {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub data_len: u32,
}

impl WavDescriptor {
    pub fn pcm16(channels: u16, sample_rate: u32, data_len: u32) -> Self {
        Self {
            channels,
            sample_rate,
            bits_per_sample: 16,
            data_len,
        }
    }

    pub fn block_align(&self) -> u16 {
        self.channels.saturating_mul(self.bits_per_sample / 8)
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate
            .saturating_mul(u32::from(self.block_align()))
    }

    /// Canonical little-endian header.
    /// A streaming data length keeps the RIFF size at the placeholder too.
    pub fn header(&self) -> [u8; WAV_HEADER_LEN] {
        let riff_size = if self.data_len == STREAMING_SIZE {
            STREAMING_SIZE
        } else {
            self.data_len.saturating_add(36)
        };

        let mut h = [0u8; WAV_HEADER_LEN];
        h[0..4].copy_from_slice(b"RIFF");
        h[4..8].copy_from_slice(&riff_size.to_le_bytes());
        h[8..12].copy_from_slice(b"WAVE");
        h[12..16].copy_from_slice(b"fmt ");
        h[16..20].copy_from_slice(&16u32.to_le_bytes());
        h[20..22].copy_from_slice(&FORMAT_PCM.to_le_bytes());
        h[22..24].copy_from_slice(&self.channels.to_le_bytes());
        h[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        h[28..32].copy_from_slice(&self.byte_rate().to_le_bytes());
        h[32..34].copy_from_slice(&self.block_align().to_le_bytes());
        h[34..36].copy_from_slice(&self.bits_per_sample.to_le_bytes());
        h[36..40].copy_from_slice(b"data");
        h[40..44].copy_from_slice(&self.data_len.to_le_bytes());
        h
    }
}

/// Header for a live stream whose length is not yet known
pub fn streaming_header(channels: u16, sample_rate: u32) -> [u8; WAV_HEADER_LEN] {
    WavDescriptor::pcm16(channels, sample_rate, STREAMING_SIZE).header()
}

/// Append interleaved samples as 16-bit little-endian PCM
pub fn write_pcm16(samples: &[f32], out: &mut Vec<u8>) {
    out.reserve(samples.len() * 2);
    for &sample in samples {
        out.extend_from_slice(&quantize_sample(sample).to_le_bytes());
    }
}

/// Serialize decoded audio as a canonical 16-bit PCM WAV file.
/// Output is exactly `44 + 2 * channels * frames` bytes.
pub fn encode_wav(pcm: &PcmBuffer) -> Vec<u8> {
    let samples = pcm.interleave();
    let data_len = u32::try_from(samples.len() * 2).unwrap_or(STREAMING_SIZE - 1);
    let descriptor = WavDescriptor::pcm16(pcm.channel_count(), pcm.sample_rate(), data_len);

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + samples.len() * 2);
    out.extend_from_slice(&descriptor.header());
    write_pcm16(&samples, &mut out);
    out
}

/// Rewrite the RIFF and data sizes of a canonical 44-byte-header WAV from
/// its actual length. Streams recorded with [`streaming_header`] carry
/// placeholder sizes until this runs.
///
/// Returns false, leaving the bytes untouched, when they do not start with
/// a canonical header.
pub fn seal_wav_sizes(bytes: &mut [u8]) -> bool {
    if bytes.len() < WAV_HEADER_LEN
        || &bytes[0..4] != b"RIFF"
        || &bytes[8..12] != b"WAVE"
        || &bytes[36..40] != b"data"
    {
        return false;
    }
    let data_len = u32::try_from(bytes.len() - WAV_HEADER_LEN).unwrap_or(STREAMING_SIZE - 36);
    bytes[4..8].copy_from_slice(&data_len.saturating_add(36).to_le_bytes());
    bytes[40..44].copy_from_slice(&data_len.to_le_bytes());
    true
}
