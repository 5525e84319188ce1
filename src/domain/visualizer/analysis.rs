//! Byte-scaled time and frequency analysis of the live signal

use std::f32::consts::PI;

use spectrum_analyzer::scaling::divide_by_N;
use spectrum_analyzer::{samples_fft_to_spectrum, FrequencyLimit};

/// Default analysis window (samples)
pub const DEFAULT_FFT_SIZE: usize = 2048;

/// Lower bound of the decibel range mapped onto a byte
pub const MIN_DECIBELS: f32 = -100.0;

/// Upper bound of the decibel range mapped onto a byte
pub const MAX_DECIBELS: f32 = -30.0;

/// Map float samples onto unsigned bytes centred at 128.
/// Fills as many bytes as there are samples (newest window last).
pub fn time_domain_bytes(samples: &[f32], out: &mut [u8]) {
    let start = samples.len().saturating_sub(out.len());
    let window = &samples[start..];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = match window.get(i) {
            Some(&s) => (128.0 * (1.0 + s)).clamp(0.0, 255.0) as u8,
            None => 128,
        };
    }
}

/// Blackman window coefficient for position `n` of `size`
fn blackman(n: usize, size: usize) -> f32 {
    let x = n as f32 / size as f32;
    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
}

/// Spectrum magnitudes of the last `2 * out.len()` samples, in bytes.
///
/// The window is Blackman weighted, each bin magnitude is normalised by
/// the window size, converted to decibels and mapped linearly from
/// [`MIN_DECIBELS`, `MAX_DECIBELS`] onto [0, 255]. The window size must be
/// a power of two; anything else yields an empty spectrum.
pub fn frequency_bytes(samples: &[f32], out: &mut [u8]) {
    let size = out.len() * 2;
    if size == 0 {
        return;
    }

    let mut windowed = vec![0.0f32; size];
    let start = samples.len().saturating_sub(size);
    let offset = size - (samples.len() - start);
    for (i, &s) in samples[start..].iter().enumerate() {
        let n = offset + i;
        windowed[n] = s * blackman(n, size);
    }

    // sampling at `size` Hz puts bin k at k Hz
    let spectrum = match samples_fft_to_spectrum(
        &windowed,
        size as u32,
        FrequencyLimit::All,
        Some(&divide_by_N),
    ) {
        Ok(spectrum) => spectrum,
        Err(_) => {
            out.fill(0);
            return;
        }
    };

    let range = MAX_DECIBELS - MIN_DECIBELS;
    out.fill(0);
    for (byte, (_, magnitude)) in out.iter_mut().zip(spectrum.data().iter()) {
        let magnitude = magnitude.val();
        let db = if magnitude > 0.0 {
            20.0 * magnitude.log10()
        } else {
            f32::NEG_INFINITY
        };
        let scaled = 255.0 * (db - MIN_DECIBELS) / range;
        *byte = scaled.clamp(0.0, 255.0) as u8;
    }
}
