//! Ring-buffer analysis tap fed by the capture thread

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::application::ports::AnalysisTap;
use crate::domain::visualizer::{frequency_bytes, time_domain_bytes, DEFAULT_FFT_SIZE};

/// Keeps the newest `fft_size` mono samples for visualization
pub struct SampleAnalyser {
    fft_size: usize,
    window: Mutex<VecDeque<f32>>,
}

impl SampleAnalyser {
    pub fn new(fft_size: usize) -> Self {
        let fft_size = fft_size.max(2);
        Self {
            fft_size,
            window: Mutex::new(VecDeque::with_capacity(fft_size)),
        }
    }

    /// Append interleaved samples, mixing them down to mono
    pub fn push_interleaved(&self, samples: &[f32], channels: u16) {
        let channels = usize::from(channels.max(1));
        let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
        for frame in samples.chunks(channels) {
            let mono = frame.iter().sum::<f32>() / frame.len() as f32;
            if window.len() == self.fft_size {
                window.pop_front();
            }
            window.push_back(mono);
        }
    }

    fn snapshot(&self) -> Vec<f32> {
        self.window
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect()
    }
}

impl Default for SampleAnalyser {
    fn default() -> Self {
        Self::new(DEFAULT_FFT_SIZE)
    }
}

impl AnalysisTap for SampleAnalyser {
    fn fft_size(&self) -> usize {
        self.fft_size
    }

    fn time_domain_bytes(&self, out: &mut [u8]) {
        time_domain_bytes(&self.snapshot(), out);
    }

    fn frequency_bytes(&self, out: &mut [u8]) {
        let len = out.len().min(self.fft_size / 2);
        frequency_bytes(&self.snapshot(), &mut out[..len]);
        out[len..].fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_newest_window() {
        let analyser = SampleAnalyser::new(4);
        analyser.push_interleaved(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6], 1);
        assert_eq!(analyser.snapshot(), vec![0.3, 0.4, 0.5, 0.6]);
    }

    #[test]
    fn mixes_stereo_down() {
        let analyser = SampleAnalyser::new(8);
        analyser.push_interleaved(&[1.0, 0.0, -0.5, -0.5], 2);
        assert_eq!(analyser.snapshot(), vec![0.5, -0.5]);
    }

    #[test]
    fn empty_window_reads_as_silence() {
        let analyser = SampleAnalyser::default();
        let mut bytes = [0u8; 16];
        analyser.time_domain_bytes(&mut bytes);
        assert_eq!(bytes, [128; 16]);

        let mut spectrum = [7u8; 16];
        analyser.frequency_bytes(&mut spectrum);
        assert_eq!(spectrum, [0; 16]);
    }
}
