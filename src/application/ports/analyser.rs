//! Analysis tap port

/// Read-only view over the live signal for visualization
pub trait AnalysisTap: Send + Sync {
    /// Samples kept in the analysis window
    fn fft_size(&self) -> usize;

    /// Fill `out` with the newest samples as bytes centred on 128
    fn time_domain_bytes(&self, out: &mut [u8]);

    /// Fill `out` with byte-scaled spectrum magnitudes
    fn frequency_bytes(&self, out: &mut [u8]);
}
