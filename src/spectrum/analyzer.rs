//! Per-frame spectrum computation from the shared history.

use super::normalize::{NormalizerChain, NormalizerKind};
use super::transform::HartleyTransform;
use crate::audio::SharedHistory;
use crate::error::Result;

/// Snapshot, transform and normalize, reusing buffers between frames
#[derive(Default)]
pub struct SpectrumAnalyzer {
    transform: HartleyTransform,
    chain: NormalizerChain,
    time_series: Vec<f32>,
    bins: Vec<f32>,
}

impl SpectrumAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the normalized spectrum of the whole history.
    ///
    /// Returns the first half of the transform (low to high frequency). The
    /// history lock is held only for the copy. Only the render thread resizes
    /// the history, so the capacity read before the copy is still valid.
    pub fn process(&mut self, history: &SharedHistory, kind: NormalizerKind) -> Result<&[f32]> {
        let window_len = history.capacity_samples();
        self.time_series.resize(window_len, 0.0);
        history.snapshot_into(bytemuck::cast_slice_mut(&mut self.time_series[..]))?;

        self.analyze(kind)
    }

    /// Spectrum of an explicit block of samples
    pub fn process_samples(&mut self, samples: &[f32], kind: NormalizerKind) -> Result<&[f32]> {
        self.time_series.clear();
        self.time_series.extend_from_slice(samples);
        self.analyze(kind)
    }

    fn analyze(&mut self, kind: NormalizerKind) -> Result<&[f32]> {
        let window_len = self.time_series.len();
        let coefficients = self.transform.compute(&self.time_series)?;

        // Rear half mirrors the front for real input
        self.bins.clear();
        self.bins.extend_from_slice(&coefficients[..window_len / 2]);
        self.chain.apply(kind, &mut self.bins, window_len as f32);
        Ok(&self.bins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SAMPLE_BYTES;
    use crate::error::Error;
    use crate::spectrum::normalize::divsqrt;

    #[test]
    fn test_dc_bin_from_history() {
        let samples = [0.5f32, -0.25, 1.0, 0.75, -1.0, 0.0, 0.125, 0.375];
        let history = SharedHistory::new(samples.len() * SAMPLE_BYTES).unwrap();
        history.lock().push_samples(samples.iter().copied()).unwrap();

        let mut analyzer = SpectrumAnalyzer::new();
        let bins = analyzer.process(&history, NormalizerKind::DivSqrt).unwrap();

        let sum: f32 = samples.iter().sum();
        assert_eq!(bins.len(), 4);
        assert!((bins[0] - divsqrt(sum.abs(), 8.0)).abs() < 1e-5);
    }

    #[test]
    fn test_follows_history_growth() {
        let history = SharedHistory::new(16 * SAMPLE_BYTES).unwrap();
        let mut analyzer = SpectrumAnalyzer::new();

        assert_eq!(
            analyzer.process(&history, NormalizerKind::FiltNorm).unwrap().len(),
            8
        );

        history.ensure_window(16, 2).unwrap();
        assert_eq!(
            analyzer.process(&history, NormalizerKind::FiltNorm).unwrap().len(),
            16
        );
    }

    #[test]
    fn test_silence_is_flat() {
        let mut analyzer = SpectrumAnalyzer::new();
        let bins = analyzer
            .process_samples(&[0.0; 32], NormalizerKind::LogNorm)
            .unwrap();
        let floor = bins[0];
        assert!(bins.iter().all(|&v| v == floor));
    }

    #[test]
    fn test_empty_history_fails_setup() {
        let history = SharedHistory::new(0).unwrap();
        let mut analyzer = SpectrumAnalyzer::new();
        assert!(matches!(
            analyzer.process(&history, NormalizerKind::DivSqrt),
            Err(Error::TransformSetup { size: 0 })
        ));
    }
}
