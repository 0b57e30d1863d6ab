//! Capture and analysis configuration.

use crate::spectrum::NormalizerKind;

/// How much history to keep and how to normalize it
#[derive(Debug, Clone)]
pub struct AnalysisParams {
    /// History length in audio periods; the transform size is
    /// `period_frames * quality_factor` samples
    pub quality_factor: usize,

    /// Period (frames per callback) assumed before the first callback arrives
    pub initial_period_frames: usize,

    /// Normalizer selected at startup
    pub normalizer: NormalizerKind,

    /// Input device name (default input device when unset)
    pub device: Option<String>,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            quality_factor: 6,
            initial_period_frames: 1024,
            normalizer: NormalizerKind::FiltNorm, // Smoothest output
            device: None,
        }
    }
}

impl AnalysisParams {
    /// Initial history capacity in bytes
    pub fn initial_capacity_bytes(&self) -> usize {
        self.initial_period_frames
            .saturating_mul(self.quality_factor)
            .saturating_mul(crate::audio::SAMPLE_BYTES)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.quality_factor == 0 {
            return Err("Quality factor must be > 0".to_string());
        }
        if self.initial_period_frames == 0 {
            return Err("Initial period must be > 0 frames".to_string());
        }
        if self.initial_capacity_bytes() == usize::MAX {
            return Err(format!(
                "History of {} x {} frames does not fit in memory",
                self.initial_period_frames, self.quality_factor
            ));
        }
        Ok(())
    }
}
