//! Per-bin magnitude normalizers.
//!
//! Two plain scalings and two filtered variants. The filtered variants keep a
//! short history per frequency bin, so each bin is smoothed across frames
//! independently of its neighbours.

use std::fmt;

/// Taps of the moving-average filter
pub const FILTER_TAPS: usize = 5;

/// Offset keeping the log away from zero
const LOG_FLOOR: f32 = 0.07;
const LOG_GAIN: f32 = 15.0;

/// Selectable normalizer, in cycling order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizerKind {
    /// Amplitude divided by the square root of the window length
    DivSqrt,
    /// Log-compressed [`NormalizerKind::DivSqrt`]
    LogNorm,
    /// [`NormalizerKind::DivSqrt`] through the moving-average filter
    FiltSqrt,
    /// [`NormalizerKind::LogNorm`] through the moving-average filter (smoothest)
    #[default]
    FiltNorm,
}

impl NormalizerKind {
    pub const ALL: [NormalizerKind; 4] = [
        NormalizerKind::DivSqrt,
        NormalizerKind::LogNorm,
        NormalizerKind::FiltSqrt,
        NormalizerKind::FiltNorm,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// Next normalizer, wrapping from the last back to the first
    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn name(self) -> &'static str {
        match self {
            NormalizerKind::DivSqrt => "divsqrt",
            NormalizerKind::LogNorm => "lognorm",
            NormalizerKind::FiltSqrt => "filtsqrt",
            NormalizerKind::FiltNorm => "filtnorm",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for NormalizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn divsqrt(magnitude: f32, window_len: f32) -> f32 {
    magnitude / window_len.sqrt()
}

pub fn lognorm(magnitude: f32, window_len: f32) -> f32 {
    ((divsqrt(magnitude, window_len) + LOG_FLOOR) * LOG_GAIN).log10() / 2.0 - 0.01
}

/// Push `value` through one bin's filter history and return the new average.
///
/// The history shifts down one slot, then the last slot receives the mean of
/// the four retained slots and the new value.
pub fn filter_step(slots: &mut [f32; FILTER_TAPS], value: f32) -> f32 {
    slots.copy_within(1.., 0);
    let retained: f32 = slots[..FILTER_TAPS - 1].iter().sum();
    slots[FILTER_TAPS - 1] = (retained + value) / FILTER_TAPS as f32;
    slots[FILTER_TAPS - 1]
}

/// One filter history per bin
#[derive(Debug, Default, Clone)]
pub struct FilterBank {
    histories: Vec<[f32; FILTER_TAPS]>,
}

impl FilterBank {
    pub fn len(&self) -> usize {
        self.histories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }

    /// Match the bin count, clearing all history when it changes
    fn fit(&mut self, bins: usize) {
        if self.histories.len() != bins {
            self.histories.clear();
            self.histories.resize(bins, [0.0; FILTER_TAPS]);
        }
    }

    fn step(&mut self, bin: usize, value: f32) -> f32 {
        filter_step(&mut self.histories[bin], value)
    }
}

/// Applies the selected normalizer and owns the filter state
#[derive(Debug, Default, Clone)]
pub struct NormalizerChain {
    filtered_sqrt: FilterBank,
    filtered_log: FilterBank,
}

impl NormalizerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize `bins` in place. Values are taken as magnitudes (`abs` first).
    pub fn apply(&mut self, kind: NormalizerKind, bins: &mut [f32], window_len: f32) {
        match kind {
            NormalizerKind::DivSqrt => {
                for v in bins.iter_mut() {
                    *v = divsqrt(v.abs(), window_len);
                }
            }
            NormalizerKind::LogNorm => {
                for v in bins.iter_mut() {
                    *v = lognorm(v.abs(), window_len);
                }
            }
            NormalizerKind::FiltSqrt => {
                self.filtered_sqrt.fit(bins.len());
                for (i, v) in bins.iter_mut().enumerate() {
                    *v = self.filtered_sqrt.step(i, divsqrt(v.abs(), window_len));
                }
            }
            NormalizerKind::FiltNorm => {
                self.filtered_log.fit(bins.len());
                for (i, v) in bins.iter_mut().enumerate() {
                    *v = self.filtered_log.step(i, lognorm(v.abs(), window_len));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divsqrt_is_pure() {
        let a = divsqrt(8.0, 16.0);
        let mut chain = NormalizerChain::new();
        let mut bins = [3.0, 5.0];
        chain.apply(NormalizerKind::FiltSqrt, &mut bins, 16.0);
        let b = divsqrt(8.0, 16.0);

        assert_eq!(a, 2.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_lognorm_formula() {
        // divsqrt = 0.93 -> (0.93 + 0.07) * 15 = 15
        let v = lognorm(0.93 * 4.0, 16.0);
        let expected = 15.0f32.log10() / 2.0 - 0.01;
        assert!((v - expected).abs() < 1e-5);

        // Silence stays finite thanks to the floor
        assert!(lognorm(0.0, 1024.0).is_finite());
    }

    #[test]
    fn test_filter_step_recurrence() {
        let mut slots = [0.0; FILTER_TAPS];

        assert_eq!(filter_step(&mut slots, 5.0), 1.0);
        assert_eq!(slots, [0.0, 0.0, 0.0, 0.0, 1.0]);

        // (0 + 0 + 0 + 1 + 5) / 5
        assert_eq!(filter_step(&mut slots, 5.0), 1.2);
        assert_eq!(slots, [0.0, 0.0, 0.0, 1.0, 1.2]);
    }

    #[test]
    fn test_filter_converges_to_constant_input() {
        let mut slots = [0.0; FILTER_TAPS];
        let mut out = 0.0;
        for _ in 0..500 {
            out = filter_step(&mut slots, 2.0);
        }
        assert!((out - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_filter_output_stays_within_input_extremes() {
        let inputs = [0.3, 1.7, -0.4, 2.5, 0.0, 0.9, 1.1, -1.2, 0.6, 2.2, 0.1];
        let mut slots = [0.0; FILTER_TAPS];
        // The initial zero state counts as a fed value
        let mut lo: f32 = 0.0;
        let mut hi: f32 = 0.0;

        for &value in &inputs {
            lo = lo.min(value);
            hi = hi.max(value);
            let out = filter_step(&mut slots, value);
            assert!(out >= lo - 1e-6 && out <= hi + 1e-6, "{} outside [{}, {}]", out, lo, hi);
        }
    }

    #[test]
    fn test_bins_filter_independently() {
        let mut chain = NormalizerChain::new();

        let mut frame = [10.0, 0.0, 0.0];
        chain.apply(NormalizerKind::FiltSqrt, &mut frame, 1.0);
        assert_eq!(frame, [2.0, 0.0, 0.0]);

        // Bin 1 and 2 saw only zeros, so bin 0's energy must not leak into them
        let mut frame = [0.0, 0.0, 0.0];
        chain.apply(NormalizerKind::FiltSqrt, &mut frame, 1.0);
        assert_eq!(frame[1], 0.0);
        assert_eq!(frame[2], 0.0);
        assert!((frame[0] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_filtered_variants_keep_separate_state() {
        let mut chain = NormalizerChain::new();
        let mut bins = [5.0];
        chain.apply(NormalizerKind::FiltSqrt, &mut bins, 1.0);
        assert_eq!(bins[0], 1.0);

        let mut bins = [0.0];
        chain.apply(NormalizerKind::FiltNorm, &mut bins, 1.0);
        assert!((bins[0] - lognorm(0.0, 1.0) / 5.0).abs() < 1e-6);

        // FiltSqrt resumes from its own history
        let mut bins = [5.0];
        chain.apply(NormalizerKind::FiltSqrt, &mut bins, 1.0);
        assert!((bins[0] - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_bin_count_change_resets_history() {
        let mut chain = NormalizerChain::new();
        let mut bins = [5.0, 5.0];
        chain.apply(NormalizerKind::FiltSqrt, &mut bins, 1.0);

        let mut bins = [5.0, 5.0, 5.0];
        chain.apply(NormalizerKind::FiltSqrt, &mut bins, 1.0);
        assert_eq!(bins, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_apply_takes_magnitude() {
        let mut chain = NormalizerChain::new();
        let mut bins = [-4.0, 4.0];
        chain.apply(NormalizerKind::DivSqrt, &mut bins, 4.0);
        assert_eq!(bins, [2.0, 2.0]);
    }

    #[test]
    fn test_kind_cycles_and_names() {
        let mut kind = NormalizerKind::DivSqrt;
        let mut seen = Vec::new();
        for _ in 0..4 {
            kind = kind.next();
            seen.push(kind.index());
        }
        assert_eq!(seen, vec![1, 2, 3, 0]);

        assert_eq!(NormalizerKind::default(), NormalizerKind::FiltNorm);
        assert_eq!(NormalizerKind::from_name("lognorm"), Some(NormalizerKind::LogNorm));
        assert_eq!(NormalizerKind::from_name("fft"), None);
    }
}
