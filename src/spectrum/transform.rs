//! Discrete Hartley transform on top of rustfft.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Real-to-real Hartley transform with a cached plan.
///
/// `H[k] = sum_n x[n] * cas(2*pi*k*n/N)` with `cas = cos + sin`, unnormalized.
/// For real input this is `Re(X[k]) - Im(X[k])` of the forward DFT, so bins
/// come out ordered low to high frequency like an FFT.
pub struct HartleyTransform {
    planner: FftPlanner<f32>,
    fft: Option<Arc<dyn Fft<f32>>>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    output: Vec<f32>,
}

impl Default for HartleyTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl HartleyTransform {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
            fft: None,
            buffer: Vec::new(),
            scratch: Vec::new(),
            output: Vec::new(),
        }
    }

    /// Size of the current plan (0 before the first call)
    pub fn len(&self) -> usize {
        self.fft.as_ref().map(|fft| fft.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn plan(&mut self, size: usize) -> Result<Arc<dyn Fft<f32>>> {
        if size == 0 {
            return Err(Error::TransformSetup { size });
        }
        if let Some(fft) = self.fft.as_ref().filter(|fft| fft.len() == size) {
            return Ok(Arc::clone(fft));
        }

        log::debug!("Planning Hartley transform of size {}", size);
        let fft = self.planner.plan_fft_forward(size);
        self.buffer = vec![Complex::new(0.0, 0.0); size];
        self.scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        self.output = vec![0.0; size];
        self.fft = Some(Arc::clone(&fft));
        Ok(fft)
    }

    /// Transform `input`, returning one coefficient per input sample
    pub fn compute(&mut self, input: &[f32]) -> Result<&[f32]> {
        let fft = self.plan(input.len())?;

        for (slot, &x) in self.buffer.iter_mut().zip(input) {
            *slot = Complex::new(x, 0.0);
        }
        fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        for (out, c) in self.output.iter_mut().zip(&self.buffer) {
            *out = c.re - c.im;
        }
        Ok(&self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    /// O(N^2) reference straight from the definition
    fn naive_dht(input: &[f32]) -> Vec<f32> {
        let n = input.len();
        (0..n)
            .map(|k| {
                input
                    .iter()
                    .enumerate()
                    .map(|(i, &x)| {
                        let angle = 2.0 * PI * (k * i) as f64 / n as f64;
                        x as f64 * (angle.cos() + angle.sin())
                    })
                    .sum::<f64>() as f32
            })
            .collect()
    }

    #[test]
    fn test_dc_bin_is_sum_of_inputs() {
        let samples = [0.5f32, -0.25, 1.0, 0.75, -1.0, 0.0, 0.125, 0.375];
        let mut transform = HartleyTransform::new();

        let out = transform.compute(&samples).unwrap();
        let sum: f32 = samples.iter().sum();

        assert_eq!(out.len(), 8);
        assert!((out[0] - sum).abs() < 1e-5, "DC {} != sum {}", out[0], sum);
    }

    #[test]
    fn test_matches_reference_dht() {
        let samples = [0.5f32, -0.25, 1.0, 0.75, -1.0, 0.0, 0.125, 0.375];
        let expected = naive_dht(&samples);
        let mut transform = HartleyTransform::new();

        let out = transform.compute(&samples).unwrap();
        for (k, (a, b)) in out.iter().zip(&expected).enumerate() {
            assert!((a - b).abs() < 1e-4, "bin {}: {} vs {}", k, a, b);
        }
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        let n = 64;
        let k = 5;
        let samples: Vec<f32> = (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * (k * i) as f32 / n as f32).cos())
            .collect();
        let mut transform = HartleyTransform::new();

        let out = transform.compute(&samples).unwrap();
        let peak = out[..n / 2]
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.abs().total_cmp(&b.abs()))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, k);
    }

    #[test]
    fn test_replans_when_size_changes() {
        let mut transform = HartleyTransform::new();
        assert!(transform.is_empty());

        transform.compute(&[1.0; 8]).unwrap();
        assert_eq!(transform.len(), 8);

        let out = transform.compute(&[1.0; 12]).unwrap();
        assert_eq!(out.len(), 12);
        assert!((out[0] - 12.0).abs() < 1e-5);
        assert_eq!(transform.len(), 12);
    }

    #[test]
    fn test_empty_input_is_setup_failure() {
        let mut transform = HartleyTransform::new();
        assert!(matches!(
            transform.compute(&[]),
            Err(Error::TransformSetup { size: 0 })
        ));
    }
}
