//! Frequency analysis: Hartley transform plus bin normalization.

pub mod analyzer;
pub mod normalize;
pub mod transform;

pub use analyzer::SpectrumAnalyzer;
pub use normalize::{divsqrt, filter_step, lognorm, FilterBank, NormalizerChain, NormalizerKind};
pub use transform::HartleyTransform;
