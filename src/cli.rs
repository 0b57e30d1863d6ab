//! Command-line argument parsing.

use clap::Parser;

use crate::params::{AnalysisParams, RenderConfig};
use crate::spectrum::NormalizerKind;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "spectrum")]
#[command(about = "Live audio spectrum viewer", long_about = None)]
pub struct Args {
    /// Input device name (see --list-devices)
    #[arg(long, value_name = "NAME")]
    pub device: Option<String>,

    /// List input devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// History length in audio periods (transform size = period * quality)
    #[arg(long, value_name = "K", default_value = "6")]
    pub quality: usize,

    /// Period assumed before the first audio callback (frames)
    #[arg(long, value_name = "FRAMES", default_value = "1024")]
    pub period: usize,

    /// Startup normalizer: divsqrt, lognorm, filtsqrt, filtnorm (default)
    #[arg(long, value_name = "NAME", default_value = "filtnorm")]
    pub normalizer: String,

    /// Window width (pixels)
    #[arg(long, value_name = "PIXELS", default_value = "640")]
    pub width: u32,

    /// Window height (pixels)
    #[arg(long, value_name = "PIXELS", default_value = "480")]
    pub height: u32,
}

impl Args {
    /// Parse normalizer name from command-line arguments
    pub fn parse_normalizer(&self) -> NormalizerKind {
        match NormalizerKind::from_name(&self.normalizer.to_lowercase()) {
            Some(kind) => kind,
            None => {
                log::warn!(
                    "Unknown normalizer '{}', using {}",
                    self.normalizer,
                    NormalizerKind::default()
                );
                NormalizerKind::default()
            }
        }
    }

    pub fn analysis_params(&self) -> AnalysisParams {
        AnalysisParams {
            quality_factor: self.quality,
            initial_period_frames: self.period,
            normalizer: self.parse_normalizer(),
            device: self.device.clone(),
        }
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            window_width: self.width,
            window_height: self.height,
            ..Default::default()
        }
    }
}
