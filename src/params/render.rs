//! Window and drawing configuration.

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    pub title: String,

    /// Grid line colour (RGBA)
    pub grid_color: [f32; 4],

    /// Spectrum line colour (RGBA)
    pub spectrum_color: [f32; 4],

    pub clear_color: [f64; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 640,
            window_height: 480,
            title: "spectrum".to_string(),
            grid_color: [0.2, 0.0, 0.0, 1.0], // Dark red, stays behind the curve
            spectrum_color: [1.0, 1.0, 1.0, 1.0],
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}
