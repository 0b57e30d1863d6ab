//! Interaction and layout constants for the spectrum view.

#[derive(Debug, Clone)]
pub struct ViewParams {
    /// Width-scale change per frame while `-` or `=` is held
    pub width_step: f32,

    /// Scale change per scroll line
    pub zoom_step: f32,

    /// Grid cell size (pixels, width multiplied by the width scale)
    pub grid_cell_px: f32,

    /// Gap between the spectrum baseline and the bottom edge (pixels)
    pub baseline_px: f32,

    /// Pixels per scroll line for touchpads reporting pixel deltas
    pub scroll_pixels_per_line: f32,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            width_step: 0.05,
            zoom_step: 0.05,
            grid_cell_px: 25.0,
            baseline_px: 2.0,
            scroll_pixels_per_line: 20.0,
        }
    }
}
