//! Line geometry for the grid and the spectrum curve, in window pixels.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::params::RenderConfig;
use crate::view::ViewState;

/// Vertex of a line list (pixel position + colour)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

fn push_line(out: &mut Vec<LineVertex>, from: Vec2, to: Vec2, color: [f32; 4]) {
    out.push(LineVertex {
        position: from.to_array(),
        color,
    });
    out.push(LineVertex {
        position: to.to_array(),
        color,
    });
}

/// Number of whole cells of `cell` in `span`, or None when the grid is degenerate
fn cell_count(span: f32, cell: f32) -> Option<usize> {
    let count = (span / cell).floor();
    (count.is_finite() && count >= 0.0).then_some(count as usize)
}

/// Grid of `cell`-sized cells covering `size` from `origin`
pub fn push_grid(out: &mut Vec<LineVertex>, cell: Vec2, origin: Vec2, size: Vec2, color: [f32; 4]) {
    if let Some(columns) = cell_count(size.x, cell.x) {
        for i in 0..=columns {
            let x = origin.x + i as f32 * cell.x;
            push_line(out, Vec2::new(x, origin.y), Vec2::new(x, origin.y + size.y), color);
        }
    }
    if let Some(rows) = cell_count(size.y, cell.y) {
        for i in 0..=rows {
            let y = origin.y + i as f32 * cell.y;
            push_line(out, Vec2::new(origin.x, y), Vec2::new(origin.x + size.x, y), color);
        }
    }
}

/// Polyline through `samples`, spread evenly over `size.x`.
///
/// A sample of 1.0 is drawn `size.y` away from `origin.y`; a negative
/// `size.y` draws upwards.
pub fn push_samples(out: &mut Vec<LineVertex>, samples: &[f32], origin: Vec2, size: Vec2, color: [f32; 4]) {
    if samples.len() < 2 {
        return;
    }
    let step = size.x / (samples.len() - 1) as f32;
    let point = |i: usize, v: f32| Vec2::new(origin.x + i as f32 * step, origin.y + v * size.y);

    for (i, pair) in samples.windows(2).enumerate() {
        push_line(out, point(i, pair[0]), point(i + 1, pair[1]), color);
    }
}

/// Background grid then the spectrum, both stretched by the width scale.
/// The curve grows upwards from just above the bottom edge.
pub fn build_frame(
    out: &mut Vec<LineVertex>,
    bins: &[f32],
    view: &ViewState,
    window: Vec2,
    config: &RenderConfig,
) {
    out.clear();
    let params = view.params();
    let width = window.x * view.width_scale;

    push_grid(
        out,
        Vec2::new(params.grid_cell_px * view.width_scale, params.grid_cell_px),
        Vec2::ZERO,
        Vec2::new(width, window.y),
        config.grid_color,
    );
    push_samples(
        out,
        bins,
        Vec2::new(0.0, window.y - params.baseline_px),
        Vec2::new(width, -window.y),
        config.spectrum_color,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ViewParams;
    use crate::spectrum::NormalizerKind;

    const WHITE: [f32; 4] = [1.0; 4];

    #[test]
    fn test_grid_line_count() {
        let mut out = Vec::new();
        push_grid(&mut out, Vec2::new(25.0, 25.0), Vec2::ZERO, Vec2::new(100.0, 50.0), WHITE);

        // 5 vertical + 3 horizontal lines
        assert_eq!(out.len(), 16);
        assert_eq!(out[8].position, [100.0, 0.0]);
        assert_eq!(out[9].position, [100.0, 50.0]);
    }

    #[test]
    fn test_degenerate_grid_draws_no_columns() {
        let mut out = Vec::new();
        push_grid(&mut out, Vec2::new(0.0, 25.0), Vec2::ZERO, Vec2::new(0.0, 50.0), WHITE);
        // Only the 3 horizontal lines
        assert_eq!(out.len(), 6);
    }

    #[test]
    fn test_samples_are_inverted_from_baseline() {
        let mut out = Vec::new();
        push_samples(
            &mut out,
            &[0.0, 0.5, 1.0],
            Vec2::new(0.0, 98.0),
            Vec2::new(200.0, -100.0),
            WHITE,
        );

        let points: Vec<[f32; 2]> = out.iter().map(|v| v.position).collect();
        assert_eq!(
            points,
            vec![[0.0, 98.0], [100.0, 48.0], [100.0, 48.0], [200.0, -2.0]]
        );
    }

    #[test]
    fn test_single_sample_draws_nothing() {
        let mut out = Vec::new();
        push_samples(&mut out, &[1.0], Vec2::ZERO, Vec2::ONE, WHITE);
        assert!(out.is_empty());
    }

    #[test]
    fn test_build_frame_scales_width() {
        let mut view = ViewState::new(ViewParams::default(), NormalizerKind::default());
        view.width_scale = 2.0;
        let config = RenderConfig::default();
        let mut out = vec![LineVertex::zeroed(); 3];

        build_frame(&mut out, &[0.0, 0.0], &view, Vec2::new(100.0, 50.0), &config);

        // Grid: 5 columns of 50px over 200px plus 3 rows, then one curve segment
        assert_eq!(out.len(), (5 + 3 + 1) * 2);
        let curve = &out[out.len() - 2..];
        assert_eq!(curve[0].position, [0.0, 48.0]);
        assert_eq!(curve[1].position, [200.0, 48.0]);
        assert_eq!(curve[1].color, config.spectrum_color);
        assert_eq!(out[0].color, config.grid_color);
    }
}
