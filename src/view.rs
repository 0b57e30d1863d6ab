//! Interactive view state: pan, zoom, width scale and normalizer selection.
//!
//! Input is sampled once per frame (like a polled window API): held keys and
//! buttons are levels, scroll is accumulated between frames and consumed by
//! [`ViewState::update`].

use glam::{Mat4, Vec2, Vec3};
use std::collections::HashSet;

use crate::params::ViewParams;
use crate::spectrum::NormalizerKind;

/// Actions bound to keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKey {
    /// Advance to the next normalizer (once per press)
    CycleNormalizer,
    NarrowWidth,
    WidenWidth,
    ResetWidth,
    /// Reset pan and zoom
    ResetView,
}

/// Input levels sampled from the window
#[derive(Debug, Default, Clone)]
pub struct InputState {
    pub drag_button: bool,
    pub cursor: Vec2,
    held: HashSet<ViewKey>,
    scroll: f32,
}

impl InputState {
    pub fn set_key(&mut self, key: ViewKey, pressed: bool) {
        if pressed {
            self.held.insert(key);
        } else {
            self.held.remove(&key);
        }
    }

    pub fn is_held(&self, key: ViewKey) -> bool {
        self.held.contains(&key)
    }

    /// Accumulate wheel movement (lines, positive = away from the user)
    pub fn add_scroll(&mut self, lines: f32) {
        self.scroll += lines;
    }

    /// Scroll since the last call
    pub fn take_scroll(&mut self) -> f32 {
        std::mem::take(&mut self.scroll)
    }

    /// Drop all levels, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        self.held.clear();
        self.drag_button = false;
    }
}

/// Pan/zoom transform and the selected normalizer
#[derive(Debug, Clone)]
pub struct ViewState {
    pub scale: f32,
    pub x: f32,
    pub y: f32,
    pub width_scale: f32,
    pub normalizer: NormalizerKind,
    /// Cursor position at the previous frame while dragging
    drag_origin: Option<Vec2>,
    /// Cycle key was already down at the previous frame
    cycle_held: bool,
    params: ViewParams,
}

impl ViewState {
    pub fn new(params: ViewParams, normalizer: NormalizerKind) -> Self {
        Self {
            scale: 1.0,
            x: 0.0,
            y: 0.0,
            width_scale: 1.0,
            normalizer,
            drag_origin: None,
            cycle_held: false,
            params,
        }
    }

    pub fn params(&self) -> &ViewParams {
        &self.params
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }

    /// Apply one frame of input. Consumes the accumulated scroll.
    pub fn update(&mut self, input: &mut InputState) {
        // Drag: accumulate the cursor delta since the last sampled position
        if input.drag_button {
            if let Some(origin) = self.drag_origin {
                let delta = input.cursor - origin;
                self.x += delta.x;
                self.y += delta.y;
            }
            self.drag_origin = Some(input.cursor);
        } else {
            self.drag_origin = None;
        }

        // Edge-triggered: one step per press, not per frame
        if input.is_held(ViewKey::CycleNormalizer) {
            if !self.cycle_held {
                self.normalizer = self.normalizer.next();
                self.cycle_held = true;
                log::info!("Normalizer: {}", self.normalizer);
            }
        } else {
            self.cycle_held = false;
        }

        if input.is_held(ViewKey::NarrowWidth) {
            self.width_scale -= self.params.width_step;
        }
        if input.is_held(ViewKey::WidenWidth) {
            self.width_scale += self.params.width_step;
        }
        if input.is_held(ViewKey::ResetWidth) {
            self.width_scale = 1.0;
        }

        if input.is_held(ViewKey::ResetView) {
            self.x = 0.0;
            self.y = 0.0;
            self.scale = 1.0;
        }
        self.scale += input.take_scroll() * self.params.zoom_step;
    }

    /// Pixel space (origin top-left, y down) to clip space, with pan and zoom
    pub fn transform(&self, width: f32, height: f32) -> Mat4 {
        let projection = Mat4::orthographic_rh(0.0, width.max(1.0), height.max(1.0), 0.0, -1.0, 1.0);
        projection
            * Mat4::from_translation(Vec3::new(self.x, self.y, 0.0))
            * Mat4::from_scale(Vec3::new(self.scale, self.scale, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn view() -> ViewState {
        ViewState::new(ViewParams::default(), NormalizerKind::default())
    }

    #[test]
    fn test_defaults() {
        let view = view();
        assert_eq!(view.scale, 1.0);
        assert_eq!((view.x, view.y), (0.0, 0.0));
        assert_eq!(view.width_scale, 1.0);
        assert_eq!(view.normalizer, NormalizerKind::FiltNorm);
    }

    #[test]
    fn test_scroll_adjusts_scale() {
        let mut view = view();
        let mut input = InputState::default();

        input.add_scroll(2.0);
        view.update(&mut input);
        assert!((view.scale - 1.10).abs() < 1e-6);

        // Scroll is consumed
        view.update(&mut input);
        assert!((view.scale - 1.10).abs() < 1e-6);
    }

    #[test]
    fn test_drag_accumulates_translation() {
        let mut view = view();
        let mut input = InputState::default();

        input.drag_button = true;
        input.cursor = Vec2::new(100.0, 100.0);
        view.update(&mut input);
        // First frame of a drag only records the origin
        assert_eq!((view.x, view.y), (0.0, 0.0));
        assert!(view.is_dragging());

        input.cursor = Vec2::new(110.0, 95.0);
        view.update(&mut input);
        input.cursor = Vec2::new(130.0, 90.0);
        view.update(&mut input);
        assert_eq!((view.x, view.y), (30.0, -10.0));

        // Moving without the button does nothing
        input.drag_button = false;
        view.update(&mut input);
        input.cursor = Vec2::new(500.0, 500.0);
        view.update(&mut input);
        assert_eq!((view.x, view.y), (30.0, -10.0));
        assert!(!view.is_dragging());

        // New drag starts from the new position
        input.drag_button = true;
        view.update(&mut input);
        assert_eq!((view.x, view.y), (30.0, -10.0));
    }

    #[test]
    fn test_reset_view_regardless_of_drag() {
        let mut view = view();
        let mut input = InputState::default();

        input.drag_button = true;
        input.cursor = Vec2::new(0.0, 0.0);
        view.update(&mut input);
        input.cursor = Vec2::new(40.0, 25.0);
        input.add_scroll(4.0);
        view.update(&mut input);
        assert_ne!((view.x, view.y), (0.0, 0.0));

        input.set_key(ViewKey::ResetView, true);
        view.update(&mut input);
        assert_eq!((view.x, view.y), (0.0, 0.0));
        assert_eq!(view.scale, 1.0);
    }

    #[test]
    fn test_cycle_is_edge_triggered() {
        let mut view = ViewState::new(ViewParams::default(), NormalizerKind::DivSqrt);
        let mut input = InputState::default();
        let mut seen = Vec::new();

        for _ in 0..4 {
            input.set_key(ViewKey::CycleNormalizer, true);
            // Held for several frames
            for _ in 0..3 {
                view.update(&mut input);
            }
            seen.push(view.normalizer.index());
            input.set_key(ViewKey::CycleNormalizer, false);
            view.update(&mut input);
        }

        assert_eq!(seen, vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_width_scale_keys() {
        let mut view = view();
        let mut input = InputState::default();

        input.set_key(ViewKey::WidenWidth, true);
        for _ in 0..4 {
            view.update(&mut input);
        }
        assert!((view.width_scale - 1.2).abs() < 1e-5);

        input.set_key(ViewKey::WidenWidth, false);
        input.set_key(ViewKey::NarrowWidth, true);
        view.update(&mut input);
        assert!((view.width_scale - 1.15).abs() < 1e-5);

        input.set_key(ViewKey::NarrowWidth, false);
        input.set_key(ViewKey::ResetWidth, true);
        view.update(&mut input);
        assert_eq!(view.width_scale, 1.0);
    }

    #[test]
    fn test_transform_maps_pixels_to_clip_space() {
        let mut view = view();
        let m = view.transform(200.0, 100.0);

        let top_left = m * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let bottom_right = m * Vec4::new(200.0, 100.0, 0.0, 1.0);
        assert!((top_left.x + 1.0).abs() < 1e-6 && (top_left.y - 1.0).abs() < 1e-6);
        assert!((bottom_right.x - 1.0).abs() < 1e-6 && (bottom_right.y + 1.0).abs() < 1e-6);

        // Pan then zoom: (10, 10) scaled by 2 and shifted by (100, 0) lands on (120, 20)
        view.scale = 2.0;
        view.x = 100.0;
        let m = view.transform(200.0, 100.0);
        let moved = m * Vec4::new(10.0, 10.0, 0.0, 1.0);
        let reference = ViewState::new(ViewParams::default(), NormalizerKind::default())
            .transform(200.0, 100.0)
            * Vec4::new(120.0, 20.0, 0.0, 1.0);
        assert!((moved - reference).abs().max_element() < 1e-5);
    }

    #[test]
    fn test_release_all_clears_levels() {
        let mut input = InputState::default();
        input.drag_button = true;
        input.set_key(ViewKey::WidenWidth, true);
        input.release_all();
        assert!(!input.drag_button);
        assert!(!input.is_held(ViewKey::WidenWidth));
    }
}
