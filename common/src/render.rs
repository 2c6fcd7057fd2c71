//! Render context and redraw tracking.
//!
//! # Render Context
//!
//! Sizes in the widgets are given in density-independent pixels (dp) or as
//! fractions of the drawing area. [`RenderContext`] carries the area and the
//! pixel density explicitly so no widget reads display metrics from global
//! state.
//!
//! # Update Strategy
//!
//! | Element | Update Frequency | Strategy |
//! |---------|-----------------|----------|
//! | Gauge | Needle moved or readout changed | Conditional redraw |
//! | Chart | New row in the buffer | Conditional redraw |
//! | Background | First frame / after clear | Draw-once tracking |

use embedded_graphics::prelude::*;
use libm::roundf;

/// Drawing area and pixel density for one widget.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RenderContext {
    /// Top-left corner of the widget on the display.
    pub origin: Point,
    pub width: u32,
    pub height: u32,
    /// Physical pixels per dp.
    pub density: f32,
}

impl RenderContext {
    pub const fn new(
        origin: Point,
        width: u32,
        height: u32,
        density: f32,
    ) -> Self {
        Self {
            origin,
            width,
            height,
            density,
        }
    }

    /// Convert density-independent pixels to physical pixels.
    #[inline]
    pub fn dp(
        &self,
        dp: f32,
    ) -> f32 {
        dp * self.density
    }

    /// [`dp`](Self::dp) rounded to a whole stroke width of at least 1 px.
    pub fn stroke_px(
        &self,
        dp: f32,
    ) -> u32 {
        let px = roundf(self.dp(dp));
        if px < 1.0 { 1 } else { px as u32 }
    }

    #[inline]
    pub const fn size(&self) -> Size { Size::new(self.width, self.height) }

    /// Center of the drawing area in display coordinates.
    pub const fn center(&self) -> Point {
        Point::new(
            self.origin.x + (self.width / 2) as i32,
            self.origin.y + (self.height / 2) as i32,
        )
    }
}

// =============================================================================
// Redraw Tracking
// =============================================================================

/// Tracks which parts of the screen need drawing this frame.
#[derive(Clone, Copy, Debug)]
pub struct RenderState {
    first_frame: bool,
    display_cleared: bool,
    /// Needle angle and readout text values drawn last.
    last_gauge: Option<(f32, f32, f32)>,
    last_chart: Option<(usize, f32)>,
}

impl RenderState {
    pub const fn new() -> Self {
        Self {
            first_frame: true,
            display_cleared: false,
            last_gauge: None,
            last_chart: None,
        }
    }

    /// Whether the static background must be drawn.
    #[inline]
    pub const fn need_background(&self) -> bool { self.first_frame || self.display_cleared }

    /// Whether the gauge differs from what was drawn last. Records the new
    /// values when it does.
    pub fn check_gauge_dirty(
        &mut self,
        needle_degrees: f32,
        speed_kmh: f32,
        energy_j: f32,
    ) -> bool {
        let current = (needle_degrees, speed_kmh, energy_j);
        if self.need_background() || self.last_gauge != Some(current) {
            self.last_gauge = Some(current);
            return true;
        }
        false
    }

    /// Whether the chart gained rows since it was drawn last. Keyed on the
    /// buffer length and the newest row time, since a full buffer keeps its
    /// length while scrolling.
    pub fn check_chart_dirty(
        &mut self,
        len: usize,
        latest_time_ms: f32,
    ) -> bool {
        let current = (len, latest_time_ms);
        if self.need_background() || self.last_chart != Some(current) {
            self.last_chart = Some(current);
            return true;
        }
        false
    }

    /// The whole display was cleared; everything draws again next frame.
    pub const fn mark_display_cleared(&mut self) {
        self.display_cleared = true;
    }

    /// Call at the end of every frame.
    pub const fn end_frame(&mut self) {
        self.first_frame = false;
        self.display_cleared = false;
    }

    #[inline]
    pub const fn is_first_frame(&self) -> bool { self.first_frame }
}

impl Default for RenderState {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dp_conversion() {
        let ctx = RenderContext::new(Point::zero(), 320, 240, 2.0);
        assert_eq!(ctx.dp(1.5), 3.0);
        assert_eq!(ctx.stroke_px(1.0), 2);
        assert_eq!(ctx.stroke_px(0.1), 1, "thin lines stay visible");
    }

    #[test]
    fn test_center_includes_origin() {
        let ctx = RenderContext::new(Point::new(10, 200), 100, 50, 1.0);
        assert_eq!(ctx.center(), Point::new(60, 225));
    }

    #[test]
    fn test_first_frame_draws_everything() {
        let mut state = RenderState::new();
        assert!(state.need_background());
        assert!(state.check_gauge_dirty(200.0, 0.0, 0.0));
        assert!(state.check_chart_dirty(0, 0.0));
        state.end_frame();
        assert!(!state.need_background());
        assert!(!state.is_first_frame());
    }

    #[test]
    fn test_gauge_dirty_only_on_change() {
        let mut state = RenderState::new();
        state.check_gauge_dirty(200.0, 0.0, 0.0);
        state.end_frame();

        assert!(!state.check_gauge_dirty(200.0, 0.0, 0.0));
        assert!(state.check_gauge_dirty(201.0, 0.0, 0.0), "needle moved");
        assert!(state.check_gauge_dirty(201.0, 3.6, 0.5), "readout changed");
        assert!(!state.check_gauge_dirty(201.0, 3.6, 0.5));
    }

    #[test]
    fn test_chart_dirty_when_full_buffer_scrolls() {
        let mut state = RenderState::new();
        state.check_chart_dirty(5, 400.0);
        state.end_frame();

        assert!(!state.check_chart_dirty(5, 400.0));
        assert!(state.check_chart_dirty(5, 500.0), "same length, new row");
    }

    #[test]
    fn test_clear_forces_redraw() {
        let mut state = RenderState::new();
        state.check_gauge_dirty(200.0, 0.0, 0.0);
        state.end_frame();
        state.mark_display_cleared();

        assert!(state.need_background());
        assert!(state.check_gauge_dirty(200.0, 0.0, 0.0));
        state.end_frame();
        assert!(!state.need_background());
    }
}
