//! Analog gauge: rim, face, tick scale, labels, needle and readouts.
//!
//! # Geometry
//!
//! Everything scales with the shorter side `s` of the drawing area:
//!
//! | Element | Size |
//! |---------|------|
//! | Rim diameter | 0.90 s |
//! | Rim thickness | 0.02 s |
//! | Scale inset from face | 0.015 s |
//! | Plain / minor / major tick | 0.02 / 0.03 / 0.06 s |
//! | Label radius | 0.70 of scale radius |
//! | Needle length / tail | 0.40 s / s/12 |
//!
//! Angles are screen degrees clockwise from 12 o'clock. The scale starts at
//! `180 + start_angle` (bottom left) and runs clockwise.
//!
//! The gauge only reads a [`NickMap`]; it never solves tick alignment itself.

use core::fmt::Write;

use embedded_graphics::{
    mono_font::MonoTextStyle,
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Triangle},
    text::Text,
};
use heapless::String;
use libm::{cosf, roundf, sinf};

use crate::channels::{ChannelId, ChannelTable};
use crate::colors::{FACE_DARK, NEEDLE_RED, RIM_GRAY, SCREW_GRAY};
use crate::render::RenderContext;
use crate::scale::ScaleConfig;
use crate::styles::{CENTERED, DIAL_FONT, LABEL_FONT, LABEL_STYLE_DIM, VALUE_FONT};
use crate::ticks::NickMap;

/// Point at `radius` from `center` in direction `degrees` (clockwise from up).
pub fn point_at(
    center: Point,
    radius: f32,
    degrees: f32,
) -> Point {
    let rad = degrees.to_radians();
    Point::new(
        center.x + roundf(radius * sinf(rad)) as i32,
        center.y - roundf(radius * cosf(rad)) as i32,
    )
}

/// Resolved pixel geometry of a gauge.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct GaugeLayout {
    pub center: Point,
    pub rim_diameter: u32,
    pub face_diameter: u32,
    pub scale_radius: f32,
    pub label_radius: f32,
    pub tick_len: f32,
    pub minor_tick_len: f32,
    pub major_tick_len: f32,
    pub tick_width: u32,
    pub needle_length: f32,
    pub needle_tail: f32,
    pub needle_width: f32,
    pub hub_radius: f32,
    pub screw_radius: f32,
}

impl GaugeLayout {
    pub fn new(ctx: &RenderContext) -> Self {
        let side = ctx.width.min(ctx.height) as f32;
        let rim_diameter = 0.90 * side;
        let face_diameter = rim_diameter - 2.0 * 0.02 * side;
        let scale_radius = face_diameter / 2.0 - 0.015 * side;

        Self {
            center: ctx.center(),
            rim_diameter: rim_diameter as u32,
            face_diameter: face_diameter as u32,
            scale_radius,
            label_radius: 0.70 * scale_radius,
            tick_len: 0.02 * side,
            minor_tick_len: 0.03 * side,
            major_tick_len: 0.06 * side,
            tick_width: ((0.005 * side) as u32).max(1),
            needle_length: side / 2.0 * 0.8,
            needle_tail: side / 12.0,
            needle_width: (side / 98.0).max(ctx.dp(2.0)),
            hub_radius: side / 49.0,
            screw_radius: side / 61.0,
        }
    }

    /// Screen angle of tick `tick`.
    pub fn tick_degrees(
        scale: &ScaleConfig,
        tick: u32,
    ) -> f32 {
        tick as f32 * scale.degrees_per_tick() + 180.0 + scale.start_angle_deg
    }
}

/// Values shown as text in the upper and lower half of the dial.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct GaugeReadout {
    pub speed_kmh: f32,
    pub energy_j: f32,
}

/// Rim and face.
pub fn draw_gauge_face<D>(
    display: &mut D,
    layout: &GaugeLayout,
) where
    D: DrawTarget<Color = Rgb565>,
{
    Circle::with_center(layout.center, layout.rim_diameter)
        .into_styled(PrimitiveStyle::with_fill(RIM_GRAY))
        .draw(display)
        .ok();
    Circle::with_center(layout.center, layout.face_diameter)
        .into_styled(PrimitiveStyle::with_fill(FACE_DARK))
        .draw(display)
        .ok();
}

/// Every tick, minor and major marks, and the major labels.
///
/// Plain ticks use the energy color; minor and major marks and labels use the
/// speed color, since they mark round speeds.
pub fn draw_scale<D>(
    display: &mut D,
    layout: &GaugeLayout,
    scale: &ScaleConfig,
    nicks: &NickMap,
    channels: &ChannelTable,
) where
    D: DrawTarget<Color = Rgb565>,
{
    let plain_color = channels.get(ChannelId::Energy).color;
    let mark_color = channels.get(ChannelId::Speed).color;
    let label_style = MonoTextStyle::new(DIAL_FONT, mark_color);
    let last_tick = scale.total_ticks.min(nicks.len().saturating_sub(1) as u32);

    for tick in 0..=last_tick {
        let degrees = GaugeLayout::tick_degrees(scale, tick);

        if nicks.is_major(tick) {
            draw_tick(display, layout, degrees, layout.major_tick_len, mark_color);
        }
        if nicks.is_minor(tick) {
            draw_tick(display, layout, degrees, layout.minor_tick_len, mark_color);
        }
        draw_tick(display, layout, degrees, layout.tick_len, plain_color);

        if let Some(text) = nicks.label_text(tick) {
            let position = point_at(layout.center, layout.label_radius, degrees);
            Text::with_text_style(&text, position, label_style, CENTERED)
                .draw(display)
                .ok();
        }
    }
}

/// One radial mark of length `len` inward from the scale circle.
fn draw_tick<D>(
    display: &mut D,
    layout: &GaugeLayout,
    degrees: f32,
    len: f32,
    color: Rgb565,
) where
    D: DrawTarget<Color = Rgb565>,
{
    let outer = point_at(layout.center, layout.scale_radius, degrees);
    let inner = point_at(layout.center, layout.scale_radius - len, degrees);
    Line::new(outer, inner)
        .into_styled(PrimitiveStyle::with_stroke(color, layout.tick_width))
        .draw(display)
        .ok();
}

/// Needle at screen angle `degrees`, with hub and screw.
pub fn draw_needle<D>(
    display: &mut D,
    layout: &GaugeLayout,
    degrees: f32,
) where
    D: DrawTarget<Color = Rgb565>,
{
    let half_width = layout.needle_width / 2.0;
    let tip = point_at(layout.center, layout.needle_length, degrees);
    let tail = point_at(layout.center, layout.needle_tail, degrees + 180.0);
    let left = point_at(layout.center, half_width, degrees - 90.0);
    let right = point_at(layout.center, half_width, degrees + 90.0);
    let fill = PrimitiveStyle::with_fill(NEEDLE_RED);

    Triangle::new(left, tip, right).into_styled(fill).draw(display).ok();
    Triangle::new(left, tail, right).into_styled(fill).draw(display).ok();
    Line::new(tail, tip)
        .into_styled(PrimitiveStyle::with_stroke(NEEDLE_RED, 1))
        .draw(display)
        .ok();

    Circle::with_center(layout.center, (2.0 * layout.hub_radius) as u32)
        .into_styled(fill)
        .draw(display)
        .ok();
    Circle::with_center(layout.center, (2.0 * layout.screw_radius) as u32)
        .into_styled(PrimitiveStyle::with_fill(SCREW_GRAY))
        .draw(display)
        .ok();
}

/// Speed above the hub, energy below it, each with its unit.
pub fn draw_readout<D>(
    display: &mut D,
    layout: &GaugeLayout,
    channels: &ChannelTable,
    readout: &GaugeReadout,
) where
    D: DrawTarget<Color = Rgb565>,
{
    let offset = (layout.scale_radius / 2.0) as i32;
    let unit_gap = VALUE_FONT.character_size.height as i32 / 2 + LABEL_FONT.character_size.height as i32 / 2 + 2;

    let rows = [
        (ChannelId::Speed, readout.speed_kmh, -offset),
        (ChannelId::Energy, readout.energy_j, offset),
    ];

    for (channel, value, dy) in rows {
        let attrs = channels.get(channel);
        let mut value_str: String<16> = String::new();
        let _ = write!(value_str, "{value:.1}");

        let position = layout.center + Point::new(0, dy);
        Text::with_text_style(&value_str, position, MonoTextStyle::new(VALUE_FONT, attrs.color), CENTERED)
            .draw(display)
            .ok();
        Text::with_text_style(
            attrs.unit,
            position + Point::new(0, unit_gap),
            MonoTextStyle::new(LABEL_FONT, attrs.color),
            CENTERED,
        )
        .draw(display)
        .ok();
    }
}

/// Odometer text centered under the hub.
pub fn draw_odometer<D>(
    display: &mut D,
    layout: &GaugeLayout,
    text: &str,
) where
    D: DrawTarget<Color = Rgb565>,
{
    let position = layout.center + Point::new(0, (layout.scale_radius * 0.85) as i32);
    Text::with_text_style(text, position, LABEL_STYLE_DIM, CENTERED)
        .draw(display)
        .ok();
}

/// Complete gauge: face, scale, readouts, needle.
#[allow(clippy::too_many_arguments)]
pub fn draw_gauge<D>(
    display: &mut D,
    ctx: &RenderContext,
    scale: &ScaleConfig,
    nicks: &NickMap,
    channels: &ChannelTable,
    needle_degrees: f32,
    readout: &GaugeReadout,
    odometer: Option<&str>,
) where
    D: DrawTarget<Color = Rgb565>,
{
    let layout = GaugeLayout::new(ctx);
    draw_gauge_face(display, &layout);
    draw_scale(display, &layout, scale, nicks, channels);
    draw_readout(display, &layout, channels, readout);
    if let Some(text) = odometer {
        draw_odometer(display, &layout, text);
    }
    draw_needle(display, &layout, needle_degrees);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{ENERGY_YELLOW, SPEED_GREEN};
    use crate::needle::NeedleAnimator;
    use crate::widgets::test_display::FrameBuffer;

    fn ctx() -> RenderContext { RenderContext::new(Point::zero(), 300, 300, 1.0) }

    #[test]
    fn test_point_at_cardinal_directions() {
        let c = Point::new(100, 100);
        assert_eq!(point_at(c, 10.0, 0.0), Point::new(100, 90), "up");
        assert_eq!(point_at(c, 10.0, 90.0), Point::new(110, 100), "right");
        assert_eq!(point_at(c, 10.0, 180.0), Point::new(100, 110), "down");
        assert_eq!(point_at(c, 10.0, 270.0), Point::new(90, 100), "left");
    }

    #[test]
    fn test_layout_proportions() {
        let layout = GaugeLayout::new(&ctx());
        assert_eq!(layout.center, Point::new(150, 150));
        assert!(layout.rim_diameter.abs_diff(270) <= 1);
        assert!(layout.face_diameter.abs_diff(258) <= 1);
        assert!((layout.scale_radius - 124.5).abs() < 1e-3);
        assert!(layout.major_tick_len > layout.minor_tick_len && layout.minor_tick_len > layout.tick_len);
    }

    #[test]
    fn test_layout_uses_shorter_side() {
        let wide = GaugeLayout::new(&RenderContext::new(Point::zero(), 600, 300, 1.0));
        assert!(wide.rim_diameter.abs_diff(270) <= 1);
        assert_eq!(wide.center, Point::new(300, 150));
    }

    #[test]
    fn test_scale_draws_major_marks_in_speed_color() {
        let scale = ScaleConfig::new();
        let nicks = NickMap::build(&scale);
        let layout = GaugeLayout::new(&ctx());
        let mut fb = FrameBuffer::new(300, 300);

        draw_scale(&mut fb, &layout, &scale, &nicks, &ChannelTable::new());

        // The inner end of a major mark sits past the plain ticks
        let degrees = GaugeLayout::tick_degrees(&scale, 50);
        let inner = point_at(layout.center, layout.scale_radius - layout.major_tick_len + 1.0, degrees);
        assert!(fb.has_near(inner, 1, SPEED_GREEN), "major mark for 100 km/h");

        // Tick 1 is neither major nor minor, only the short plain tick
        let degrees = GaugeLayout::tick_degrees(&scale, 1);
        let outer = point_at(layout.center, layout.scale_radius - 1.0, degrees);
        assert!(fb.has_near(outer, 1, ENERGY_YELLOW));
    }

    #[test]
    fn test_needle_points_along_angle() {
        let layout = GaugeLayout::new(&ctx());
        let mut fb = FrameBuffer::new(300, 300);

        let needle = NeedleAnimator::new(&ScaleConfig::new());
        draw_needle(&mut fb, &layout, needle.needle_degrees());

        let near_tip = point_at(layout.center, layout.needle_length - 4.0, needle.needle_degrees());
        assert!(fb.has_near(near_tip, 1, NEEDLE_RED));

        let opposite = point_at(layout.center, layout.needle_length - 4.0, needle.needle_degrees() + 180.0);
        assert_eq!(fb.pixel(opposite.x, opposite.y), Some(crate::colors::BLACK), "tail is short");
    }

    #[test]
    fn test_full_gauge_draws_every_layer() {
        let scale = ScaleConfig::new();
        let nicks = NickMap::build(&scale);
        let mut fb = FrameBuffer::new(300, 300);
        let readout = GaugeReadout {
            speed_kmh: 36.0,
            energy_j: 50.0,
        };

        draw_gauge(&mut fb, &ctx(), &scale, &nicks, &ChannelTable::new(), 250.0, &readout, Some("00000001.00 km"));

        assert!(fb.count(RIM_GRAY) > 0);
        assert!(fb.count(FACE_DARK) > 0);
        assert!(fb.count(SPEED_GREEN) > 0);
        assert!(fb.count(ENERGY_YELLOW) > 0);
        assert!(fb.count(NEEDLE_RED) > 0);
        assert!(fb.count(SCREW_GRAY) > 0);
    }
}
