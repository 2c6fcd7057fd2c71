//! Scrolling multi-channel line chart.
//!
//! One polyline per channel over the buffer's time axis. The x axis always
//! spans the oldest to the newest row, so the chart scrolls once the buffer is
//! full. Channels on the same side share that side's value range; the range
//! is recomputed from the buffer every draw.
//!
//! A `None` value ends the current line segment. The next present value
//! starts a new one, so a missing acceleration shows as a gap and never as a
//! drop to zero.

use core::fmt::Write;

use embedded_graphics::{
    mono_font::MonoTextStyle,
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{Line, PrimitiveStyle, Rectangle},
    text::Text,
};
use heapless::String;
use libm::roundf;

use crate::channels::{Axis, ChannelId, ChannelTable};
use crate::colors::{GRID_GRAY, WHITE};
use crate::render::RenderContext;
use crate::series::RollingSeriesBuffer;
use crate::styles::{LABEL_FONT, LEFT_ALIGNED, RIGHT_ALIGNED};

/// Width reserved for axis values on each side, in dp.
const AXIS_MARGIN_DP: f32 = 30.0;

/// Height of the legend strip above the plot, in dp.
const LEGEND_HEIGHT_DP: f32 = 14.0;

/// Frame and plot area of a chart.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ChartLayout {
    pub frame: Rectangle,
    pub plot: Rectangle,
    pub legend_y: i32,
}

impl ChartLayout {
    pub fn new(ctx: &RenderContext) -> Self {
        let margin = roundf(ctx.dp(AXIS_MARGIN_DP)) as u32;
        let legend = roundf(ctx.dp(LEGEND_HEIGHT_DP)) as u32;

        let frame = Rectangle::new(
            ctx.origin + Point::new(0, legend as i32),
            Size::new(ctx.width, ctx.height.saturating_sub(legend)),
        );
        let plot = Rectangle::new(
            frame.top_left + Point::new(margin as i32, 1),
            Size::new(
                ctx.width.saturating_sub(2 * margin),
                frame.size.height.saturating_sub(2),
            ),
        );

        Self {
            frame,
            plot,
            legend_y: ctx.origin.y + legend as i32 / 2,
        }
    }
}

/// Value range shared by every channel drawn against `axis`.
///
/// Zero-based channels pull the minimum down to 0. A flat range is widened
/// to one unit so the line sits on the bottom edge instead of dividing by zero.
fn axis_range<const N: usize>(
    buffer: &RollingSeriesBuffer<N>,
    channels: &ChannelTable,
    axis: Axis,
) -> Option<(f32, f32)> {
    let mut range: Option<(f32, f32)> = None;
    let mut zero_based = false;

    for channel in ChannelId::ALL {
        let attrs = channels.get(channel);
        if attrs.axis != axis {
            continue;
        }
        zero_based |= attrs.zero_based;
        if let Some((min, max)) = buffer.min_max(channel) {
            range = Some(match range {
                None => (min, max),
                Some((lo, hi)) => (lo.min(min), hi.max(max)),
            });
        }
    }

    range.map(|(mut min, mut max)| {
        if zero_based {
            min = min.min(0.0);
            max = max.max(0.0);
        }
        if max - min < f32::EPSILON {
            max = min + 1.0;
        }
        (min, max)
    })
}

fn map_x(
    time_ms: f32,
    first_ms: f32,
    span_ms: f32,
    plot: &Rectangle,
) -> i32 {
    let width = plot.size.width.saturating_sub(1) as f32;
    let frac = if span_ms > 0.0 { (time_ms - first_ms) / span_ms } else { 1.0 };
    plot.top_left.x + roundf(frac.clamp(0.0, 1.0) * width) as i32
}

fn map_y(
    value: f32,
    (min, max): (f32, f32),
    plot: &Rectangle,
) -> i32 {
    let height = plot.size.height.saturating_sub(1) as f32;
    let frac = ((value - min) / (max - min)).clamp(0.0, 1.0);
    plot.top_left.y + height as i32 - roundf(frac * height) as i32
}

/// Frame, mid grid line, one line per channel, axis extremes and legend.
pub fn draw_chart<D, const N: usize>(
    display: &mut D,
    ctx: &RenderContext,
    buffer: &RollingSeriesBuffer<N>,
    channels: &ChannelTable,
) where
    D: DrawTarget<Color = Rgb565>,
{
    let layout = ChartLayout::new(ctx);
    let plot = layout.plot;

    layout
        .frame
        .into_styled(PrimitiveStyle::with_stroke(GRID_GRAY, 1))
        .draw(display)
        .ok();
    let mid_y = plot.top_left.y + plot.size.height as i32 / 2;
    Line::new(
        Point::new(plot.top_left.x, mid_y),
        Point::new(plot.top_left.x + plot.size.width as i32 - 1, mid_y),
    )
    .into_styled(PrimitiveStyle::with_stroke(GRID_GRAY, 1))
    .draw(display)
    .ok();

    let left = axis_range(buffer, channels, Axis::Left);
    let right = axis_range(buffer, channels, Axis::Right);
    let first_ms = buffer.rows().next().map_or(0.0, |row| row.time_ms);
    let span_ms = buffer.span_ms();

    for channel in ChannelId::ALL {
        let attrs = channels.get(channel);
        let range = match attrs.axis {
            Axis::Left => left,
            Axis::Right => right,
        };
        let Some(range) = range else {
            continue;
        };
        let style = PrimitiveStyle::with_stroke(attrs.color, ctx.stroke_px(attrs.line_width_dp));

        let mut prev: Option<Point> = None;
        for (time_ms, value) in buffer.channel(channel) {
            let Some(value) = value else {
                prev = None;
                continue;
            };
            let point = Point::new(map_x(time_ms, first_ms, span_ms, &plot), map_y(value, range, &plot));
            match prev {
                Some(from) => Line::new(from, point).into_styled(style).draw(display).ok(),
                None => Pixel(point, attrs.color).draw(display).ok(),
            };
            prev = Some(point);
        }
    }

    draw_axis_values(display, &layout, channels, Axis::Left, left);
    draw_axis_values(display, &layout, channels, Axis::Right, right);
    draw_legend(display, ctx, &layout, channels);
}

/// Range extremes beside the plot, in the color of the axis' first channel
/// (left) or white (right, shared by several channels).
fn draw_axis_values<D>(
    display: &mut D,
    layout: &ChartLayout,
    channels: &ChannelTable,
    axis: Axis,
    range: Option<(f32, f32)>,
) where
    D: DrawTarget<Color = Rgb565>,
{
    let Some((min, max)) = range else {
        return;
    };
    let plot = &layout.plot;

    let (x, text_style, color) = match axis {
        Axis::Left => {
            let color = ChannelId::ALL
                .iter()
                .map(|&channel| channels.get(channel))
                .find(|attrs| attrs.axis == Axis::Left)
                .map_or(WHITE, |attrs| attrs.color);
            (plot.top_left.x - 2, RIGHT_ALIGNED, color)
        }
        Axis::Right => (plot.top_left.x + plot.size.width as i32 + 2, LEFT_ALIGNED, WHITE),
    };
    let character_style = MonoTextStyle::new(LABEL_FONT, color);
    let half_line = LABEL_FONT.character_size.height as i32 / 2;

    let extremes = [
        (max, plot.top_left.y + half_line),
        (min, plot.top_left.y + plot.size.height as i32 - half_line),
    ];
    for (value, y) in extremes {
        let mut text: String<12> = String::new();
        let _ = write!(text, "{value:.1}");
        Text::with_text_style(&text, Point::new(x, y), character_style, text_style)
            .draw(display)
            .ok();
    }
}

/// Color swatch and label per channel, evenly spread over the strip above the frame.
fn draw_legend<D>(
    display: &mut D,
    ctx: &RenderContext,
    layout: &ChartLayout,
    channels: &ChannelTable,
) where
    D: DrawTarget<Color = Rgb565>,
{
    let slot = ctx.width as i32 / ChannelId::ALL.len() as i32;
    let swatch = roundf(ctx.dp(8.0)) as i32;

    for (i, channel) in ChannelId::ALL.iter().enumerate() {
        let attrs = channels.get(*channel);
        let x = ctx.origin.x + i as i32 * slot + 2;

        Line::new(Point::new(x, layout.legend_y), Point::new(x + swatch, layout.legend_y))
            .into_styled(PrimitiveStyle::with_stroke(attrs.color, 2))
            .draw(display)
            .ok();

        let mut text: String<24> = String::new();
        let _ = write!(text, "{} ({})", attrs.label, attrs.unit);
        Text::with_text_style(
            &text,
            Point::new(x + swatch + 3, layout.legend_y),
            MonoTextStyle::new(LABEL_FONT, attrs.color),
            LEFT_ALIGNED,
        )
        .draw(display)
        .ok();
    }
}
