//! Chart channel identifiers and their display attributes.
//!
//! Attributes live in a plain table keyed by [`ChannelId`] rather than on the
//! identifier itself, so a host can restyle a channel without touching the
//! pipeline. [`ChannelId::ALL`] is the drawing priority: later channels are
//! painted over earlier ones.

use embedded_graphics::pixelcolor::Rgb565;

use crate::colors::{ACCEL_BLUE, ENERGY_YELLOW, SPEED_GREEN};

/// Number of chart channels.
pub const CHANNEL_COUNT: usize = 3;

/// One chart series.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ChannelId {
    /// Smoothed speed in km/h.
    Speed,
    /// Kinetic energy in joules.
    Energy,
    /// Longitudinal acceleration in g. May be absent for a sample.
    Acceleration,
}

impl ChannelId {
    /// All channels in drawing order.
    pub const ALL: [Self; CHANNEL_COUNT] = [Self::Speed, Self::Energy, Self::Acceleration];

    /// Column of this channel in a series row.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::Speed => 0,
            Self::Energy => 1,
            Self::Acceleration => 2,
        }
    }
}

/// Which side of the chart a channel's value axis is drawn on.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Axis {
    Left,
    Right,
}

/// Display attributes for one channel.
#[derive(Clone, Copy, Debug)]
pub struct ChannelAttrs {
    pub label: &'static str,
    pub unit: &'static str,
    pub color: Rgb565,
    /// Line width in density-independent pixels.
    pub line_width_dp: f32,
    pub axis: Axis,
    /// Pin the axis minimum at zero instead of the data minimum.
    pub zero_based: bool,
}

/// Attribute table for every channel.
#[derive(Clone, Copy, Debug)]
pub struct ChannelTable {
    attrs: [ChannelAttrs; CHANNEL_COUNT],
}

impl ChannelTable {
    /// The stock table: speed and energy on the right axis, acceleration on the left.
    pub const fn new() -> Self {
        Self {
            attrs: [
                ChannelAttrs {
                    label: "Speed",
                    unit: "km/h",
                    color: SPEED_GREEN,
                    line_width_dp: 1.0,
                    axis: Axis::Right,
                    zero_based: true,
                },
                ChannelAttrs {
                    label: "Energy",
                    unit: "J",
                    color: ENERGY_YELLOW,
                    line_width_dp: 0.5,
                    axis: Axis::Right,
                    zero_based: true,
                },
                ChannelAttrs {
                    label: "Accel",
                    unit: "g",
                    color: ACCEL_BLUE,
                    line_width_dp: 0.3,
                    axis: Axis::Left,
                    zero_based: false,
                },
            ],
        }
    }

    #[inline]
    pub const fn get(
        &self,
        channel: ChannelId,
    ) -> &ChannelAttrs {
        &self.attrs[channel.index()]
    }

    /// Replace the attributes of one channel.
    pub fn set(
        &mut self,
        channel: ChannelId,
        attrs: ChannelAttrs,
    ) {
        self.attrs[channel.index()] = attrs;
    }
}

impl Default for ChannelTable {
    fn default() -> Self { Self::new() }
}
