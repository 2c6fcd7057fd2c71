//! Gauge and chart widgets.
//!
//! All widgets are generic over `DrawTarget<Color = Rgb565>` and take their
//! area and pixel density from a [`RenderContext`](crate::render::RenderContext).

mod chart;
mod gauge;

pub use chart::{ChartLayout, draw_chart};
pub use gauge::{
    GaugeLayout,
    GaugeReadout,
    draw_gauge,
    draw_gauge_face,
    draw_needle,
    draw_odometer,
    draw_readout,
    draw_scale,
    point_at,
};

/// Framebuffer target for widget tests.
#[cfg(test)]
pub(crate) mod test_display {
    use std::vec::Vec;

    use embedded_graphics::pixelcolor::Rgb565;
    use embedded_graphics::prelude::*;

    use crate::colors::BLACK;

    pub struct FrameBuffer {
        width: u32,
        height: u32,
        pixels: Vec<Rgb565>,
    }

    impl FrameBuffer {
        pub fn new(
            width: u32,
            height: u32,
        ) -> Self {
            Self {
                width,
                height,
                pixels: vec![BLACK; (width * height) as usize],
            }
        }

        pub fn pixel(
            &self,
            x: i32,
            y: i32,
        ) -> Option<Rgb565> {
            if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
                return None;
            }
            Some(self.pixels[(y as u32 * self.width + x as u32) as usize])
        }

        pub fn count(
            &self,
            color: Rgb565,
        ) -> usize {
            self.pixels.iter().filter(|&&c| c == color).count()
        }

        /// Whether `color` appears within `radius` pixels of `center`.
        pub fn has_near(
            &self,
            center: Point,
            radius: i32,
            color: Rgb565,
        ) -> bool {
            (-radius..=radius).any(|dy| {
                (-radius..=radius).any(|dx| self.pixel(center.x + dx, center.y + dy) == Some(color))
            })
        }
    }

    impl OriginDimensions for FrameBuffer {
        fn size(&self) -> Size { Size::new(self.width, self.height) }
    }

    impl DrawTarget for FrameBuffer {
        type Color = Rgb565;
        type Error = core::convert::Infallible;

        fn draw_iter<I>(
            &mut self,
            pixels: I,
        ) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(point, color) in pixels {
                if point.x >= 0 && point.y >= 0 && (point.x as u32) < self.width && (point.y as u32) < self.height {
                    self.pixels[(point.y as u32 * self.width + point.x as u32) as usize] = color;
                }
            }
            Ok(())
        }
    }
}
