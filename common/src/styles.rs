//! Pre-computed text styles for the gauge and chart.
//!
//! Styles are `const` so draw functions never build them per frame. Channel
//! colors are only known at runtime (they come from the channel table), so the
//! fonts are exposed as well for `MonoTextStyle::new(FONT, color)`.

use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyle, ascii::FONT_6X10},
    pixelcolor::Rgb565,
    text::{Alignment, Baseline, TextStyle, TextStyleBuilder},
};
use profont::{PROFONT_9_POINT, PROFONT_24_POINT};

use crate::colors::GRID_GRAY;

// =============================================================================
// Text Alignment Styles
// =============================================================================

/// Centered on the anchor point both ways. Dial labels and readouts.
pub const CENTERED: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Center)
    .baseline(Baseline::Middle)
    .build();

/// Left-aligned, vertically centered. Chart legend and left axis.
pub const LEFT_ALIGNED: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Left)
    .baseline(Baseline::Middle)
    .build();

/// Right-aligned, vertically centered. Right axis values.
pub const RIGHT_ALIGNED: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Right)
    .baseline(Baseline::Middle)
    .build();

// =============================================================================
// Fonts
// =============================================================================

/// Large readout font for speed and energy values.
pub const VALUE_FONT: &MonoFont = &PROFONT_24_POINT;

/// Dial label font.
pub const DIAL_FONT: &MonoFont = &PROFONT_9_POINT;

/// Units, legend and axis text.
pub const LABEL_FONT: &MonoFont = &FONT_6X10;

// =============================================================================
// Fixed-Color Styles
// =============================================================================

/// Dimmed text for the odometer.
pub const LABEL_STYLE_DIM: MonoTextStyle<'static, Rgb565> = MonoTextStyle::new(&FONT_6X10, GRID_GRAY);
