//! Color constants for the gauge and chart.
//!
//! Rgb565 packs 5 bits red, 6 bits green and 5 bits blue. The channel colors
//! are the 8-bit design colors truncated to that range:
//!
//! | Channel | Design | Rgb565 |
//! |---------|--------|--------|
//! | Speed | `#22ff22` | (4, 63, 4) |
//! | Energy | `#ffff22` | (31, 63, 4) |
//! | Acceleration | `#88ddff` | (17, 55, 31) |

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

// =============================================================================
// Standard Colors
// =============================================================================

/// Pure black. Screen background.
pub const BLACK: Rgb565 = Rgb565::BLACK;

/// Pure white. Value text on the chart's right axis.
pub const WHITE: Rgb565 = Rgb565::WHITE;

// =============================================================================
// Channel Colors
// =============================================================================

/// Speed trace, major ticks and dial labels.
pub const SPEED_GREEN: Rgb565 = Rgb565::new(4, 63, 4);

/// Energy trace and regular ticks.
pub const ENERGY_YELLOW: Rgb565 = Rgb565::new(31, 63, 4);

/// Acceleration trace and its axis.
pub const ACCEL_BLUE: Rgb565 = Rgb565::new(17, 55, 31);

// =============================================================================
// Gauge Body
// =============================================================================

/// Outer rim of the dial.
pub const RIM_GRAY: Rgb565 = Rgb565::new(6, 13, 6);

/// Dial face, slightly lifted from the black background.
pub const FACE_DARK: Rgb565 = Rgb565::new(2, 4, 2);

/// Needle fill.
pub const NEEDLE_RED: Rgb565 = Rgb565::RED;

/// Needle pivot cap.
pub const SCREW_GRAY: Rgb565 = Rgb565::new(10, 20, 10);

/// Chart grid and frame lines.
pub const GRID_GRAY: Rgb565 = Rgb565::new(8, 16, 8);
