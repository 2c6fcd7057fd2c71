//! Compile-time defaults for the speedometer pipeline and gauge.
//!
//! Every runtime option has a default here. The host crate may override any of
//! them from a TOML file at startup; the core only ever sees the resolved values.
//!
//! # Compile-Time Validation
//!
//! Related defaults are checked with `const` assertions so an inconsistent edit
//! fails the build instead of producing a broken scale at runtime.

// =============================================================================
// Physical Model
// =============================================================================

/// Mass used for kinetic energy, in kilograms.
pub const MASS_KG: f32 = 1.0;

/// Converts m/s² into standard gravities.
pub const G_PER_MPS2: f32 = 0.101_971_62;

/// Converts m/s into km/h.
pub const KMH_PER_MPS: f32 = 3.6;

// =============================================================================
// Gauge Scale
// =============================================================================

/// Speed at the end of the dial, in km/h.
pub const GAUGE_MAX_SPEED_KMH: f32 = 200.0;

/// Number of tick steps on the dial (ticks are indexed `0..=TOTAL_TICKS`).
pub const TOTAL_TICKS: u32 = 200;

/// Speed interval between labelled (major) ticks, in km/h.
pub const MAJOR_INTERVAL_KMH: u32 = 20;

/// Speed interval between minor ticks, in km/h.
pub const MINOR_INTERVAL_KMH: u32 = 10;

/// Dial start angle in degrees, measured clockwise from the bottom (6 o'clock).
pub const START_ANGLE_DEG: f32 = 20.0;

/// Dial end angle in degrees, measured clockwise from the bottom.
pub const END_ANGLE_DEG: f32 = 340.0;

/// Upper bound on tick slots a `NickMap` can hold (ticks `0..MAX_NICKS`).
pub const MAX_NICKS: usize = 1025;

const _: () = assert!(TOTAL_TICKS % MAJOR_INTERVAL_KMH == 0);
const _: () = assert!(MAJOR_INTERVAL_KMH % MINOR_INTERVAL_KMH == 0);
const _: () = assert!((TOTAL_TICKS as usize) < MAX_NICKS);

// =============================================================================
// Timing
// =============================================================================

/// Animation clock period in milliseconds (smoother, kinematics, chart append).
pub const ANIMATION_CADENCE_MS: u64 = 100;

/// Number of sub-steps the smoother uses to ramp toward a new target.
pub const SMOOTHING_STEPS: u32 = 10;

/// Minimum wall time between two needle moves, in milliseconds.
pub const RENDER_MIN_INTERVAL_MS: u64 = 5;

/// Snap threshold of the needle animator in degrees of dial travel.
pub const NEEDLE_STEP_FACTOR: f32 = 3.0;

/// Target interval between location callbacks, in milliseconds.
pub const LOCATION_INTERVAL_MS: u64 = 250;

// =============================================================================
// Chart History
// =============================================================================

/// Seconds of history the chart keeps.
pub const HISTORY_SECONDS: u32 = 300;

/// Interval between chart samples in milliseconds.
pub const SAMPLE_INTERVAL_MS: u32 = 100;

/// Storage bound of the chart buffer. Derived capacities above this are clamped.
pub const SERIES_MAX_CAPACITY: usize = 6000;

/// Chart capacity for a history duration and sample interval.
///
/// `C = history_seconds * 1000 / sample_interval_ms`. A zero interval yields 0.
pub const fn series_capacity(
    history_seconds: u32,
    sample_interval_ms: u32,
) -> usize {
    if sample_interval_ms == 0 {
        return 0;
    }
    (history_seconds as usize * 1000) / sample_interval_ms as usize
}

/// Default chart capacity (3000 samples: five minutes at 10 Hz).
pub const DEFAULT_SERIES_CAPACITY: usize = series_capacity(HISTORY_SECONDS, SAMPLE_INTERVAL_MS);

const _: () = assert!(DEFAULT_SERIES_CAPACITY <= SERIES_MAX_CAPACITY);
