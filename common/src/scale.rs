//! Gauge scale geometry and configuration checks.
//!
//! The dial is linear in its own value (kinetic energy): tick `i` carries
//! `i * value_per_tick` and sits at `i * degrees_per_tick` of dial travel. The
//! nonlinear speed labels on top of that are the tick solver's business; this
//! module only knows the linear part.

use core::fmt;

use heapless::Vec;
use libm::{fabsf, roundf};

use crate::config::{
    END_ANGLE_DEG, GAUGE_MAX_SPEED_KMH, KMH_PER_MPS, MAJOR_INTERVAL_KMH, MASS_KG, MAX_NICKS,
    MINOR_INTERVAL_KMH, START_ANGLE_DEG, TOTAL_TICKS,
};
use crate::kinematics::energy;

/// Fraction of a tick that `min + max` may miss the tick grid by.
const TICK_GRID_TOLERANCE: f32 = 1e-3;

/// Upper bound on warnings a single validation pass can produce.
pub const MAX_SCALE_WARNINGS: usize = 10;

/// Immutable description of the gauge scale.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ScaleConfig {
    pub min_value: f32,
    pub max_value: f32,
    pub total_ticks: u32,
    /// Speed interval in km/h between labelled ticks.
    pub major_interval: u32,
    /// Speed interval in km/h between minor ticks. `None` disables minor ticks.
    pub minor_interval: Option<u32>,
    pub mass_kg: f32,
    pub start_angle_deg: f32,
    pub end_angle_deg: f32,
}

impl ScaleConfig {
    /// Stock scale: 0-200 km/h for a 1 kg mass on 200 ticks.
    pub fn new() -> Self {
        Self::for_max_speed(
            GAUGE_MAX_SPEED_KMH,
            MASS_KG,
            TOTAL_TICKS,
            MAJOR_INTERVAL_KMH,
            Some(MINOR_INTERVAL_KMH),
        )
    }

    /// Scale whose end value is the energy of `mass_kg` at `max_speed_kmh`,
    /// rounded to a whole joule.
    pub fn for_max_speed(
        max_speed_kmh: f32,
        mass_kg: f32,
        total_ticks: u32,
        major_interval: u32,
        minor_interval: Option<u32>,
    ) -> Self {
        Self {
            min_value: 0.0,
            max_value: roundf(energy(mass_kg, max_speed_kmh / KMH_PER_MPS)),
            total_ticks,
            major_interval,
            minor_interval,
            mass_kg,
            start_angle_deg: START_ANGLE_DEG,
            end_angle_deg: END_ANGLE_DEG,
        }
    }

    /// Value step between two adjacent ticks. Zero when there are no ticks.
    pub fn value_per_tick(&self) -> f32 {
        if self.total_ticks == 0 {
            return 0.0;
        }
        (self.max_value - self.min_value) / self.total_ticks as f32
    }

    /// Dial travel between two adjacent ticks. Zero when there are no ticks.
    pub fn degrees_per_tick(&self) -> f32 {
        if self.total_ticks == 0 {
            return 0.0;
        }
        (self.end_angle_deg - self.start_angle_deg) / self.total_ticks as f32
    }

    /// Value change that moves the needle by one degree.
    pub fn value_per_degree(&self) -> f32 {
        let degrees = self.degrees_per_tick();
        if degrees == 0.0 {
            return 0.0;
        }
        self.value_per_tick() / degrees
    }

    /// Check the scale for inconsistent settings.
    ///
    /// An empty list means the scale is clean. Anything returned is advisory:
    /// the solver and renderer still do their best with the given values.
    pub fn validate(&self) -> Vec<ScaleWarning, MAX_SCALE_WARNINGS> {
        let mut warnings: Vec<ScaleWarning, MAX_SCALE_WARNINGS> = Vec::new();
        let mut push = |warning: ScaleWarning| {
            let _ = warnings.push(warning);
        };

        if self.total_ticks == 0 {
            push(ScaleWarning::NoTicks);
        } else if self.total_ticks as usize >= MAX_NICKS {
            push(ScaleWarning::TooManyTicks {
                total_ticks: self.total_ticks,
                limit: (MAX_NICKS - 1) as u32,
            });
        }

        if self.major_interval == 0 {
            push(ScaleWarning::NoMajorInterval);
        } else if self.total_ticks % self.major_interval != 0 {
            push(ScaleWarning::TicksNotMultipleOfMajor {
                total_ticks: self.total_ticks,
                major_interval: self.major_interval,
            });
        }

        if self.minor_interval == Some(0) {
            push(ScaleWarning::NoMinorInterval);
        }

        if !(self.min_value < self.max_value) {
            push(ScaleWarning::EmptyRange {
                min_value: self.min_value,
                max_value: self.max_value,
            });
        }

        let value_per_tick = self.value_per_tick();
        if value_per_tick > 0.0 {
            let ticks_in_sum = (self.min_value + self.max_value) / value_per_tick;
            if fabsf(ticks_in_sum - roundf(ticks_in_sum)) > TICK_GRID_TOLERANCE {
                push(ScaleWarning::RangeOffTickGrid {
                    min_value: self.min_value,
                    max_value: self.max_value,
                    value_per_tick,
                });
            }
        }

        if !(self.mass_kg > 0.0) {
            push(ScaleWarning::NonPositiveMass(self.mass_kg));
        }

        if !(self.start_angle_deg < self.end_angle_deg) {
            push(ScaleWarning::InvertedAngles {
                start_deg: self.start_angle_deg,
                end_deg: self.end_angle_deg,
            });
        }

        warnings
    }
}

impl Default for ScaleConfig {
    fn default() -> Self { Self::new() }
}

/// Minor interval for a major interval: half if even, else a third, else a
/// fifth. Intervals divisible by none of these get no minor ticks.
pub const fn derive_minor_interval(major_interval: u32) -> Option<u32> {
    if major_interval == 0 {
        None
    } else if major_interval % 2 == 0 {
        Some(major_interval / 2)
    } else if major_interval % 3 == 0 {
        Some(major_interval / 3)
    } else if major_interval % 5 == 0 {
        Some(major_interval / 5)
    } else {
        None
    }
}

// =============================================================================
// Warnings
// =============================================================================

/// A recoverable problem with a scale configuration.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ScaleWarning {
    NoTicks,
    TooManyTicks { total_ticks: u32, limit: u32 },
    NoMajorInterval,
    NoMinorInterval,
    TicksNotMultipleOfMajor { total_ticks: u32, major_interval: u32 },
    EmptyRange { min_value: f32, max_value: f32 },
    /// `min + max` is not a whole number of ticks, so the dial midpoint falls between ticks.
    RangeOffTickGrid { min_value: f32, max_value: f32, value_per_tick: f32 },
    NonPositiveMass(f32),
    InvertedAngles { start_deg: f32, end_deg: f32 },
}

impl fmt::Display for ScaleWarning {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::NoTicks => write!(f, "scale has no ticks"),
            Self::TooManyTicks { total_ticks, limit } => {
                write!(f, "{total_ticks} ticks exceed the limit of {limit}, extra ticks get no labels")
            }
            Self::NoMajorInterval => write!(f, "major interval is 0, no labels will be drawn"),
            Self::NoMinorInterval => write!(f, "minor interval is 0, no minor ticks will be drawn"),
            Self::TicksNotMultipleOfMajor {
                total_ticks,
                major_interval,
            } => write!(f, "{total_ticks} ticks is not a multiple of the major interval {major_interval}"),
            Self::EmptyRange { min_value, max_value } => {
                write!(f, "min value {min_value} is not below max value {max_value}")
            }
            Self::RangeOffTickGrid {
                min_value,
                max_value,
                value_per_tick,
            } => write!(
                f,
                "min value {min_value} + max value {max_value} is not a multiple of the tick value {value_per_tick}"
            ),
            Self::NonPositiveMass(mass) => write!(f, "mass {mass} kg is not positive"),
            Self::InvertedAngles { start_deg, end_deg } => {
                write!(f, "start angle {start_deg} is not below end angle {end_deg}")
            }
        }
    }
}
