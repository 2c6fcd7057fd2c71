//! Core of the kinetic speedometer.
//!
//! Everything that does not need an operating system lives here:
//!
//! - [`smoother`]: fixed-step ramp from raw location speed to displayed speed
//! - [`kinematics`]: kinetic energy, acceleration in g, session clock, odometer
//! - [`series`]: bounded, index-aligned multi-channel chart history
//! - [`scale`]: gauge scale geometry and validation
//! - [`ticks`]: speed label alignment on the square-root scale
//! - [`needle`]: rate-limited needle animation
//! - [`channels`]: chart channel identifiers and display attributes
//! - [`render`], [`styles`], [`widgets`]: drawing the gauge and chart
//! - [`config`], [`colors`]: compile-time defaults
//!
//! # no_std Compatibility
//!
//! This crate is `no_std` and allocation-free. Storage is `heapless`, math is
//! `libm`, and nothing reads a clock: callers pass timestamps in.

#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod channels;
pub mod colors;
pub mod config;
pub mod kinematics;
pub mod needle;
pub mod render;
pub mod scale;
pub mod series;
pub mod smoother;
pub mod styles;
pub mod ticks;
pub mod widgets;

// Re-export commonly used items
pub use channels::{ChannelId, ChannelTable};
pub use kinematics::{KinematicSample, KinematicsCalculator};
pub use needle::{NeedleAnimator, NeedleState};
pub use scale::{ScaleConfig, ScaleWarning};
pub use series::{ChartBuffer, RollingSeriesBuffer};
pub use smoother::{SpeedSample, TelemetrySmoother};
pub use ticks::NickMap;
