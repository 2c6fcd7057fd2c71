//! Kinetic speedometer host.
//!
//! Runs the [`speedo_common`] core on desktop threads:
//!
//! - [`config`]: TOML runtime configuration over the compile-time defaults
//! - [`scheduler`]: cancellable fixed-rate worker threads
//! - [`handoff`]: lock-free cells between the location, animation and render cadences
//! - [`location`]: simulated location provider
//! - [`pipeline`]: the animation-clock tick and the session lifecycle
//!
//! The `speedo-sim` binary (feature `simulator`) draws the gauge and chart in
//! an SDL2 window.

// Crate-level lints
#![allow(clippy::cast_possible_truncation)] // u128 millis -> u64, u64 -> f32 for interpolation
#![allow(clippy::cast_precision_loss)] // u64 -> f32 in profile interpolation
#![allow(clippy::module_name_repetitions)]

pub mod clock;
pub mod config;
pub mod error;
pub mod handoff;
pub mod location;
pub mod pipeline;
pub mod scheduler;

pub use config::SpeedoConfig;
pub use error::{Error, Result};
pub use pipeline::{Session, Telemetry};
