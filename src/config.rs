//! Runtime configuration for the speedometer.
//!
//! Loaded once at startup from an optional TOML file. Every key is optional and
//! falls back to the compile-time default in [`speedo_common::config`]:
//!
//! ```toml
//! mass_kg = 1.0
//! gauge_max_speed_kmh = 200.0
//! total_ticks = 200
//! major_interval = 20
//! minor_interval = 10
//! animation_cadence_ms = 100
//! render_min_interval_ms = 5
//! history_seconds = 300
//! sample_interval_ms = 100
//! location_interval_ms = 250
//! # speed_deadband_mps = 0.25
//! ```
//!
//! `gauge_max_value` defaults to the kinetic energy of `mass_kg` at
//! `gauge_max_speed_kmh`, so changing either keeps the dial consistent.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use speedo_common::config::{
    ANIMATION_CADENCE_MS, END_ANGLE_DEG, GAUGE_MAX_SPEED_KMH, HISTORY_SECONDS, LOCATION_INTERVAL_MS,
    MAJOR_INTERVAL_KMH, MASS_KG, MINOR_INTERVAL_KMH, NEEDLE_STEP_FACTOR, RENDER_MIN_INTERVAL_MS,
    SAMPLE_INTERVAL_MS, SERIES_MAX_CAPACITY, START_ANGLE_DEG, TOTAL_TICKS, series_capacity,
};
use speedo_common::scale::ScaleConfig;

use crate::error::Result;

/// Speedometer settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpeedoConfig {
    /// Mass for kinetic energy, in kg
    pub mass_kg: f32,
    /// Dial start value
    pub gauge_min_value: f32,
    /// Dial end value; derived from `gauge_max_speed_kmh` when absent
    pub gauge_max_value: Option<f32>,
    /// Speed at the end of the dial, in km/h
    pub gauge_max_speed_kmh: f32,
    pub total_ticks: u32,
    /// Speed between labelled ticks, in km/h
    pub major_interval: u32,
    /// Speed between minor ticks, in km/h; derived from the major interval when absent
    pub minor_interval: Option<u32>,
    pub start_angle_deg: f32,
    pub end_angle_deg: f32,
    /// Animation clock period
    pub animation_cadence_ms: u64,
    /// Minimum time between two needle moves
    pub render_min_interval_ms: u64,
    /// Needle snap window in degrees of dial travel
    pub needle_step_factor: f32,
    /// Chart history length
    pub history_seconds: u32,
    /// Interval between chart samples
    pub sample_interval_ms: u32,
    /// Target interval between location fixes
    pub location_interval_ms: u64,
    /// Speeds at or below this are treated as standstill; disabled when absent
    pub speed_deadband_mps: Option<f32>,
}

impl Default for SpeedoConfig {
    fn default() -> Self {
        Self {
            mass_kg: MASS_KG,
            gauge_min_value: 0.0,
            gauge_max_value: None,
            gauge_max_speed_kmh: GAUGE_MAX_SPEED_KMH,
            total_ticks: TOTAL_TICKS,
            major_interval: MAJOR_INTERVAL_KMH,
            minor_interval: Some(MINOR_INTERVAL_KMH),
            start_angle_deg: START_ANGLE_DEG,
            end_angle_deg: END_ANGLE_DEG,
            animation_cadence_ms: ANIMATION_CADENCE_MS,
            render_min_interval_ms: RENDER_MIN_INTERVAL_MS,
            needle_step_factor: NEEDLE_STEP_FACTOR,
            history_seconds: HISTORY_SECONDS,
            sample_interval_ms: SAMPLE_INTERVAL_MS,
            location_interval_ms: LOCATION_INTERVAL_MS,
            speed_deadband_mps: None,
        }
    }
}

impl SpeedoConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        Ok(config)
    }

    /// Load from `path` if given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                log::info!("Using config: {}", path.display());
                Self::from_file(path)
            }
            None => {
                log::info!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Gauge scale described by this configuration
    pub fn scale(&self) -> ScaleConfig {
        let mut scale = ScaleConfig::for_max_speed(
            self.gauge_max_speed_kmh,
            self.mass_kg,
            self.total_ticks,
            self.major_interval,
            self.minor_interval,
        );
        scale.min_value = self.gauge_min_value;
        if let Some(max_value) = self.gauge_max_value {
            scale.max_value = max_value;
        }
        scale.start_angle_deg = self.start_angle_deg;
        scale.end_angle_deg = self.end_angle_deg;
        scale
    }

    /// Chart capacity requested by the history settings, before clamping
    pub fn requested_series_capacity(&self) -> usize {
        series_capacity(self.history_seconds, self.sample_interval_ms)
    }

    /// Chart capacity actually used
    pub fn series_capacity(&self) -> usize { self.requested_series_capacity().min(SERIES_MAX_CAPACITY) }

    pub fn animation_cadence(&self) -> Duration { Duration::from_millis(self.animation_cadence_ms) }

    pub fn location_interval(&self) -> Duration { Duration::from_millis(self.location_interval_ms) }

    /// Log the effective settings and every recoverable problem with them.
    ///
    /// Returns the number of warnings logged.
    pub fn log_diagnostics(&self) -> usize {
        let scale = self.scale();
        log::info!(
            "Scale: {} - {} over {} ticks, major {} / minor {:?} km/h, mass {} kg",
            scale.min_value,
            scale.max_value,
            scale.total_ticks,
            scale.major_interval,
            scale.minor_interval,
            scale.mass_kg
        );

        let scale_warnings = scale.validate();
        for warning in &scale_warnings {
            log::warn!("Scale: {warning}");
        }
        if scale_warnings.is_empty() {
            log::info!("Scale ok");
        }
        let mut count = scale_warnings.len();

        let requested = self.requested_series_capacity();
        if requested > SERIES_MAX_CAPACITY {
            log::warn!(
                "Chart history of {} samples exceeds the limit, keeping {}",
                requested,
                SERIES_MAX_CAPACITY
            );
            count += 1;
        }
        if requested == 0 {
            log::warn!("Chart history is empty (history_seconds or sample_interval_ms is 0)");
            count += 1;
        }
        if self.animation_cadence_ms == 0 {
            log::warn!("animation_cadence_ms is 0, the animation clock will spin");
            count += 1;
        }

        log::info!(
            "Animation every {} ms, chart keeps {} samples, deadband {:?}",
            self.animation_cadence_ms,
            self.series_capacity(),
            self.speed_deadband_mps
        );
        count
    }
}
