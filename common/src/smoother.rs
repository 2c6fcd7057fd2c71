//! Fixed-step speed smoothing.
//!
//! Location fixes arrive at an irregular 4-10 Hz. Feeding them straight into the
//! gauge makes the readout jump, so each new fix becomes a *target* and the
//! animation clock walks the displayed speed toward it in
//! [`SMOOTHING_STEPS`] equal increments:
//!
//! ```text
//! step       = (target - current) / 10
//! delta_left = |target - current|
//! steps_left = 10
//!
//! every tick:  steps_left <= 1 or delta_left <= |step|  ->  current = target   (snap)
//!              otherwise                               ->  current += step
//! ```
//!
//! The final move is always a snap, so the value never overshoots the target.
//! Counting steps keeps the landing on the tenth tick even when f32 rounding
//! leaves `delta_left` a hair above `|step|`.
//! A new target mid-ramp simply restarts the ramp from wherever `current` is.

use libm::fabsf;

use crate::config::SMOOTHING_STEPS;

/// One location fix as delivered by the positioning collaborator.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SpeedSample {
    /// Provider timestamp in milliseconds.
    pub timestamp_ms: u64,
    /// Reported ground speed in m/s. Meaningless when `has_speed` is false.
    pub speed_mps: f32,
    /// Whether the provider reported a speed for this fix.
    pub has_speed: bool,
}

impl SpeedSample {
    pub const fn new(
        timestamp_ms: u64,
        speed_mps: f32,
    ) -> Self {
        Self {
            timestamp_ms,
            speed_mps,
            has_speed: true,
        }
    }

    /// A fix without speed information.
    pub const fn without_speed(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            speed_mps: 0.0,
            has_speed: false,
        }
    }
}

/// Ramp state for the displayed speed.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct SmoothState {
    pub current_speed: f32,
    pub target_speed: f32,
    pub step: f32,
    /// Distance still to cover. Never negative.
    pub delta_left: f32,
    /// Ticks until the ramp lands on the target.
    pub steps_left: u32,
}

/// Turns target-speed events into a smoothly ramped current speed.
#[derive(Clone, Debug)]
pub struct TelemetrySmoother {
    state: SmoothState,
    /// Speeds at or below this are treated as standstill. `None` disables it.
    deadband_mps: Option<f32>,
}

impl TelemetrySmoother {
    /// Create a smoother at rest with an optional standstill deadband.
    pub const fn new(deadband_mps: Option<f32>) -> Self {
        Self {
            state: SmoothState {
                current_speed: 0.0,
                target_speed: 0.0,
                step: 0.0,
                delta_left: 0.0,
                steps_left: 0,
            },
            deadband_mps,
        }
    }

    /// Set a new target speed in m/s and restart the ramp toward it.
    pub fn set_target(
        &mut self,
        speed_mps: f32,
    ) {
        let state = &mut self.state;
        state.target_speed = speed_mps;
        state.step = (speed_mps - state.current_speed) / SMOOTHING_STEPS as f32;
        state.delta_left = fabsf(speed_mps - state.current_speed);
        state.steps_left = if state.delta_left > 0.0 { SMOOTHING_STEPS } else { 0 };
    }

    /// Set the target from a location fix, applying the input policy.
    ///
    /// A fix without speed is a standstill. With a deadband configured, speeds
    /// at or below it are also a standstill (GPS jitter while parked).
    pub fn set_target_from_sample(
        &mut self,
        sample: &SpeedSample,
    ) {
        let speed = if sample.has_speed {
            self.apply_deadband(sample.speed_mps)
        } else {
            0.0
        };
        self.set_target(speed);
    }

    fn apply_deadband(
        &self,
        speed_mps: f32,
    ) -> f32 {
        match self.deadband_mps {
            Some(limit) if speed_mps <= limit => 0.0,
            _ => speed_mps,
        }
    }

    /// Advance the ramp by one animation tick and return the new current speed.
    pub fn advance(&mut self) -> f32 {
        let state = &mut self.state;
        let step_size = fabsf(state.step);

        if state.steps_left <= 1 || state.delta_left <= step_size {
            state.current_speed = state.target_speed;
            state.step = 0.0;
            state.delta_left = 0.0;
            state.steps_left = 0;
        } else {
            state.current_speed += state.step;
            state.delta_left = (state.delta_left - step_size).max(0.0);
            state.steps_left -= 1;
        }

        state.current_speed
    }

    /// Return to rest (session restart). The deadband policy is kept.
    pub fn reset(&mut self) {
        self.state = SmoothState::default();
    }

    #[inline]
    pub const fn current_speed(&self) -> f32 { self.state.current_speed }

    #[inline]
    pub const fn target_speed(&self) -> f32 { self.state.target_speed }

    #[inline]
    pub const fn state(&self) -> &SmoothState { &self.state }

    #[inline]
    pub const fn deadband_mps(&self) -> Option<f32> { self.deadband_mps }
}

impl Default for TelemetrySmoother {
    fn default() -> Self { Self::new(None) }
}
