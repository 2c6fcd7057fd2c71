//! Rate-limited needle animation.
//!
//! The pipeline publishes a new target value every animation tick; the render
//! loop calls [`NeedleAnimator::step`] once per frame. Each step moves the
//! drawn needle a fixed two degrees of dial travel toward the target, or snaps
//! onto it once it is within `step_factor` degrees or within one step. Steps
//! closer together than `min_move_interval_ms` are skipped, so needle speed
//! does not depend on the frame rate. A step never carries the needle past its
//! target, whatever the step factor.

use libm::fabsf;

use crate::config::{NEEDLE_STEP_FACTOR, RENDER_MIN_INTERVAL_MS};
use crate::scale::ScaleConfig;

/// Animation state of the needle.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NeedleState {
    /// The drawn needle shows the target value.
    Settled,
    /// The drawn needle is still moving toward the target.
    Converging,
}

/// Drawn needle position and its target.
#[derive(Clone, Debug)]
pub struct NeedleAnimator {
    value: f32,
    needle_value: f32,
    last_move_ms: Option<u64>,
    value_per_tick: f32,
    degrees_per_tick: f32,
    start_angle_deg: f32,
    end_angle_deg: f32,
    step_factor: f32,
    min_move_interval_ms: u64,
}

impl NeedleAnimator {
    /// Animator for `scale` with the stock step factor and rate limit.
    pub fn new(scale: &ScaleConfig) -> Self {
        Self::with_tuning(scale, NEEDLE_STEP_FACTOR, RENDER_MIN_INTERVAL_MS)
    }

    pub fn with_tuning(
        scale: &ScaleConfig,
        step_factor: f32,
        min_move_interval_ms: u64,
    ) -> Self {
        Self {
            value: scale.min_value,
            needle_value: scale.min_value,
            last_move_ms: None,
            value_per_tick: scale.value_per_tick(),
            degrees_per_tick: scale.degrees_per_tick(),
            start_angle_deg: scale.start_angle_deg,
            end_angle_deg: scale.end_angle_deg,
            step_factor,
            min_move_interval_ms,
        }
    }

    /// Set a new target; the needle animates toward it.
    pub fn move_to_value(
        &mut self,
        value: f32,
    ) {
        self.value = value;
    }

    /// Jump the needle and the target to `value` without animation.
    pub fn set_value(
        &mut self,
        value: f32,
    ) {
        self.value = value;
        self.needle_value = value;
    }

    /// Advance the animation at wall-clock time `now_ms`.
    ///
    /// Returns `true` when the drawn needle changed and needs a redraw.
    pub fn step(
        &mut self,
        now_ms: u64,
    ) -> bool {
        if self.state() == NeedleState::Settled {
            return false;
        }
        if let Some(last) = self.last_move_ms {
            // A clock that went backwards counts as enough time passed
            if matches!(now_ms.checked_sub(last), Some(elapsed) if elapsed < self.min_move_interval_ms) {
                return false;
            }
        }

        let per_degree = self.value_per_degree();
        let snap = self.step_factor * per_degree;
        let max_move = 2.0 * per_degree;
        let remaining = self.value - self.needle_value;
        let distance = fabsf(remaining);

        if distance <= snap || distance <= max_move || !(per_degree > 0.0) {
            self.needle_value = self.value;
        } else if remaining > 0.0 {
            self.needle_value += max_move;
        } else {
            self.needle_value -= max_move;
        }

        self.last_move_ms = Some(now_ms);
        true
    }

    pub fn state(&self) -> NeedleState {
        if self.needle_value == self.value {
            NeedleState::Settled
        } else {
            NeedleState::Converging
        }
    }

    /// Target value.
    #[inline]
    pub const fn value(&self) -> f32 { self.value }

    /// Value the needle is currently drawn at.
    #[inline]
    pub const fn needle_value(&self) -> f32 { self.needle_value }

    fn value_per_degree(&self) -> f32 {
        if self.degrees_per_tick == 0.0 {
            return 0.0;
        }
        self.value_per_tick / self.degrees_per_tick
    }

    /// Screen angle of the drawn needle in degrees, clockwise from 12 o'clock.
    ///
    /// Values past the end of the dial pin the needle at the end stop.
    pub fn needle_degrees(&self) -> f32 {
        if self.value_per_tick == 0.0 {
            return self.start_angle_deg + 180.0;
        }
        let angle = self.needle_value / self.value_per_tick * self.degrees_per_tick;
        if angle <= self.end_angle_deg {
            angle + 180.0 + self.start_angle_deg
        } else {
            self.end_angle_deg + 180.0
        }
    }
}
