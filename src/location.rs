//! Simulated location provider.
//!
//! Replays a [`DriveProfile`] on its own thread and publishes one
//! [`SpeedSample`] per interval into a [`SampleSlot`]. Stands in for a GPS
//! subscription: starting it subscribes, stopping it unsubscribes, and a leg
//! without a fix publishes samples with `has_speed = false`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use speedo_common::smoother::SpeedSample;

use crate::clock;
use crate::error::Result;
use crate::handoff::SampleSlot;
use crate::scheduler::PeriodicTask;

// =============================================================================
// Drive Profile
// =============================================================================

/// One leg of a simulated drive.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Leg {
    /// Speed at the start of the leg in m/s
    pub from_mps: f32,
    /// Speed at the end of the leg in m/s
    pub to_mps: f32,
    pub duration_ms: u64,
    /// `false` simulates lost satellite lock
    pub has_fix: bool,
}

impl Leg {
    /// Linear speed change over the leg.
    pub const fn ramp(
        from_mps: f32,
        to_mps: f32,
        duration_ms: u64,
    ) -> Self {
        Self {
            from_mps,
            to_mps,
            duration_ms,
            has_fix: true,
        }
    }

    /// Constant speed.
    pub const fn cruise(
        speed_mps: f32,
        duration_ms: u64,
    ) -> Self {
        Self::ramp(speed_mps, speed_mps, duration_ms)
    }

    /// Standing still.
    pub const fn stop(duration_ms: u64) -> Self { Self::cruise(0.0, duration_ms) }

    /// No fix for the whole leg.
    pub const fn dropout(duration_ms: u64) -> Self {
        Self {
            from_mps: 0.0,
            to_mps: 0.0,
            duration_ms,
            has_fix: false,
        }
    }

    fn speed_at(
        &self,
        offset_ms: u64,
    ) -> f32 {
        if self.duration_ms == 0 {
            return self.to_mps;
        }
        let t = offset_ms as f32 / self.duration_ms as f32;
        self.from_mps + (self.to_mps - self.from_mps) * t
    }
}

/// Looping sequence of legs.
#[derive(Clone, Debug, Default)]
pub struct DriveProfile {
    legs: Vec<Leg>,
}

impl DriveProfile {
    pub fn new(legs: Vec<Leg>) -> Self { Self { legs } }

    /// Urban loop: pull away, cruise, a highway stretch, a tunnel, a stop.
    pub fn city_loop() -> Self {
        Self::new(vec![
            Leg::stop(3_000),
            Leg::ramp(0.0, 13.9, 8_000),
            Leg::cruise(13.9, 10_000),
            Leg::ramp(13.9, 33.3, 12_000),
            Leg::cruise(33.3, 15_000),
            Leg::dropout(4_000),
            Leg::cruise(33.3, 6_000),
            Leg::ramp(33.3, 0.0, 9_000),
        ])
    }

    /// Length of one loop.
    pub fn duration_ms(&self) -> u64 { self.legs.iter().map(|leg| leg.duration_ms).sum() }

    /// Sample at `elapsed_ms` into the drive, stamped with `timestamp_ms`.
    ///
    /// The profile repeats; an empty profile never has a fix.
    pub fn sample_at(
        &self,
        elapsed_ms: u64,
        timestamp_ms: u64,
    ) -> SpeedSample {
        let total = self.duration_ms();
        if total == 0 {
            return SpeedSample::without_speed(timestamp_ms);
        }

        let mut offset = elapsed_ms % total;
        for leg in &self.legs {
            if offset < leg.duration_ms {
                return if leg.has_fix {
                    SpeedSample::new(timestamp_ms, leg.speed_at(offset))
                } else {
                    SpeedSample::without_speed(timestamp_ms)
                };
            }
            offset -= leg.duration_ms;
        }
        SpeedSample::without_speed(timestamp_ms)
    }

    #[inline]
    pub fn legs(&self) -> &[Leg] { &self.legs }
}

// =============================================================================
// Provider
// =============================================================================

/// Publishes the profile into a sample slot while running.
pub struct SimulatedLocation {
    profile: DriveProfile,
    slot: Arc<SampleSlot>,
    task: PeriodicTask,
}

impl SimulatedLocation {
    pub fn new(
        profile: DriveProfile,
        slot: Arc<SampleSlot>,
        interval: Duration,
    ) -> Self {
        Self {
            profile,
            slot,
            task: PeriodicTask::new("location", interval),
        }
    }

    /// Subscribe. The drive restarts from the beginning of the profile.
    pub fn start(&mut self) -> Result<()> {
        let profile = self.profile.clone();
        let slot = Arc::clone(&self.slot);
        let started = Instant::now();

        self.task.start(move || {
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            slot.publish(&profile.sample_at(elapsed_ms, clock::now_ms()));
        })
    }

    /// Unsubscribe. No-op when not running.
    pub fn stop(&mut self) { self.task.stop(); }

    #[inline]
    pub fn is_running(&self) -> bool { self.task.is_running() }
}
