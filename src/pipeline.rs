//! Animation-clock pipeline and session lifecycle.
//!
//! [`Telemetry`] is the work of one animation tick:
//!
//! 1. Drain the newest location fix (if any) into the smoother target
//! 2. Advance the smoother one step
//! 3. Derive energy, acceleration and distance
//! 4. Append the row to the chart buffer
//! 5. Publish the readout for the render loop
//!
//! [`Session`] runs it on a [`PeriodicTask`] next to the simulated location
//! provider and implements pause, resume and restart.

use std::sync::Arc;

use parking_lot::Mutex;
use speedo_common::kinematics::{KinematicSample, KinematicsCalculator};
use speedo_common::series::ChartBuffer;
use speedo_common::smoother::TelemetrySmoother;

use crate::clock;
use crate::config::SpeedoConfig;
use crate::error::Result;
use crate::handoff::{Readout, ReadoutCell, SampleSlot};
use crate::location::{DriveProfile, SimulatedLocation};
use crate::scheduler::PeriodicTask;

/// Chart buffer shared between the animation clock and the render loop.
///
/// Boxed: the buffer is sized for the longest history and too large to move
/// around on the stack.
pub type SharedChart = Arc<Mutex<Box<ChartBuffer>>>;

// =============================================================================
// Telemetry
// =============================================================================

/// State owned by the animation clock.
pub struct Telemetry {
    smoother: TelemetrySmoother,
    kinematics: KinematicsCalculator,
    samples: Arc<SampleSlot>,
    chart: SharedChart,
    readout: Arc<ReadoutCell>,
}

impl Telemetry {
    pub fn new(
        config: &SpeedoConfig,
        samples: Arc<SampleSlot>,
        chart: SharedChart,
        readout: Arc<ReadoutCell>,
    ) -> Self {
        Self {
            smoother: TelemetrySmoother::new(config.speed_deadband_mps),
            kinematics: KinematicsCalculator::new(config.mass_kg),
            samples,
            chart,
            readout,
        }
    }

    /// Run one animation tick at wall-clock time `now_ms`.
    pub fn tick(
        &mut self,
        now_ms: u64,
    ) -> KinematicSample {
        // No new fix: keep ramping toward the last target
        if let Some(sample) = self.samples.take() {
            self.smoother.set_target_from_sample(&sample);
        }
        let speed_mps = self.smoother.advance();

        let regressions = self.kinematics.clock_regressions();
        let sample = self.kinematics.sample(now_ms, speed_mps);
        if self.kinematics.clock_regressions() != regressions {
            log::warn!("Clock went backwards at {now_ms} ms, session time re-anchored");
        }

        self.chart.lock().append_sample(&sample);
        self.readout.publish(&Readout {
            speed_kmh: sample.speed_kmh,
            energy_j: sample.energy_j,
            odometer_m: self.kinematics.odometer().meters(),
        });

        sample
    }

    /// Back to rest: zero speed, new session epoch, odometer at zero.
    ///
    /// Fixes published before the reset are not replayed.
    pub fn reset(&mut self) {
        self.smoother.reset();
        self.kinematics.reset();
        let _stale = self.samples.take();
        self.readout.publish(&Readout::default());
    }

    #[inline]
    pub const fn smoother(&self) -> &TelemetrySmoother { &self.smoother }

    #[inline]
    pub const fn kinematics(&self) -> &KinematicsCalculator { &self.kinematics }
}

// =============================================================================
// Session
// =============================================================================

/// A running speedometer: location provider, animation clock and their
/// shared outputs.
pub struct Session {
    telemetry: Arc<Mutex<Telemetry>>,
    clock: PeriodicTask,
    location: SimulatedLocation,
    chart: SharedChart,
    readout: Arc<ReadoutCell>,
}

impl Session {
    /// Build a paused session replaying `profile`.
    pub fn new(
        config: &SpeedoConfig,
        profile: DriveProfile,
    ) -> Self {
        let samples = Arc::new(SampleSlot::new());
        let chart: SharedChart = Arc::new(Mutex::new(Box::new(ChartBuffer::new(config.series_capacity()))));
        let readout = Arc::new(ReadoutCell::new());

        let telemetry = Telemetry::new(config, Arc::clone(&samples), Arc::clone(&chart), Arc::clone(&readout));

        Self {
            telemetry: Arc::new(Mutex::new(telemetry)),
            clock: PeriodicTask::new("animation", config.animation_cadence()),
            location: SimulatedLocation::new(profile, samples, config.location_interval()),
            chart,
            readout,
        }
    }

    /// Start (or restart) the location subscription and the animation clock.
    ///
    /// Calling this while running replaces both workers; there is never more
    /// than one clock ticking.
    pub fn resume(&mut self) -> Result<()> {
        self.location.start()?;

        let telemetry = Arc::clone(&self.telemetry);
        if let Err(e) = self.clock.start(move || {
            telemetry.lock().tick(clock::now_ms());
        }) {
            self.location.stop();
            return Err(e);
        }

        log::info!("Session resumed");
        Ok(())
    }

    /// Stop the animation clock and the location subscription.
    pub fn pause(&mut self) {
        let was_active = self.clock.is_running() || self.location.is_running();
        self.clock.stop();
        self.location.stop();
        if was_active {
            log::info!("Session paused");
        }
    }

    /// Start a new session: clear the chart, zero the readout and the
    /// odometer. Keeps the running/paused state.
    pub fn restart(&mut self) -> Result<()> {
        let was_running = self.is_running();
        self.pause();

        self.telemetry.lock().reset();
        self.chart.lock().clear();
        log::info!("Session restarted");

        if was_running {
            self.resume()?;
        }
        Ok(())
    }

    #[inline]
    pub fn is_running(&self) -> bool { self.clock.is_running() }

    /// Latest published readout.
    #[inline]
    pub fn readout(&self) -> Readout { self.readout.load() }

    #[inline]
    pub const fn chart(&self) -> &SharedChart { &self.chart }

    /// Backward clock jumps absorbed so far.
    pub fn clock_regressions(&self) -> u32 { self.telemetry.lock().kinematics().clock_regressions() }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use speedo_common::channels::ChannelId;
    use speedo_common::smoother::SpeedSample;

    use super::*;
    use crate::location::Leg;

    struct Rig {
        samples: Arc<SampleSlot>,
        chart: SharedChart,
        readout: Arc<ReadoutCell>,
        telemetry: Telemetry,
    }

    fn rig(config: &SpeedoConfig) -> Rig {
        let samples = Arc::new(SampleSlot::new());
        let chart: SharedChart = Arc::new(Mutex::new(Box::new(ChartBuffer::new(config.series_capacity()))));
        let readout = Arc::new(ReadoutCell::new());
        let telemetry = Telemetry::new(config, Arc::clone(&samples), Arc::clone(&chart), Arc::clone(&readout));
        Rig {
            samples,
            chart,
            readout,
            telemetry,
        }
    }

    #[test]
    fn test_ten_ticks_reach_target() {
        let mut rig = rig(&SpeedoConfig::default());
        rig.samples.publish(&SpeedSample::new(0, 10.0));

        let mut last = None;
        for i in 0..10 {
            last = Some(rig.telemetry.tick(1_000 + i * 100));
        }
        let last = last.unwrap();

        assert_eq!(rig.telemetry.smoother().current_speed(), 10.0);
        assert_eq!(last.energy_j, 50.0);
        assert_eq!(rig.chart.lock().len(), 10);

        let readout = rig.readout.load();
        assert_eq!(readout.energy_j, 50.0);
        assert!((readout.speed_kmh - 36.0).abs() < 1e-3);
    }

    #[test]
    fn test_first_row_has_no_acceleration() {
        let mut rig = rig(&SpeedoConfig::default());
        rig.samples.publish(&SpeedSample::new(0, 5.0));
        rig.telemetry.tick(1_000);
        rig.telemetry.tick(1_100);

        let chart = rig.chart.lock();
        let accel: Vec<_> = chart.channel(ChannelId::Acceleration).collect();
        assert_eq!(accel[0].1, None, "no previous sample");
        assert!(accel[1].1.is_some());
    }

    #[test]
    fn test_missing_fix_ramps_to_zero() {
        let mut rig = rig(&SpeedoConfig::default());
        rig.samples.publish(&SpeedSample::new(0, 10.0));
        for i in 0..10 {
            rig.telemetry.tick(i * 100);
        }
        rig.samples.publish(&SpeedSample::without_speed(1_000));
        for i in 10..20 {
            rig.telemetry.tick(i * 100);
        }
        assert_eq!(rig.telemetry.smoother().current_speed(), 0.0);
        assert_eq!(rig.readout.load().energy_j, 0.0);
    }

    #[test]
    fn test_no_signal_holds_state() {
        let mut rig = rig(&SpeedoConfig::default());
        for i in 0..5 {
            rig.telemetry.tick(i * 100);
        }
        assert_eq!(rig.telemetry.smoother().current_speed(), 0.0);
        assert_eq!(rig.chart.lock().len(), 5, "rows keep coming without input");
    }

    #[test]
    fn test_clock_regression_is_absorbed() {
        let mut rig = rig(&SpeedoConfig::default());
        rig.samples.publish(&SpeedSample::new(0, 10.0));
        rig.telemetry.tick(10_000);
        rig.telemetry.tick(10_100);
        let sample = rig.telemetry.tick(5_000);

        assert_eq!(rig.telemetry.kinematics().clock_regressions(), 1);
        assert_eq!(sample.acceleration_g, None, "dt is zero after a regression");
        assert_eq!(sample.time_ms, 100.0, "session time does not go backwards");
    }

    #[test]
    fn test_reset_zeroes_readout_and_drops_stale_fix() {
        let mut rig = rig(&SpeedoConfig::default());
        rig.samples.publish(&SpeedSample::new(0, 10.0));
        rig.telemetry.tick(0);
        rig.samples.publish(&SpeedSample::new(50, 20.0));

        rig.telemetry.reset();
        assert_eq!(rig.readout.load(), Readout::default());

        rig.telemetry.tick(100);
        assert_eq!(rig.telemetry.smoother().target_speed(), 0.0, "stale fix not replayed");
        assert_eq!(rig.telemetry.kinematics().odometer().meters(), 0.0);
    }

    fn fast_config() -> SpeedoConfig {
        SpeedoConfig {
            animation_cadence_ms: 5,
            location_interval_ms: 5,
            ..SpeedoConfig::default()
        }
    }

    #[test]
    fn test_pause_stops_location_without_clock() {
        let mut session = Session::new(&fast_config(), DriveProfile::city_loop());
        session.location.start().unwrap();
        assert!(!session.is_running(), "clock never started");

        session.pause();
        assert!(!session.location.is_running(), "location stopped on its own");
    }

    #[test]
    fn test_session_lifecycle() {
        let profile = DriveProfile::new(vec![Leg::cruise(10.0, 60_000)]);
        let mut session = Session::new(&fast_config(), profile);
        assert!(!session.is_running());

        session.resume().unwrap();
        session.resume().unwrap();
        thread::sleep(Duration::from_millis(100));
        assert!(session.is_running());
        assert!(!session.chart().lock().is_empty());
        assert!(session.readout().speed_kmh > 0.0);

        session.pause();
        session.pause();
        assert!(!session.is_running());
        let rows = session.chart().lock().len();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(session.chart().lock().len(), rows, "paused clock does not append");

        session.restart().unwrap();
        assert!(!session.is_running(), "restart keeps the paused state");
        assert!(session.chart().lock().is_empty());
        assert_eq!(session.readout(), Readout::default());
    }
}
