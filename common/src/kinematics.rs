//! Kinetic energy, acceleration and travelled distance from the smoothed speed.
//!
//! Runs once per animation tick, right after the smoother has advanced.
//!
//! # Time Base
//!
//! Sample times are milliseconds since a session epoch taken from wall-clock
//! time. Wall clocks can be adjusted backwards (NTP, manual change). When that
//! happens the epoch is re-anchored so elapsed time continues from the last
//! sample, and the tick is treated as having no elapsed time. Acceleration for
//! such a tick is absent rather than a huge spike.
//!
//! # Absent Acceleration
//!
//! Acceleration needs a non-zero time delta. The first tick of a session, a
//! repeated timestamp and a clock regression all produce `None`. Downstream
//! code must keep `None` distinct from `0.0`: a flat line on the chart would
//! claim "no acceleration" when in fact nothing was measured.

use core::fmt::Write;

use heapless::String;

use crate::config::{G_PER_MPS2, KMH_PER_MPS};

/// Kinetic energy in joules: `0.5 * m * v²`.
#[inline]
pub fn energy(
    mass_kg: f32,
    speed_mps: f32,
) -> f32 {
    0.5 * mass_kg * speed_mps * speed_mps
}

/// Acceleration in g between two speeds `dt_s` seconds apart.
///
/// Returns `None` when `dt_s` is zero.
#[inline]
pub fn acceleration(
    current_mps: f32,
    prev_mps: f32,
    dt_s: f32,
) -> Option<f32> {
    if dt_s == 0.0 {
        return None;
    }
    Some(((current_mps - prev_mps) / dt_s) * G_PER_MPS2)
}

// =============================================================================
// Session Clock
// =============================================================================

/// Result of reading the session clock.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Elapsed {
    /// Milliseconds since the session epoch.
    Ms(u64),
    /// The wall clock went backwards; the epoch was re-anchored and the
    /// session time holds at the contained value.
    Regressed(u64),
}

impl Elapsed {
    #[inline]
    pub const fn ms(self) -> u64 {
        match self {
            Self::Ms(ms) | Self::Regressed(ms) => ms,
        }
    }
}

/// Monotonic session time derived from a wall clock that may jump backwards.
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionClock {
    epoch_ms: Option<u64>,
    last_elapsed_ms: u64,
}

impl SessionClock {
    pub const fn new() -> Self {
        Self {
            epoch_ms: None,
            last_elapsed_ms: 0,
        }
    }

    /// Session time for wall-clock reading `now_ms`.
    ///
    /// The first call sets the epoch. A reading earlier than the previous one
    /// re-anchors the epoch so session time never decreases.
    pub fn elapsed(
        &mut self,
        now_ms: u64,
    ) -> Elapsed {
        let Some(epoch) = self.epoch_ms else {
            self.epoch_ms = Some(now_ms);
            self.last_elapsed_ms = 0;
            return Elapsed::Ms(0);
        };

        match now_ms.checked_sub(epoch) {
            Some(elapsed) if elapsed >= self.last_elapsed_ms => {
                self.last_elapsed_ms = elapsed;
                Elapsed::Ms(elapsed)
            }
            _ => {
                self.epoch_ms = Some(now_ms.saturating_sub(self.last_elapsed_ms));
                Elapsed::Regressed(self.last_elapsed_ms)
            }
        }
    }

    /// Forget the epoch; the next reading starts a new session.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[inline]
    pub const fn epoch_ms(&self) -> Option<u64> { self.epoch_ms }
}

// =============================================================================
// Kinematic Samples
// =============================================================================

/// One derived readout per animation tick.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct KinematicSample {
    /// Session time in milliseconds.
    pub time_ms: f32,
    pub speed_kmh: f32,
    pub energy_j: f32,
    /// `None` when no valid time delta exists for this tick.
    pub acceleration_g: Option<f32>,
}

/// Stateful front end for [`energy`] and [`acceleration`].
#[derive(Clone, Debug)]
pub struct KinematicsCalculator {
    mass_kg: f32,
    clock: SessionClock,
    prev_speed_mps: f32,
    prev_time_ms: Option<u64>,
    odometer: Odometer,
    regressions: u32,
}

impl KinematicsCalculator {
    pub const fn new(mass_kg: f32) -> Self {
        Self {
            mass_kg,
            clock: SessionClock::new(),
            prev_speed_mps: 0.0,
            prev_time_ms: None,
            odometer: Odometer::new(),
            regressions: 0,
        }
    }

    /// Derive the readout for the smoothed speed at wall-clock time `now_ms`.
    pub fn sample(
        &mut self,
        now_ms: u64,
        speed_mps: f32,
    ) -> KinematicSample {
        let time_ms = match self.clock.elapsed(now_ms) {
            Elapsed::Ms(ms) => ms,
            Elapsed::Regressed(ms) => {
                self.regressions = self.regressions.wrapping_add(1);
                self.prev_time_ms = Some(ms);
                ms
            }
        };

        let dt_s = self
            .prev_time_ms
            .map_or(0.0, |prev| time_ms.saturating_sub(prev) as f32 / 1000.0);

        let sample = KinematicSample {
            time_ms: time_ms as f32,
            speed_kmh: speed_mps * KMH_PER_MPS,
            energy_j: energy(self.mass_kg, speed_mps),
            acceleration_g: acceleration(speed_mps, self.prev_speed_mps, dt_s),
        };

        self.odometer.advance(dt_s, speed_mps);
        self.prev_time_ms = Some(time_ms);
        self.prev_speed_mps = speed_mps;

        sample
    }

    /// Start a new session: new epoch, no previous sample, odometer at zero.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.prev_speed_mps = 0.0;
        self.prev_time_ms = None;
        self.odometer.reset();
    }

    #[inline]
    pub const fn mass_kg(&self) -> f32 { self.mass_kg }

    #[inline]
    pub const fn odometer(&self) -> &Odometer { &self.odometer }

    /// Number of backward clock jumps absorbed since creation.
    #[inline]
    pub const fn clock_regressions(&self) -> u32 { self.regressions }
}

// =============================================================================
// Odometer
// =============================================================================

/// Width of the odometer readout: 8 integer digits, a point and 2 decimals.
pub const ODOMETER_TEXT_LEN: usize = 16;

/// Distance travelled in the current session.
#[derive(Clone, Copy, Debug, Default)]
pub struct Odometer {
    meters: f64,
}

impl Odometer {
    pub const fn new() -> Self { Self { meters: 0.0 } }

    /// Add `dt_s * speed_mps` metres.
    pub fn advance(
        &mut self,
        dt_s: f32,
        speed_mps: f32,
    ) {
        self.meters += f64::from(dt_s) * f64::from(speed_mps);
    }

    pub fn reset(&mut self) {
        self.meters = 0.0;
    }

    #[inline]
    pub const fn meters(&self) -> f64 { self.meters }

    /// Zero-padded kilometre readout, e.g. `00000012.35 km`.
    pub fn text(&self) -> String<ODOMETER_TEXT_LEN> {
        format_odometer(self.meters / 1000.0)
    }
}

/// Format kilometres as an 11-wide zero-padded value with 2 decimals.
pub fn format_odometer(km: f64) -> String<ODOMETER_TEXT_LEN> {
    let mut text = String::new();
    let _ = write!(text, "{km:011.2} km");
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smoother::TelemetrySmoother;

    #[test]
    fn test_energy_formula() {
        assert_eq!(energy(1.0, 10.0), 50.0);
        assert_eq!(energy(2.0, 3.0), 9.0);
        assert_eq!(energy(1.0, 0.0), 0.0);
    }

    #[test]
    fn test_energy_monotonic_in_magnitude() {
        let speeds = [0.0f32, 0.1, 0.5, 1.0, 2.5, 10.0, 33.3, 55.5];
        for pair in speeds.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert!(energy(1.0, a) < energy(1.0, b), "energy({a}) >= energy({b})");
            assert!(energy(1.0, -a) < energy(1.0, -b), "negative speeds use magnitude");
            assert!(energy(1.0, a) < energy(1.0, -b));
        }
    }

    #[test]
    fn test_acceleration_absent_for_zero_dt() {
        for (current, prev) in [(0.0, 0.0), (10.0, 0.0), (-3.0, 7.0), (1e6, -1e6)] {
            assert_eq!(acceleration(current, prev, 0.0), None, "dt = 0 with {current}/{prev}");
        }
    }

    #[test]
    fn test_acceleration_in_g() {
        let g = acceleration(9.806_65, 0.0, 1.0).unwrap();
        assert!((g - 1.0).abs() < 1e-4, "one standard gravity, got {g}");

        let braking = acceleration(0.0, 10.0, 2.0).unwrap();
        assert!(braking < 0.0);
    }

    #[test]
    fn test_scenario_ramp_then_energy() {
        let mut smoother = TelemetrySmoother::default();
        smoother.set_target(10.0);
        let mut speed = 0.0;
        for _ in 0..10 {
            speed = smoother.advance();
        }
        assert_eq!(speed, 10.0);
        assert_eq!(energy(1.0, speed), 50.0);
    }

    #[test]
    fn test_session_clock_first_reading_is_zero() {
        let mut clock = SessionClock::new();
        assert_eq!(clock.elapsed(1_000_000), Elapsed::Ms(0));
        assert_eq!(clock.elapsed(1_000_250), Elapsed::Ms(250));
    }

    #[test]
    fn test_session_clock_regression_holds_time() {
        let mut clock = SessionClock::new();
        clock.elapsed(10_000);
        clock.elapsed(10_500);

        assert_eq!(clock.elapsed(4_000), Elapsed::Regressed(500), "jumped before the epoch");
        assert_eq!(clock.elapsed(4_100), Elapsed::Ms(600), "continues from re-anchored epoch");

        assert_eq!(clock.elapsed(4_050), Elapsed::Regressed(600), "jump that stays past the epoch");
        assert_eq!(clock.elapsed(4_150), Elapsed::Ms(700));
    }

    #[test]
    fn test_first_sample_has_no_acceleration() {
        let mut calc = KinematicsCalculator::new(1.0);
        let sample = calc.sample(5_000, 3.0);
        assert_eq!(sample.time_ms, 0.0);
        assert_eq!(sample.acceleration_g, None);
        assert!((sample.speed_kmh - 10.8).abs() < 1e-4);
        assert_eq!(sample.energy_j, 4.5);
    }

    #[test]
    fn test_same_timestamp_gives_absent_acceleration() {
        let mut calc = KinematicsCalculator::new(1.0);
        calc.sample(1_000, 0.0);
        let a = calc.sample(1_100, 1.0);
        let b = calc.sample(1_100, 2.0);

        assert!(a.acceleration_g.is_some());
        assert_eq!(b.acceleration_g, None, "dt = 0 must not fabricate a value");
        assert_eq!(b.energy_j, 2.0, "energy is still derived");
    }

    #[test]
    fn test_clock_regression_gives_absent_acceleration() {
        let mut calc = KinematicsCalculator::new(1.0);
        calc.sample(50_000, 0.0);
        let before = calc.sample(50_100, 1.0);
        let jumped = calc.sample(20_000, 2.0);
        let after = calc.sample(20_100, 3.0);

        assert_eq!(jumped.acceleration_g, None);
        assert_eq!(jumped.time_ms, before.time_ms, "session time holds across the jump");
        assert_eq!(calc.clock_regressions(), 1);

        let g = after.acceleration_g.unwrap();
        let expected = (1.0 / 0.1) * G_PER_MPS2;
        assert!((g - expected).abs() < 1e-3, "normal deltas resume, got {g}");
        assert!(after.time_ms > jumped.time_ms);
    }

    #[test]
    fn test_odometer_integrates_speed() {
        let mut calc = KinematicsCalculator::new(1.0);
        calc.sample(0, 10.0);
        for t in 1..=10u64 {
            calc.sample(t * 100, 10.0);
        }
        let meters = calc.odometer().meters();
        assert!((meters - 10.0).abs() < 1e-3, "1 s at 10 m/s, got {meters}");
    }

    #[test]
    fn test_reset_starts_new_session() {
        let mut calc = KinematicsCalculator::new(1.0);
        calc.sample(0, 10.0);
        calc.sample(1_000, 10.0);
        calc.reset();

        let sample = calc.sample(90_000, 5.0);
        assert_eq!(sample.time_ms, 0.0);
        assert_eq!(sample.acceleration_g, None);
        assert_eq!(calc.odometer().meters(), 0.0);
    }

    #[test]
    fn test_odometer_text_format() {
        assert_eq!(format_odometer(12.345_6).as_str(), "00000012.35 km");
        assert_eq!(format_odometer(0.0).as_str(), "00000000.00 km");
        assert_eq!(format_odometer(1234.5).as_str(), "00001234.50 km");
    }
}
