//! Lock-free handoff cells between the three cadences.
//!
//! Each cell has exactly one writer thread and one reader thread, and neither
//! side ever blocks:
//!
//! | Cell | Writer | Reader |
//! |------|--------|--------|
//! | [`SampleSlot`] | location provider | animation clock |
//! | [`ReadoutCell`] | animation clock | render loop |
//!
//! Only the latest value matters in both directions; a reader that falls
//! behind simply sees the newest value.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_queue::ArrayQueue;
use speedo_common::smoother::SpeedSample;

// =============================================================================
// Location Sample Slot
// =============================================================================

/// Latest location fix, written by the provider and drained by the clock.
///
/// A one-slot lock-free queue. Publishing over an unread fix replaces it, so
/// the clock only ever sees the newest fix, and each fix at most once.
#[derive(Debug)]
pub struct SampleSlot {
    latest: ArrayQueue<SpeedSample>,
}

impl SampleSlot {
    pub fn new() -> Self {
        Self {
            latest: ArrayQueue::new(1),
        }
    }

    /// Store a new fix, replacing one the clock has not taken yet.
    pub fn publish(
        &self,
        sample: &SpeedSample,
    ) {
        let _replaced = self.latest.force_push(*sample);
    }

    /// Take the newest fix published since the last take.
    pub fn take(&self) -> Option<SpeedSample> { self.latest.pop() }

    /// Whether a fix is waiting.
    #[inline]
    pub fn has_pending(&self) -> bool { !self.latest.is_empty() }
}

impl Default for SampleSlot {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Readout Cell
// =============================================================================

/// What the render loop needs from the latest animation tick.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Readout {
    pub speed_kmh: f32,
    /// Gauge target for the needle.
    pub energy_j: f32,
    pub odometer_m: f64,
}

/// Latest readout, written by the animation clock and read by the render loop.
///
/// Speed and energy share one 64-bit word so the dial text and the needle
/// target always come from the same tick.
#[derive(Debug, Default)]
pub struct ReadoutCell {
    speed_energy: AtomicU64,
    odometer_bits: AtomicU64,
}

impl ReadoutCell {
    pub const fn new() -> Self {
        Self {
            speed_energy: AtomicU64::new(0),
            odometer_bits: AtomicU64::new(0),
        }
    }

    pub fn publish(
        &self,
        readout: &Readout,
    ) {
        let packed = (u64::from(readout.speed_kmh.to_bits()) << 32) | u64::from(readout.energy_j.to_bits());
        self.speed_energy.store(packed, Ordering::Release);
        self.odometer_bits.store(readout.odometer_m.to_bits(), Ordering::Release);
    }

    pub fn load(&self) -> Readout {
        let packed = self.speed_energy.load(Ordering::Acquire);
        Readout {
            speed_kmh: f32::from_bits((packed >> 32) as u32),
            energy_j: f32::from_bits(packed as u32),
            odometer_m: f64::from_bits(self.odometer_bits.load(Ordering::Acquire)),
        }
    }
}
