//! Tick alignment for the square-root speed labels.
//!
//! Ticks are evenly spaced in energy, but the labels are speeds. Since
//! `v = sqrt(2E / m)`, speed per tick is large near zero and shrinks toward
//! the end of the dial. A label such as "40" therefore has no tick of its own;
//! it goes on the last tick whose speed is still below the next multiple of
//! the label interval.
//!
//! # Bucket Search
//!
//! For tick `i` and interval `step`:
//!
//! ```text
//! low  = floor(speed(i) / step) * step
//! high = low + step
//! j    = last index >= i with speed(j) < high
//! i gets label `high` iff j == i
//! ```
//!
//! Every tick inside the same bucket resolves to the same `j`, so exactly one
//! of them wins and no label is assigned twice. Tick 0 is always labelled 0.
//!
//! # Precomputation
//!
//! The gauge draws every tick on every frame, so both maps are built once per
//! scale and the renderer only does lookups. [`NickMap::build`] caches the
//! search result per bucket, which makes the whole build linear in the tick
//! count.

use core::fmt::Write;

use heapless::{String, Vec};
use libm::{floorf, sqrtf};

use crate::config::{KMH_PER_MPS, MAX_NICKS};
use crate::scale::{ScaleConfig, derive_minor_interval};

/// Longest label text (`u32::MAX` has 10 digits).
pub const LABEL_TEXT_LEN: usize = 10;

/// Search limit past the last tick. The final bucket closes beyond the dial,
/// so the search must be allowed to run over `total_ticks`, just not forever.
fn search_limit(scale: &ScaleConfig) -> u32 {
    scale.total_ticks.saturating_mul(64).max(1024)
}

fn is_solvable(scale: &ScaleConfig) -> bool {
    let vpt = scale.value_per_tick();
    vpt.is_finite() && vpt > 0.0 && scale.mass_kg.is_finite() && scale.mass_kg > 0.0
}

/// Speed in km/h represented by tick `tick`.
pub fn speed_kmh_at(
    scale: &ScaleConfig,
    tick: u32,
) -> f32 {
    let value = tick as f32 * scale.value_per_tick();
    sqrtf(2.0 * value / scale.mass_kg) * KMH_PER_MPS
}

/// Lower and upper multiples of `interval` bracketing the speed of `tick`.
fn bucket(
    scale: &ScaleConfig,
    tick: u32,
    interval: u32,
) -> (f32, f32) {
    let step = interval as f32;
    let low = floorf(speed_kmh_at(scale, tick) / step) * step;
    (low, low + step)
}

/// Last tick at or after `from` whose speed is below `high`.
fn search_bucket(
    scale: &ScaleConfig,
    from: u32,
    high: f32,
) -> Option<u32> {
    let limit = search_limit(scale);
    let mut j = from;
    while speed_kmh_at(scale, j) < high {
        if j >= limit {
            return None;
        }
        j += 1;
    }
    j.checked_sub(1)
}

/// Label for `tick` at `interval`, or `None` when the tick is not the one
/// chosen for its bucket.
///
/// This is the reference form of the solver; [`NickMap::build`] produces the
/// same answers for every tick in one pass.
pub fn label_for_tick(
    scale: &ScaleConfig,
    tick: u32,
    interval: u32,
) -> Option<u32> {
    if tick == 0 {
        return Some(0);
    }
    if interval == 0 || !is_solvable(scale) {
        return None;
    }

    let (_, high) = bucket(scale, tick, interval);
    match search_bucket(scale, tick, high) {
        Some(j) if j == tick => Some(high as u32),
        _ => None,
    }
}

// =============================================================================
// Nick Map
// =============================================================================

type LabelSlots = Vec<Option<u32>, MAX_NICKS>;

/// Label lookup per tick for the major and minor intervals.
#[derive(Clone, Debug)]
pub struct NickMap {
    major: LabelSlots,
    minor: LabelSlots,
}

impl NickMap {
    /// Solve both intervals of `scale`.
    ///
    /// Ticks past [`MAX_NICKS`] are not stored. A scale with no usable value
    /// range or mass yields a map with only tick 0 labelled.
    pub fn build(scale: &ScaleConfig) -> Self {
        let slots = (scale.total_ticks as usize + 1).min(MAX_NICKS);
        let minor_interval = scale
            .minor_interval
            .or_else(|| derive_minor_interval(scale.major_interval));

        Self {
            major: solve(scale, scale.major_interval, slots),
            minor: minor_interval.map_or_else(|| empty(slots), |interval| solve(scale, interval, slots)),
        }
    }

    /// Number of tick slots (`total_ticks + 1`, capped at [`MAX_NICKS`]).
    #[inline]
    pub fn len(&self) -> usize { self.major.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.major.is_empty() }

    /// Major label at `tick`.
    pub fn major_label(
        &self,
        tick: u32,
    ) -> Option<u32> {
        self.major.get(tick as usize).copied().flatten()
    }

    /// Minor label at `tick`.
    pub fn minor_label(
        &self,
        tick: u32,
    ) -> Option<u32> {
        self.minor.get(tick as usize).copied().flatten()
    }

    #[inline]
    pub fn is_major(
        &self,
        tick: u32,
    ) -> bool {
        self.major_label(tick).is_some()
    }

    #[inline]
    pub fn is_minor(
        &self,
        tick: u32,
    ) -> bool {
        self.minor_label(tick).is_some()
    }

    /// Text drawn next to `tick`. Only non-zero major ticks carry text.
    pub fn label_text(
        &self,
        tick: u32,
    ) -> Option<String<LABEL_TEXT_LEN>> {
        if tick == 0 {
            return None;
        }
        let label = self.major_label(tick)?;
        let mut text = String::new();
        write!(text, "{label}").ok()?;
        Some(text)
    }

    /// `(tick, label)` for every major tick in ascending order.
    pub fn majors(&self) -> impl Iterator<Item = (u32, u32)> + '_ { labelled(&self.major) }

    /// `(tick, label)` for every minor tick in ascending order.
    pub fn minors(&self) -> impl Iterator<Item = (u32, u32)> + '_ { labelled(&self.minor) }
}

fn labelled(slots: &LabelSlots) -> impl Iterator<Item = (u32, u32)> + '_ {
    slots
        .iter()
        .enumerate()
        .filter_map(|(tick, label)| label.map(|label| (tick as u32, label)))
}

fn empty(slots: usize) -> LabelSlots {
    let mut labels = LabelSlots::new();
    labels.resize(slots, None).ok();
    labels
}

/// One linear sweep over the ticks. The search runs once per bucket; the other
/// ticks of the bucket reuse its result.
fn solve(
    scale: &ScaleConfig,
    interval: u32,
    slots: usize,
) -> LabelSlots {
    let mut labels = empty(slots);
    if slots == 0 {
        return labels;
    }
    labels[0] = Some(0);
    if interval == 0 || !is_solvable(scale) {
        return labels;
    }

    // (low, winning tick) of the bucket seen last
    let mut cached: Option<(f32, Option<u32>)> = None;

    for tick in 1..slots as u32 {
        let (low, high) = bucket(scale, tick, interval);
        let winner = match cached {
            Some((cached_low, winner)) if cached_low == low => winner,
            _ => {
                let winner = search_bucket(scale, tick, high);
                cached = Some((low, winner));
                winner
            }
        };
        if winner == Some(tick) {
            labels[tick as usize] = Some(high as u32);
        }
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock_scale() -> ScaleConfig { ScaleConfig::new() }

    #[test]
    fn test_speed_at_ends_of_dial() {
        let scale = stock_scale();
        assert_eq!(speed_kmh_at(&scale, 0), 0.0);
        let top = speed_kmh_at(&scale, scale.total_ticks);
        assert!((top - 200.0).abs() < 0.1, "last tick is ~200 km/h, got {top}");
    }

    #[test]
    fn test_major_ticks_for_stock_scale() {
        let map = NickMap::build(&stock_scale());
        let majors: std::vec::Vec<(u32, u32)> = map.majors().collect();
        assert_eq!(
            majors,
            [
                (0, 0),
                (2, 20),
                (8, 40),
                (18, 60),
                (32, 80),
                (50, 100),
                (72, 120),
                (98, 140),
                (128, 160),
                (162, 180),
                (200, 200),
            ]
        );
    }

    #[test]
    fn test_each_major_label_appears_once() {
        let map = NickMap::build(&stock_scale());
        for label in (0..=200).step_by(20) {
            let count = map.majors().filter(|&(_, l)| l == label).count();
            assert_eq!(count, 1, "label {label} assigned {count} times");
        }
    }

    #[test]
    fn test_minor_labels_unique() {
        let map = NickMap::build(&stock_scale());
        let labels: std::vec::Vec<u32> = map.minors().map(|(_, label)| label).collect();
        for (i, label) in labels.iter().enumerate() {
            assert!(!labels[i + 1..].contains(label), "minor label {label} duplicated");
            assert_eq!(label % 10, 0);
        }
        for label in (20..=200).step_by(10) {
            assert!(labels.contains(&label), "minor label {label} missing");
        }
    }

    #[test]
    fn test_sweep_matches_per_tick_solver() {
        let scales = [
            stock_scale(),
            ScaleConfig::for_max_speed(160.0, 1.0, 120, 20, Some(5)),
            ScaleConfig::for_max_speed(300.0, 2.5, 300, 30, None),
            ScaleConfig::for_max_speed(90.0, 1.0, 45, 15, None),
        ];
        for scale in &scales {
            let map = NickMap::build(scale);
            for tick in 0..=scale.total_ticks {
                assert_eq!(
                    map.major_label(tick),
                    label_for_tick(scale, tick, scale.major_interval),
                    "tick {tick} of {scale:?}"
                );
            }
        }
    }

    #[test]
    fn test_tick_zero_is_always_zero() {
        let mut scale = stock_scale();
        scale.max_value = scale.min_value;
        assert_eq!(label_for_tick(&scale, 0, 20), Some(0));

        let map = NickMap::build(&scale);
        assert_eq!(map.major_label(0), Some(0));
        assert_eq!(map.majors().count(), 1, "degenerate scale labels only tick 0");
    }

    #[test]
    fn test_interval_that_does_not_divide_leaves_gaps() {
        let scale = ScaleConfig::for_max_speed(200.0, 1.0, 200, 30, None);
        let map = NickMap::build(&scale);
        let labels: std::vec::Vec<u32> = map.majors().map(|(_, label)| label).collect();
        assert_eq!(labels, [0, 30, 60, 90, 120, 150, 180]);
        assert!(!map.is_major(200), "210 lies past the dial");
    }

    #[test]
    fn test_label_text_skips_tick_zero() {
        let map = NickMap::build(&stock_scale());
        assert_eq!(map.label_text(0), None);
        assert_eq!(map.label_text(1), None);
        assert_eq!(map.label_text(8).as_deref(), Some("40"));
    }

    #[test]
    fn test_derived_minor_interval_used_when_unset() {
        let mut scale = stock_scale();
        scale.minor_interval = None;
        let derived = NickMap::build(&scale);
        let explicit = NickMap::build(&stock_scale());
        assert!(derived.minors().eq(explicit.minors()), "20 derives a minor interval of 10");
    }

    #[test]
    fn test_map_length_is_capped() {
        let scale = ScaleConfig::for_max_speed(200.0, 1.0, 5000, 20, None);
        let map = NickMap::build(&scale);
        assert_eq!(map.len(), MAX_NICKS);
        assert_eq!(map.major_label(5000), None);
    }
}
