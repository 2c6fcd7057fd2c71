//! Bounded multi-channel history for the chart.
//!
//! One row per animation tick holds the session time and a value slot for
//! every channel. Channels never get their own length: a missing value is
//! stored as `None` in its slot, and eviction drops whole rows. That keeps
//! every channel index-aligned with the shared time axis at all times.
//!
//! # Capacity
//!
//! Storage is a fixed `heapless::Deque` of `N` rows. The runtime capacity
//! (history seconds over sample interval) is clamped to `N`.

use heapless::Deque;

use crate::channels::{CHANNEL_COUNT, ChannelId};
use crate::config::SERIES_MAX_CAPACITY;
use crate::kinematics::KinematicSample;

/// One chart sample across all channels.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SeriesRow {
    /// Session time in milliseconds.
    pub time_ms: f32,
    /// Value per channel, indexed by [`ChannelId::index`]. `None` is a gap.
    pub values: [Option<f32>; CHANNEL_COUNT],
}

impl SeriesRow {
    #[inline]
    pub const fn value(
        &self,
        channel: ChannelId,
    ) -> Option<f32> {
        self.values[channel.index()]
    }
}

impl From<&KinematicSample> for SeriesRow {
    fn from(sample: &KinematicSample) -> Self {
        let mut values = [None; CHANNEL_COUNT];
        values[ChannelId::Speed.index()] = Some(sample.speed_kmh);
        values[ChannelId::Energy.index()] = Some(sample.energy_j);
        values[ChannelId::Acceleration.index()] = sample.acceleration_g;
        Self {
            time_ms: sample.time_ms,
            values,
        }
    }
}

/// Rolling window of the most recent rows, at most `N` of them.
#[derive(Clone, Debug)]
pub struct RollingSeriesBuffer<const N: usize> {
    rows: Deque<SeriesRow, N>,
    capacity: usize,
}

/// Chart buffer sized for the largest supported history.
pub type ChartBuffer = RollingSeriesBuffer<SERIES_MAX_CAPACITY>;

impl<const N: usize> RollingSeriesBuffer<N> {
    /// Empty buffer keeping at most `capacity` rows (clamped to `N`).
    pub const fn new(capacity: usize) -> Self {
        Self {
            rows: Deque::new(),
            capacity: if capacity < N { capacity } else { N },
        }
    }

    /// Append one row. When the buffer is over capacity afterwards the oldest
    /// row is dropped.
    pub fn append(
        &mut self,
        time_ms: f32,
        values: [Option<f32>; CHANNEL_COUNT],
    ) {
        self.push(SeriesRow { time_ms, values });
    }

    /// Append the row for a kinematic sample. Absent acceleration becomes a gap.
    pub fn append_sample(
        &mut self,
        sample: &KinematicSample,
    ) {
        self.push(SeriesRow::from(sample));
    }

    fn push(
        &mut self,
        row: SeriesRow,
    ) {
        if self.rows.is_full() {
            self.rows.pop_front();
        }
        // Cannot fail: a slot was freed above if the deque was full
        let _ = self.rows.push_back(row);
        while self.rows.len() > self.capacity {
            self.rows.pop_front();
        }
    }

    /// Drop every row (session restart).
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    #[inline]
    pub fn len(&self) -> usize { self.rows.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    #[inline]
    pub const fn capacity(&self) -> usize { self.capacity }

    /// Rows from oldest to newest.
    pub fn rows(&self) -> impl Iterator<Item = &SeriesRow> { self.rows.iter() }

    /// `(time_ms, value)` pairs of one channel, oldest first. Gaps are `None`.
    pub fn channel(
        &self,
        channel: ChannelId,
    ) -> impl Iterator<Item = (f32, Option<f32>)> + '_ {
        self.rows.iter().map(move |row| (row.time_ms, row.value(channel)))
    }

    /// Smallest and largest present value of one channel.
    pub fn min_max(
        &self,
        channel: ChannelId,
    ) -> Option<(f32, f32)> {
        self.rows
            .iter()
            .filter_map(|row| row.value(channel))
            .fold(None, |range, value| match range {
                None => Some((value, value)),
                Some((min, max)) => Some((min.min(value), max.max(value))),
            })
    }

    /// Most recent row.
    #[inline]
    pub fn latest(&self) -> Option<&SeriesRow> { self.rows.back() }

    /// Time span from the oldest to the newest row, in milliseconds.
    pub fn span_ms(&self) -> f32 {
        match (self.rows.front(), self.rows.back()) {
            (Some(first), Some(last)) => last.time_ms - first.time_ms,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinematics::KinematicsCalculator;

    fn row(i: u32) -> [Option<f32>; CHANNEL_COUNT] {
        let v = i as f32;
        [Some(v), Some(v * 10.0), if i % 2 == 0 { Some(-v) } else { None }]
    }

    #[test]
    fn test_keeps_last_rows_in_order() {
        let mut buffer = RollingSeriesBuffer::<16>::new(5);
        for i in 0..7 {
            buffer.append(i as f32 * 100.0, row(i));
        }

        assert_eq!(buffer.len(), 5);
        for channel in ChannelId::ALL {
            let times: std::vec::Vec<f32> = buffer.channel(channel).map(|(t, _)| t).collect();
            assert_eq!(times, [200.0, 300.0, 400.0, 500.0, 600.0], "{channel:?}");
        }
        let speeds: std::vec::Vec<Option<f32>> = buffer.channel(ChannelId::Speed).map(|(_, v)| v).collect();
        assert_eq!(speeds, [Some(2.0), Some(3.0), Some(4.0), Some(5.0), Some(6.0)]);
        let accel: std::vec::Vec<Option<f32>> =
            buffer.channel(ChannelId::Acceleration).map(|(_, v)| v).collect();
        assert_eq!(accel, [Some(-2.0), None, Some(-4.0), None, Some(-6.0)]);
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        let mut buffer = RollingSeriesBuffer::<64>::new(10);
        for i in 0..100 {
            buffer.append(i as f32, row(i));
            assert!(buffer.len() <= 10);
            for channel in ChannelId::ALL {
                assert_eq!(buffer.channel(channel).count(), buffer.len(), "channels stay aligned");
            }
        }
    }

    #[test]
    fn test_capacity_clamped_to_storage() {
        let mut buffer = RollingSeriesBuffer::<4>::new(100);
        assert_eq!(buffer.capacity(), 4);
        for i in 0..9 {
            buffer.append(i as f32, row(i));
        }
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.latest().map(|r| r.time_ms), Some(8.0));
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let mut buffer = RollingSeriesBuffer::<4>::new(0);
        buffer.append(0.0, row(0));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_same_timestamp_rows_both_recorded() {
        let mut calc = KinematicsCalculator::new(1.0);
        let mut buffer = RollingSeriesBuffer::<8>::new(8);

        buffer.append_sample(&calc.sample(1_000, 0.0));
        buffer.append_sample(&calc.sample(1_100, 2.0));
        buffer.append_sample(&calc.sample(1_100, 4.0));

        assert_eq!(buffer.len(), 3);
        let last = buffer.latest().unwrap();
        assert_eq!(last.value(ChannelId::Acceleration), None, "no time passed");
        assert_eq!(last.value(ChannelId::Energy), Some(8.0));
        let speed = last.value(ChannelId::Speed).unwrap();
        assert!((speed - 14.4).abs() < 1e-4);
    }

    #[test]
    fn test_min_max_ignores_gaps() {
        let mut buffer = RollingSeriesBuffer::<8>::new(8);
        buffer.append(0.0, [Some(3.0), None, None]);
        buffer.append(1.0, [Some(-1.0), None, None]);
        buffer.append(2.0, [Some(7.0), None, Some(0.5)]);

        assert_eq!(buffer.min_max(ChannelId::Speed), Some((-1.0, 7.0)));
        assert_eq!(buffer.min_max(ChannelId::Energy), None);
        assert_eq!(buffer.min_max(ChannelId::Acceleration), Some((0.5, 0.5)));
        assert_eq!(buffer.span_ms(), 2.0);
    }

    #[test]
    fn test_clear() {
        let mut buffer = RollingSeriesBuffer::<8>::new(8);
        buffer.append(0.0, row(0));
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.latest(), None);
        assert_eq!(buffer.capacity(), 8);
    }
}
