//! Wall-clock source for the session clock.
//!
//! The kinematics pipeline is fed wall-clock milliseconds on purpose: a wall
//! clock can jump backwards, and the session clock in
//! [`speedo_common::kinematics::SessionClock`] absorbs that.

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, or 0 if the system clock is before it.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |since| u64::try_from(since.as_millis()).unwrap_or(u64::MAX))
}
