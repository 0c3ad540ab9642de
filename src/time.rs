//! Tick timeline.
//!
//! The host measures animation time in integer ticks, 4800 per second, so
//! that every common frame rate lands on whole tick boundaries. All key
//! writes in this crate are addressed in ticks.

/// A point on the host timeline, in ticks.
pub type TimeValue = i32;

/// Ticks in one second of animation.
pub const TICKS_PER_SECOND: TimeValue = 4800;

/// Frame rate the host scene starts with.
pub const DEFAULT_FRAME_RATE: u32 = 30;

/// Converts seconds to ticks, rounding to the nearest tick.
#[inline]
#[must_use]
pub fn sec_to_ticks(secs: f32) -> TimeValue {
    (secs * TICKS_PER_SECOND as f32).round() as TimeValue
}

/// Converts ticks to seconds.
#[inline]
#[must_use]
pub fn ticks_to_sec(ticks: TimeValue) -> f32 {
    ticks as f32 / TICKS_PER_SECOND as f32
}

/// Ticks covered by one frame at `frame_rate` frames per second.
///
/// Integer division, as the host does: rates that do not divide 4800 evenly
/// get a truncated frame length. Never less than one tick.
#[inline]
#[must_use]
pub fn ticks_per_frame(frame_rate: u32) -> TimeValue {
    let rate = TimeValue::try_from(frame_rate).unwrap_or(TimeValue::MAX).max(1);
    (TICKS_PER_SECOND / rate).max(1)
}

/// Closed tick interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interval {
    pub start: TimeValue,
    pub end: TimeValue,
}

impl Interval {
    #[must_use]
    pub fn new(start: TimeValue, end: TimeValue) -> Self {
        Self { start, end }
    }

    /// Length of the interval in ticks.
    #[inline]
    #[must_use]
    pub fn duration(&self) -> TimeValue {
        self.end - self.start
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, time: TimeValue) -> bool {
        time >= self.start && time <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_lengths_match_host() {
        assert_eq!(ticks_per_frame(30), 160);
        assert_eq!(ticks_per_frame(60), 80);
        assert_eq!(ticks_per_frame(90), 53);
        assert_eq!(ticks_per_frame(120), 40);
    }

    #[test]
    fn frame_length_never_collapses() {
        assert_eq!(ticks_per_frame(4800), 1);
        assert_eq!(ticks_per_frame(9600), 1);
        assert_eq!(ticks_per_frame(u32::MAX), 1);
        assert_eq!(ticks_per_frame(0), 4800);
    }

    #[test]
    fn seconds_round_trip() {
        assert_eq!(sec_to_ticks(1.0), 4800);
        assert_eq!(sec_to_ticks(10.0 / 30.0), 1600);
        assert!((ticks_to_sec(2400) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn interval_contains_both_ends() {
        let range = Interval::new(0, 1440);
        assert!(range.contains(0));
        assert!(range.contains(1440));
        assert!(!range.contains(1600));
        assert_eq!(range.duration(), 1440);
    }
}
