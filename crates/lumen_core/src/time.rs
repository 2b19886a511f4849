//! Frame timing primitives
//!
//! `TimeTicks` is a monotonic timestamp with an arbitrary origin. Frame
//! producers stamp each begin-frame with one, so consumers never need to
//! read a clock themselves and tests stay deterministic.

use core::fmt;
use core::ops::{Add, AddAssign, Sub};
use std::time::Duration;

/// Monotonic timestamp, measured from an arbitrary origin
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeTicks(Duration);

impl TimeTicks {
    /// The origin
    pub const ZERO: Self = Self(Duration::ZERO);

    pub const fn from_micros(micros: u64) -> Self {
        Self(Duration::from_micros(micros))
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    /// Time elapsed since the origin
    pub const fn since_origin(&self) -> Duration {
        self.0
    }

    /// Duration since `earlier`, or zero if `earlier` is later than `self`
    pub fn saturating_duration_since(&self, earlier: TimeTicks) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<Duration> for TimeTicks {
    type Output = TimeTicks;

    fn add(self, rhs: Duration) -> TimeTicks {
        TimeTicks(self.0 + rhs)
    }
}

impl AddAssign<Duration> for TimeTicks {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs;
    }
}

impl Sub<TimeTicks> for TimeTicks {
    type Output = Duration;

    fn sub(self, rhs: TimeTicks) -> Duration {
        self.saturating_duration_since(rhs)
    }
}

impl fmt::Debug for TimeTicks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeTicks({}us)", self.0.as_micros())
    }
}

/// Identifies a begin-frame: the source that issued it and its sequence
/// number within that source
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BeginFrameId {
    pub source_id: u64,
    pub sequence_number: u64,
}

impl BeginFrameId {
    pub const fn new(source_id: u64, sequence_number: u64) -> Self {
        Self {
            source_id,
            sequence_number,
        }
    }

    /// Whether `self` was issued after `other` by the same source
    pub fn is_next_after(&self, other: &BeginFrameId) -> bool {
        self.source_id == other.source_id && self.sequence_number > other.sequence_number
    }
}

/// Arguments of one begin-frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameArgs {
    pub frame_id: BeginFrameId,
    /// When the frame was issued
    pub frame_time: TimeTicks,
    /// Expected duration of the frame (the display's vsync interval)
    pub interval: Duration,
}

impl FrameArgs {
    pub fn new(
        source_id: u64,
        sequence_number: u64,
        frame_time: TimeTicks,
        interval: Duration,
    ) -> Self {
        Self {
            frame_id: BeginFrameId::new(source_id, sequence_number),
            frame_time,
            interval,
        }
    }

    /// Arguments for a frame at `fps`, from source 0
    pub fn at_rate(sequence_number: u64, frame_time: TimeTicks, fps: u32) -> Self {
        let interval = Duration::from_secs(1) / fps.max(1);
        Self::new(0, sequence_number, frame_time, interval)
    }

    /// When the frame was due to be presented
    pub fn deadline(&self) -> TimeTicks {
        self.frame_time + self.interval
    }

    /// The frame that follows this one at the same interval
    pub fn next(&self) -> FrameArgs {
        FrameArgs {
            frame_id: BeginFrameId::new(
                self.frame_id.source_id,
                self.frame_id.sequence_number + 1,
            ),
            frame_time: self.frame_time + self.interval,
            interval: self.interval,
        }
    }
}
