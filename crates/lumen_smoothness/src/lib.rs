//! # lumen_smoothness - Frame Smoothness Accounting
//!
//! Turns a stream of per-frame results from the frame pacer into:
//! - a rolling throughput figure over the last N frames
//! - one-second sliding-window drop percentages
//! - a drop-percentage histogram with tail percentiles
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Frame pacer (begin / end frame, first paint)                │
//! ├──────────────────────────────────────────────────────────────┤
//! │  FrameSmoothnessTracker                                      │
//! │  ├─ FrameRingBuffer      rolling throughput                  │
//! │  ├─ FrameSorter          results back into begin order       │
//! │  ├─ SlidingWindow        one-second drop percentage          │
//! │  └─ SlidingWindowHistogram  percentiles, buckets             │
//! ├──────────────────────────────────────────────────────────────┤
//! │  SharedSmoothnessData (seqlock, read from any thread)        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The tracker itself is single-threaded. Results are published on every
//! dropped frame into a [`SharedSmoothnessData`] that other threads read
//! without blocking the compositor.

pub mod config;
pub mod error;
pub mod frame_sorter;
pub mod histogram;
pub mod ring_buffer;
pub mod seqlock;
pub mod sliding_window;
pub mod tracker;

pub use config::SmoothnessConfig;
pub use error::{SmoothnessError, SmoothnessResult};
pub use frame_sorter::FrameSorter;
pub use histogram::{SlidingWindowHistogram, DROPPED_FRAME_BUCKETS, HISTOGRAM_BINS};
pub use ring_buffer::{FrameOutcome, FrameRingBuffer};
pub use seqlock::{SharedSmoothnessData, SmoothnessData};
pub use sliding_window::SlidingWindow;
pub use tracker::{FrameSmoothnessTracker, SMOOTHNESS_THRESHOLD_PERCENT, SMOOTHNESS_UNAVAILABLE};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::SmoothnessConfig;
    pub use crate::seqlock::{SharedSmoothnessData, SmoothnessData};
    pub use crate::tracker::FrameSmoothnessTracker;
    pub use lumen_core::{FrameArgs, TimeTicks};
}
