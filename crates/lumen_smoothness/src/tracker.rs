//! Frame smoothness tracking
//!
//! The tracker is fed once per composited frame by the frame pacer and
//! maintains two views of smoothness:
//!
//! - a cheap rolling throughput over the last `frame_history_size` frames
//!   (fed by the `add_*_frame` calls), and
//! - one-second sliding-window drop percentages collected into a histogram,
//!   from which the worst window and tail percentiles are derived (fed by
//!   `on_begin_frame` / `on_end_frame` once first paint happened).
//!
//! Results leave the tracker only through [`FrameSmoothnessTracker::report_frames`],
//! which publishes them into a shared, seqlock-guarded destination.

use crate::config::{frames_in_window, SmoothnessConfig};
use crate::error::SmoothnessResult;
use crate::frame_sorter::FrameSorter;
use crate::histogram::DROPPED_FRAME_BUCKETS;
use crate::ring_buffer::{FrameOutcome, FrameRingBuffer};
use crate::seqlock::{SharedSmoothnessData, SmoothnessData};
use crate::sliding_window::SlidingWindow;
use lumen_core::FrameArgs;
use std::sync::Arc;

/// Windows dropping more than this percentage count as janky
pub const SMOOTHNESS_THRESHOLD_PERCENT: u32 = 5;

/// Returned by the `most_recent_*` getters when nothing was published
pub const SMOOTHNESS_UNAVAILABLE: f64 = -1.0;

/// Dropped-frame counter and smoothness tracker.
///
/// Driven from a single thread; only the published [`SharedSmoothnessData`]
/// is meant to be read elsewhere.
#[derive(Debug)]
pub struct FrameSmoothnessTracker {
    config: SmoothnessConfig,
    ring_buffer: FrameRingBuffer<FrameOutcome>,
    total_frames: u64,
    total_partial: u64,
    total_dropped: u64,

    /// Frames ended since first paint
    total_frames_after_fcp: u64,
    /// Dropped frames since first paint
    total_smoothness_dropped: u64,
    fcp_received: bool,

    frame_sorter: FrameSorter,
    sliding_window: SlidingWindow,
    ukm_smoothness_data: Option<Arc<SharedSmoothnessData>>,
}

impl Default for FrameSmoothnessTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSmoothnessTracker {
    /// Create a tracker with the default configuration
    pub fn new() -> Self {
        Self::from_valid_config(SmoothnessConfig::default())
    }

    /// Create a tracker with a custom configuration
    pub fn with_config(config: SmoothnessConfig) -> SmoothnessResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    /// Create a tracker with the default configuration and a custom ring
    /// buffer capacity
    pub fn with_history_size(frame_history_size: usize) -> SmoothnessResult<Self> {
        Self::with_config(SmoothnessConfig {
            frame_history_size,
            ..Default::default()
        })
    }

    fn from_valid_config(config: SmoothnessConfig) -> Self {
        let sliding_window = SlidingWindow::new(
            config.sliding_window_interval(),
            config.nominal_frames_in_window(),
        );
        Self {
            ring_buffer: FrameRingBuffer::new(config.frame_history_size),
            total_frames: 0,
            total_partial: 0,
            total_dropped: 0,
            total_frames_after_fcp: 0,
            total_smoothness_dropped: 0,
            fcp_received: false,
            frame_sorter: FrameSorter::with_window(
                config.sliding_window_interval(),
                config.nominal_frames_in_window() as usize,
            ),
            sliding_window,
            ukm_smoothness_data: None,
            config,
        }
    }

    pub fn config(&self) -> &SmoothnessConfig {
        &self.config
    }

    // === Rolling throughput ===

    pub fn add_good_frame(&mut self) {
        self.ring_buffer.save_to_buffer(FrameOutcome::Complete);
        self.total_frames += 1;
    }

    pub fn add_partial_frame(&mut self) {
        self.ring_buffer.save_to_buffer(FrameOutcome::Partial);
        self.total_frames += 1;
        self.total_partial += 1;
    }

    pub fn add_dropped_frame(&mut self) {
        self.ring_buffer.save_to_buffer(FrameOutcome::Dropped);
        self.total_frames += 1;
        self.total_dropped += 1;
    }

    /// Whole percentage of complete frames in the ring buffer.
    ///
    /// The denominator is the buffer capacity, not the number of frames
    /// saved so far, so a buffer that is not yet full reads low.
    pub fn average_throughput(&self) -> u32 {
        let good_frames = self
            .ring_buffer
            .iter_recent()
            .filter(|outcome| *outcome == FrameOutcome::Complete)
            .count();
        (good_frames * 100 / self.ring_buffer.buffer_size()) as u32
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn total_partial(&self) -> u64 {
        self.total_partial
    }

    pub fn total_dropped(&self) -> u64 {
        self.total_dropped
    }

    pub fn ring_buffer(&self) -> &FrameRingBuffer<FrameOutcome> {
        &self.ring_buffer
    }

    // === Per-frame pipeline ===

    pub fn on_begin_frame(&mut self, args: &FrameArgs) {
        if self.fcp_received {
            self.frame_sorter.add_new_frame(args);
        }
    }

    pub fn on_end_frame(&mut self, args: &FrameArgs, is_dropped: bool) {
        if !args.interval.is_zero() {
            let frames = frames_in_window(self.config.sliding_window_interval(), args.interval);
            self.sliding_window.set_total_frames_in_window(frames);
            self.frame_sorter.set_max_pending(frames as usize);
        }

        if self.fcp_received {
            self.total_frames_after_fcp += 1;
        }

        if is_dropped {
            if self.fcp_received {
                self.total_smoothness_dropped += 1;
            }
            self.report_frames();
        }

        if self.fcp_received {
            let window = &mut self.sliding_window;
            self.frame_sorter
                .add_frame_result(args, is_dropped, |args, dropped| {
                    window.notify_frame_result(args, dropped);
                });
        }
    }

    /// Open the first-paint gate; frames before it do not count
    pub fn on_fcp_received(&mut self) {
        if !self.fcp_received {
            log::debug!("First contentful paint received, tracking smoothness");
        }
        self.fcp_received = true;
    }

    pub fn fcp_received(&self) -> bool {
        self.fcp_received
    }

    pub fn set_ukm_smoothness_destination(&mut self, destination: Arc<SharedSmoothnessData>) {
        self.ukm_smoothness_data = Some(destination);
    }

    /// Publish the current figures to the shared destination.
    ///
    /// Called on every dropped frame. Does nothing without a destination or
    /// before any frame was counted.
    pub fn report_frames(&self) {
        let Some(destination) = &self.ukm_smoothness_data else {
            return;
        };
        if self.total_frames_after_fcp == 0 {
            return;
        }

        let histogram = self.sliding_window.histogram();
        let data = SmoothnessData {
            avg_smoothness: self.total_smoothness_dropped as f64 * 100.0
                / self.total_frames_after_fcp as f64,
            worst_smoothness: self.sliding_window.max_percent_dropped(),
            above_threshold: histogram.percent_above(SMOOTHNESS_THRESHOLD_PERCENT),
            percentile_95: histogram.percent_dropped_frame_percentile(0.95) as f64,
            median_smoothness: histogram.percent_dropped_frame_percentile(0.5) as f64,
            time_max_delta: self.sliding_window.time_max_delta(),
        };
        log::debug!(
            "Reporting smoothness: avg {:.2}% worst {:.1}% p95 {}%",
            data.avg_smoothness,
            data.worst_smoothness,
            data.percentile_95
        );
        destination.write(&data);
    }

    /// Last published average, or [`SMOOTHNESS_UNAVAILABLE`]
    pub fn most_recent_average_smoothness(&self) -> f64 {
        self.most_recent()
            .map(|data| data.avg_smoothness)
            .unwrap_or(SMOOTHNESS_UNAVAILABLE)
    }

    /// Last published 95th percentile, or [`SMOOTHNESS_UNAVAILABLE`]
    pub fn most_recent_95_percentile_smoothness(&self) -> f64 {
        self.most_recent()
            .map(|data| data.percentile_95)
            .unwrap_or(SMOOTHNESS_UNAVAILABLE)
    }

    fn most_recent(&self) -> Option<SmoothnessData> {
        self.ukm_smoothness_data.as_ref().and_then(|shared| shared.read())
    }

    // === Sliding window queries ===

    pub fn sliding_window(&self) -> &SlidingWindow {
        &self.sliding_window
    }

    pub fn sliding_window_max_percent_dropped(&self) -> f64 {
        self.sliding_window.max_percent_dropped()
    }

    pub fn sliding_window_current_percent_dropped(&self) -> Option<f64> {
        self.sliding_window.current_percent_dropped()
    }

    pub fn sliding_window_95_percentile_percent(&self) -> u32 {
        self.sliding_window
            .histogram()
            .percent_dropped_frame_percentile(0.95)
    }

    pub fn sliding_window_median_percent(&self) -> u32 {
        self.sliding_window
            .histogram()
            .percent_dropped_frame_percentile(0.5)
    }

    pub fn percent_dropped_frame_buckets(&self) -> [f64; DROPPED_FRAME_BUCKETS] {
        self.sliding_window.histogram().percent_dropped_frame_buckets()
    }

    /// Clear all state back to construction, keeping the destination
    pub fn reset(&mut self) {
        log::debug!("Resetting smoothness tracker after {} frames", self.total_frames);
        self.ring_buffer.clear();
        self.total_frames = 0;
        self.total_partial = 0;
        self.total_dropped = 0;
        self.total_frames_after_fcp = 0;
        self.total_smoothness_dropped = 0;
        self.fcp_received = false;
        self.frame_sorter.reset();
        self.sliding_window.reset();
        let frames = self.config.nominal_frames_in_window();
        self.sliding_window.set_total_frames_in_window(frames);
        self.frame_sorter.set_max_pending(frames as usize);
    }
}
