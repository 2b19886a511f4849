//! One-second sliding window over frame results
//!
//! Every time the window fills up, the share of dropped frames inside it is
//! recorded into the drop-percentage histogram and the oldest frames are
//! trimmed until the window is no longer full.

use crate::histogram::SlidingWindowHistogram;
use lumen_core::{FrameArgs, TimeTicks};
use std::collections::VecDeque;
use std::time::Duration;

/// Sliding window of `(frame, is_dropped)` results.
///
/// After each accepted frame the covered span
/// (`back.frame_time + back.interval - front.frame_time`) is below the
/// window width.
#[derive(Debug)]
pub struct SlidingWindow {
    width: Duration,
    entries: VecDeque<(FrameArgs, bool)>,
    dropped_in_window: u32,
    /// Expected number of frames in a full window at the current rate
    total_frames_in_window: u64,
    histogram: SlidingWindowHistogram,
    max_percent_dropped: f64,
    current_percent_dropped: Option<f64>,
    first_frame_time: Option<TimeTicks>,
    /// Time from the first counted frame to the frame that set the max
    time_max_delta: Duration,
}

impl SlidingWindow {
    pub fn new(width: Duration, total_frames_in_window: u64) -> Self {
        Self {
            width,
            entries: VecDeque::new(),
            dropped_in_window: 0,
            total_frames_in_window,
            histogram: SlidingWindowHistogram::new(),
            max_percent_dropped: 0.0,
            current_percent_dropped: None,
            first_frame_time: None,
            time_max_delta: Duration::ZERO,
        }
    }

    pub fn set_total_frames_in_window(&mut self, frames: u64) {
        self.total_frames_in_window = frames;
    }

    pub fn total_frames_in_window(&self) -> u64 {
        self.total_frames_in_window
    }

    /// Feed one frame result.
    ///
    /// Returns `true` if the window filled up and a sample was recorded.
    pub fn notify_frame_result(&mut self, args: &FrameArgs, is_dropped: bool) -> bool {
        // Frames at least as long as the window only happen under external
        // frame control and say nothing about smoothness.
        if args.interval >= self.width {
            log::trace!(
                "Discarding frame {:?} with interval {:?}",
                args.frame_id,
                args.interval
            );
            return false;
        }

        self.first_frame_time.get_or_insert(args.frame_time);
        self.entries.push_back((*args, is_dropped));
        if is_dropped {
            self.dropped_in_window += 1;
        }

        if self.span() < self.width {
            return false;
        }

        let expected = self.total_frames_in_window.max(1) as f64;
        let percent = (self.dropped_in_window as f64 * 100.0 / expected).min(100.0);
        if percent > self.max_percent_dropped {
            self.max_percent_dropped = percent;
            self.time_max_delta = self
                .first_frame_time
                .map(|first| args.frame_time - first)
                .unwrap_or_default();
            log::debug!("New worst one-second window: {:.1}% dropped", percent);
        }
        self.current_percent_dropped = Some(percent);
        self.histogram.add_percent_dropped_frame(percent, 1);

        while self.span() >= self.width {
            let Some((_, dropped)) = self.entries.pop_front() else {
                break;
            };
            if dropped {
                self.dropped_in_window -= 1;
            }
        }
        true
    }

    /// Time covered by the frames currently in the window
    pub fn span(&self) -> Duration {
        match (self.entries.front(), self.entries.back()) {
            (Some((front, _)), Some((back, _))) => back.deadline() - front.frame_time,
            _ => Duration::ZERO,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dropped_in_window(&self) -> u32 {
        self.dropped_in_window
    }

    pub fn histogram(&self) -> &SlidingWindowHistogram {
        &self.histogram
    }

    pub fn max_percent_dropped(&self) -> f64 {
        self.max_percent_dropped
    }

    /// Percentage recorded for the most recent full window
    pub fn current_percent_dropped(&self) -> Option<f64> {
        self.current_percent_dropped
    }

    pub fn time_max_delta(&self) -> Duration {
        self.time_max_delta
    }

    /// Whether a frame with this id is currently inside the window
    pub fn contains(&self, args: &FrameArgs) -> bool {
        self.entries.iter().any(|(entry, _)| entry.frame_id == args.frame_id)
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.dropped_in_window = 0;
        self.histogram.clear();
        self.max_percent_dropped = 0.0;
        self.current_percent_dropped = None;
        self.first_frame_time = None;
        self.time_max_delta = Duration::ZERO;
    }
}
