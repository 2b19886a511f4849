//! Reorders frame results into begin-frame order
//!
//! Results can come back out of order (a later frame may be resolved
//! before an earlier one that is still in flight). The sliding window
//! needs them in the order the frames were issued, so results are held
//! until every earlier frame has one.
//!
//! A frame whose result never arrives is given up on once a result comes
//! in for a frame issued a full window after it, or once more than a
//! window's worth of frames is waiting behind it.

use lumen_core::{BeginFrameId, FrameArgs};
use std::collections::VecDeque;
use std::time::Duration;

/// Frames held at most when no window size was set (one second at 240 Hz)
const DEFAULT_MAX_PENDING: usize = 240;

#[derive(Debug, Clone, Copy)]
struct PendingFrame {
    args: FrameArgs,
    /// `Some(is_dropped)` once a result arrived
    result: Option<bool>,
}

/// Buffers frame results and releases them in begin order
#[derive(Debug)]
pub struct FrameSorter {
    pending: VecDeque<PendingFrame>,
    last_begun: Option<BeginFrameId>,
    window: Duration,
    max_pending: usize,
    abandoned: u64,
}

impl Default for FrameSorter {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSorter {
    /// Sorter for a one second window
    pub fn new() -> Self {
        Self::with_window(Duration::from_secs(1), DEFAULT_MAX_PENDING)
    }

    /// Sorter giving up on frames older than `window` or further than
    /// `max_pending` frames behind
    pub fn with_window(window: Duration, max_pending: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            last_begun: None,
            window,
            max_pending: max_pending.max(1),
            abandoned: 0,
        }
    }

    /// Update the frame bound when the display rate changes
    pub fn set_max_pending(&mut self, max_pending: usize) {
        self.max_pending = max_pending.max(1);
    }

    pub fn max_pending(&self) -> usize {
        self.max_pending
    }

    /// Register a newly issued frame.
    ///
    /// Frames that are not newer than the last registered frame of the same
    /// source are ignored. A frame from a different source starts a new
    /// sequence.
    pub fn add_new_frame(&mut self, args: &FrameArgs) {
        if let Some(last) = &self.last_begun {
            if last.source_id == args.frame_id.source_id && !args.frame_id.is_next_after(last) {
                log::trace!("Ignoring out-of-order begin frame {:?}", args.frame_id);
                return;
            }
        }
        self.last_begun = Some(args.frame_id);
        // Growth is bounded even when no result ever arrives. A resolved
        // head is never evicted here, it flushes with the next result.
        while self.pending.len() >= self.max_pending
            && self.pending.front().is_some_and(|front| front.result.is_none())
        {
            self.abandon_front();
        }
        self.pending.push_back(PendingFrame { args: *args, result: None });
    }

    /// Record the result of a frame and flush every frame whose result is
    /// now known, in begin order, into `sink`.
    ///
    /// A frame can receive several results; it counts as dropped if any
    /// of them was. Results for frames that were never registered (or were
    /// already flushed) are ignored.
    pub fn add_frame_result<F>(&mut self, args: &FrameArgs, is_dropped: bool, mut sink: F)
    where
        F: FnMut(&FrameArgs, bool),
    {
        let Some(frame) = self
            .pending
            .iter_mut()
            .find(|frame| frame.args.frame_id == args.frame_id)
        else {
            log::trace!("Ignoring result for unknown frame {:?}", args.frame_id);
            return;
        };
        frame.result = Some(frame.result.unwrap_or(false) || is_dropped);

        let newest = args.frame_time;
        while let Some(front) = self.pending.front() {
            let stale = front.result.is_none()
                && (self.pending.len() > self.max_pending
                    || newest.saturating_duration_since(front.args.frame_time) >= self.window);
            if stale {
                self.abandon_front();
                continue;
            }
            let Some(dropped) = front.result else {
                break;
            };
            let args = front.args;
            self.pending.pop_front();
            sink(&args, dropped);
        }
    }

    fn abandon_front(&mut self) {
        if let Some(front) = self.pending.pop_front() {
            self.abandoned += 1;
            log::debug!("Giving up on frame {:?} without a result", front.args.frame_id);
        }
    }

    /// Frames registered but not yet flushed
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Frames given up on because their result never arrived
    pub fn abandoned_count(&self) -> u64 {
        self.abandoned
    }

    pub fn reset(&mut self) {
        self.pending.clear();
        self.last_begun = None;
        self.abandoned = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::TimeTicks;

    fn frames(count: usize) -> Vec<FrameArgs> {
        let mut args = FrameArgs::at_rate(1, TimeTicks::ZERO, 60);
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(args);
            args = args.next();
        }
        out
    }

    #[test]
    fn test_in_order_results_flush_immediately() {
        let mut sorter = FrameSorter::new();
        let frames = frames(2);
        let mut flushed = Vec::new();

        sorter.add_new_frame(&frames[0]);
        sorter.add_new_frame(&frames[1]);
        sorter.add_frame_result(&frames[0], false, |a, d| flushed.push((a.frame_id.sequence_number, d)));
        assert_eq!(flushed, vec![(1, false)]);
        assert_eq!(sorter.pending_count(), 1);
    }

    #[test]
    fn test_out_of_order_results_are_held() {
        let mut sorter = FrameSorter::new();
        let frames = frames(3);
        let mut flushed = Vec::new();
        for args in &frames {
            sorter.add_new_frame(args);
        }

        sorter.add_frame_result(&frames[2], true, |a, d| flushed.push((a.frame_id.sequence_number, d)));
        sorter.add_frame_result(&frames[1], false, |a, d| flushed.push((a.frame_id.sequence_number, d)));
        assert!(flushed.is_empty());

        sorter.add_frame_result(&frames[0], false, |a, d| flushed.push((a.frame_id.sequence_number, d)));
        assert_eq!(flushed, vec![(1, false), (2, false), (3, true)]);
        assert_eq!(sorter.pending_count(), 0);
    }

    #[test]
    fn test_multiple_results_merge_dropped() {
        let mut sorter = FrameSorter::new();
        let frames = frames(2);
        let mut flushed = Vec::new();
        sorter.add_new_frame(&frames[0]);
        sorter.add_new_frame(&frames[1]);

        sorter.add_frame_result(&frames[1], true, |a, d| flushed.push((a.frame_id.sequence_number, d)));
        sorter.add_frame_result(&frames[1], false, |a, d| flushed.push((a.frame_id.sequence_number, d)));
        sorter.add_frame_result(&frames[0], false, |a, d| flushed.push((a.frame_id.sequence_number, d)));
        assert_eq!(flushed, vec![(1, false), (2, true)]);
    }

    #[test]
    fn test_unknown_and_stale_frames_ignored() {
        let mut sorter = FrameSorter::new();
        let frames = frames(2);
        let mut flushed = 0;

        // Never begun
        sorter.add_frame_result(&frames[0], true, |_, _| flushed += 1);
        assert_eq!(flushed, 0);

        // Begun twice: the repeat is ignored
        sorter.add_new_frame(&frames[1]);
        sorter.add_new_frame(&frames[1]);
        sorter.add_new_frame(&frames[0]);
        assert_eq!(sorter.pending_count(), 1);

        sorter.reset();
        assert_eq!(sorter.pending_count(), 0);
    }

    #[test]
    fn test_lost_frame_abandoned_after_window() {
        let mut sorter = FrameSorter::new();
        let frames = frames(70);
        let mut flushed = Vec::new();
        for args in &frames {
            sorter.add_new_frame(args);
        }

        // Frame 1 never gets a result; frames within a second of it wait
        for args in &frames[1..61] {
            sorter.add_frame_result(args, false, |a, _| flushed.push(a.frame_id.sequence_number));
        }
        assert!(flushed.is_empty());

        // Frame 62 is the first one issued a full second after frame 1
        sorter.add_frame_result(&frames[61], true, |a, _| flushed.push(a.frame_id.sequence_number));
        assert_eq!(flushed, (2..=62).collect::<Vec<_>>());
        assert_eq!(sorter.abandoned_count(), 1);
        assert_eq!(sorter.pending_count(), 8);
    }

    #[test]
    fn test_pending_frames_bounded() {
        let mut sorter = FrameSorter::with_window(Duration::from_secs(1), 8);
        let frames = frames(100);
        for args in &frames {
            sorter.add_new_frame(args);
        }
        assert_eq!(sorter.pending_count(), 8);
        assert_eq!(sorter.abandoned_count(), 92);

        let mut flushed = Vec::new();
        sorter.add_frame_result(&frames[92], false, |a, _| flushed.push(a.frame_id.sequence_number));
        assert_eq!(flushed, vec![93]);
        assert_eq!(sorter.pending_count(), 7);
    }
}
