//! Histogram of per-window dropped-frame percentages
//!
//! One bin per integer percent (0..=100). Percentiles are answered by
//! walking the bins from the top, which finds the tail cheaply.

/// Number of bins: one per integer percent from 0 to 100
pub const HISTOGRAM_BINS: usize = 101;

/// Bucket boundaries used for the coarse distribution report
const BUCKET_BOUNDS: [usize; 8] = [0, 3, 6, 12, 25, 50, 75, HISTOGRAM_BINS];

/// Number of coarse distribution buckets
pub const DROPPED_FRAME_BUCKETS: usize = BUCKET_BOUNDS.len() - 1;

/// Drop-percentage histogram.
///
/// Invariant: the bins always sum to `total_count`.
#[derive(Debug, Clone)]
pub struct SlidingWindowHistogram {
    bins: [u32; HISTOGRAM_BINS],
    total_count: u32,
}

impl Default for SlidingWindowHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl SlidingWindowHistogram {
    pub fn new() -> Self {
        Self {
            bins: [0; HISTOGRAM_BINS],
            total_count: 0,
        }
    }

    /// Record `count` windows that dropped `percent` of their frames.
    ///
    /// The percentage is rounded to the nearest integer and clamped to
    /// `[0, 100]`; NaN lands in bin 0. Once the total reaches `u32::MAX`
    /// further samples are dropped.
    pub fn add_percent_dropped_frame(&mut self, percent: f64, count: u32) {
        let bin = if percent.is_nan() {
            0
        } else {
            percent.round().clamp(0.0, 100.0) as usize
        };
        // Bins never exceed the total, so clamping here keeps them summing to it
        let count = count.min(u32::MAX - self.total_count);
        if count == 0 {
            return;
        }
        self.bins[bin] += count;
        self.total_count += count;
    }

    /// Smallest percentage X such that a `percentile` share of the recorded
    /// windows dropped at most X percent of their frames.
    ///
    /// `percentile` is in `[0, 1]`. Returns 0 for an empty histogram.
    pub fn percent_dropped_frame_percentile(&self, percentile: f64) -> u32 {
        if self.total_count == 0 {
            return 0;
        }
        let percentile = percentile.clamp(0.0, 1.0);
        let samples_to_skip = (1.0 - percentile) * self.total_count as f64;

        let mut index = HISTOGRAM_BINS - 1;
        let mut skipped = self.bins[index] as f64;
        while skipped < samples_to_skip && index > 0 {
            index -= 1;
            skipped += self.bins[index] as f64;
        }
        index as u32
    }

    /// Share of recorded windows (in percent) per coarse bucket:
    /// `[0,3) [3,6) [6,12) [12,25) [25,50) [50,75) [75,100]`.
    pub fn percent_dropped_frame_buckets(&self) -> [f64; DROPPED_FRAME_BUCKETS] {
        let mut buckets = [0.0; DROPPED_FRAME_BUCKETS];
        if self.total_count == 0 {
            return buckets;
        }
        for (i, bucket) in buckets.iter_mut().enumerate() {
            let count: u64 = self.bins[BUCKET_BOUNDS[i]..BUCKET_BOUNDS[i + 1]]
                .iter()
                .map(|&c| c as u64)
                .sum();
            *bucket = count as f64 * 100.0 / self.total_count as f64;
        }
        buckets
    }

    /// Share of recorded windows (in percent) that dropped more than
    /// `threshold` percent of their frames
    pub fn percent_above(&self, threshold: u32) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        let start = (threshold as usize + 1).min(HISTOGRAM_BINS);
        let above: u64 = self.bins[start..].iter().map(|&c| c as u64).sum();
        above as f64 * 100.0 / self.total_count as f64
    }

    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    pub fn bins(&self) -> &[u32; HISTOGRAM_BINS] {
        &self.bins
    }

    pub fn clear(&mut self) {
        self.bins = [0; HISTOGRAM_BINS];
        self.total_count = 0;
    }
}
