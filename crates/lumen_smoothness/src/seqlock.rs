//! Sequence-lock publication of smoothness results
//!
//! The compositor thread is the single writer; any number of threads may
//! read. The writer never blocks and readers never block the writer: a
//! reader copies the record and retries if the sequence number shows a
//! write was in progress or happened during the copy.
//!
//! Fields are stored as atomic words so a torn read is detected rather
//! than being undefined behavior.

use crossbeam_utils::{Backoff, CachePadded};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{fence, AtomicU64, Ordering};
use std::time::Duration;

/// Smoothness figures published by the tracker. Percentages are of
/// dropped frames, so lower is smoother.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SmoothnessData {
    /// Dropped frames over all frames since first paint
    pub avg_smoothness: f64,
    /// Worst one-second window
    pub worst_smoothness: f64,
    /// Share of windows above the smoothness threshold
    pub above_threshold: f64,
    pub percentile_95: f64,
    pub median_smoothness: f64,
    /// Time from the first counted frame to the worst window
    pub time_max_delta: Duration,
}

/// Seqlock-guarded destination for [`SmoothnessData`].
///
/// Share it with `Arc`; only one thread may call [`write`](Self::write).
#[derive(Debug, Default)]
pub struct SharedSmoothnessData {
    /// Odd while a write is in progress; zero until the first write
    sequence: CachePadded<AtomicU64>,
    avg_smoothness: AtomicU64,
    worst_smoothness: AtomicU64,
    above_threshold: AtomicU64,
    percentile_95: AtomicU64,
    median_smoothness: AtomicU64,
    time_max_delta_us: AtomicU64,
}

impl SharedSmoothnessData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a new record. Single writer only.
    pub fn write(&self, data: &SmoothnessData) {
        let sequence = self.sequence.load(Ordering::Relaxed);
        self.sequence.store(sequence + 1, Ordering::Relaxed);
        fence(Ordering::Release);

        self.avg_smoothness
            .store(data.avg_smoothness.to_bits(), Ordering::Relaxed);
        self.worst_smoothness
            .store(data.worst_smoothness.to_bits(), Ordering::Relaxed);
        self.above_threshold
            .store(data.above_threshold.to_bits(), Ordering::Relaxed);
        self.percentile_95
            .store(data.percentile_95.to_bits(), Ordering::Relaxed);
        self.median_smoothness
            .store(data.median_smoothness.to_bits(), Ordering::Relaxed);
        self.time_max_delta_us.store(
            data.time_max_delta.as_micros().min(u64::MAX as u128) as u64,
            Ordering::Relaxed,
        );

        self.sequence.store(sequence + 2, Ordering::Release);
    }

    /// Copy out the latest record, or `None` if nothing was written yet.
    ///
    /// Spins (with backoff) while a write is in progress.
    pub fn read(&self) -> Option<SmoothnessData> {
        let backoff = Backoff::new();
        loop {
            let before = self.sequence.load(Ordering::Acquire);
            if before & 1 == 1 {
                backoff.snooze();
                continue;
            }

            let data = SmoothnessData {
                avg_smoothness: f64::from_bits(self.avg_smoothness.load(Ordering::Relaxed)),
                worst_smoothness: f64::from_bits(self.worst_smoothness.load(Ordering::Relaxed)),
                above_threshold: f64::from_bits(self.above_threshold.load(Ordering::Relaxed)),
                percentile_95: f64::from_bits(self.percentile_95.load(Ordering::Relaxed)),
                median_smoothness: f64::from_bits(self.median_smoothness.load(Ordering::Relaxed)),
                time_max_delta: Duration::from_micros(
                    self.time_max_delta_us.load(Ordering::Relaxed),
                ),
            };

            fence(Ordering::Acquire);
            let after = self.sequence.load(Ordering::Relaxed);
            if before == after {
                return (before != 0).then_some(data);
            }
            backoff.snooze();
        }
    }

    /// Number of completed writes
    pub fn write_count(&self) -> u64 {
        self.sequence.load(Ordering::Acquire) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_unwritten_reads_none() {
        let shared = SharedSmoothnessData::new();
        assert_eq!(shared.read(), None);
        assert_eq!(shared.write_count(), 0);
    }

    #[test]
    fn test_write_then_read() {
        let shared = SharedSmoothnessData::new();
        let data = SmoothnessData {
            avg_smoothness: 2.5,
            worst_smoothness: 30.0,
            above_threshold: 12.5,
            percentile_95: 20.0,
            median_smoothness: 1.0,
            time_max_delta: Duration::from_millis(1500),
        };
        shared.write(&data);
        assert_eq!(shared.read(), Some(data));
        assert_eq!(shared.write_count(), 1);
    }

    #[test]
    fn test_concurrent_readers_never_see_torn_records() {
        let shared = Arc::new(SharedSmoothnessData::new());
        let writer = {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || {
                for i in 1..=20_000u32 {
                    let v = i as f64;
                    shared.write(&SmoothnessData {
                        avg_smoothness: v,
                        worst_smoothness: v,
                        above_threshold: v,
                        percentile_95: v,
                        median_smoothness: v,
                        time_max_delta: Duration::from_micros(i as u64),
                    });
                }
            })
        };

        let readers: Vec<_> = (0..3)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    for _ in 0..20_000 {
                        if let Some(data) = shared.read() {
                            let v = data.avg_smoothness;
                            assert_eq!(data.worst_smoothness, v);
                            assert_eq!(data.above_threshold, v);
                            assert_eq!(data.percentile_95, v);
                            assert_eq!(data.median_smoothness, v);
                            assert_eq!(data.time_max_delta, Duration::from_micros(v as u64));
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(shared.write_count(), 20_000);
    }
}
