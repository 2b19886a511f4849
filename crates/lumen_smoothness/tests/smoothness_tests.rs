//! Integration tests for lumen_smoothness

use lumen_core::{FrameArgs, TimeTicks};
use lumen_smoothness::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const WINDOW: Duration = Duration::from_secs(1);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Drive `count` frames at `fps` through begin/end, dropping where `dropped(i)`
fn drive<F: Fn(u64) -> bool>(
    tracker: &mut FrameSmoothnessTracker,
    first: FrameArgs,
    count: u64,
    dropped: F,
) -> FrameArgs {
    let mut args = first;
    for i in 0..count {
        tracker.on_begin_frame(&args);
        tracker.on_end_frame(&args, dropped(i));
        args = args.next();
    }
    args
}

#[test]
fn test_throughput_reflects_only_recent_history() {
    let mut tracker = FrameSmoothnessTracker::with_history_size(10).unwrap();
    for _ in 0..10 {
        tracker.add_good_frame();
    }
    assert_eq!(tracker.average_throughput(), 100);
    for _ in 0..5 {
        tracker.add_dropped_frame();
    }
    assert_eq!(tracker.average_throughput(), 50);
    assert_eq!(tracker.total_frames(), 15);
    assert_eq!(tracker.total_dropped(), 5);
}

#[test]
fn test_throughput_never_exceeds_100() {
    let mut tracker = FrameSmoothnessTracker::with_history_size(7).unwrap();
    for i in 0..200u32 {
        match i % 5 {
            0 => tracker.add_partial_frame(),
            1 => tracker.add_dropped_frame(),
            _ => tracker.add_good_frame(),
        }
        let good = tracker
            .ring_buffer()
            .iter_recent()
            .filter(|o| *o == FrameOutcome::Complete)
            .count();
        let throughput = tracker.average_throughput();
        assert!(throughput <= 100);
        assert_eq!(throughput as usize, good * 100 / 7);
    }
}

#[test]
fn test_histogram_percentiles_are_monotonic() {
    let mut histogram = SlidingWindowHistogram::new();
    for i in 0..1000u32 {
        histogram.add_percent_dropped_frame(((i * 37) % 101) as f64, 1);
        assert_eq!(histogram.bins().iter().sum::<u32>(), histogram.total_count());
    }
    let mut previous = 0;
    for step in 0..=1000 {
        let p = step as f64 / 1000.0;
        let value = histogram.percent_dropped_frame_percentile(p);
        assert!(value >= previous);
        previous = value;
    }
    assert_eq!(SlidingWindowHistogram::new().percent_dropped_frame_percentile(0.95), 0);
}

#[test]
fn test_long_frames_never_enter_window() {
    init_logging();
    let mut tracker = FrameSmoothnessTracker::new();
    tracker.on_fcp_received();

    let mut time = TimeTicks::ZERO;
    for seq in 1..=5 {
        let args = FrameArgs::new(0, seq, time, WINDOW + Duration::from_millis(seq * 10));
        tracker.on_begin_frame(&args);
        tracker.on_end_frame(&args, true);
        assert!(!tracker.sliding_window().contains(&args));
        time += args.interval;
    }
    assert!(tracker.sliding_window().is_empty());
    assert_eq!(tracker.sliding_window().dropped_in_window(), 0);
    assert_eq!(tracker.sliding_window().histogram().total_count(), 0);
}

#[test]
fn test_window_span_stays_below_width_with_jittery_intervals() {
    let mut window = SlidingWindow::new(WINDOW, 60);
    let mut time = TimeTicks::ZERO;
    for seq in 0..2000u64 {
        let interval = Duration::from_millis(8 + (seq * 7) % 25);
        let args = FrameArgs::new(0, seq, time, interval);
        window.notify_frame_result(&args, seq % 4 == 0);
        assert!(window.span() < WINDOW, "span {:?} at frame {}", window.span(), seq);
        time += interval;
    }
    assert!(window.histogram().total_count() > 0);
    assert!(window.max_percent_dropped() <= 100.0);
}

#[test]
fn test_out_of_order_results_fed_in_begin_order() {
    let mut tracker = FrameSmoothnessTracker::new();
    tracker.on_fcp_received();

    let first = FrameArgs::at_rate(1, TimeTicks::ZERO, 60);
    let second = first.next();
    let third = second.next();
    for args in [&first, &second, &third] {
        tracker.on_begin_frame(args);
    }

    tracker.on_end_frame(&third, false);
    tracker.on_end_frame(&second, true);
    assert!(tracker.sliding_window().is_empty());

    tracker.on_end_frame(&first, false);
    assert_eq!(tracker.sliding_window().len(), 3);
    assert_eq!(tracker.sliding_window().dropped_in_window(), 1);
}

#[test]
fn test_steady_drops_reported_in_histogram() {
    init_logging();
    let mut tracker = FrameSmoothnessTracker::new();
    tracker.on_fcp_received();

    // 60 Hz, one drop in every six frames: 10 drops per second
    drive(&mut tracker, FrameArgs::at_rate(1, TimeTicks::ZERO, 60), 600, |i| i % 6 == 0);

    let max = tracker.sliding_window_max_percent_dropped();
    assert!((15.0..=20.0).contains(&max), "max {}", max);
    let p95 = tracker.sliding_window_95_percentile_percent();
    assert!((15..=20).contains(&p95), "p95 {}", p95);
    let buckets = tracker.percent_dropped_frame_buckets();
    assert!((buckets.iter().sum::<f64>() - 100.0).abs() < 1e-9);
}

#[test]
fn test_smooth_run_reports_zero() {
    let shared = Arc::new(SharedSmoothnessData::new());
    let mut tracker = FrameSmoothnessTracker::new();
    tracker.set_ukm_smoothness_destination(Arc::clone(&shared));
    tracker.on_fcp_received();

    let next = drive(&mut tracker, FrameArgs::at_rate(1, TimeTicks::ZERO, 60), 300, |_| false);
    assert_eq!(shared.write_count(), 0);
    assert_eq!(tracker.sliding_window_median_percent(), 0);

    // A single drop publishes the figures collected so far
    tracker.on_begin_frame(&next);
    tracker.on_end_frame(&next, true);
    let data = shared.read().expect("published");
    assert!((data.avg_smoothness - 100.0 / 301.0).abs() < 1e-9);
    assert_eq!(data.worst_smoothness, 0.0);
    assert_eq!(data.percentile_95, 0.0);
    assert_eq!(data.above_threshold, 0.0);
}

#[test]
fn test_reader_thread_sees_consistent_publications() {
    let shared = Arc::new(SharedSmoothnessData::new());
    let done = Arc::new(AtomicBool::new(false));

    let reader = {
        let shared = Arc::clone(&shared);
        let done = Arc::clone(&done);
        std::thread::spawn(move || {
            let mut reads = 0u64;
            while !done.load(Ordering::Acquire) {
                if let Some(data) = shared.read() {
                    assert!(data.avg_smoothness >= 0.0 && data.avg_smoothness <= 100.0);
                    assert!(data.worst_smoothness <= 100.0);
                    reads += 1;
                }
            }
            reads
        })
    };

    let mut tracker = FrameSmoothnessTracker::new();
    tracker.set_ukm_smoothness_destination(Arc::clone(&shared));
    tracker.on_fcp_received();
    drive(&mut tracker, FrameArgs::at_rate(1, TimeTicks::ZERO, 120), 5000, |i| i % 3 == 0);
    done.store(true, Ordering::Release);

    reader.join().unwrap();
    assert!(shared.write_count() > 1000);
    assert!(tracker.most_recent_average_smoothness() > 0.0);
}

#[test]
fn test_lost_frame_does_not_starve_window() {
    init_logging();
    let mut tracker = FrameSmoothnessTracker::new();
    tracker.on_fcp_received();

    // Frame 1 begins but its result never arrives
    let lost = FrameArgs::at_rate(1, TimeTicks::ZERO, 60);
    tracker.on_begin_frame(&lost);
    drive(&mut tracker, lost.next(), 6000, |i| i % 2 == 0);

    assert!(!tracker.sliding_window().is_empty());
    assert!(tracker.sliding_window().histogram().total_count() > 0);
    let max = tracker.sliding_window_max_percent_dropped();
    assert!((40.0..=60.0).contains(&max), "max {}", max);
}

#[test]
fn test_reset_reopens_fcp_gate() {
    let mut tracker = FrameSmoothnessTracker::new();
    tracker.on_fcp_received();
    drive(&mut tracker, FrameArgs::at_rate(1, TimeTicks::ZERO, 60), 120, |i| i % 2 == 0);
    assert!(tracker.sliding_window().histogram().total_count() > 0);

    tracker.reset();
    assert!(!tracker.fcp_received());
    let next = FrameArgs::at_rate(1, TimeTicks::from_millis(5000), 60);
    drive(&mut tracker, next, 120, |_| true);
    assert!(tracker.sliding_window().is_empty());
    assert_eq!(tracker.sliding_window().histogram().total_count(), 0);
}

#[test]
fn test_config_from_json() {
    let config = SmoothnessConfig::from_json(r#"{ "frame_history_size": 120, "nominal_frame_rate": 120 }"#)
        .unwrap();
    assert_eq!(config.sliding_window_interval(), WINDOW);
    let tracker = FrameSmoothnessTracker::with_config(config).unwrap();
    assert_eq!(tracker.ring_buffer().buffer_size(), 120);
    assert_eq!(tracker.sliding_window().total_frames_in_window(), 120);

    assert!(matches!(
        SmoothnessConfig::from_json(r#"{ "frame_history_size": 0 }"#),
        Err(SmoothnessError::InvalidConfig(_))
    ));
    assert!(matches!(
        SmoothnessConfig::from_json("not json"),
        Err(SmoothnessError::Parse(_))
    ));
}
