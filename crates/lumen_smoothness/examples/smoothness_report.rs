//! Smoothness Report Demo
//!
//! Simulates a few seconds of 60 Hz composition with a burst of jank in
//! the middle, then prints what the tracker published.
//!
//! Run with:
//! ```
//! RUST_LOG=debug cargo run -p lumen_smoothness --example smoothness_report
//! ```

use lumen_smoothness::prelude::*;
use lumen_smoothness::SMOOTHNESS_THRESHOLD_PERCENT;
use std::sync::Arc;

fn main() {
    env_logger::init();

    println!("Smoothness Report Demo");
    println!("======================\n");

    let config = SmoothnessConfig::for_refresh_rate(60);
    let mut tracker = match FrameSmoothnessTracker::with_config(config) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Failed to create tracker: {}", e);
            return;
        }
    };

    let shared = Arc::new(SharedSmoothnessData::new());
    tracker.set_ukm_smoothness_destination(Arc::clone(&shared));
    tracker.on_fcp_received();

    // 5 seconds: smooth, janky second (every third frame dropped), smooth
    let mut args = FrameArgs::at_rate(1, TimeTicks::ZERO, 60);
    for i in 0..300u32 {
        let dropped = (120..180).contains(&i) && i % 3 == 0;
        tracker.on_begin_frame(&args);
        tracker.on_end_frame(&args, dropped);
        if dropped {
            tracker.add_dropped_frame();
        } else {
            tracker.add_good_frame();
        }
        args = args.next();
    }

    println!("Rolling throughput: {}%", tracker.average_throughput());
    println!(
        "Frames: {} total, {} dropped",
        tracker.total_frames(),
        tracker.total_dropped()
    );
    println!();

    println!("Sliding window:");
    println!("  Worst window: {:.1}%", tracker.sliding_window_max_percent_dropped());
    println!("  95th percentile: {}%", tracker.sliding_window_95_percentile_percent());
    println!("  Median: {}%", tracker.sliding_window_median_percent());
    let labels = ["0-3", "3-6", "6-12", "12-25", "25-50", "50-75", "75-100"];
    for (label, share) in labels.iter().zip(tracker.percent_dropped_frame_buckets()) {
        println!("  {:>7}%: {:5.1}% of windows", label, share);
    }
    println!();

    match shared.read() {
        Some(data) => {
            println!("Last published ({} writes):", shared.write_count());
            println!("  Average dropped: {:.2}%", data.avg_smoothness);
            println!("  Worst window: {:.1}%", data.worst_smoothness);
            println!(
                "  Windows above {}%: {:.1}%",
                SMOOTHNESS_THRESHOLD_PERCENT, data.above_threshold
            );
            println!("  Worst window seen after: {:?}", data.time_max_delta);
            if let Ok(json) = serde_json::to_string_pretty(&data) {
                println!("\n{}", json);
            }
        }
        None => println!("Nothing published (no dropped frames)"),
    }
}
