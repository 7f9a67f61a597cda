//! Timing / behavioral rhythm feature extraction.
//!
//! Timing is assumed nominally available on every device, so missing
//! timestamps degrade every feature here to zero instead of excluding it.

use crate::constants::{
    DWELL_DISTANCE_THRESHOLD, DWELL_TIME_THRESHOLD, PAUSE_GAP_THRESHOLD,
};
use crate::features::FeatureRecord;
use crate::geometry::{distance, mean, std_dev};
use crate::strokes::{Stroke, StrokeSet};

pub const TIMING_FEATURES: [&str; 7] = [
    "pause_count",
    "rhythm_consistency",
    "tempo_variation",
    "dwell_point_count",
    "total_duration",
    "pause_time_ratio",
    "avg_stroke_duration",
];

pub fn extract(set: &StrokeSet) -> FeatureRecord {
    let mut record = FeatureRecord::new();

    if !set.has_timestamps() {
        for name in TIMING_FEATURES {
            record.insert(name, 0.0);
        }
        return record;
    }

    let durations: Vec<f64> = set
        .strokes
        .iter()
        .filter_map(|s| s.duration())
        .map(|d| d as f64)
        .collect();

    // Inter-stroke gaps, in draw order.
    let mut pause_count = 0.0;
    let mut pause_time = 0.0;
    for pair in set.strokes.windows(2) {
        if let (Some(end), Some(start)) = (pair[0].end_time(), pair[1].start_time()) {
            let gap = start - end;
            if gap > PAUSE_GAP_THRESHOLD {
                pause_count += 1.0;
                pause_time += gap as f64;
            }
        }
    }

    // Stroke-duration standard deviation: low means a steady rhythm.
    let rhythm = std_dev(&durations);

    // Average absolute change between consecutive stroke durations.
    let tempo = if durations.len() >= 2 {
        mean(&durations.windows(2).map(|w| (w[1] - w[0]).abs()).collect::<Vec<_>>())
    } else {
        0.0
    };

    let dwell_points: usize = set.strokes.iter().map(count_dwell_points).sum();

    let total_duration = match (
        set.strokes.iter().find_map(|s| s.start_time()),
        set.strokes.iter().rev().find_map(|s| s.end_time()),
    ) {
        (Some(start), Some(end)) if end > start => (end - start) as f64,
        _ => 0.0,
    };

    record.insert("pause_count", pause_count);
    record.insert("rhythm_consistency", rhythm);
    record.insert("tempo_variation", tempo);
    record.insert("dwell_point_count", dwell_points as f64);
    record.insert("total_duration", total_duration);
    record.insert(
        "pause_time_ratio",
        if total_duration > 0.0 { pause_time / total_duration } else { 0.0 },
    );
    record.insert("avg_stroke_duration", mean(&durations));

    record
}

/// Count sustained near-stationary holds inside one stroke: consecutive
/// movement under the dwell distance whose accumulated time span reaches
/// the dwell threshold.
fn count_dwell_points(stroke: &Stroke) -> usize {
    let points = &stroke.points;
    let mut count = 0;
    let mut run_start: Option<i64> = None;

    for pair in points.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let (Some(ta), Some(tb)) = (a.time, b.time) else {
            run_start = None;
            continue;
        };
        if distance(a, b) < DWELL_DISTANCE_THRESHOLD {
            let start = *run_start.get_or_insert(ta);
            if tb - start >= DWELL_TIME_THRESHOLD {
                count += 1;
                run_start = None;
            }
        } else {
            run_start = None;
        }
    }

    count
}
