//! Signature statistics.
//!
//! The basic, velocity, shape and stroke statistics the baseline model
//! was originally trained on. Deliberately plain: counts, bounding-box
//! measures and velocity/duration summaries.

use crate::features::FeatureRecord;
use crate::geometry::{bounding_box, mean, path_length, safe_div, std_dev, velocities};
use crate::strokes::StrokeSet;

pub const STATS_FEATURES: [&str; 19] = [
    "stroke_count",
    "total_points",
    "total_duration_ms",
    "average_points_per_stroke",
    "average_velocity",
    "max_velocity",
    "min_velocity",
    "velocity_std",
    "width",
    "height",
    "area",
    "aspect_ratio",
    "center_x",
    "center_y",
    "average_stroke_length",
    "total_length",
    "length_variation",
    "average_stroke_duration",
    "duration_variation",
];

pub fn extract(set: &StrokeSet) -> FeatureRecord {
    let mut record = FeatureRecord::new();

    let stroke_count = set.stroke_count();
    let total_points = set.point_count();

    record.insert("stroke_count", stroke_count as f64);
    record.insert("total_points", total_points as f64);
    record.insert(
        "average_points_per_stroke",
        safe_div(total_points as f64, stroke_count as f64),
    );

    let total_duration = match (
        set.strokes.iter().find_map(|s| s.start_time()),
        set.strokes.iter().rev().find_map(|s| s.end_time()),
    ) {
        (Some(start), Some(end)) if end > start => (end - start) as f64,
        _ => 0.0,
    };
    record.insert("total_duration_ms", total_duration);

    // Velocity summary across every stroke.
    let vels: Vec<f64> = set.strokes.iter().flat_map(|s| velocities(&s.points)).collect();
    if vels.is_empty() {
        record.insert("average_velocity", 0.0);
        record.insert("max_velocity", 0.0);
        record.insert("min_velocity", 0.0);
        record.insert("velocity_std", 0.0);
    } else {
        record.insert("average_velocity", mean(&vels));
        record.insert("max_velocity", vels.iter().cloned().fold(f64::MIN, f64::max));
        record.insert("min_velocity", vels.iter().cloned().fold(f64::MAX, f64::min));
        record.insert("velocity_std", std_dev(&vels));
    }

    // Overall shape.
    let bb = bounding_box(set.all_points());
    let (cx, cy) = bb.center();
    record.insert("width", bb.width());
    record.insert("height", bb.height());
    record.insert("area", bb.area());
    record.insert("aspect_ratio", safe_div(bb.width(), bb.height()));
    record.insert("center_x", cx);
    record.insert("center_y", cy);

    // Per-stroke length and duration.
    let lengths: Vec<f64> = set.strokes.iter().map(|s| path_length(&s.points)).collect();
    record.insert("average_stroke_length", mean(&lengths));
    record.insert("total_length", lengths.iter().sum());
    record.insert("length_variation", std_dev(&lengths));

    let durations: Vec<f64> = set
        .strokes
        .iter()
        .filter_map(|s| s.duration())
        .map(|d| d as f64)
        .collect();
    record.insert("average_stroke_duration", mean(&durations));
    record.insert("duration_variation", std_dev(&durations));

    record
}
