//! Geometric shape feature extraction.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::{
    get_overlap_sample_pairs, DIRECTION_CHANGE_THRESHOLD, OVERLAP_DISTANCE_THRESHOLD,
    OVERLAP_EXHAUSTIVE_LIMIT, TREMOR_ANGLE_THRESHOLD,
};
use crate::features::FeatureRecord;
use crate::geometry::{curvature_3pt, distance, mean, path_length, safe_div, turning_angle};
use crate::strokes::{Point, StrokeSet};

pub const GEOMETRIC_FEATURES: [&str; 7] = [
    "avg_stroke_complexity",
    "tremor_index",
    "smoothness",
    "direction_change_count",
    "avg_curvature",
    "spatial_efficiency",
    "cross_stroke_overlap",
];

pub fn extract(set: &StrokeSet) -> FeatureRecord {
    let mut record = FeatureRecord::new();

    // Path length over end-to-end chord, per stroke. A single point or a
    // closed stroke (zero chord) counts as complexity 1.
    let complexities: Vec<f64> = set
        .strokes
        .iter()
        .map(|s| {
            if s.len() < 2 {
                return 1.0;
            }
            let chord = distance(&s.points[0], &s.points[s.len() - 1]);
            let path = path_length(&s.points);
            if chord == 0.0 {
                1.0
            } else {
                path / chord
            }
        })
        .collect();

    // 1-sample turning angles across all strokes.
    let mut turning: Vec<f64> = Vec::new();
    let mut curvatures: Vec<f64> = Vec::new();
    for stroke in &set.strokes {
        for w in stroke.points.windows(3) {
            turning.push(turning_angle(&w[0], &w[1], &w[2]));
            curvatures.push(curvature_3pt(&w[0], &w[1], &w[2]));
        }
    }

    let tremor = if turning.is_empty() {
        0.0
    } else {
        turning.iter().filter(|&&a| a > TREMOR_ANGLE_THRESHOLD).count() as f64
            / turning.len() as f64
    };

    let direction_changes =
        turning.iter().filter(|&&a| a > DIRECTION_CHANGE_THRESHOLD).count() as f64;

    // Bounded inverse of the mean turning angle: 1 for a perfectly smooth
    // path, approaching 0 as the path gets jagged.
    let smoothness = 1.0 / (1.0 + mean(&turning));

    let total_ink: f64 = set.strokes.iter().map(|s| path_length(&s.points)).sum();
    let bb = crate::geometry::bounding_box(set.all_points());
    let spatial_efficiency = safe_div(total_ink, bb.area().sqrt());

    record.insert("avg_stroke_complexity", mean(&complexities));
    record.insert("tremor_index", tremor);
    record.insert("smoothness", smoothness);
    record.insert("direction_change_count", direction_changes);
    record.insert("avg_curvature", mean(&curvatures));
    record.insert("spatial_efficiency", spatial_efficiency);
    record.insert("cross_stroke_overlap", cross_stroke_overlap(set));

    record
}

/// Fraction of cross-stroke point pairs closer than the overlap
/// threshold. Exhaustive below `OVERLAP_EXHAUSTIVE_LIMIT` points; above
/// that the quadratic pair space is estimated from a fixed-seed random
/// sample so cost stays bounded and results stay deterministic.
fn cross_stroke_overlap(set: &StrokeSet) -> f64 {
    if set.stroke_count() < 2 {
        return 0.0;
    }

    // Flatten to (stroke index, point) so pairs can be drawn uniformly.
    let flat: Vec<(usize, &Point)> = set
        .strokes
        .iter()
        .enumerate()
        .flat_map(|(i, s)| s.points.iter().map(move |p| (i, p)))
        .collect();

    if flat.len() <= OVERLAP_EXHAUSTIVE_LIMIT {
        let mut pairs = 0usize;
        let mut close = 0usize;
        for i in 0..flat.len() {
            for j in i + 1..flat.len() {
                if flat[i].0 == flat[j].0 {
                    continue;
                }
                pairs += 1;
                if distance(flat[i].1, flat[j].1) < OVERLAP_DISTANCE_THRESHOLD {
                    close += 1;
                }
            }
        }
        return safe_div(close as f64, pairs as f64);
    }

    // Fixed seed keeps repeated extraction over the same set bit-identical.
    let mut rng = StdRng::seed_from_u64(0x5161_a078);
    let budget = get_overlap_sample_pairs();
    let mut pairs = 0usize;
    let mut close = 0usize;
    for _ in 0..budget {
        let i = rng.gen_range(0..flat.len());
        let j = rng.gen_range(0..flat.len());
        if i == j || flat[i].0 == flat[j].0 {
            continue;
        }
        pairs += 1;
        if distance(flat[i].1, flat[j].1) < OVERLAP_DISTANCE_THRESHOLD {
            close += 1;
        }
    }
    safe_div(close as f64, pairs as f64)
}
