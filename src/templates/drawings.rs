//! Free-form template analyzers: face, star, house, connect-the-dots.
//!
//! Coordinates follow the capture convention: y grows downward, so
//! "upper" means smaller y.

use crate::geometry::{
    bounding_box, centroid, closed_corner_indices, distance, path_length, safe_div,
};
use crate::strokes::{Stroke, StrokeSet};
use crate::templates::DescriptorMap;

/// Face: left/right point balance and vertical ordering of the stroke
/// clusters (eyes up top, mouth down low).
pub fn analyze_face(set: &StrokeSet) -> DescriptorMap {
    let mut out = DescriptorMap::new();
    out.insert("symmetry".into(), 0.0);
    out.insert("vertical_order_plausibility".into(), 0.0);

    if set.is_empty() {
        return out;
    }

    let bb = bounding_box(set.all_points());
    let (center_x, _) = bb.center();

    let mut left = 0usize;
    let mut right = 0usize;
    for p in set.all_points() {
        if p.x < center_x {
            left += 1;
        } else {
            right += 1;
        }
    }
    let total = (left + right) as f64;
    if total > 0.0 {
        let imbalance = (left as f64 - right as f64).abs() / total;
        out.insert("symmetry".into(), 1.0 - imbalance);
    }

    // Topmost stroke cluster should sit in the upper 40% of the drawing,
    // bottommost in the lower 40%.
    if set.stroke_count() >= 2 && bb.height() > 0.0 {
        let centroids_y: Vec<f64> = set
            .strokes
            .iter()
            .map(|s| centroid(s.points.iter()).1)
            .collect();
        let top = centroids_y.iter().cloned().fold(f64::MAX, f64::min);
        let bottom = centroids_y.iter().cloned().fold(f64::MIN, f64::max);

        let top_ok = top <= bb.min_y + bb.height() * 0.4;
        let bottom_ok = bottom >= bb.min_y + bb.height() * 0.6;
        let score = match (top_ok, bottom_ok) {
            (true, true) => 1.0,
            (true, false) | (false, true) => 0.5,
            (false, false) => 0.0,
        };
        out.insert("vertical_order_plausibility".into(), score);
    }

    out
}

/// Star: detected point count and the regularity of the corner angles
/// around the centroid (a clean n-point star spaces them 2π/n apart).
pub fn analyze_star(set: &StrokeSet) -> DescriptorMap {
    let mut out = DescriptorMap::new();
    out.insert("point_count".into(), 0.0);
    out.insert("angular_regularity".into(), 0.0);

    let Some(stroke) = set.strokes.first() else { return out };
    let points = &stroke.points;
    let corners = closed_corner_indices(points);
    out.insert("point_count".into(), corners.len() as f64);

    if corners.len() < 3 {
        return out;
    }

    let (cx, cy) = centroid(points.iter());
    let mut angles: Vec<f64> = corners
        .iter()
        .map(|&i| (points[i].y - cy).atan2(points[i].x - cx))
        .collect();
    angles.sort_by(f64::total_cmp);

    // Cyclic gaps between successive corner bearings.
    let n = angles.len();
    let expected = 2.0 * std::f64::consts::PI / n as f64;
    let mut gap_error = 0.0;
    for i in 0..n {
        let gap = if i + 1 < n {
            angles[i + 1] - angles[i]
        } else {
            2.0 * std::f64::consts::PI - (angles[n - 1] - angles[0])
        };
        gap_error += (gap - expected).abs();
    }
    let regularity = (1.0 - safe_div(gap_error / n as f64, expected)).clamp(0.0, 1.0);
    out.insert("angular_regularity".into(), regularity);

    out
}

/// House: a 2-3 corner top stroke reads as a roof, strokes taller than
/// wide read as walls.
pub fn analyze_house(set: &StrokeSet) -> DescriptorMap {
    let mut out = DescriptorMap::new();
    out.insert("roof_detected".into(), 0.0);
    out.insert("wall_count".into(), 0.0);
    out.insert("structure_score".into(), 0.0);

    if set.is_empty() {
        return out;
    }

    // Topmost stroke by centroid is the roof candidate.
    let roof = set
        .strokes
        .iter()
        .min_by(|a, b| {
            let ya = centroid(a.points.iter()).1;
            let yb = centroid(b.points.iter()).1;
            ya.total_cmp(&yb)
        });

    let roof_detected = roof.map_or(false, |s| {
        let corners = closed_corner_indices(&s.points).len();
        (2..=3).contains(&corners)
    });

    let wall_count = set.strokes.iter().filter(|s| is_wall(s)).count();

    out.insert("roof_detected".into(), if roof_detected { 1.0 } else { 0.0 });
    out.insert("wall_count".into(), wall_count as f64);

    let walls_ok = wall_count >= 2;
    let structure = match (roof_detected, walls_ok) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.5,
        (false, false) => 0.0,
    };
    out.insert("structure_score".into(), structure);

    out
}

fn is_wall(stroke: &Stroke) -> bool {
    let bb = bounding_box(stroke.points.iter());
    bb.height() > bb.width() && bb.height() > 0.0
}

/// Connect-the-dots: how directly the pen travelled between dots, and
/// whether the dots were visited in a monotonic sweep.
pub fn analyze_connect_dots(set: &StrokeSet) -> DescriptorMap {
    let mut out = DescriptorMap::new();
    out.insert("path_efficiency".into(), 0.0);
    out.insert("monotonic_pattern".into(), 0.0);

    if set.is_empty() {
        return out;
    }

    let mut chord_total = 0.0;
    let mut traced_total = 0.0;
    for stroke in &set.strokes {
        if stroke.len() < 2 {
            continue;
        }
        chord_total += distance(&stroke.points[0], &stroke.points[stroke.len() - 1]);
        traced_total += path_length(&stroke.points);
    }
    out.insert("path_efficiency".into(), safe_div(chord_total, traced_total));

    // Stroke starting points sweeping strictly in one axis direction.
    if set.stroke_count() >= 2 {
        let starts: Vec<(f64, f64)> = set
            .strokes
            .iter()
            .filter_map(|s| s.points.first().map(|p| (p.x, p.y)))
            .collect();
        let left_to_right = starts.windows(2).all(|w| w[1].0 >= w[0].0);
        let top_to_bottom = starts.windows(2).all(|w| w[1].1 >= w[0].1);
        if left_to_right || top_to_bottom {
            out.insert("monotonic_pattern".into(), 1.0);
        }
    }

    out
}
