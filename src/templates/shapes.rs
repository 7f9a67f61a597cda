//! Geometric shape analyzers: circle, square, triangle.

use crate::constants::CORNER_PRESSURE_SPIKE_FACTOR;
use crate::geometry::{
    centroid, closed_corner_indices, distance, mean, path_length, safe_div, signed_angle,
    std_dev,
};
use crate::strokes::StrokeSet;
use crate::templates::DescriptorMap;

/// Circle: closure quality and radial deviation of the sole stroke.
pub fn analyze_circle(set: &StrokeSet) -> DescriptorMap {
    let mut out = DescriptorMap::new();
    out.insert("closure_quality".into(), 0.0);
    out.insert("radial_deviation".into(), 0.0);

    let Some(stroke) = set.strokes.first() else { return out };
    let points = &stroke.points;
    if points.len() < 3 {
        return out;
    }

    // Gap between pen-down and pen-up, normalized by the traced length.
    let gap = distance(&points[0], &points[points.len() - 1]);
    let total = path_length(points);
    let closure = (1.0 - safe_div(gap, total)).clamp(0.0, 1.0);

    // Spread of centroid-relative radii over their mean.
    let (cx, cy) = centroid(points.iter());
    let center = crate::strokes::Point::new(cx, cy);
    let radii: Vec<f64> = points.iter().map(|p| distance(p, &center)).collect();
    let radial_deviation = safe_div(std_dev(&radii), mean(&radii));

    out.insert("closure_quality".into(), closure);
    out.insert("radial_deviation".into(), radial_deviation);
    out
}

/// Square: corner pressure spikes and edge-length consistency over the
/// four detected corners.
pub fn analyze_square(set: &StrokeSet) -> DescriptorMap {
    let mut out = DescriptorMap::new();
    out.insert("corner_count".into(), 0.0);
    out.insert("corner_pressure_spike_ratio".into(), 0.0);
    out.insert("edge_length_consistency".into(), 0.0);

    let Some(stroke) = set.strokes.first() else { return out };
    let points = &stroke.points;
    let corners = closed_corner_indices(points);
    out.insert("corner_count".into(), corners.len() as f64);

    if corners.len() != 4 {
        return out;
    }

    // Pressure spike ratio: corners pressed noticeably harder than the
    // stroke average. 0 when the stroke carries no pressure.
    let pressures: Vec<f64> = points.iter().filter_map(|p| p.pressure).collect();
    if !pressures.is_empty() {
        let avg = mean(&pressures);
        if avg > 0.0 {
            let spikes = corners
                .iter()
                .filter_map(|&i| points[i].pressure)
                .filter(|&p| p > avg * CORNER_PRESSURE_SPIKE_FACTOR)
                .count();
            out.insert(
                "corner_pressure_spike_ratio".into(),
                spikes as f64 / corners.len() as f64,
            );
        }
    }

    // Edge lengths between consecutive corners, measured along the
    // traced path so a bowed edge reads longer than its chord. The
    // last edge wraps through the stroke end back to the first corner.
    let mut edges = Vec::with_capacity(4);
    for w in corners.windows(2) {
        edges.push(path_length(&points[w[0]..=w[1]]));
    }
    let last = corners[corners.len() - 1];
    let wrap = path_length(&points[last..])
        + distance(&points[points.len() - 1], &points[0])
        + path_length(&points[..=corners[0]]);
    edges.push(wrap);
    let m = mean(&edges);
    if m > 0.0 {
        // Inverse of the coefficient of variation, bounded to (0, 1].
        let cv = std_dev(&edges) / m;
        out.insert("edge_length_consistency".into(), 1.0 / (1.0 + cv));
    }

    out
}

/// Triangle: deviation of the interior angle sum from π over the three
/// detected corners.
pub fn analyze_triangle(set: &StrokeSet) -> DescriptorMap {
    let mut out = DescriptorMap::new();
    out.insert("corner_count".into(), 0.0);
    out.insert("angle_sum_deviation".into(), 0.0);

    let Some(stroke) = set.strokes.first() else { return out };
    let points = &stroke.points;
    let corners = closed_corner_indices(points);
    out.insert("corner_count".into(), corners.len() as f64);

    if corners.len() != 3 {
        return out;
    }

    let mut angle_sum = 0.0;
    for i in 0..3 {
        let prev = &points[corners[(i + 2) % 3]];
        let here = &points[corners[i]];
        let next = &points[corners[(i + 1) % 3]];
        angle_sum += signed_angle(prev, here, next).abs();
    }
    out.insert("angle_sum_deviation".into(), (angle_sum - std::f64::consts::PI).abs());

    out
}
