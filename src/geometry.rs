//! Geometry Primitives
//!
//! Pure shared math for the extractors and analyzers. Every division is
//! guarded: zero path length, zero radius or a degenerate bounding box
//! yields 0, never NaN or infinity, so numeric faults stop here and never
//! propagate out of an extractor.

use serde::{Deserialize, Serialize};

use crate::constants::{CORNER_ANGLE_THRESHOLD, CORNER_HALF_WINDOW, CORNER_LOCAL_MAX_RADIUS};
use crate::strokes::Point;

// ============================================================================
// BASIC MEASURES
// ============================================================================

/// Euclidean distance between two points.
pub fn distance(a: &Point, b: &Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Sum of consecutive distances along a point sequence.
pub fn path_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| distance(&w[0], &w[1])).sum()
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }
}

/// Bounding box over an iterator of points. Degenerate `(0,0,0,0)` box for
/// empty input.
pub fn bounding_box<'a, I: IntoIterator<Item = &'a Point>>(points: I) -> BoundingBox {
    let mut iter = points.into_iter();
    let first = match iter.next() {
        Some(p) => p,
        None => return BoundingBox { min_x: 0.0, min_y: 0.0, max_x: 0.0, max_y: 0.0 },
    };
    let mut bb = BoundingBox { min_x: first.x, min_y: first.y, max_x: first.x, max_y: first.y };
    for p in iter {
        if p.x < bb.min_x { bb.min_x = p.x; }
        if p.x > bb.max_x { bb.max_x = p.x; }
        if p.y < bb.min_y { bb.min_y = p.y; }
        if p.y > bb.max_y { bb.max_y = p.y; }
    }
    bb
}

/// Arithmetic mean of the point coordinates. `(0, 0)` for empty input.
pub fn centroid<'a, I: IntoIterator<Item = &'a Point>>(points: I) -> (f64, f64) {
    let mut sx = 0.0;
    let mut sy = 0.0;
    let mut n = 0usize;
    for p in points {
        sx += p.x;
        sy += p.y;
        n += 1;
    }
    if n == 0 {
        (0.0, 0.0)
    } else {
        (sx / n as f64, sy / n as f64)
    }
}

// ============================================================================
// ANGLES & CURVATURE
// ============================================================================

/// Signed interior angle at vertex `b`, between vectors `b→a` and `b→c`,
/// in `(−π, π]`. Degenerate vectors yield 0.
pub fn signed_angle(a: &Point, b: &Point, c: &Point) -> f64 {
    let v1 = (a.x - b.x, a.y - b.y);
    let v2 = (c.x - b.x, c.y - b.y);
    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let det = v1.0 * v2.1 - v1.1 * v2.0;
    if dot == 0.0 && det == 0.0 {
        return 0.0;
    }
    det.atan2(dot)
}

/// Absolute turning angle at `b`: deviation between the incoming segment
/// `a→b` and the outgoing segment `b→c`. 0 for straight-on motion and for
/// degenerate segments.
pub fn turning_angle(a: &Point, b: &Point, c: &Point) -> f64 {
    let v1 = (b.x - a.x, b.y - a.y);
    let v2 = (c.x - b.x, c.y - b.y);
    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let det = v1.0 * v2.1 - v1.1 * v2.0;
    if dot == 0.0 && det == 0.0 {
        return 0.0;
    }
    det.atan2(dot).abs()
}

/// Discrete curvature at the middle of a 3-point window: inverse of the
/// circumradius of the triangle `(a, b, c)`. Collinear or coincident
/// points yield 0.
pub fn curvature_3pt(a: &Point, b: &Point, c: &Point) -> f64 {
    let la = distance(b, c);
    let lb = distance(a, c);
    let lc = distance(a, b);
    // Twice the signed triangle area, via the cross product.
    let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
    let denom = la * lb * lc;
    if denom == 0.0 {
        return 0.0;
    }
    // curvature = 1/R = 4*area / (a*b*c) = 2*|cross| / (a*b*c)
    (2.0 * cross.abs()) / denom
}

// ============================================================================
// CORNER DETECTION
// ============================================================================

/// Turning angle at index `i` over a symmetric window of `half_window`
/// samples each side. 0 when the window does not fit.
pub fn windowed_turning_angle(points: &[Point], i: usize, half_window: usize) -> f64 {
    if i < half_window || i + half_window >= points.len() {
        return 0.0;
    }
    turning_angle(&points[i - half_window], &points[i], &points[i + half_window])
}

/// Detect corners: indices whose windowed turning angle exceeds
/// `threshold` and is a local maximum of that metric over a small
/// neighborhood. Returned in index order.
pub fn corner_indices(points: &[Point], half_window: usize, threshold: f64) -> Vec<usize> {
    let n = points.len();
    if n < 2 * half_window + 1 {
        return Vec::new();
    }

    let angles: Vec<f64> = (0..n)
        .map(|i| windowed_turning_angle(points, i, half_window))
        .collect();

    let mut corners = Vec::new();
    for i in half_window..n - half_window {
        if angles[i] <= threshold {
            continue;
        }
        let lo = i.saturating_sub(CORNER_LOCAL_MAX_RADIUS);
        let hi = (i + CORNER_LOCAL_MAX_RADIUS).min(n - 1);
        let is_local_max = (lo..=hi).all(|j| angles[j] <= angles[i] || j == i);
        if is_local_max {
            corners.push(i);
        }
    }
    corners
}

/// Corner detection with the default window and threshold.
pub fn default_corners(points: &[Point]) -> Vec<usize> {
    corner_indices(points, CORNER_HALF_WINDOW, CORNER_ANGLE_THRESHOLD)
}

/// Corner detection for closed strokes (first and last point close
/// relative to the path): the sequence is extended circularly so the
/// corner at the pen-down point is found too. Falls back to the plain
/// detector for open strokes.
pub fn closed_corner_indices(points: &[Point]) -> Vec<usize> {
    let n = points.len();
    let w = CORNER_HALF_WINDOW;
    if n < 2 * w + 1 {
        return Vec::new();
    }

    let gap = distance(&points[0], &points[n - 1]);
    let total = path_length(points);
    let closed = total > 0.0 && gap / total < 0.1;
    if !closed {
        return default_corners(points);
    }

    // Wrap w points from each end around the other.
    let mut extended: Vec<Point> = Vec::with_capacity(n + 2 * w);
    extended.extend_from_slice(&points[n - w - 1..n - 1]);
    extended.extend_from_slice(points);
    extended.extend_from_slice(&points[1..=w]);

    let mut corners: Vec<usize> = corner_indices(&extended, w, CORNER_ANGLE_THRESHOLD)
        .into_iter()
        .filter_map(|i| {
            // Map back into the original index space; discard hits that
            // fall inside the duplicated margins twice.
            let i = i as isize - w as isize;
            if i < 0 {
                Some((i + (n as isize - 1)) as usize)
            } else if (i as usize) < n {
                Some(i as usize)
            } else {
                None
            }
        })
        .collect();
    corners.sort_unstable();
    corners.dedup();
    // The final point duplicates the pen-down point on a closed stroke;
    // keep only one corner for that location.
    if corners.first() == Some(&0) && corners.last() == Some(&(n - 1)) {
        corners.pop();
    }
    corners
}

// ============================================================================
// VELOCITY
// ============================================================================

/// Per-segment velocities. When both endpoints carry timestamps the time
/// delta is used (clamped to at least 1 unit); otherwise a unit delta is
/// assumed, so the value degrades to plain segment length.
pub fn velocities(points: &[Point]) -> Vec<f64> {
    points
        .windows(2)
        .map(|w| {
            let d = distance(&w[0], &w[1]);
            let dt = match (w[0].time, w[1].time) {
                (Some(t0), Some(t1)) => (t1 - t0).max(1) as f64,
                _ => 1.0,
            };
            d / dt
        })
        .collect()
}

// ============================================================================
// SMALL STATISTICS HELPERS
// ============================================================================

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Population standard deviation; 0 for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Guarded division: 0 when the denominator is 0 or not finite.
pub fn safe_div(num: f64, denom: f64) -> f64 {
    if denom == 0.0 || !denom.is_finite() || !num.is_finite() {
        0.0
    } else {
        num / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_distance_and_path_length() {
        let pts = vec![pt(0.0, 0.0), pt(3.0, 4.0), pt(3.0, 8.0)];
        assert_eq!(distance(&pts[0], &pts[1]), 5.0);
        assert_eq!(path_length(&pts), 9.0);
        assert_eq!(path_length(&pts[..1]), 0.0);
    }

    #[test]
    fn test_bounding_box_degenerate() {
        let bb = bounding_box([].iter());
        assert_eq!((bb.min_x, bb.min_y, bb.max_x, bb.max_y), (0.0, 0.0, 0.0, 0.0));
        assert_eq!(bb.area(), 0.0);
    }

    #[test]
    fn test_centroid() {
        let pts = vec![pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0), pt(0.0, 10.0)];
        assert_eq!(centroid(pts.iter()), (5.0, 5.0));
        assert_eq!(centroid([].iter()), (0.0, 0.0));
    }

    #[test]
    fn test_signed_angle_right_turn() {
        // Right angle at the origin.
        let a = pt(1.0, 0.0);
        let b = pt(0.0, 0.0);
        let c = pt(0.0, 1.0);
        let angle = signed_angle(&a, &b, &c);
        assert!((angle.abs() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_turning_angle_straight_is_zero() {
        let angle = turning_angle(&pt(0.0, 0.0), &pt(1.0, 0.0), &pt(2.0, 0.0));
        assert_eq!(angle, 0.0);
    }

    #[test]
    fn test_turning_angle_degenerate_is_zero() {
        let p = pt(1.0, 1.0);
        assert_eq!(turning_angle(&p, &p, &p), 0.0);
    }

    #[test]
    fn test_curvature_of_known_circle() {
        // Three points on a unit circle: curvature 1.
        let a = pt(1.0, 0.0);
        let b = pt(0.0, 1.0);
        let c = pt(-1.0, 0.0);
        assert!((curvature_3pt(&a, &b, &c) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_curvature_collinear_is_zero() {
        let a = pt(0.0, 0.0);
        let b = pt(1.0, 0.0);
        let c = pt(2.0, 0.0);
        assert_eq!(curvature_3pt(&a, &b, &c), 0.0);
    }

    #[test]
    fn test_corner_detection_on_right_angle_path() {
        // Dense L shape: along x then up y, corner at the bend.
        let mut pts: Vec<Point> = (0..=10).map(|i| pt(i as f64, 0.0)).collect();
        pts.extend((1..=10).map(|i| pt(10.0, i as f64)));
        let corners = default_corners(&pts);
        assert_eq!(corners.len(), 1);
        assert_eq!(corners[0], 10);
    }

    #[test]
    fn test_closed_square_has_four_corners() {
        // Dense closed square, 10 samples per edge, ending where it began.
        let mut pts = Vec::new();
        for i in 0..10 { pts.push(pt(i as f64, 0.0)); }
        for i in 0..10 { pts.push(pt(10.0, i as f64)); }
        for i in 0..10 { pts.push(pt(10.0 - i as f64, 10.0)); }
        for i in 0..10 { pts.push(pt(0.0, 10.0 - i as f64)); }
        pts.push(pt(0.0, 0.0));

        let corners = closed_corner_indices(&pts);
        assert_eq!(corners, vec![0, 10, 20, 30]);
    }

    #[test]
    fn test_no_corners_on_straight_line() {
        let pts: Vec<Point> = (0..30).map(|i| pt(i as f64, 0.0)).collect();
        assert!(default_corners(&pts).is_empty());
    }

    #[test]
    fn test_velocities_with_and_without_time() {
        let timed = vec![
            Point::full(0.0, 0.0, 1.0, 0),
            Point::full(10.0, 0.0, 1.0, 5),
        ];
        assert_eq!(velocities(&timed), vec![2.0]);

        let untimed = vec![pt(0.0, 0.0), pt(10.0, 0.0)];
        assert_eq!(velocities(&untimed), vec![10.0]);
    }

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(1.0, 0.0), 0.0);
        assert_eq!(safe_div(1.0, f64::NAN), 0.0);
        assert_eq!(safe_div(6.0, 3.0), 2.0);
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(std_dev(&[5.0]), 0.0);
        let sd = std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((sd - 2.0).abs() < 1e-12);
    }
}
