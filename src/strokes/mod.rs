//! Stroke data model.
//!
//! A `Point` is one timestamped, pressure-aware pen/touch sample, a
//! `Stroke` one continuous contact gesture, a `StrokeSet` one complete
//! drawing instance (signature, shape, or template drawing). All three
//! are immutable once produced by the normalizer; draw order is
//! meaningful and preserved.

use serde::{Deserialize, Serialize};

pub mod normalize;

// ============================================================================
// POINT
// ============================================================================

/// One captured pen/touch sample.
///
/// `pressure` is in `[0, 1]` when the device reports it; `time` is a
/// monotonic capture timestamp. Both are optional and their absence must
/// never abort extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, pressure: None, time: None }
    }

    pub fn with_pressure(x: f64, y: f64, pressure: f64) -> Self {
        Self { x, y, pressure: Some(pressure), time: None }
    }

    pub fn full(x: f64, y: f64, pressure: f64, time: i64) -> Self {
        Self { x, y, pressure: Some(pressure), time: Some(time) }
    }
}

// ============================================================================
// STROKE
// ============================================================================

/// One continuous contact gesture. Non-empty after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<Point>,
}

impl Stroke {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First point timestamp, if any point carries one.
    pub fn start_time(&self) -> Option<i64> {
        self.points.iter().find_map(|p| p.time)
    }

    /// Last point timestamp, if any point carries one.
    pub fn end_time(&self) -> Option<i64> {
        self.points.iter().rev().find_map(|p| p.time)
    }

    /// Stroke duration in time units, when both ends are timestamped.
    pub fn duration(&self) -> Option<i64> {
        match (self.start_time(), self.end_time()) {
            (Some(s), Some(e)) if e >= s => Some(e - s),
            _ => None,
        }
    }
}

// ============================================================================
// STROKE SET
// ============================================================================

/// All strokes of one drawing instance, in draw order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeSet {
    pub strokes: Vec<Stroke>,
}

impl StrokeSet {
    pub fn new(strokes: Vec<Stroke>) -> Self {
        Self { strokes }
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() || self.strokes.iter().all(|s| s.is_empty())
    }

    /// Total number of points across all strokes.
    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(|s| s.len()).sum()
    }

    /// Iterate over every point of every stroke, in draw order.
    pub fn all_points(&self) -> impl Iterator<Item = &Point> {
        self.strokes.iter().flat_map(|s| s.points.iter())
    }

    /// True if any point carries a pressure sample above zero.
    pub fn has_pressure(&self) -> bool {
        self.all_points().any(|p| p.pressure.map_or(false, |v| v > 0.0))
    }

    /// True if any point carries a timestamp.
    pub fn has_timestamps(&self) -> bool {
        self.all_points().any(|p| p.time.is_some())
    }
}

// ============================================================================
// DEVICE CAPABILITIES
// ============================================================================

/// Optional capability flags reported by the capture client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    #[serde(default, rename = "supportsPressure")]
    pub supports_pressure: Option<bool>,
    #[serde(default, rename = "supportsTilt")]
    pub supports_tilt: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_with_times() -> StrokeSet {
        StrokeSet::new(vec![Stroke::new(vec![
            Point::full(0.0, 0.0, 0.5, 100),
            Point::full(10.0, 0.0, 0.6, 150),
        ])])
    }

    #[test]
    fn test_stroke_duration() {
        let set = set_with_times();
        assert_eq!(set.strokes[0].duration(), Some(50));
    }

    #[test]
    fn test_duration_missing_timestamps() {
        let stroke = Stroke::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        assert_eq!(stroke.duration(), None);
    }

    #[test]
    fn test_has_pressure_ignores_zero() {
        let set = StrokeSet::new(vec![Stroke::new(vec![Point::with_pressure(0.0, 0.0, 0.0)])]);
        assert!(!set.has_pressure());
        assert!(set_with_times().has_pressure());
    }

    #[test]
    fn test_point_count() {
        assert_eq!(set_with_times().point_count(), 2);
    }
}
