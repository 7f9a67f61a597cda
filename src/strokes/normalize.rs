//! Stroke Normalizer
//!
//! Canonicalizes the heterogeneous capture payloads clients actually send
//! into a single `StrokeSet`. Accepted shapes:
//!
//! - a bare array of strokes
//! - an object with a `strokes`, `raw` or `data` key holding either a
//!   stroke array or a flat point array
//! - strokes as `{ "points": [...] }` records or bare point arrays
//! - points as `{x, y, pressure?, time?}` records or `[x, y]` pairs
//! - any of the above nested as JSON-encoded text, unwrapped recursively
//!   up to `MAX_UNWRAP_DEPTH`
//!
//! Invalid points are dropped, strokes left with zero valid points are
//! dropped, and only a payload with zero surviving strokes is fatal.
//! Normalization is pure: the same raw input always yields the same set.

use serde_json::Value;

use crate::constants::{DEFAULT_PRESSURE, MAX_UNWRAP_DEPTH};
use crate::error::NormalizeError;
use crate::strokes::{Point, Stroke, StrokeSet};

/// Keys probed, in order, when the payload is an object.
const PAYLOAD_KEYS: [&str; 3] = ["strokes", "raw", "data"];

/// Normalize an arbitrary raw payload into a `StrokeSet`.
pub fn normalize(raw: &Value) -> Result<StrokeSet, NormalizeError> {
    let mut owned;
    let mut value = raw;

    // Unwrap JSON-encoded text at the top level, bounded.
    let mut depth = 0;
    while let Value::String(text) = value {
        depth += 1;
        if depth > MAX_UNWRAP_DEPTH {
            return Err(NormalizeError::DepthExceeded(MAX_UNWRAP_DEPTH));
        }
        owned = serde_json::from_str::<Value>(text)
            .map_err(|e| NormalizeError::BadJson(e.to_string()))?;
        value = &owned;
    }

    let stroke_list = match value {
        Value::Array(_) => value.clone(),
        Value::Object(map) => {
            let found = PAYLOAD_KEYS.iter().find_map(|k| map.get(*k));
            match found {
                Some(inner) => unwrap_text(inner, depth)?,
                None => return Err(NormalizeError::UnrecognizedShape("object without strokes/raw/data key")),
            }
        }
        _ => return Err(NormalizeError::UnrecognizedShape("expected array or object")),
    };

    let items = match &stroke_list {
        Value::Array(items) => items,
        _ => return Err(NormalizeError::UnrecognizedShape("stroke container is not an array")),
    };

    let mut strokes: Vec<Stroke> = Vec::new();
    // Points appearing directly in the container (flat point array form)
    // accumulate into one implicit stroke.
    let mut loose_points: Vec<Point> = Vec::new();

    for item in items {
        let item = unwrap_text(item, depth)?;
        if let Some(stroke) = decode_stroke(&item) {
            if !stroke.points.is_empty() {
                strokes.push(stroke);
            }
        } else if let Some(point) = decode_point(&item) {
            loose_points.push(point);
        }
        // Anything else is an invalid entry: dropped, not fatal.
    }

    if !loose_points.is_empty() {
        strokes.push(Stroke::new(loose_points));
    }

    if strokes.is_empty() {
        return Err(NormalizeError::Empty);
    }

    Ok(StrokeSet::new(strokes))
}

/// Parse raw JSON text and normalize it.
pub fn normalize_str(raw: &str) -> Result<StrokeSet, NormalizeError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| NormalizeError::BadJson(e.to_string()))?;
    normalize(&value)
}

/// Unwrap a value that may itself be JSON-encoded text, continuing the
/// caller's depth budget.
fn unwrap_text(value: &Value, depth_used: usize) -> Result<Value, NormalizeError> {
    let mut current = value.clone();
    let mut depth = depth_used;
    while let Value::String(text) = &current {
        depth += 1;
        if depth > MAX_UNWRAP_DEPTH {
            return Err(NormalizeError::DepthExceeded(MAX_UNWRAP_DEPTH));
        }
        current = serde_json::from_str::<Value>(text)
            .map_err(|e| NormalizeError::BadJson(e.to_string()))?;
    }
    Ok(current)
}

/// Decode one candidate stroke. Returns `None` if the value is not stroke
/// shaped (it may still be a bare point).
fn decode_stroke(value: &Value) -> Option<Stroke> {
    match value {
        Value::Object(map) => {
            let points_val = map.get("points")?;
            let items = points_val.as_array()?;
            let mut points: Vec<Point> = items.iter().filter_map(decode_point).collect();
            // Capture clients that only timestamp the stroke bounds:
            // interpolate startTime/endTime onto untimed points.
            if points.iter().all(|p| p.time.is_none()) {
                if let (Some(start), Some(end)) =
                    (map.get("startTime").and_then(as_time), map.get("endTime").and_then(as_time))
                {
                    interpolate_times(&mut points, start, end);
                }
            }
            Some(Stroke::new(points))
        }
        Value::Array(items) => {
            // An array is a stroke when its elements are point shaped;
            // a `[x, y]` pair of numbers is a point, not a stroke.
            match items.first() {
                Some(Value::Array(_)) | Some(Value::Object(_)) => {
                    Some(Stroke::new(items.iter().filter_map(decode_point).collect()))
                }
                _ => None,
            }
        }
        _ => None,
    }
}

/// Decode one candidate point: `{x, y, ...}` record or `[x, y]` pair.
fn decode_point(value: &Value) -> Option<Point> {
    match value {
        Value::Object(map) => {
            let x = map.get("x").and_then(Value::as_f64)?;
            let y = map.get("y").and_then(Value::as_f64)?;
            if !x.is_finite() || !y.is_finite() {
                return None;
            }
            let pressure = map
                .get("pressure")
                .and_then(Value::as_f64)
                .filter(|p| p.is_finite())
                .map(|p| p.clamp(0.0, 1.0));
            let time = map.get("time").and_then(as_time);
            Some(Point { x, y, pressure, time })
        }
        Value::Array(items) if items.len() >= 2 => {
            let x = items[0].as_f64()?;
            let y = items[1].as_f64()?;
            if !x.is_finite() || !y.is_finite() {
                return None;
            }
            // Pair form carries no timing; pressure defaults to neutral.
            Some(Point { x, y, pressure: Some(DEFAULT_PRESSURE), time: None })
        }
        _ => None,
    }
}

fn as_time(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}

/// Spread stroke-level start/end timestamps linearly over the points.
fn interpolate_times(points: &mut [Point], start: i64, end: i64) {
    let n = points.len();
    if n == 0 || end < start {
        return;
    }
    if n == 1 {
        points[0].time = Some(start);
        return;
    }
    let span = (end - start) as f64;
    for (i, p) in points.iter_mut().enumerate() {
        let t = start as f64 + span * (i as f64 / (n - 1) as f64);
        p.time = Some(t as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_stroke_array_of_point_records() {
        let raw = json!([[{"x": 1.0, "y": 2.0, "pressure": 0.5, "time": 10}, {"x": 3.0, "y": 4.0}]]);
        let set = normalize(&raw).unwrap();
        assert_eq!(set.stroke_count(), 1);
        assert_eq!(set.strokes[0].points[0].pressure, Some(0.5));
        assert_eq!(set.strokes[0].points[1].pressure, None);
    }

    #[test]
    fn test_object_with_strokes_key() {
        let raw = json!({"strokes": [{"points": [{"x": 0, "y": 0}, {"x": 5, "y": 5}]}]});
        let set = normalize(&raw).unwrap();
        assert_eq!(set.stroke_count(), 1);
        assert_eq!(set.strokes[0].len(), 2);
    }

    #[test]
    fn test_coordinate_pair_form_defaults() {
        let raw = json!({"data": [[[1, 2], [3, 4]], [[5, 6], [7, 8]]]});
        let set = normalize(&raw).unwrap();
        assert_eq!(set.stroke_count(), 2);
        let p = &set.strokes[0].points[0];
        assert_eq!(p.pressure, Some(DEFAULT_PRESSURE));
        assert_eq!(p.time, None);
    }

    #[test]
    fn test_flat_point_array_becomes_one_stroke() {
        let raw = json!({"raw": [{"x": 1, "y": 1}, {"x": 2, "y": 2}, {"x": 3, "y": 3}]});
        let set = normalize(&raw).unwrap();
        assert_eq!(set.stroke_count(), 1);
        assert_eq!(set.strokes[0].len(), 3);
    }

    #[test]
    fn test_json_text_nesting() {
        let inner = json!([[{"x": 1, "y": 2}]]).to_string();
        let raw = json!({ "strokes": inner });
        let set = normalize(&raw).unwrap();
        assert_eq!(set.stroke_count(), 1);

        // Double-encoded still works.
        let double = Value::String(serde_json::to_string(&inner).unwrap());
        let raw2 = json!({ "strokes": double });
        assert_eq!(normalize(&raw2).unwrap(), set);
    }

    #[test]
    fn test_depth_limit() {
        // Encode a valid payload one level past the budget.
        let mut text = json!([[{"x": 1, "y": 2}]]).to_string();
        for _ in 0..MAX_UNWRAP_DEPTH + 1 {
            text = serde_json::to_string(&Value::String(text)).unwrap();
        }
        let err = normalize_str(&text).unwrap_err();
        assert!(matches!(err, NormalizeError::DepthExceeded(_)));
    }

    #[test]
    fn test_invalid_points_dropped_not_fatal() {
        let raw = json!([[{"x": "bad", "y": 0}, {"x": 1, "y": 1}, {"y": 2}]]);
        let set = normalize(&raw).unwrap();
        assert_eq!(set.strokes[0].len(), 1);
    }

    #[test]
    fn test_all_strokes_invalid_is_empty_error() {
        let raw = json!([[{"x": "bad", "y": "bad"}], []]);
        assert!(matches!(normalize(&raw), Err(NormalizeError::Empty)));
    }

    #[test]
    fn test_unrecognized_shape() {
        assert!(matches!(
            normalize(&json!(42)),
            Err(NormalizeError::UnrecognizedShape(_))
        ));
        assert!(matches!(
            normalize(&json!({"nope": []})),
            Err(NormalizeError::UnrecognizedShape(_))
        ));
    }

    #[test]
    fn test_stroke_bound_time_interpolation() {
        let raw = json!({"strokes": [{
            "points": [{"x": 0, "y": 0}, {"x": 1, "y": 0}, {"x": 2, "y": 0}],
            "startTime": 100,
            "endTime": 200
        }]});
        let set = normalize(&raw).unwrap();
        let times: Vec<i64> = set.strokes[0].points.iter().map(|p| p.time.unwrap()).collect();
        assert_eq!(times, vec![100, 150, 200]);
    }

    #[test]
    fn test_idempotence_across_encodings() {
        // Same logical data, three encodings.
        let a = json!([[{"x": 1.0, "y": 2.0}, {"x": 3.0, "y": 4.0}]]);
        let b = json!({"strokes": [{"points": [{"x": 1.0, "y": 2.0}, {"x": 3.0, "y": 4.0}]}]});
        let c = Value::String(a.to_string());

        let sa = normalize(&a).unwrap();
        let sb = normalize(&b).unwrap();
        let sc = normalize(&c).unwrap();
        assert_eq!(sa, sb);
        assert_eq!(sa, sc);

        // Re-encoding the normalized output and normalizing again is stable.
        let reencoded = serde_json::to_value(&sa).unwrap();
        let again = normalize(&reencoded["strokes"]).unwrap();
        assert_eq!(again.point_count(), sa.point_count());
    }
}
