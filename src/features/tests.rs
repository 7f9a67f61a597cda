//! Cross-extractor tests: properties that must hold over the merged
//! record, not any single extractor.

use std::cell::RefCell;
use std::time::Duration;

use crate::features::extract_all_features;
use crate::metrics::{MetricsSink, NopMetrics};
use crate::strokes::{DeviceCapabilities, Point, Stroke, StrokeSet};

fn signature_like_set() -> StrokeSet {
    let mut strokes = Vec::new();
    for s in 0..3 {
        let points = (0..25)
            .map(|i| {
                let t = (s * 400 + i * 12) as i64;
                let x = (s * 40) as f64 + i as f64 * 1.7;
                let y = 20.0 + ((i as f64) * 0.7).sin() * 8.0;
                Point::full(x, y, 0.3 + 0.02 * (i % 10) as f64, t)
            })
            .collect();
        strokes.push(Stroke::new(points));
    }
    StrokeSet::new(strokes)
}

#[test]
fn test_extraction_is_deterministic() {
    let set = signature_like_set();
    let a = extract_all_features(&set, None, &NopMetrics);
    let b = extract_all_features(&set, None, &NopMetrics);
    assert_eq!(a, b);
    // Bit-identical serialized form too.
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn test_exclusion_invariant_over_merged_record() {
    // No pressure anywhere: the merged record must carry the exclusions
    // and no pressure value may survive the merge.
    let set = StrokeSet::new(vec![Stroke::new(vec![
        Point::new(0.0, 0.0),
        Point::new(5.0, 5.0),
        Point::new(10.0, 0.0),
    ])]);
    let record = extract_all_features(&set, None, &NopMetrics);

    assert_eq!(record.has_pressure_data, Some(false));
    for name in &record.excluded {
        assert!(
            record.values.get(name).is_none(),
            "excluded feature {} still has a value",
            name
        );
        assert!(!record.supported.contains(name));
    }
    assert!(record.excluded.contains("avg_pressure"));
    assert!(record.excluded.len() >= 8);
}

#[test]
fn test_device_capability_gate() {
    let set = signature_like_set();
    let caps = DeviceCapabilities { supports_pressure: Some(false), supports_tilt: None };
    let record = extract_all_features(&set, Some(&caps), &NopMetrics);
    assert_eq!(record.has_pressure_data, Some(false));
    assert!(record.is_excluded("pressure_std"));
}

#[test]
fn test_degenerate_input_never_panics_or_poisons() {
    let set = StrokeSet::new(vec![Stroke::new(vec![Point::new(7.0, 7.0); 4])]);
    let record = extract_all_features(&set, None, &NopMetrics);
    for (name, value) in &record.values {
        assert!(value.is_finite(), "{} is not finite: {}", name, value);
    }
}

#[test]
fn test_metrics_sink_sees_every_extractor() {
    struct Names(RefCell<Vec<String>>);
    impl MetricsSink for Names {
        fn record_extraction(&self, extractor: &str, _: Duration, _: usize, _: usize) {
            self.0.borrow_mut().push(extractor.to_string());
        }
    }

    let sink = Names(RefCell::new(Vec::new()));
    extract_all_features(&signature_like_set(), None, &sink);
    let names = sink.0.borrow();
    assert_eq!(
        names.as_slice(),
        ["pressure", "timing", "geometric", "security", "stats"]
    );
}
