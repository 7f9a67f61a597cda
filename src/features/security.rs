//! Security / anomaly indicator extraction.
//!
//! Heuristics for traced, replayed or mechanically reproduced drawings.
//! The thresholds are empirically chosen constants (see `constants.rs`).
//! When the data is too thin to judge, indicators degrade to the neutral
//! mid-range 0.5 so a missing sensor biases authentication in neither
//! direction.

use crate::constants::{
    PRESSURE_ANOMALY_DELTA, SPEED_CONSISTENCY_WINDOW, UNNATURAL_PAUSE_DISTANCE,
    UNNATURAL_PAUSE_GAP,
};
use crate::features::FeatureRecord;
use crate::geometry::{distance, mean, std_dev, velocities};
use crate::strokes::StrokeSet;

pub const SECURITY_FEATURES: [&str; 6] = [
    "unnatural_pause_count",
    "speed_anomaly_ratio",
    "pressure_anomaly_count",
    "timing_regularity",
    "device_consistency",
    "behavioral_authenticity_score",
];

const NEUTRAL: f64 = 0.5;

pub fn extract(set: &StrokeSet) -> FeatureRecord {
    let mut record = FeatureRecord::new();

    let unnatural_pauses = count_unnatural_pauses(set);
    let speed_ratio = speed_anomaly_ratio(set);
    let pressure_anomalies = count_pressure_anomalies(set);
    let timing_regularity = timing_regularity(set);
    let device_consistency = if set.has_pressure() { 1.0 } else { NEUTRAL };

    let authenticity = behavioral_authenticity(
        set,
        unnatural_pauses,
        speed_ratio,
        pressure_anomalies,
        timing_regularity,
        device_consistency,
    );

    record.insert("unnatural_pause_count", unnatural_pauses as f64);
    record.insert("speed_anomaly_ratio", speed_ratio);
    record.insert("pressure_anomaly_count", pressure_anomalies as f64);
    record.insert("timing_regularity", timing_regularity);
    record.insert("device_consistency", device_consistency);
    record.insert("behavioral_authenticity_score", authenticity);

    record
}

/// Long in-stroke time gaps with near-zero displacement: the pen stopped
/// while the forger checked the template.
fn count_unnatural_pauses(set: &StrokeSet) -> usize {
    let mut count = 0;
    for stroke in &set.strokes {
        for w in stroke.points.windows(2) {
            let (Some(t0), Some(t1)) = (w[0].time, w[1].time) else { continue };
            if t1 - t0 > UNNATURAL_PAUSE_GAP && distance(&w[0], &w[1]) < UNNATURAL_PAUSE_DISTANCE {
                count += 1;
            }
        }
    }
    count
}

/// Fraction of consecutive velocity samples that differ by less than the
/// speed-consistency window. Human motion varies; a high ratio suggests
/// mechanical reproduction. Neutral 0.5 when there are too few samples.
fn speed_anomaly_ratio(set: &StrokeSet) -> f64 {
    let mut consistent = 0usize;
    let mut total = 0usize;
    for stroke in &set.strokes {
        let vels = velocities(&stroke.points);
        for w in vels.windows(2) {
            let base = w[0].abs().max(1e-9);
            total += 1;
            if ((w[1] - w[0]).abs() / base) < SPEED_CONSISTENCY_WINDOW {
                consistent += 1;
            }
        }
    }
    if total < 2 {
        NEUTRAL
    } else {
        consistent as f64 / total as f64
    }
}

/// Adjacent pressure jumps larger than the anomaly delta.
fn count_pressure_anomalies(set: &StrokeSet) -> usize {
    let mut count = 0;
    for stroke in &set.strokes {
        for w in stroke.points.windows(2) {
            let (Some(p0), Some(p1)) = (w[0].pressure, w[1].pressure) else { continue };
            if (p1 - p0).abs() > PRESSURE_ANOMALY_DELTA {
                count += 1;
            }
        }
    }
    count
}

/// Coefficient of variation of the stroke durations. Neutral 0.5 when
/// fewer than two timed strokes exist.
fn timing_regularity(set: &StrokeSet) -> f64 {
    let durations: Vec<f64> = set
        .strokes
        .iter()
        .filter_map(|s| s.duration())
        .map(|d| d as f64)
        .collect();
    if durations.len() < 2 {
        return NEUTRAL;
    }
    let m = mean(&durations);
    if m == 0.0 {
        return NEUTRAL;
    }
    std_dev(&durations) / m
}

/// Composite of five 0 / 0.5 / 1 sub-factors. Insufficient data for a
/// factor scores it 0.5, never 0 or 1.
fn behavioral_authenticity(
    set: &StrokeSet,
    unnatural_pauses: usize,
    speed_ratio: f64,
    pressure_anomalies: usize,
    timing_regularity: f64,
    device_consistency: f64,
) -> f64 {
    // 1. Pauses: none is natural, one is suspicious, more is damning.
    let pause_factor = match unnatural_pauses {
        0 => 1.0,
        1 => 0.5,
        _ => 0.0,
    };

    // 2. Speed variability: humans rarely keep velocity within 5%.
    let speed_factor = if !set.has_timestamps() {
        NEUTRAL
    } else if speed_ratio < 0.3 {
        1.0
    } else if speed_ratio < 0.6 {
        0.5
    } else {
        0.0
    };

    // 3. Pressure continuity.
    let pressure_factor = if !set.has_pressure() {
        NEUTRAL
    } else if pressure_anomalies == 0 {
        1.0
    } else if pressure_anomalies <= 2 {
        0.5
    } else {
        0.0
    };

    // 4. Timing variation: a coefficient of variation near zero means
    // machine-regular strokes.
    let timing_factor = if !set.has_timestamps() {
        NEUTRAL
    } else if timing_regularity < 0.05 {
        0.0
    } else if timing_regularity < 0.1 {
        0.5
    } else {
        1.0
    };

    // 5. Device signal presence.
    let device_factor = if device_consistency >= 1.0 { 1.0 } else { NEUTRAL };

    (pause_factor + speed_factor + pressure_factor + timing_factor + device_factor) / 5.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strokes::{Point, Stroke};

    fn bare_set() -> StrokeSet {
        StrokeSet::new(vec![Stroke::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 5.0),
        ])])
    }

    #[test]
    fn test_insufficient_data_is_neutral() {
        let record = extract(&bare_set());

        assert_eq!(record.get("device_consistency"), Some(0.5));
        assert_eq!(record.get("timing_regularity"), Some(0.5));
        // No timestamps, no pressure: three of five factors neutral, the
        // pause and speed-sample factors resolve from what little exists.
        let score = record.get("behavioral_authenticity_score").unwrap();
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn test_unnatural_pause_detection() {
        // 500-unit stall with sub-threshold movement mid-stroke.
        let set = StrokeSet::new(vec![Stroke::new(vec![
            Point::full(0.0, 0.0, 0.5, 0),
            Point::full(10.0, 0.0, 0.5, 20),
            Point::full(10.5, 0.0, 0.5, 520),
            Point::full(20.0, 0.0, 0.5, 540),
        ])]);
        let record = extract(&set);
        assert_eq!(record.get("unnatural_pause_count"), Some(1.0));
    }

    #[test]
    fn test_mechanical_speed_flagged() {
        // Perfectly even spacing and timing: every velocity identical.
        let points: Vec<Point> = (0..30)
            .map(|i| Point::full(i as f64 * 5.0, 0.0, 0.5, i as i64 * 10))
            .collect();
        let set = StrokeSet::new(vec![Stroke::new(points)]);
        let record = extract(&set);
        assert_eq!(record.get("speed_anomaly_ratio"), Some(1.0));
    }

    #[test]
    fn test_pressure_jump_counted() {
        let set = StrokeSet::new(vec![Stroke::new(vec![
            Point::with_pressure(0.0, 0.0, 0.1),
            Point::with_pressure(1.0, 0.0, 0.9),
            Point::with_pressure(2.0, 0.0, 0.85),
        ])]);
        let record = extract(&set);
        assert_eq!(record.get("pressure_anomaly_count"), Some(1.0));
        assert_eq!(record.get("device_consistency"), Some(1.0));
    }

    #[test]
    fn test_all_indicators_finite_on_single_point() {
        let set = StrokeSet::new(vec![Stroke::new(vec![Point::new(3.0, 3.0)])]);
        let record = extract(&set);
        for name in SECURITY_FEATURES {
            assert!(record.get(name).unwrap().is_finite());
        }
    }
}
