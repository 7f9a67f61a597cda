//! Pressure feature extraction.
//!
//! The only extractor that can genuinely lack its input: capacitive
//! screens and mice report no pressure at all. When the device declares
//! no support, or no point carries a positive sample, every pressure
//! feature is excluded with a reason instead of being faked as zero.

use crate::features::{ExclusionReason, FeatureRecord};
use crate::geometry::{mean, std_dev};
use crate::strokes::{DeviceCapabilities, Stroke, StrokeSet};

/// The eight pressure feature names, excluded as a block when the data
/// cannot support them.
pub const PRESSURE_FEATURES: [&str; 8] = [
    "avg_pressure",
    "max_pressure",
    "min_pressure",
    "pressure_std",
    "pressure_range",
    "contact_time_ratio",
    "pressure_buildup_rate",
    "pressure_release_rate",
];

pub fn extract(set: &StrokeSet, capabilities: Option<&DeviceCapabilities>) -> FeatureRecord {
    let mut record = FeatureRecord::new();

    let device_supports = capabilities.and_then(|c| c.supports_pressure).unwrap_or(true);
    if !device_supports {
        return excluded_record(record, ExclusionReason::DeviceDoesNotSupportPressure);
    }

    let samples: Vec<f64> = set
        .all_points()
        .filter_map(|p| p.pressure)
        .collect();

    if !samples.iter().any(|&p| p > 0.0) {
        return excluded_record(record, ExclusionReason::NoPressureDataCollected);
    }

    record.has_pressure_data = Some(true);

    let avg = mean(&samples);
    let max = samples.iter().cloned().fold(f64::MIN, f64::max);
    let min = samples.iter().cloned().fold(f64::MAX, f64::min);

    record.insert("avg_pressure", avg);
    record.insert("max_pressure", max);
    record.insert("min_pressure", min);
    record.insert("pressure_std", std_dev(&samples));
    record.insert("pressure_range", max - min);

    // Fraction of samples actually in contact (pressure above zero).
    let in_contact = samples.iter().filter(|&&p| p > 0.0).count();
    record.insert("contact_time_ratio", in_contact as f64 / samples.len() as f64);

    let (buildup, release) = buildup_release_rates(&set.strokes);
    record.insert("pressure_buildup_rate", buildup);
    record.insert("pressure_release_rate", release);

    record
}

fn excluded_record(mut record: FeatureRecord, reason: ExclusionReason) -> FeatureRecord {
    record.has_pressure_data = Some(false);
    for name in PRESSURE_FEATURES {
        record.exclude(name, reason);
    }
    record
}

/// Per-stroke pressure slopes over the first and last quartile of
/// in-stroke samples, averaged across strokes. Buildup is positive when
/// pressure rises at the start, release positive when it falls at the
/// end.
fn buildup_release_rates(strokes: &[Stroke]) -> (f64, f64) {
    let mut buildups = Vec::new();
    let mut releases = Vec::new();

    for stroke in strokes {
        let pressures: Vec<f64> = stroke.points.iter().filter_map(|p| p.pressure).collect();
        let n = pressures.len();
        if n < 2 {
            continue;
        }
        let q = (n / 4).max(1);

        let first = &pressures[..q.min(n)];
        let last = &pressures[n - q.min(n)..];

        if first.len() >= 1 {
            let span = first.len().max(1) as f64;
            buildups.push((first[first.len() - 1] - pressures[0]) / span);
        }
        if last.len() >= 1 {
            let span = last.len().max(1) as f64;
            releases.push((last[0] - pressures[n - 1]) / span);
        }
    }

    (mean(&buildups), mean(&releases))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strokes::Point;

    fn set_from_pressures(pressures: &[f64]) -> StrokeSet {
        let points = pressures
            .iter()
            .enumerate()
            .map(|(i, &p)| Point::with_pressure(i as f64, 0.0, p))
            .collect();
        StrokeSet::new(vec![Stroke::new(points)])
    }

    #[test]
    fn test_basic_pressure_stats() {
        let set = set_from_pressures(&[0.2, 0.4, 0.6, 0.8]);
        let record = extract(&set, None);

        assert_eq!(record.has_pressure_data, Some(true));
        assert_eq!(record.get("avg_pressure"), Some(0.5));
        assert_eq!(record.get("max_pressure"), Some(0.8));
        assert_eq!(record.get("min_pressure"), Some(0.2));
        assert!((record.get("pressure_range").unwrap() - 0.6).abs() < 1e-12);
        assert_eq!(record.get("contact_time_ratio"), Some(1.0));
    }

    #[test]
    fn test_no_pressure_data_excludes_all_eight() {
        let set = StrokeSet::new(vec![Stroke::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
        ])]);
        let record = extract(&set, None);

        assert_eq!(record.has_pressure_data, Some(false));
        assert_eq!(record.exclusion_reason, Some(ExclusionReason::NoPressureDataCollected));
        for name in PRESSURE_FEATURES {
            assert!(record.is_excluded(name), "{} should be excluded", name);
            assert!(record.get(name).is_none());
        }
    }

    #[test]
    fn test_device_without_pressure_support() {
        let set = set_from_pressures(&[0.5, 0.6]);
        let caps = DeviceCapabilities { supports_pressure: Some(false), supports_tilt: None };
        let record = extract(&set, Some(&caps));

        assert_eq!(record.has_pressure_data, Some(false));
        assert_eq!(
            record.exclusion_reason,
            Some(ExclusionReason::DeviceDoesNotSupportPressure)
        );
        assert!(record.is_excluded("pressure_buildup_rate"));
    }

    #[test]
    fn test_all_zero_pressure_counts_as_no_data() {
        let set = set_from_pressures(&[0.0, 0.0, 0.0]);
        let record = extract(&set, None);
        assert_eq!(record.has_pressure_data, Some(false));
        assert_eq!(record.exclusion_reason, Some(ExclusionReason::NoPressureDataCollected));
    }

    #[test]
    fn test_buildup_and_release_sign() {
        // Pressure ramps up over the first quartile and falls at the end.
        let set = set_from_pressures(&[0.1, 0.2, 0.5, 0.8, 0.8, 0.8, 0.5, 0.2]);
        let record = extract(&set, None);
        assert!(record.get("pressure_buildup_rate").unwrap() > 0.0);
        assert!(record.get("pressure_release_rate").unwrap() > 0.0);
    }

    #[test]
    fn test_degenerate_single_point() {
        let set = set_from_pressures(&[0.7]);
        let record = extract(&set, None);
        // One sample: stats finite, slopes neutral.
        assert_eq!(record.get("avg_pressure"), Some(0.7));
        assert_eq!(record.get("pressure_std"), Some(0.0));
        assert_eq!(record.get("pressure_buildup_rate"), Some(0.0));
    }
}
