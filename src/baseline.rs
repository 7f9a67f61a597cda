//! Baseline aggregation and rule-based similarity scoring.
//!
//! A `Baseline` condenses a user's enrollment drawings into per-feature
//! statistics. Scoring a fresh attempt against it is a weighted
//! normalized-difference average mapped onto `[5, 100]`; the floor keeps
//! measurement noise from ever producing an absolute-zero score.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::compare::ComparisonResult;
use crate::constants::{DEVIATION_PENALTY, MIN_ENROLLMENT_SAMPLES, SCORE_FLOOR};
use crate::error::BaselineError;
use crate::features::FeatureRecord;

// ============================================================================
// BASELINE MODEL
// ============================================================================

/// Aggregate statistics for one feature across enrollment records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureStat {
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two samples.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stddev: Option<f64>,
    pub sample_count: usize,
}

/// A user's enrolled behavioral profile for one template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Baseline {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Number of enrollment records aggregated.
    pub sample_count: usize,
    pub features: BTreeMap<String, FeatureStat>,
    pub supported_features: BTreeSet<String>,
    pub excluded_features: BTreeSet<String>,
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Build a baseline from enrollment feature records.
///
/// A feature name excluded in ANY record is excluded from the whole
/// baseline; a device that failed to report pressure once cannot anchor
/// a pressure expectation. Features with zero valid samples are omitted
/// entirely, never defaulted.
pub fn build_baseline(records: &[FeatureRecord]) -> Result<Baseline, BaselineError> {
    if records.len() < MIN_ENROLLMENT_SAMPLES {
        return Err(BaselineError::NotEnoughSamples {
            required: MIN_ENROLLMENT_SAMPLES,
            got: records.len(),
        });
    }

    let mut supported: BTreeSet<String> = BTreeSet::new();
    let mut excluded: BTreeSet<String> = BTreeSet::new();
    for record in records {
        supported.extend(record.supported.iter().cloned());
        excluded.extend(record.excluded.iter().cloned());
    }
    for name in &excluded {
        supported.remove(name);
    }

    let mut features = BTreeMap::new();
    for name in &supported {
        let samples: Vec<f64> = records
            .iter()
            .filter(|r| !r.is_excluded(name))
            .filter_map(|r| r.get(name))
            .collect();
        if samples.is_empty() {
            continue;
        }
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let stddev = if samples.len() >= 2 {
            let var = samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                / (samples.len() - 1) as f64;
            Some(var.sqrt())
        } else {
            None
        };
        features.insert(
            name.clone(),
            FeatureStat { mean, stddev, sample_count: samples.len() },
        );
    }

    log::info!(
        "baseline built from {} records: {} features, {} excluded",
        records.len(),
        features.len(),
        excluded.len()
    );

    Ok(Baseline {
        id: Uuid::new_v4(),
        created_at: Utc::now(),
        sample_count: records.len(),
        features,
        supported_features: supported,
        excluded_features: excluded,
    })
}

// ============================================================================
// SCORING
// ============================================================================

/// Feature families carry different discriminative weight; pressure is
/// the hardest to forge, velocity close behind.
fn family_weight(name: &str) -> f64 {
    if name.contains("velocity") {
        1.5
    } else if name.contains("pressure") {
        2.0
    } else if name.contains("duration") {
        1.2
    } else if name.contains("stroke") {
        1.3
    } else {
        1.0
    }
}

/// Score a fresh attempt's features against a baseline.
///
/// For each feature in the baseline's supported set that the current
/// record also carries, the normalized absolute difference from the
/// baseline mean is weighted by family and averaged, then mapped to
/// `score = clamp(100 - avg * 50, 5, 100)`.
pub fn score_against_baseline(current: &FeatureRecord, baseline: &Baseline) -> ComparisonResult {
    let mut subscores = BTreeMap::new();
    let mut weighted_sum = 0.0;
    let mut compared = 0usize;

    for name in &baseline.supported_features {
        let Some(stat) = baseline.features.get(name) else { continue };
        if current.is_excluded(name) {
            continue;
        }
        let Some(value) = current.get(name) else { continue };

        let diff = if stat.mean > 0.0 {
            (value - stat.mean).abs() / stat.mean
        } else {
            (value - stat.mean).abs()
        };
        subscores.insert(name.clone(), diff);
        weighted_sum += family_weight(name) * diff;
        compared += 1;
    }

    if compared == 0 {
        return ComparisonResult::rejected("no comparable features between record and baseline");
    }

    let avg = weighted_sum / compared as f64;
    let score = (100.0 - avg * DEVIATION_PENALTY).clamp(SCORE_FLOOR, 100.0);

    log::debug!(
        "baseline score: {} features compared, avg weighted diff {:.4} -> {:.1}",
        compared,
        avg,
        score
    );

    let mut detail = BTreeMap::new();
    detail.insert("features_compared".into(), json!(compared));
    detail.insert("avg_weighted_difference".into(), json!(avg));
    detail.insert("baseline_id".into(), json!(baseline.id));

    ComparisonResult { score, subscores, detail }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ExclusionReason;

    fn record(pairs: &[(&str, f64)]) -> FeatureRecord {
        let mut r = FeatureRecord::new();
        for (name, value) in pairs {
            r.supported.insert((*name).into());
            r.insert(name, *value);
        }
        r
    }

    fn enrollment() -> Vec<FeatureRecord> {
        vec![
            record(&[("average_velocity", 10.0), ("total_duration_ms", 500.0)]),
            record(&[("average_velocity", 12.0), ("total_duration_ms", 520.0)]),
            record(&[("average_velocity", 11.0)]),
        ]
    }

    #[test]
    fn test_too_few_records() {
        let records = enrollment()[..2].to_vec();
        let err = build_baseline(&records).unwrap_err();
        assert!(matches!(err, BaselineError::NotEnoughSamples { required: 3, got: 2 }));
    }

    #[test]
    fn test_partial_feature_aggregation() {
        let baseline = build_baseline(&enrollment()).unwrap();

        let velocity = &baseline.features["average_velocity"];
        assert_eq!(velocity.sample_count, 3);
        assert!((velocity.mean - 11.0).abs() < 1e-9);
        assert!(velocity.stddev.is_some());

        // Present in only two of three records: averaged over those two.
        let duration = &baseline.features["total_duration_ms"];
        assert_eq!(duration.sample_count, 2);
        assert!((duration.mean - 510.0).abs() < 1e-9);
    }

    #[test]
    fn test_excluded_anywhere_excluded_everywhere() {
        let mut records = enrollment();
        records[2].exclude("average_pressure", ExclusionReason::NoPressureDataCollected);
        records[0].supported.insert("average_pressure".into());
        records[0].insert("average_pressure", 0.6);

        let baseline = build_baseline(&records).unwrap();
        assert!(!baseline.features.contains_key("average_pressure"));
        assert!(!baseline.supported_features.contains("average_pressure"));
        assert!(baseline.excluded_features.contains("average_pressure"));
    }

    #[test]
    fn test_absent_feature_omitted_not_zeroed() {
        let mut records = enrollment();
        for r in &mut records {
            r.supported.insert("phantom_feature".into());
        }
        let baseline = build_baseline(&records).unwrap();
        assert!(!baseline.features.contains_key("phantom_feature"));
    }

    #[test]
    fn test_identical_record_scores_100() {
        let baseline = build_baseline(&enrollment()).unwrap();
        let current = record(&[("average_velocity", 11.0), ("total_duration_ms", 510.0)]);
        let result = score_against_baseline(&current, &baseline);
        assert_eq!(result.score, 100.0);
    }

    #[test]
    fn test_wild_deviation_hits_floor_not_zero() {
        let baseline = build_baseline(&enrollment()).unwrap();
        let current = record(&[("average_velocity", 5000.0), ("total_duration_ms", 9.0)]);
        let result = score_against_baseline(&current, &baseline);
        assert_eq!(result.score, 5.0);
    }

    #[test]
    fn test_score_bounds() {
        let baseline = build_baseline(&enrollment()).unwrap();
        for v in [0.0, 5.0, 11.0, 20.0, 1000.0] {
            let current = record(&[("average_velocity", v)]);
            let result = score_against_baseline(&current, &baseline);
            assert!(result.score >= 5.0 && result.score <= 100.0, "score {}", result.score);
        }
    }

    #[test]
    fn test_no_overlap_is_rejection_not_panic() {
        let baseline = build_baseline(&enrollment()).unwrap();
        let current = record(&[("unrelated", 1.0)]);
        let result = score_against_baseline(&current, &baseline);
        assert_eq!(result.score, 0.0);
        assert!(result.detail.contains_key("error"));
    }
}
