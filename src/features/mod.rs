//! Features Module - Domain Feature Extraction
//!
//! Four behavioral extractors (pressure, timing, geometric, security)
//! plus the signature statistics block, all consuming a normalized
//! `StrokeSet` and producing a `FeatureRecord`. Extractors never fail on
//! normalized input; a feature the data cannot support is *excluded* with
//! a reason, which is not the same thing as being zero.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::metrics::MetricsSink;
use crate::strokes::{DeviceCapabilities, StrokeSet};

pub mod geometric;
pub mod pressure;
pub mod security;
pub mod stats;
pub mod timing;

#[cfg(test)]
mod tests;

// ============================================================================
// EXCLUSION REASONS
// ============================================================================

/// Why a feature family was excluded from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    DeviceDoesNotSupportPressure,
    NoPressureDataCollected,
}

// ============================================================================
// FEATURE RECORD
// ============================================================================

/// Flat feature-name → value mapping plus explicit exclusion metadata.
///
/// Invariant: a name present in `excluded` never has an entry in
/// `values`. `insert`/`exclude` enforce this; callers must treat an
/// excluded feature as unavailable, not as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub values: BTreeMap<String, f64>,
    pub excluded: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusion_reason: Option<ExclusionReason>,
    pub supported: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_pressure_data: Option<bool>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a computed feature value. Non-finite values are clamped to
    /// 0 (numeric faults must not escape the record), and excluded names
    /// are refused.
    pub fn insert(&mut self, name: &str, value: f64) {
        if self.excluded.contains(name) {
            return;
        }
        let v = if value.is_finite() { value } else { 0.0 };
        self.values.insert(name.to_string(), v);
        self.supported.insert(name.to_string());
    }

    /// Exclude a feature, discarding any computed value for it.
    pub fn exclude(&mut self, name: &str, reason: ExclusionReason) {
        self.values.remove(name);
        self.supported.remove(name);
        self.excluded.insert(name.to_string());
        self.exclusion_reason = Some(reason);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.contains(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fold another record into this one. Values of names excluded on
    /// either side are dropped; exclusions and supported sets are
    /// unioned; pressure availability is taken from whichever record
    /// knows it.
    pub fn merge(&mut self, other: FeatureRecord) {
        for name in &other.excluded {
            self.values.remove(name);
            self.supported.remove(name);
            self.excluded.insert(name.clone());
        }
        for (name, value) in other.values {
            if !self.excluded.contains(&name) {
                self.values.insert(name.clone(), value);
                self.supported.insert(name);
            }
        }
        for name in other.supported {
            if !self.excluded.contains(&name) {
                self.supported.insert(name);
            }
        }
        if self.exclusion_reason.is_none() {
            self.exclusion_reason = other.exclusion_reason;
        }
        if other.has_pressure_data.is_some() {
            self.has_pressure_data = other.has_pressure_data;
        }
    }
}

// ============================================================================
// FULL EXTRACTION
// ============================================================================

/// Run every extractor over a normalized drawing and merge the records.
///
/// Never fails: extractors degrade to their documented defaults. Each
/// extractor's wall time is reported through the metrics sink.
pub fn extract_all_features(
    set: &StrokeSet,
    capabilities: Option<&DeviceCapabilities>,
    metrics: &dyn MetricsSink,
) -> FeatureRecord {
    let mut record = FeatureRecord::new();

    let extractors: [(&str, fn(&StrokeSet, Option<&DeviceCapabilities>) -> FeatureRecord); 5] = [
        ("pressure", pressure::extract),
        ("timing", |s, _| timing::extract(s)),
        ("geometric", |s, _| geometric::extract(s)),
        ("security", |s, _| security::extract(s)),
        ("stats", |s, _| stats::extract(s)),
    ];

    for (name, run) in extractors {
        let started = Instant::now();
        let partial = run(set, capabilities);
        metrics.record_extraction(name, started.elapsed(), partial.values.len(), partial.excluded.len());
        record.merge(partial);
    }

    record
}
