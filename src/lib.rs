//! Stroke-based biometric feature and similarity engine.
//!
//! Turns raw hand-drawn capture payloads into normalized stroke sets,
//! extracts behavioral feature records from them, analyzes drawings
//! against shape templates, compares a stored drawing with a fresh
//! attempt, and scores attempts against enrolled baselines — locally by
//! rule, or through a remote ML scorer with silent fallback.
//!
//! Typical flow:
//!
//! ```no_run
//! use signature_auth_core::features::extract_all_features;
//! use signature_auth_core::metrics::NopMetrics;
//! use signature_auth_core::strokes::normalize::normalize_str;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let set = normalize_str(r#"{"strokes": [[[0, 0], [5, 5], [10, 0]]]}"#)?;
//! let record = extract_all_features(&set, None, &NopMetrics);
//! println!("{} features", record.len());
//! # Ok(())
//! # }
//! ```

pub mod baseline;
pub mod compare;
pub mod constants;
pub mod error;
pub mod features;
pub mod geometry;
pub mod metrics;
pub mod scoring;
pub mod strokes;
pub mod templates;

pub use baseline::{build_baseline, score_against_baseline, Baseline, FeatureStat};
pub use compare::{compare_drawings, ComparisonResult};
pub use error::{BaselineError, NormalizeError, RemoteScoreError};
pub use features::{extract_all_features, ExclusionReason, FeatureRecord};
pub use scoring::{RemoteScorer, RuleBasedScorer, ScoreRequest, ScorerWithFallback, ScoringBackend};
pub use strokes::normalize::{normalize, normalize_str};
pub use strokes::{DeviceCapabilities, Point, Stroke, StrokeSet};
pub use templates::{analyze, DescriptorMap, TemplateType};
