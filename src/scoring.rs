//! Scoring backends.
//!
//! The rule-based scorer in `baseline` is always available and always
//! authoritative as a fallback. A remote ML scorer can be layered on
//! top; when it answers in time its confidence supersedes the local
//! score, and when it fails in any way the caller never notices.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::baseline::{score_against_baseline, Baseline};
use crate::compare::ComparisonResult;
use crate::constants::{get_remote_scorer_url, get_remote_timeout_ms};
use crate::error::RemoteScoreError;
use crate::features::FeatureRecord;

// ============================================================================
// BACKEND PORT
// ============================================================================

/// One scoring request: a fresh attempt's features against a baseline.
#[derive(Debug, Clone, Copy)]
pub struct ScoreRequest<'a> {
    pub username: &'a str,
    pub baseline: &'a Baseline,
    pub current: &'a FeatureRecord,
}

pub trait ScoringBackend {
    fn name(&self) -> &'static str;

    fn score(&self, request: &ScoreRequest<'_>) -> Result<ComparisonResult, RemoteScoreError>;
}

// ============================================================================
// RULE-BASED SCORER
// ============================================================================

/// Local weighted-deviation scorer. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedScorer;

impl ScoringBackend for RuleBasedScorer {
    fn name(&self) -> &'static str {
        "rule_based"
    }

    fn score(&self, request: &ScoreRequest<'_>) -> Result<ComparisonResult, RemoteScoreError> {
        Ok(score_against_baseline(request.current, request.baseline))
    }
}

// ============================================================================
// REMOTE SCORER
// ============================================================================

#[derive(Debug, Deserialize)]
struct RemoteScoreResponse {
    confidence_score: f64,
}

/// HTTP scorer speaking the ML service's verification contract:
/// a POST of the baseline and current features, answered with a
/// `confidence_score` in `[0, 100]`.
#[derive(Debug, Clone)]
pub struct RemoteScorer {
    url: String,
    timeout: Duration,
}

impl RemoteScorer {
    pub fn new(url: String, timeout: Duration) -> Self {
        Self { url, timeout }
    }

    /// Build from `SIG_REMOTE_SCORER_URL` / `SIG_REMOTE_SCORER_TIMEOUT_MS`;
    /// `None` when no URL is configured.
    pub fn from_env() -> Option<Self> {
        let url = get_remote_scorer_url()?;
        Some(Self::new(url, Duration::from_millis(get_remote_timeout_ms())))
    }
}

impl ScoringBackend for RemoteScorer {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn score(&self, request: &ScoreRequest<'_>) -> Result<ComparisonResult, RemoteScoreError> {
        let payload = json!({
            "username": request.username,
            "baseline": request.baseline,
            "current_features": request.current.values,
            "supported_features": request.current.supported,
            "excluded_features": request.current.excluded,
        });

        let response = ureq::post(&self.url)
            .timeout(self.timeout)
            .set("Content-Type", "application/json")
            .send_json(payload)
            .map_err(|e| RemoteScoreError::Request(e.to_string()))?;

        let parsed: RemoteScoreResponse = response
            .into_json()
            .map_err(|e| RemoteScoreError::BadResponse(e.to_string()))?;

        if !parsed.confidence_score.is_finite() {
            return Err(RemoteScoreError::BadResponse(
                "confidence_score is not a finite number".into(),
            ));
        }

        let mut result = ComparisonResult {
            score: parsed.confidence_score.clamp(0.0, 100.0),
            subscores: Default::default(),
            detail: Default::default(),
        };
        result.detail.insert("backend".into(), json!(self.name()));
        Ok(result)
    }
}

// ============================================================================
// FALLBACK COMPOSITION
// ============================================================================

/// Remote-first scorer that silently degrades to the rule-based one.
///
/// Remote failures are logged and swallowed; the caller always gets a
/// score.
pub struct ScorerWithFallback {
    remote: Option<RemoteScorer>,
    rule_based: RuleBasedScorer,
}

impl ScorerWithFallback {
    pub fn new(remote: Option<RemoteScorer>) -> Self {
        Self { remote, rule_based: RuleBasedScorer }
    }

    /// Remote scorer picked up from the environment, if configured.
    pub fn from_env() -> Self {
        Self::new(RemoteScorer::from_env())
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn score(&self, request: &ScoreRequest<'_>) -> ComparisonResult {
        if let Some(remote) = &self.remote {
            match remote.score(request) {
                Ok(result) => {
                    log::debug!("remote scorer answered with {:.1}", result.score);
                    return result;
                }
                Err(e) => {
                    log::warn!("remote scorer failed, falling back to rule-based: {}", e);
                }
            }
        }
        match self.rule_based.score(request) {
            Ok(result) => result,
            // RuleBasedScorer::score is infallible.
            Err(_) => unreachable!("rule-based scorer cannot fail"),
        }
    }
}
