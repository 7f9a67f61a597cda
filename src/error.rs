//! Error taxonomy for the engine.
//!
//! Only normalization and baseline construction surface errors to the
//! caller. Extraction degradation is expressed through feature exclusion,
//! comparison of unusable input yields a zero score with an explanation,
//! and remote-scorer failures fall back silently to the rule-based path.

use thiserror::Error;

/// Raw capture payload could not be turned into a `StrokeSet`.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("payload contains no usable strokes")]
    Empty,

    #[error("nested JSON text exceeds maximum unwrap depth ({0})")]
    DepthExceeded(usize),

    #[error("payload is not valid JSON: {0}")]
    BadJson(String),

    #[error("unrecognized payload shape: {0}")]
    UnrecognizedShape(&'static str),
}

/// Baseline could not be built from the given enrollment records.
#[derive(Debug, Error)]
pub enum BaselineError {
    #[error("need at least {required} enrollment samples, got {got}")]
    NotEnoughSamples { required: usize, got: usize },
}

/// Remote scorer failure. Never surfaced past the fallback decorator.
#[derive(Debug, Error)]
pub enum RemoteScoreError {
    #[error("remote scorer not configured")]
    NotConfigured,

    #[error("remote scorer request failed: {0}")]
    Request(String),

    #[error("remote scorer returned malformed response: {0}")]
    BadResponse(String),
}
