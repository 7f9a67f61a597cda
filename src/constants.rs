//! Central Configuration Constants
//!
//! Single source of truth for every tunable threshold in the engine.
//! The anomaly thresholds are empirically chosen; to retune them, only
//! edit this file (or set the corresponding environment variable).

use std::f64::consts::PI;

// ============================================
// Normalization
// ============================================

/// Maximum depth for unwrapping JSON-encoded string payloads
pub const MAX_UNWRAP_DEPTH: usize = 5;

/// Neutral pressure assigned to `[x, y]` coordinate-pair points
pub const DEFAULT_PRESSURE: f64 = 1.0;

// ============================================
// Geometry / corner detection
// ============================================

/// Half-width of the symmetric window used for corner turning angles
pub const CORNER_HALF_WINDOW: usize = 5;

/// Turning angle (radians) above which a point is a corner candidate
pub const CORNER_ANGLE_THRESHOLD: f64 = PI / 4.0;

/// Neighborhood (samples each side) for the corner local-maximum check
pub const CORNER_LOCAL_MAX_RADIUS: usize = 2;

// ============================================
// Timing features
// ============================================

/// Inter-stroke gap (time units) counted as a deliberate pause
pub const PAUSE_GAP_THRESHOLD: i64 = 50;

/// Maximum movement (distance units) still considered dwelling in place
pub const DWELL_DISTANCE_THRESHOLD: f64 = 5.0;

/// Minimum duration (time units) for a dwell point
pub const DWELL_TIME_THRESHOLD: i64 = 20;

// ============================================
// Geometric features
// ============================================

/// Turning angle (radians) counted as tremor over a 1-sample window
pub const TREMOR_ANGLE_THRESHOLD: f64 = PI / 6.0;

/// Turning angle (radians) counted as a direction change
pub const DIRECTION_CHANGE_THRESHOLD: f64 = PI / 4.0;

/// Distance (units) under which two points of distinct strokes overlap
pub const OVERLAP_DISTANCE_THRESHOLD: f64 = 5.0;

/// Point count above which the overlap check switches to sampling
pub const OVERLAP_EXHAUSTIVE_LIMIT: usize = 1000;

/// Number of random cross-stroke pairs sampled for large inputs
pub const OVERLAP_SAMPLE_PAIRS: usize = 20_000;

// ============================================
// Security / anomaly indicators
// ============================================

/// Relative velocity delta under which consecutive samples count as
/// mechanically consistent (the 5% speed-consistency window)
pub const SPEED_CONSISTENCY_WINDOW: f64 = 0.05;

/// Adjacent pressure delta counted as a pressure anomaly
pub const PRESSURE_ANOMALY_DELTA: f64 = 0.5;

/// Time gap (units) with near-zero displacement counted as an
/// unnatural pause (tracing indicator)
pub const UNNATURAL_PAUSE_GAP: i64 = 200;

/// Displacement (units) considered "near zero" for unnatural pauses
pub const UNNATURAL_PAUSE_DISTANCE: f64 = 2.0;

// ============================================
// Template analyzers
// ============================================

/// Multiple of the stroke's average pressure above which a corner
/// counts as a pressure spike
pub const CORNER_PRESSURE_SPIKE_FACTOR: f64 = 1.2;

// ============================================
// Baseline & scoring
// ============================================

/// Enrollment samples required before a baseline can be built
pub const MIN_ENROLLMENT_SAMPLES: usize = 3;

/// Floor of the rule-based similarity score; no attempt scores zero
pub const SCORE_FLOOR: f64 = 5.0;

/// Multiplier mapping average weighted deviation to score penalty
pub const DEVIATION_PENALTY: f64 = 50.0;

/// Default remote scorer timeout (milliseconds)
pub const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 5_000;

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get remote scorer timeout from environment or use default
pub fn get_remote_timeout_ms() -> u64 {
    std::env::var("SIG_REMOTE_SCORER_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_REMOTE_TIMEOUT_MS)
}

/// Get remote scorer URL from environment, if configured
pub fn get_remote_scorer_url() -> Option<String> {
    std::env::var("SIG_REMOTE_SCORER_URL").ok().filter(|s| !s.is_empty())
}

/// Get overlap sample budget from environment or use default
pub fn get_overlap_sample_pairs() -> usize {
    std::env::var("SIG_OVERLAP_SAMPLE_PAIRS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(OVERLAP_SAMPLE_PAIRS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeout_without_env() {
        std::env::remove_var("SIG_REMOTE_SCORER_TIMEOUT_MS");
        assert_eq!(get_remote_timeout_ms(), DEFAULT_REMOTE_TIMEOUT_MS);
    }
}
