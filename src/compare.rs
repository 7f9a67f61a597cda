//! Drawing comparison engine.
//!
//! Compares a stored reference drawing against a fresh attempt of the
//! same template. Routing the attempt to the right template is the
//! caller's job; this module assumes both sides were drawn against the
//! template it is given.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::geometry::bounding_box;
use crate::strokes::StrokeSet;
use crate::templates::{self, DescriptorMap, TemplateType};

// ============================================================================
// RESULT TYPE
// ============================================================================

/// Outcome of a comparison or a baseline scoring pass.
///
/// `score` is in `[0, 100]`. `subscores` holds the named components that
/// went into it; `detail` carries free-form diagnostic context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub score: f64,
    pub subscores: BTreeMap<String, f64>,
    pub detail: BTreeMap<String, serde_json::Value>,
}

impl ComparisonResult {
    pub fn rejected(reason: &str) -> Self {
        let mut detail = BTreeMap::new();
        detail.insert("error".into(), json!(reason));
        Self { score: 0.0, subscores: BTreeMap::new(), detail }
    }
}

// ============================================================================
// PER-TEMPLATE WEIGHTS
// ============================================================================

/// Sub-score weights: (stroke_count, point_count, size, structure).
/// Each row sums to 1.0.
fn weights_for(template: TemplateType) -> (f64, f64, f64, f64) {
    match template {
        // Single-stroke shapes lean on their structural descriptors.
        TemplateType::Circle | TemplateType::Square | TemplateType::Triangle => {
            (0.15, 0.15, 0.25, 0.45)
        }
        // Multi-stroke drawings: stroke count is itself a strong signal.
        TemplateType::Face | TemplateType::House => (0.25, 0.15, 0.20, 0.40),
        TemplateType::Star => (0.15, 0.15, 0.20, 0.50),
        TemplateType::ConnectDots => (0.25, 0.20, 0.15, 0.40),
    }
}

// ============================================================================
// COMPARISON
// ============================================================================

/// Compare a stored drawing against an attempt of the same template.
///
/// Missing or empty input on either side yields score 0 with an
/// explanatory `detail["error"]` entry rather than an error.
pub fn compare_drawings(
    stored: &StrokeSet,
    attempt: &StrokeSet,
    template: TemplateType,
) -> ComparisonResult {
    if stored.is_empty() {
        return ComparisonResult::rejected("stored drawing is empty");
    }
    if attempt.is_empty() {
        return ComparisonResult::rejected("attempt drawing is empty");
    }

    let stroke_sim = ratio_similarity(stored.stroke_count() as f64, attempt.stroke_count() as f64);
    let point_sim = ratio_similarity(stored.point_count() as f64, attempt.point_count() as f64);
    let size_sim = size_similarity(stored, attempt);

    let stored_desc = templates::analyze(stored, template);
    let attempt_desc = templates::analyze(attempt, template);
    let structure_sim = descriptor_similarity(&stored_desc, &attempt_desc);

    let (w_stroke, w_point, w_size, w_structure) = weights_for(template);
    let combined = w_stroke * stroke_sim
        + w_point * point_sim
        + w_size * size_sim
        + w_structure * structure_sim;
    let score = (combined * 100.0).round().clamp(0.0, 100.0);

    log::debug!(
        "compare[{}]: stroke={:.3} point={:.3} size={:.3} structure={:.3} -> {}",
        template.as_str(),
        stroke_sim,
        point_sim,
        size_sim,
        structure_sim,
        score
    );

    let mut subscores = BTreeMap::new();
    subscores.insert("stroke_count".into(), stroke_sim);
    subscores.insert("point_count".into(), point_sim);
    subscores.insert("size".into(), size_sim);
    subscores.insert("structure".into(), structure_sim);

    let mut detail = BTreeMap::new();
    detail.insert("template".into(), json!(template.as_str()));
    detail.insert("stored_descriptors".into(), json!(stored_desc));
    detail.insert("attempt_descriptors".into(), json!(attempt_desc));

    ComparisonResult { score, subscores, detail }
}

// ============================================================================
// SUB-SCORES
// ============================================================================

/// min/max similarity of two non-negative magnitudes. Both zero counts
/// as a perfect match.
fn ratio_similarity(a: f64, b: f64) -> f64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if hi <= 0.0 {
        return 1.0;
    }
    (lo / hi).clamp(0.0, 1.0)
}

/// Bounding-box similarity, per-axis min/max ratio averaged.
fn size_similarity(stored: &StrokeSet, attempt: &StrokeSet) -> f64 {
    let a = bounding_box(stored.all_points());
    let b = bounding_box(attempt.all_points());
    let w = ratio_similarity(a.width(), b.width());
    let h = ratio_similarity(a.height(), b.height());
    (w + h) / 2.0
}

/// Average per-descriptor agreement over the keys both maps share.
/// Descriptors are template-defined, so both sides always share the full
/// key set; the intersection guard is for safety only.
fn descriptor_similarity(a: &DescriptorMap, b: &DescriptorMap) -> f64 {
    let mut total = 0.0;
    let mut n = 0usize;
    for (name, &va) in a {
        let Some(&vb) = b.get(name) else { continue };
        let denom = va.abs().max(vb.abs());
        let sim = if denom <= 0.0 { 1.0 } else { (1.0 - (va - vb).abs() / denom).clamp(0.0, 1.0) };
        total += sim;
        n += 1;
    }
    if n == 0 {
        return 0.0;
    }
    total / n as f64
}
