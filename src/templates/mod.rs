//! Template-Specific Analyzers
//!
//! Per-shape and per-drawing descriptors used by the comparison engine
//! and by enrollment analysis. Every analyzer returns named scalars and
//! degrades to neutral values (commonly 0) instead of failing when the
//! expected structure is not there.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::strokes::StrokeSet;

pub mod drawings;
pub mod shapes;

/// Descriptor name → scalar value.
pub type DescriptorMap = BTreeMap<String, f64>;

/// The drawing category a user enrolled with. Selects which analyzer
/// runs over the normalized strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateType {
    Circle,
    Square,
    Triangle,
    Face,
    Star,
    House,
    ConnectDots,
}

impl TemplateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateType::Circle => "circle",
            TemplateType::Square => "square",
            TemplateType::Triangle => "triangle",
            TemplateType::Face => "face",
            TemplateType::Star => "star",
            TemplateType::House => "house",
            TemplateType::ConnectDots => "connect_dots",
        }
    }

    /// Parse the wire form used by capture clients.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "circle" => Some(TemplateType::Circle),
            "square" => Some(TemplateType::Square),
            "triangle" => Some(TemplateType::Triangle),
            "face" => Some(TemplateType::Face),
            "star" => Some(TemplateType::Star),
            "house" => Some(TemplateType::House),
            "connect_dots" | "connect-the-dots" => Some(TemplateType::ConnectDots),
            _ => None,
        }
    }
}

/// Run the analyzer for one template type.
pub fn analyze(set: &StrokeSet, template: TemplateType) -> DescriptorMap {
    match template {
        TemplateType::Circle => shapes::analyze_circle(set),
        TemplateType::Square => shapes::analyze_square(set),
        TemplateType::Triangle => shapes::analyze_triangle(set),
        TemplateType::Face => drawings::analyze_face(set),
        TemplateType::Star => drawings::analyze_star(set),
        TemplateType::House => drawings::analyze_house(set),
        TemplateType::ConnectDots => drawings::analyze_connect_dots(set),
    }
}
