//! Confidence scores of risk assessments.

use enum_map::{enum_map, EnumMap};

use crate::rules::RiskLabel;

/// Base confidence by resolved risk label.
pub fn base_confidence() -> EnumMap<RiskLabel, f64> {
    enum_map! {
        RiskLabel::Toxic => 0.93,
        RiskLabel::Ineffective => 0.88,
        RiskLabel::AdjustDosage => 0.80,
        RiskLabel::Safe => 0.92,
        RiskLabel::Unknown => 0.40,
    }
}

/// Compute the confidence score for `risk_label`.
///
/// The base confidence is halved if the evidence is weak, i.e., the input
/// did not parse or there are no variants for the gene.  The result is
/// rounded to two decimal places and lies in `[0, 1]`.
pub fn score(risk_label: RiskLabel, weak_evidence: bool) -> f64 {
    let mut value = base_confidence()[risk_label];
    if weak_evidence {
        value *= 0.5;
    }
    ((value * 100.0).round() / 100.0).clamp(0.0, 1.0)
}
