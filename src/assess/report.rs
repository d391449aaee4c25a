//! JSON reports written by `assess`.

use crate::{
    err::UnsupportedDrug,
    risk::{DetectedVariant, RiskAssessment},
    rules::{RiskLabel, Severity},
};

/// Version of the guideline set the bundled rules are curated from.
pub const GUIDELINE_VERSION: &str = "CPIC v2.0";

/// Summary of the risk.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RiskSummary {
    pub risk_label: RiskLabel,
    pub confidence_score: f64,
    pub severity: Severity,
}

/// Pharmacogenomic profile of the primary gene.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Profile {
    pub primary_gene: String,
    pub diplotype: String,
    pub phenotype: String,
    pub detected_variants: Vec<DetectedVariant>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ClinicalRecommendation {
    /// Name of the guideline, e.g., `CPIC Guideline for CODEINE and CYP2D6`.
    pub cpic_guideline: String,
    pub dose_adjustment: String,
    pub alternative_drugs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct QualityMetrics {
    pub vcf_parsing_success: bool,
    pub guideline_version: String,
}

/// Report of a successful assessment.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Report {
    pub patient_id: String,
    pub drug: String,
    pub timestamp: String,
    pub risk_assessment: RiskSummary,
    pub pharmacogenomic_profile: Profile,
    pub clinical_recommendation: ClinicalRecommendation,
    pub quality_metrics: QualityMetrics,
}

impl Report {
    pub fn new(patient_id: &str, timestamp: &str, assessment: &RiskAssessment) -> Self {
        Self {
            patient_id: patient_id.to_string(),
            drug: assessment.drug.to_string(),
            timestamp: timestamp.to_string(),
            risk_assessment: RiskSummary {
                risk_label: assessment.risk_label,
                confidence_score: assessment.confidence_score,
                severity: assessment.severity,
            },
            pharmacogenomic_profile: Profile {
                primary_gene: assessment.primary_gene.to_string(),
                diplotype: assessment.diplotype.clone(),
                phenotype: assessment.phenotype.to_string(),
                detected_variants: assessment.detected_variants.clone(),
            },
            clinical_recommendation: ClinicalRecommendation {
                cpic_guideline: format!(
                    "CPIC Guideline for {} and {}",
                    assessment.drug, assessment.primary_gene
                ),
                dose_adjustment: assessment.recommendation.clone(),
                alternative_drugs: assessment.alternative_drugs.clone(),
            },
            quality_metrics: QualityMetrics {
                vcf_parsing_success: assessment.parsing_success,
                guideline_version: GUIDELINE_VERSION.to_string(),
            },
        }
    }
}

/// Report for a drug that could not be assessed.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ErrorReport {
    pub patient_id: String,
    pub drug: String,
    pub timestamp: String,
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable description.
    pub detail: String,
}

impl ErrorReport {
    pub fn unsupported_drug(patient_id: &str, timestamp: &str, err: &UnsupportedDrug) -> Self {
        Self {
            patient_id: patient_id.to_string(),
            drug: err.drug.clone(),
            timestamp: timestamp.to_string(),
            error: UnsupportedDrug::CODE.to_string(),
            detail: err.to_string(),
        }
    }
}

/// One entry of the output, either a report or an error.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Entry {
    Report(Box<Report>),
    Error(ErrorReport),
}

impl Entry {
    /// Build the entry from the result of `RiskResolver::assess()`.
    pub fn from_result(
        patient_id: &str,
        timestamp: &str,
        result: &Result<RiskAssessment, UnsupportedDrug>,
    ) -> Self {
        match result {
            Ok(assessment) => Entry::Report(Box::new(Report::new(patient_id, timestamp, assessment))),
            Err(err) => Entry::Error(ErrorReport::unsupported_drug(patient_id, timestamp, err)),
        }
    }
}
