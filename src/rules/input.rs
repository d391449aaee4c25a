//! Rule table records as read from CSV.

use serde::Deserialize;

/// The columns that each rule table must have.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "gene",
    "drug",
    "diplotype",
    "phenotype",
    "risk_label",
    "severity",
    "cpic_recommendation",
    "alternative_drugs",
    "evidence_level",
];

/// Literal token for "no alternatives" in `alternative_drugs`.
pub const NO_ALTERNATIVES: &str = "none";

/// Rule table record as read from CSV file.
///
/// Additional columns are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    /// gene symbol, matched case-insensitively
    pub gene: String,
    /// drug name, matched case-insensitively
    pub drug: String,
    /// diplotype, matched exactly
    pub diplotype: String,
    /// metabolizer phenotype
    pub phenotype: String,
    /// risk label
    pub risk_label: String,
    /// severity of the risk
    pub severity: String,
    /// CPIC clinical recommendation
    pub cpic_recommendation: String,
    /// pipe-separated alternative drugs
    #[serde(default)]
    pub alternative_drugs: String,
    /// evidence level of the guideline
    pub evidence_level: String,
}

/// Split the `alternative_drugs` cell into drug names.
///
/// Empty cells and the `none` token yield no alternatives.
pub fn split_alternatives(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(NO_ALTERNATIVES))
        .map(str::to_string)
        .collect()
}

/// Return the required columns missing from `headers`.
pub fn missing_columns(headers: &csv::StringRecord) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|header| header == **col))
        .map(|col| col.to_string())
        .collect()
}
