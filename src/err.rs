//! Errors surfaced to the callers of the risk resolver.

/// The requested drug is not in the supported set.
///
/// The resolver never substitutes a nearest match and never produces a partial
/// assessment in this case.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Drug '{drug}' is not supported. Supported: {}", .supported.join(", "))]
pub struct UnsupportedDrug {
    /// The normalized drug name as requested by the caller.
    pub drug: String,
    /// The supported drug names, sorted.
    pub supported: Vec<String>,
}

impl UnsupportedDrug {
    /// Machine-readable error code.
    pub const CODE: &'static str = "unsupported_drug";

    pub fn new(drug: &str) -> Self {
        Self {
            drug: drug.to_string(),
            supported: crate::pgx::Drug::supported(),
        }
    }
}
