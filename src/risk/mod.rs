//! Deterministic risk resolution for one patient and drug.
//!
//! The resolver has no state besides the injected rule table; each
//! assessment is a pure function of the parse result, the drug, and the
//! table contents.

use itertools::Itertools;

use crate::{
    common::Genotype,
    diplotype,
    err::UnsupportedDrug,
    pgx::{Drug, Gene, DPYD_FLUOROURACIL_RSIDS},
    phenotype::{self, Phenotype},
    rules::{EvidenceTier, RiskLabel, RuleEntry, RuleTable, Severity},
    vcf::{ParseResult, VariantRecord},
};

pub mod confidence;

/// A variant reported as evidence in an assessment.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DetectedVariant {
    pub rsid: String,
    pub chromosome: String,
    pub position: u64,
}

impl From<&VariantRecord> for DetectedVariant {
    fn from(record: &VariantRecord) -> Self {
        Self {
            rsid: record.rsid.clone(),
            chromosome: record.chromosome.clone(),
            position: record.position,
        }
    }
}

/// The risk assessment of one drug for one patient.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RiskAssessment {
    pub drug: Drug,
    pub primary_gene: Gene,
    /// Diplotype label, e.g., `*1/*4` or `unknown`.
    pub diplotype: String,
    pub phenotype: Phenotype,
    pub risk_label: RiskLabel,
    pub severity: Severity,
    /// Confidence in `[0, 1]`, rounded to two decimals.
    pub confidence_score: f64,
    /// Clinical recommendation text.
    pub recommendation: String,
    pub alternative_drugs: Vec<String>,
    /// Variants of the primary gene, unique by rsID, in order of first occurrence.
    pub detected_variants: Vec<DetectedVariant>,
    /// How directly the rule table matched.
    pub evidence_tier: EvidenceTier,
    /// Whether the input parsed and yielded at least one variant.
    pub parsing_success: bool,
}

/// Outcome of the rule lookup chain.
#[derive(Debug, Clone, PartialEq)]
struct ResolvedRule {
    phenotype: Phenotype,
    risk_label: RiskLabel,
    severity: Severity,
    recommendation: String,
    alternative_drugs: Vec<String>,
    evidence_tier: EvidenceTier,
}

impl ResolvedRule {
    fn from_entry(entry: &RuleEntry, evidence_tier: EvidenceTier) -> Self {
        Self {
            phenotype: entry.phenotype,
            risk_label: entry.risk_label,
            severity: entry.severity,
            recommendation: entry.recommendation.clone(),
            alternative_drugs: entry.alternative_drugs.clone(),
            evidence_tier,
        }
    }

    /// The rule used when nothing in the table matches.
    fn fallback(gene: Gene, drug: Drug, phenotype: Phenotype) -> Self {
        Self {
            phenotype,
            risk_label: RiskLabel::Unknown,
            severity: Severity::None,
            recommendation: format!(
                "No CPIC guideline data available for {}/{} combination.",
                gene, drug
            ),
            alternative_drugs: Vec::new(),
            evidence_tier: EvidenceTier::D,
        }
    }
}

/// Resolves risk assessments against an injected rule table.
#[derive(Debug, Clone, Default)]
pub struct RiskResolver {
    rules: RuleTable,
}

impl RiskResolver {
    /// Construct new `RiskResolver` with the given rule table.
    pub fn new(rules: RuleTable) -> Self {
        Self { rules }
    }

    /// The rule table in use.
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Assess the risk of `drug` for the patient of `parse_result`.
    ///
    /// The drug name is trimmed and matched case-insensitively.
    pub fn assess(
        &self,
        parse_result: &ParseResult,
        drug: &str,
    ) -> Result<RiskAssessment, UnsupportedDrug> {
        let name = drug.trim().to_uppercase();
        let drug: Drug = name.parse().map_err(|_| UnsupportedDrug::new(&name))?;
        let gene = drug.primary_gene();
        let records = parse_result.variants_of(gene);

        let call = diplotype::resolve(records);
        let diplotype = call.diplotype.to_string();
        let phenotype = phenotype::infer(&self.rules, gene, &call.diplotype, records);
        let rule = self.lookup(gene, drug, &diplotype, phenotype, records);

        let detected_variants = records
            .iter()
            .unique_by(|record| record.rsid.as_str())
            .map(DetectedVariant::from)
            .collect::<Vec<_>>();
        let confidence_score =
            confidence::score(rule.risk_label, !parse_result.success || records.is_empty());

        tracing::debug!(
            "patient {} drug {}: {} {} -> {} (tier {}, confidence {})",
            &parse_result.patient_id,
            drug,
            &diplotype,
            rule.phenotype,
            rule.risk_label,
            rule.evidence_tier,
            confidence_score
        );

        Ok(RiskAssessment {
            drug,
            primary_gene: gene,
            diplotype,
            phenotype: rule.phenotype,
            risk_label: rule.risk_label,
            severity: rule.severity,
            confidence_score,
            recommendation: rule.recommendation,
            alternative_drugs: rule.alternative_drugs,
            detected_variants,
            evidence_tier: rule.evidence_tier,
            parsing_success: parse_result.success && !parse_result.variants.is_empty(),
        })
    }

    /// Run the rule lookup chain, the first matching tier wins.
    fn lookup(
        &self,
        gene: Gene,
        drug: Drug,
        diplotype: &str,
        phenotype: Phenotype,
        records: &[VariantRecord],
    ) -> ResolvedRule {
        if let Some(entry) = self.rules.find_by_diplotype(gene, drug, diplotype) {
            return ResolvedRule::from_entry(entry, EvidenceTier::A);
        }

        if let Some(entry) = self.rules.find_by_phenotype(gene, drug, phenotype) {
            return ResolvedRule::from_entry(entry, EvidenceTier::B);
        }

        if let Some(entry) = self.lookup_dpyd_toxicity(gene, drug, records) {
            return ResolvedRule::from_entry(entry, EvidenceTier::A);
        }

        if let Some(entry) = self.rules.find_by_phenotype(gene, drug, Phenotype::Unknown) {
            return ResolvedRule::from_entry(entry, EvidenceTier::C);
        }

        ResolvedRule::fallback(gene, drug, phenotype)
    }

    /// Look up the reduced-function fluorouracil rule for DPYD toxicity variants.
    ///
    /// Any genotype other than hom. ref. counts as carrying the variant.
    fn lookup_dpyd_toxicity(
        &self,
        gene: Gene,
        drug: Drug,
        records: &[VariantRecord],
    ) -> Option<&RuleEntry> {
        if gene != Gene::Dpyd || drug != Drug::Fluorouracil {
            return None;
        }

        records
            .iter()
            .filter(|record| {
                DPYD_FLUOROURACIL_RSIDS.contains(&record.rsid.as_str())
                    && record.genotype != Genotype::HomRef
            })
            .find_map(|record| {
                let phenotype = if record.genotype == Genotype::HomAlt {
                    Phenotype::Poor
                } else {
                    Phenotype::Intermediate
                };
                self.rules.find_by_phenotype(gene, drug, phenotype)
            })
    }
}
