//! Derivation of a per-gene diplotype from the observed genotype calls.
//!
//! This does not model haplotype phasing.  Alleles are paired in the order in
//! which they are first implied by the genotypes, and rule tables are authored
//! against exactly this convention.

use itertools::Itertools;

use crate::{common::Genotype, pgx::WILD_TYPE_ALLELE, vcf::VariantRecord};

/// Diplotype label used when there are no variant records for the gene.
pub const UNKNOWN_DIPLOTYPE: &str = "unknown";

/// A diplotype as called from the variant records of one gene.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Diplotype {
    /// No variant records are available.
    Unknown,
    /// Pair of star alleles.
    Pair(String, String),
}

impl std::fmt::Display for Diplotype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diplotype::Unknown => write!(f, "{}", UNKNOWN_DIPLOTYPE),
            Diplotype::Pair(first, second) => write!(f, "{}/{}", first, second),
        }
    }
}

/// Result of `resolve()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiplotypeCall {
    /// The called diplotype.
    pub diplotype: Diplotype,
    /// The alleles implied by all genotypes, in record order.
    pub alleles: Vec<String>,
}

/// The two allele contributions of one genotype call, none for no-calls.
fn allele_contributions(record: &VariantRecord) -> Vec<&str> {
    let star = record.star_allele.as_str();
    match record.genotype {
        Genotype::HomAlt => vec![star, star],
        Genotype::Het => vec![WILD_TYPE_ALLELE, star],
        Genotype::HomRef => vec![WILD_TYPE_ALLELE, WILD_TYPE_ALLELE],
        Genotype::WithNoCall => Vec::new(),
    }
}

/// Call the diplotype from the records of one gene, in input order.
pub fn resolve(records: &[VariantRecord]) -> DiplotypeCall {
    if records.is_empty() {
        return DiplotypeCall {
            diplotype: Diplotype::Unknown,
            alleles: Vec::new(),
        };
    }

    let alleles = records
        .iter()
        .flat_map(allele_contributions)
        .map(str::to_string)
        .collect::<Vec<_>>();

    // Only wild-type alleles (or only no-calls) yield `*1/*1`.
    let diplotype = {
        let mut unique = alleles.iter().unique();
        match (unique.next(), unique.next()) {
            (Some(first), Some(second)) => Diplotype::Pair(first.clone(), second.clone()),
            (Some(only), None) => Diplotype::Pair(only.clone(), only.clone()),
            _ => Diplotype::Pair(WILD_TYPE_ALLELE.to_string(), WILD_TYPE_ALLELE.to_string()),
        }
    };

    tracing::trace!("called diplotype {} from alleles {:?}", &diplotype, &alleles);
    DiplotypeCall { diplotype, alleles }
}
