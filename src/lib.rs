//! Deterministic pharmacogenomic risk assessment from VCF files.
//!
//! Variant records of the supported genes are parsed from a VCF file, a
//! diplotype and metabolizer phenotype are derived per gene, and the drug
//! risk is looked up in a curated CPIC rule table.

pub mod assess;
pub mod common;
pub mod diplotype;
pub mod err;
pub mod pgx;
pub mod phenotype;
pub mod risk;
pub mod rules;
pub mod supported;
pub mod vcf;
