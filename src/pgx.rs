//! Catalog of the supported pharmacogenes and drugs.

use strum::IntoEnumIterator;

/// The wild-type star allele.
pub const WILD_TYPE_ALLELE: &str = "*1";

/// Star alleles that are treated as loss-of-function in the allele-pattern heuristic.
pub const LOSS_OF_FUNCTION_ALLELES: &[&str] = &[
    "*2", "*2A", "*3", "*3A", "*3B", "*3C", "*4", "*5", "*6", "*7", "*8", "*11", "*12", "*13",
    "*14",
];

/// DPYD variants that force a reduced-function phenotype in the allele-pattern heuristic.
pub const DPYD_PHENOTYPE_RSIDS: &[&str] = &["rs3918290", "rs55886062", "rs67376798"];

/// DPYD variants that trigger the fluorouracil toxicity rule lookup.
pub const DPYD_FLUOROURACIL_RSIDS: &[&str] = &["rs3918290", "rs55886062", "rs55939643"];

/// Supported pharmacogenes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum Gene {
    #[strum(serialize = "CYP2D6")]
    #[serde(rename = "CYP2D6")]
    Cyp2d6,
    #[strum(serialize = "CYP2C19")]
    #[serde(rename = "CYP2C19")]
    Cyp2c19,
    #[strum(serialize = "CYP2C9")]
    #[serde(rename = "CYP2C9")]
    Cyp2c9,
    #[strum(serialize = "SLCO1B1")]
    #[serde(rename = "SLCO1B1")]
    Slco1b1,
    #[strum(serialize = "TPMT")]
    #[serde(rename = "TPMT")]
    Tpmt,
    #[strum(serialize = "DPYD")]
    #[serde(rename = "DPYD")]
    Dpyd,
}

impl Gene {
    /// All supported gene symbols, sorted.
    pub fn supported() -> Vec<String> {
        let mut result = Gene::iter().map(|g| g.to_string()).collect::<Vec<_>>();
        result.sort();
        result
    }
}

/// Supported drugs.
///
/// Parsing is case-insensitive, display is upper case.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
pub enum Drug {
    Codeine,
    Warfarin,
    Clopidogrel,
    Simvastatin,
    Azathioprine,
    Fluorouracil,
}

impl Drug {
    /// The gene that primarily determines the response to the drug.
    pub fn primary_gene(&self) -> Gene {
        match self {
            Drug::Codeine => Gene::Cyp2d6,
            Drug::Warfarin => Gene::Cyp2c9,
            Drug::Clopidogrel => Gene::Cyp2c19,
            Drug::Simvastatin => Gene::Slco1b1,
            Drug::Azathioprine => Gene::Tpmt,
            Drug::Fluorouracil => Gene::Dpyd,
        }
    }

    /// All supported drug names, sorted.
    pub fn supported() -> Vec<String> {
        let mut result = Drug::iter().map(|d| d.to_string()).collect::<Vec<_>>();
        result.sort();
        result
    }
}

/// Whether the star allele is a known loss-of-function allele.
pub fn is_loss_of_function(star_allele: &str) -> bool {
    LOSS_OF_FUNCTION_ALLELES.contains(&star_allele)
}

/// Whether the star allele denotes a gene duplication, e.g., `*1xN` or `*2x2`.
pub fn is_duplication(star_allele: &str) -> bool {
    star_allele.contains("xN") || star_allele.contains("x2")
}
