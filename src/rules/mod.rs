//! The curated pharmacogenomic rule table.
//!
//! The table is loaded once and read-only afterwards, so it can be shared
//! between threads by reference.

use std::{collections::HashMap, io::Read, path::Path, time::Instant};

use crate::{
    common::open_read_maybe_gz,
    pgx::{Drug, Gene},
    phenotype::Phenotype,
};

pub mod input;

/// Risk label of a gene/drug combination.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    enum_map::Enum,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum RiskLabel {
    Safe,
    #[strum(serialize = "Adjust Dosage")]
    #[serde(rename = "Adjust Dosage")]
    AdjustDosage,
    Toxic,
    Ineffective,
    Unknown,
}

/// Severity of the risk.
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
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Low,
    Moderate,
    High,
    Critical,
}

/// Evidence tier, from strongest (`A`) to weakest (`D`).
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
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum EvidenceTier {
    A,
    B,
    C,
    D,
}

/// One curated rule.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RuleEntry {
    /// Upper-case gene symbol.
    pub gene: String,
    /// Upper-case drug name.
    pub drug: String,
    /// Diplotype, e.g., `*1/*4`.
    pub diplotype: String,
    pub phenotype: Phenotype,
    pub risk_label: RiskLabel,
    pub severity: Severity,
    /// The clinical recommendation text.
    pub recommendation: String,
    /// Alternative drugs, in curated order.
    pub alternative_drugs: Vec<String>,
    /// Evidence level of the underlying guideline.
    pub evidence: EvidenceTier,
}

/// Supporting code for `RuleEntry::try_from()`.
pub mod entry {
    /// Error type for `RuleEntry::try_from()`.
    #[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
    pub enum Error {
        #[error("invalid value {value:?} in column {column}")]
        InvalidValue { column: &'static str, value: String },
    }
}

fn parse_column<T: std::str::FromStr>(column: &'static str, value: &str) -> Result<T, entry::Error> {
    value.trim().parse().map_err(|_| entry::Error::InvalidValue {
        column,
        value: value.to_string(),
    })
}

impl TryFrom<input::Record> for RuleEntry {
    type Error = entry::Error;

    fn try_from(record: input::Record) -> Result<Self, Self::Error> {
        Ok(RuleEntry {
            gene: record.gene.trim().to_uppercase(),
            drug: record.drug.trim().to_uppercase(),
            diplotype: record.diplotype.trim().to_string(),
            phenotype: parse_column("phenotype", &record.phenotype)?,
            risk_label: parse_column("risk_label", &record.risk_label)?,
            severity: parse_column("severity", &record.severity)?,
            recommendation: record.cpic_recommendation.trim().to_string(),
            alternative_drugs: input::split_alternatives(&record.alternative_drugs),
            evidence: parse_column("evidence_level", &record.evidence_level)?,
        })
    }
}

/// Error type for loading a `RuleTable`.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("could not open rule table: {0}")]
    Open(String),
    #[error("could not read rule table: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV missing columns: {0:?}")]
    MissingColumns(Vec<String>),
}

/// In-memory rule table with indices for the lookups of the risk resolver.
///
/// All indices point to the first entry with the given key.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    /// The entries in input order.
    entries: Vec<RuleEntry>,
    /// Index by (gene, drug, diplotype).
    by_diplotype: HashMap<(String, String, String), usize>,
    /// Index by (gene, drug, phenotype).
    by_phenotype: HashMap<(String, String, Phenotype), usize>,
    /// Index by (gene, diplotype) for phenotype inference.
    by_gene_diplotype: HashMap<(String, String), usize>,
}

impl RuleTable {
    /// Construct from the given entries and build the indices.
    pub fn new(entries: Vec<RuleEntry>) -> Self {
        let mut result = RuleTable::default();
        for (idx, entry) in entries.iter().enumerate() {
            result
                .by_diplotype
                .entry((
                    entry.gene.clone(),
                    entry.drug.clone(),
                    entry.diplotype.clone(),
                ))
                .or_insert(idx);
            result
                .by_phenotype
                .entry((entry.gene.clone(), entry.drug.clone(), entry.phenotype))
                .or_insert(idx);
            result
                .by_gene_diplotype
                .entry((entry.gene.clone(), entry.diplotype.clone()))
                .or_insert(idx);
        }
        result.entries = entries;
        result
    }

    /// Read the table from CSV.
    ///
    /// Missing required columns and malformed CSV are errors.  Rows with
    /// values that cannot be interpreted are skipped with a warning.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let missing = input::missing_columns(reader.headers()?);
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }

        let mut entries = Vec::new();
        for (lineno, record) in reader.deserialize::<input::Record>().enumerate() {
            match RuleEntry::try_from(record?) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!("skipping rule in data row {}: {}", lineno + 1, e),
            }
        }

        Ok(Self::new(entries))
    }

    /// Read the table from the (maybe gzip-compressed) CSV file at `path`.
    #[tracing::instrument(skip_all, fields(path = ?path.as_ref()))]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let before_loading = Instant::now();
        let reader =
            open_read_maybe_gz(path.as_ref()).map_err(|e| LoadError::Open(e.to_string()))?;
        let result = Self::from_reader(reader)?;
        tracing::info!(
            "Loaded {} rules from {:?} in {:?}",
            result.len(),
            path.as_ref(),
            before_loading.elapsed()
        );
        Ok(result)
    }

    /// Like `from_path()` but degrades to an empty table on errors.
    ///
    /// All lookups on the empty table fail, so assessments fall back to
    /// the default rule.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        Self::from_path(path.as_ref()).unwrap_or_else(|e| {
            tracing::warn!(
                "Could not load rule table {:?}, continuing with empty table: {}",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries in input order.
    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    /// First entry for the gene, drug, and diplotype.
    pub fn find_by_diplotype(&self, gene: Gene, drug: Drug, diplotype: &str) -> Option<&RuleEntry> {
        self.by_diplotype
            .get(&(gene.to_string(), drug.to_string(), diplotype.to_string()))
            .map(|idx| &self.entries[*idx])
    }

    /// First entry for the gene, drug, and phenotype.
    pub fn find_by_phenotype(
        &self,
        gene: Gene,
        drug: Drug,
        phenotype: Phenotype,
    ) -> Option<&RuleEntry> {
        self.by_phenotype
            .get(&(gene.to_string(), drug.to_string(), phenotype))
            .map(|idx| &self.entries[*idx])
    }

    /// Phenotype recorded in the first entry for the gene and diplotype, for any drug.
    pub fn phenotype_of(&self, gene: Gene, diplotype: &str) -> Option<Phenotype> {
        self.by_gene_diplotype
            .get(&(gene.to_string(), diplotype.to_string()))
            .map(|idx| self.entries[*idx].phenotype)
    }
}
