//! Code for representing pharmacogenomic variant calls internally.

use crate::{
    common::Genotype,
    pgx::{Gene, WILD_TYPE_ALLELE},
};

/// Number of mandatory VCF columns, `CHROM` through `INFO`.
pub const NUM_MANDATORY_COLUMNS: usize = 8;

/// One pharmacogenomic variant call of the patient.
///
/// Created once while parsing and never modified afterwards.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariantRecord {
    /// Chromosome name as written in the input.
    pub chromosome: String,
    /// 1-based position.
    pub position: u64,
    /// Reference allele.
    pub reference: String,
    /// Alternate allele(s), comma-separated as in the input.
    pub alternate: String,
    /// Genotype of the first sample.
    pub genotype: Genotype,
    /// Gene from `INFO/GENE`.
    pub gene: Gene,
    /// Star allele from `INFO/STAR`, `*1` if absent.
    pub star_allele: String,
    /// dbSNP ID from `INFO/RS`, `<chrom>:<pos>` if absent.
    pub rsid: String,
    /// Variant quality from `QUAL`, if any.
    pub quality: Option<f64>,
}

/// Supporting code for `VariantRecord::try_from()`.
pub mod skip {
    /// Reason for not converting a row into a `VariantRecord`.
    #[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
    pub enum Reason {
        #[error("row has {0} columns, expected at least 8")]
        TooFewColumns(usize),
        #[error("row has no GENE annotation")]
        NoGene,
        #[error("Skipping unsupported gene: {0}")]
        UnsupportedGene(String),
    }
}

/// Look up `key` in a VCF `INFO` column.
///
/// Flags without a value and empty values are treated as absent.
pub fn info_value<'a>(info: &'a str, key: &str) -> Option<&'a str> {
    info.split(';').find_map(|item| match item.split_once('=') {
        Some((k, v)) if k == key && !v.is_empty() => Some(v),
        _ => None,
    })
}

/// Extract the genotype of the first sample from the `FORMAT` and sample columns.
///
/// Rows without sample information or without `GT` are hom. ref.
fn first_sample_genotype(row: &csv::StringRecord) -> Genotype {
    let (Some(format), Some(sample)) = (row.get(8), row.get(9)) else {
        return Genotype::HomRef;
    };
    let Some(gt_idx) = format.split(':').position(|key| key == "GT") else {
        return Genotype::HomRef;
    };
    match sample.split(':').nth(gt_idx) {
        Some(raw_gt) => raw_gt.parse().unwrap_or_else(|e| {
            tracing::trace!("treating genotype as no-call: {}", e);
            Genotype::WithNoCall
        }),
        None => Genotype::HomRef,
    }
}

impl TryFrom<&csv::StringRecord> for VariantRecord {
    type Error = skip::Reason;

    fn try_from(row: &csv::StringRecord) -> Result<Self, Self::Error> {
        if row.len() < NUM_MANDATORY_COLUMNS {
            return Err(skip::Reason::TooFewColumns(row.len()));
        }
        let chrom = &row[0];
        let raw_pos = &row[1];
        let info = &row[7];

        let gene = info_value(info, "GENE").ok_or(skip::Reason::NoGene)?;
        let gene: Gene = gene
            .parse()
            .map_err(|_| skip::Reason::UnsupportedGene(gene.to_string()))?;

        let position = raw_pos.parse::<u64>().unwrap_or_else(|_| {
            tracing::warn!("invalid position {:?} at {}, using 0", raw_pos, chrom);
            0
        });
        let quality = match &row[5] {
            "" | "." => None,
            qual => qual.parse::<f64>().ok(),
        };

        Ok(VariantRecord {
            chromosome: chrom.to_string(),
            position,
            reference: row[3].to_string(),
            alternate: row[4].to_string(),
            genotype: first_sample_genotype(row),
            gene,
            star_allele: info_value(info, "STAR")
                .unwrap_or(WILD_TYPE_ALLELE)
                .to_string(),
            rsid: info_value(info, "RS")
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}:{}", chrom, raw_pos)),
            quality,
        })
    }
}
