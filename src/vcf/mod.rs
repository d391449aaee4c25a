//! Parsing of pharmacogenomic VCF files into typed variant records.
//!
//! The parser is lenient with respect to the VCF standard: `INFO` fields need
//! not be declared in the header and only the first sample is considered.
//! However, the input must declare the VCF file format on its first line and
//! have a `#CHROM` column header line.

use std::path::Path;

use indexmap::IndexMap;

use crate::{common::read_to_string_maybe_gz, pgx::Gene};

pub mod header;
pub mod record;

pub use record::VariantRecord;

/// The result of parsing the VCF file of one patient.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ParseResult {
    /// The patient identifier.
    pub patient_id: String,
    /// All variant records in input order.
    pub variants: Vec<VariantRecord>,
    /// Variant records grouped by gene, in order of first appearance.
    pub gene_variants: IndexMap<Gene, Vec<VariantRecord>>,
    /// Non-fatal problems found while parsing.
    pub warnings: Vec<String>,
    /// Whether the input passed structural validation.
    pub success: bool,
}

impl ParseResult {
    /// Create a new, empty and successful result.
    pub fn new(patient_id: &str) -> Self {
        Self {
            patient_id: patient_id.to_string(),
            variants: Vec::new(),
            gene_variants: IndexMap::new(),
            warnings: Vec::new(),
            success: true,
        }
    }

    /// Create a failed result for input that did not pass header validation.
    fn failed(patient_id: &str, err: &header::Error) -> Self {
        Self {
            success: false,
            warnings: vec![format!("VCF validation failed: {}", err)],
            ..Self::new(patient_id)
        }
    }

    /// Append `record` to the flat list and to the group of its gene.
    pub fn push(&mut self, record: VariantRecord) {
        self.gene_variants
            .entry(record.gene)
            .or_default()
            .push(record.clone());
        self.variants.push(record);
    }

    /// The records of `gene`, empty if there are none.
    pub fn variants_of(&self, gene: Gene) -> &[VariantRecord] {
        self.gene_variants
            .get(&gene)
            .map(|records| records.as_slice())
            .unwrap_or_default()
    }
}

/// Parse the VCF text `raw` of the patient with the given identifier.
///
/// Structural problems are reported through `ParseResult::success`, so this
/// function does not fail.
#[tracing::instrument(skip(raw))]
pub fn parse(raw: &str, patient_id: &str) -> ParseResult {
    if let Err(err) = header::validate(raw) {
        tracing::warn!("VCF validation failed: {}", &err);
        return ParseResult::failed(patient_id, &err);
    }

    let mut result = ParseResult::new(patient_id);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());

    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                result.warnings.push(format!("Skipping unreadable row: {}", e));
                continue;
            }
        };
        match VariantRecord::try_from(&row) {
            Ok(record) => result.push(record),
            Err(reason @ record::skip::Reason::UnsupportedGene(_)) => {
                result.warnings.push(reason.to_string());
            }
            Err(reason) => {
                tracing::debug!("skipping row {:?}: {}", &row, reason);
            }
        }
    }

    tracing::debug!(
        "parsed {} variants in {} genes with {} warnings",
        result.variants.len(),
        result.gene_variants.len(),
        result.warnings.len()
    );

    result
}

/// Read the (maybe gzip-compressed) VCF file at `path` and parse it.
pub fn parse_path<P>(path: P, patient_id: &str) -> Result<ParseResult, anyhow::Error>
where
    P: AsRef<Path>,
{
    tracing::info!("reading VCF file {:?}", path.as_ref());
    let raw = read_to_string_maybe_gz(path)?;
    Ok(parse(&raw, patient_id))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::parse;
    use crate::{common::Genotype, pgx::Gene};

    #[test]
    fn parse_example_file() -> Result<(), anyhow::Error> {
        let result = super::parse_path("tests/vcf/example.vcf", "PATIENT_001")?;

        assert!(result.success);
        assert_eq!("PATIENT_001", result.patient_id);
        assert_eq!(8, result.variants.len());
        assert_eq!(
            vec![
                Gene::Cyp2d6,
                Gene::Cyp2c19,
                Gene::Cyp2c9,
                Gene::Slco1b1,
                Gene::Tpmt,
                Gene::Dpyd
            ],
            result.gene_variants.keys().copied().collect::<Vec<_>>()
        );
        assert_eq!(
            vec!["Skipping unsupported gene: CYP3A5".to_string()],
            result.warnings
        );

        let cyp2d6 = result.variants_of(Gene::Cyp2d6);
        assert_eq!(2, cyp2d6.len());
        assert_eq!("*4", cyp2d6[0].star_allele);
        assert_eq!(Genotype::HomAlt, cyp2d6[0].genotype);
        assert_eq!("*10", cyp2d6[1].star_allele);
        assert_eq!(Genotype::Het, cyp2d6[1].genotype);

        Ok(())
    }

    #[test]
    fn groups_are_consistent_with_flat_list() -> Result<(), anyhow::Error> {
        let result = super::parse_path("tests/vcf/example.vcf", "PATIENT_001")?;

        let grouped = result
            .gene_variants
            .values()
            .map(|records| records.len())
            .sum::<usize>();
        assert_eq!(result.variants.len(), grouped);
        for record in &result.variants {
            assert!(result.variants_of(record.gene).contains(record));
        }

        Ok(())
    }

    #[test]
    fn parse_gzip_file() -> Result<(), anyhow::Error> {
        let plain = super::parse_path("tests/vcf/example.vcf", "P")?;
        let gzip = super::parse_path("tests/vcf/example.vcf.gz", "P")?;
        assert_eq!(plain, gzip);

        Ok(())
    }

    #[test]
    fn parse_latin1_file() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path = tmp_dir.join("latin1.vcf");
        std::fs::write(
            &path,
            b"##fileformat=VCFv4.2\n\
              ##source=Klinik M\xfcnchen\n\
              #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\n\
              chr22\t42130692\trs3892097\tG\tA\t99\tPASS\tGENE=CYP2D6;STAR=*4;RS=rs3892097\tGT\t1/1\n",
        )?;

        let result = super::parse_path(&path, "P")?;

        assert!(result.success);
        assert_eq!(1, result.variants.len());
        assert_eq!("*4", result.variants[0].star_allele);
        assert_eq!(Genotype::HomAlt, result.variants[0].genotype);

        Ok(())
    }

    #[test]
    fn missing_column_header_fails() {
        let result = parse(
            "##fileformat=VCFv4.2\nchr22\t42130692\trs3892097\tG\tA\t.\tPASS\tGENE=CYP2D6;STAR=*4\n",
            "PATIENT_002",
        );

        assert!(!result.success);
        assert!(result.variants.is_empty());
        assert!(result.gene_variants.is_empty());
        assert_eq!(
            vec!["VCF validation failed: Missing #CHROM header line in VCF file".to_string()],
            result.warnings
        );
    }

    #[test]
    fn missing_file_format_fails() {
        let result = parse("#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n", "P");

        assert!(!result.success);
        assert_eq!(1, result.warnings.len());
    }

    #[test]
    fn header_only_is_successful_and_empty() {
        let result = parse(
            "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n",
            "P",
        );

        assert!(result.success);
        assert!(result.variants.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn rows_without_gene_are_skipped_silently() {
        let result = parse(
            "##fileformat=VCFv4.2\n\
             #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
             chr1\t100\t.\tC\tT\t.\tPASS\tDP=10\n\
             chr1\t200\t.\tC\tT\n\
             \n\
             chr10\t96741053\t.\tG\tA\t.\tPASS\tGENE=CYP2C19;STAR=*2\tGT\t0|1\n",
            "P",
        );

        assert!(result.success);
        assert!(result.warnings.is_empty());
        assert_eq!(1, result.variants.len());
        assert_eq!(Genotype::Het, result.variants[0].genotype);
    }

    #[test]
    fn crlf_line_endings() {
        let result = parse(
            "##fileformat=VCFv4.2\r\n\
             #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\r\n\
             chr6\t18130918\t.\tT\tC\t.\tPASS\tGENE=TPMT;STAR=*3A;RS=rs1142345\tGT\t0/1\r\n",
            "P",
        );

        assert_eq!(1, result.variants.len());
        assert_eq!("rs1142345", result.variants[0].rsid);
        assert_eq!(Genotype::Het, result.variants[0].genotype);
    }

    #[test]
    fn variants_of_missing_gene_is_empty() {
        let result = super::ParseResult::new("P");
        assert!(result.variants_of(Gene::Dpyd).is_empty());
    }
}
