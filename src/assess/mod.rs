//! Implementation of the `assess` sub command.

use std::{io::Write, path::PathBuf, time::Instant};

use clap::Parser;
use rayon::prelude::*;

use crate::{
    common::{open_write_maybe_gz, worker_version},
    risk::RiskResolver,
    rules::RuleTable,
    vcf::{self, ParseResult},
};

pub mod report;

/// Prefix of generated patient identifiers.
pub const PATIENT_ID_PREFIX: &str = "PATIENT_";

/// Command line arguments for `assess` sub command.
#[derive(Parser, Debug)]
#[command(about = "Assess pharmacogenomic drug risks from a VCF file", long_about = None)]
pub struct Args {
    /// Path to the input VCF file, plain or gzip-compressed.
    #[arg(long, required = true)]
    pub path_input_vcf: PathBuf,
    /// Path to the rule table CSV file.
    #[arg(long, required = true)]
    pub path_rules: PathBuf,
    /// Drugs to assess, comma-separated.
    #[arg(long, required = true, value_delimiter = ',')]
    pub drugs: Vec<String>,
    /// Patient identifier, generated if not given.
    #[arg(long)]
    pub patient_id: Option<String>,
    /// Path to the output JSON file, written to stdout if not given.
    #[arg(long)]
    pub path_output: Option<PathBuf>,
}

impl Args {
    /// The requested drug names with blank entries removed.
    pub fn drug_list(&self) -> Vec<String> {
        self.drugs
            .iter()
            .map(|drug| drug.trim().to_string())
            .filter(|drug| !drug.is_empty())
            .collect()
    }

    /// The trimmed patient identifier, generated if not given or blank.
    pub fn patient_id_or_generated(&self) -> String {
        self.patient_id
            .as_deref()
            .map(str::trim)
            .filter(|patient_id| !patient_id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(generate_patient_id)
    }
}

/// Generate a patient identifier of the form `PATIENT_XXXXXX`.
pub fn generate_patient_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{}{}", PATIENT_ID_PREFIX, &hex[..6])
}

/// The current time in UTC as RFC 3339 with `Z` suffix.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// Assess all `drugs` in parallel, the result has the order of `drugs`.
pub fn assess_all(
    resolver: &RiskResolver,
    parse_result: &ParseResult,
    drugs: &[String],
    timestamp: &str,
) -> Vec<report::Entry> {
    drugs
        .par_iter()
        .map(|drug| {
            report::Entry::from_result(
                &parse_result.patient_id,
                timestamp,
                &resolver.assess(parse_result, drug),
            )
        })
        .collect()
}

/// Write `entries` as pretty-printed JSON array.
fn write_entries<W: Write>(mut writer: W, entries: &[report::Entry]) -> Result<(), anyhow::Error> {
    serde_json::to_writer_pretty(&mut writer, entries)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Main entry point for the `assess` command.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!("Starting `assess` (version {})", worker_version());
    tracing::info!("  common_args = {:?}", &common_args);
    tracing::info!("  args = {:?}", &args);

    let drugs = args.drug_list();
    if drugs.is_empty() {
        anyhow::bail!("no drug names given in --drugs");
    }

    tracing::info!("Loading rule table...");
    let resolver = RiskResolver::new(RuleTable::load_or_empty(&args.path_rules));
    tracing::info!("... using {} rules", resolver.rules().len());

    let patient_id = args.patient_id_or_generated();
    tracing::info!("Parsing VCF file for patient {}...", &patient_id);
    let parse_result = vcf::parse_path(&args.path_input_vcf, &patient_id)?;
    if !parse_result.success {
        anyhow::bail!(
            "invalid VCF file {:?}: {}",
            &args.path_input_vcf,
            parse_result.warnings.join("; ")
        );
    }
    for warning in &parse_result.warnings {
        tracing::warn!("{}", warning);
    }
    tracing::info!(
        "... found {} variants in {} supported genes",
        parse_result.variants.len(),
        parse_result.gene_variants.len()
    );

    let before_assessment = Instant::now();
    let timestamp = now_timestamp();
    let entries = assess_all(&resolver, &parse_result, &drugs, &timestamp);
    tracing::info!(
        "Assessed {} drugs in {:?}",
        entries.len(),
        before_assessment.elapsed()
    );

    if let Some(path_output) = &args.path_output {
        tracing::info!("Writing reports to {:?}", path_output);
        write_entries(open_write_maybe_gz(path_output)?, &entries)?;
    } else {
        write_entries(std::io::stdout().lock(), &entries)?;
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{generate_patient_id, now_timestamp, run, Args};
    use crate::common::{self, read_to_string_maybe_gz};

    fn args(tmp_dir: &temp_testdir::TempDir, drugs: &[&str], output_name: &str) -> Args {
        Args {
            path_input_vcf: "tests/vcf/example.vcf".into(),
            path_rules: "data/pharmacogenomic_rules.csv".into(),
            drugs: drugs.iter().map(|s| s.to_string()).collect(),
            patient_id: Some("PATIENT_001".into()),
            path_output: Some(tmp_dir.join(output_name)),
        }
    }

    #[test]
    fn patient_id_format() {
        let patient_id = generate_patient_id();
        assert_eq!(14, patient_id.len());
        assert!(patient_id.starts_with("PATIENT_"));
        assert!(patient_id[8..]
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn timestamp_is_utc() -> Result<(), anyhow::Error> {
        let timestamp = now_timestamp();
        assert!(timestamp.ends_with('Z'));
        chrono::DateTime::parse_from_rfc3339(&timestamp)?;

        Ok(())
    }

    #[test]
    fn drug_list_skips_blanks() {
        let tmp_dir = temp_testdir::TempDir::default();
        let args = args(&tmp_dir, &["codeine", " ", " warfarin"], "out.json");
        assert_eq!(vec!["codeine", "warfarin"], args.drug_list());
    }

    #[rstest::rstest]
    #[case(Some(" PATIENT_042 "), Some("PATIENT_042"))]
    #[case(Some("PATIENT_042"), Some("PATIENT_042"))]
    #[case(Some("  "), None)]
    #[case(Some(""), None)]
    #[case(None, None)]
    fn patient_id_is_trimmed_or_generated(
        #[case] given: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let tmp_dir = temp_testdir::TempDir::default();
        let mut args = args(&tmp_dir, &["CODEINE"], "out.json");
        args.patient_id = given.map(str::to_string);

        let patient_id = args.patient_id_or_generated();
        match expected {
            Some(expected) => assert_eq!(expected, patient_id),
            None => {
                assert!(patient_id.starts_with("PATIENT_"));
                assert_eq!(14, patient_id.len());
            }
        }
    }

    #[test]
    fn run_example() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let args = args(
            &tmp_dir,
            &["CODEINE", "aspirin", "Fluorouracil", "WARFARIN"],
            "out.json",
        );

        run(&common::Args::default(), &args)?;

        let contents = read_to_string_maybe_gz(tmp_dir.join("out.json"))?;
        let value: serde_json::Value = serde_json::from_str(&contents)?;
        let entries = value.as_array().expect("not an array");
        assert_eq!(4, entries.len());

        let timestamp = entries[0]["timestamp"].as_str().expect("no timestamp");
        insta::assert_snapshot!(contents.replace(timestamp, "[timestamp]"));

        assert_eq!(
            vec!["CODEINE", "ASPIRIN", "FLUOROURACIL", "WARFARIN"],
            entries
                .iter()
                .map(|entry| entry["drug"].as_str().unwrap_or_default())
                .collect::<Vec<_>>()
        );
        for entry in entries {
            assert_eq!("PATIENT_001", entry["patient_id"]);
            assert_eq!(entries[0]["timestamp"], entry["timestamp"]);
        }

        assert_eq!("Ineffective", entries[0]["risk_assessment"]["risk_label"]);
        assert_eq!("PM", entries[0]["pharmacogenomic_profile"]["phenotype"]);
        assert_eq!(
            2,
            entries[0]["pharmacogenomic_profile"]["detected_variants"]
                .as_array()
                .map(Vec::len)
                .unwrap_or_default()
        );
        assert_eq!("unsupported_drug", entries[1]["error"]);
        assert_eq!("*1/*2A", entries[2]["pharmacogenomic_profile"]["diplotype"]);
        assert_eq!("Safe", entries[3]["risk_assessment"]["risk_label"]);
        assert_eq!(true, entries[3]["quality_metrics"]["vcf_parsing_success"]);

        Ok(())
    }

    #[test]
    fn run_gzip_output() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let mut args = args(&tmp_dir, &["SIMVASTATIN"], "out.json.gz");
        args.path_input_vcf = "tests/vcf/example.vcf.gz".into();

        run(&common::Args::default(), &args)?;

        let value: serde_json::Value =
            serde_json::from_str(&read_to_string_maybe_gz(tmp_dir.join("out.json.gz"))?)?;
        assert_eq!("*1/*5", value[0]["pharmacogenomic_profile"]["diplotype"]);
        assert_eq!("Adjust Dosage", value[0]["risk_assessment"]["risk_label"]);

        Ok(())
    }

    #[test]
    fn run_missing_rules_degrades() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let mut args = args(&tmp_dir, &["CODEINE"], "out.json");
        args.path_rules = "tests/rules/does-not-exist.csv".into();

        run(&common::Args::default(), &args)?;

        let value: serde_json::Value =
            serde_json::from_str(&read_to_string_maybe_gz(tmp_dir.join("out.json"))?)?;
        assert_eq!("Unknown", value[0]["risk_assessment"]["risk_label"]);
        assert_eq!(
            "No CPIC guideline data available for CYP2D6/CODEINE combination.",
            value[0]["clinical_recommendation"]["dose_adjustment"]
        );

        Ok(())
    }

    #[test]
    fn run_invalid_vcf_fails() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let path_vcf = tmp_dir.join("invalid.vcf");
        std::fs::write(&path_vcf, "#CHROM\tPOS\nchr1\t1\n")?;
        let mut args = args(&tmp_dir, &["CODEINE"], "out.json");
        args.path_input_vcf = path_vcf;

        let err = run(&common::Args::default(), &args).unwrap_err();
        assert!(err.to_string().contains("##fileformat=VCF"), "{}", err);
        assert!(!tmp_dir.join("out.json").exists());

        Ok(())
    }

    #[test]
    fn run_without_drugs_fails() {
        let tmp_dir = temp_testdir::TempDir::default();
        let args = args(&tmp_dir, &[" ", ""], "out.json");
        assert!(run(&common::Args::default(), &args).is_err());
    }
}
