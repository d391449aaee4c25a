//! Implementation of the `supported` sub command.

use std::{io::Write, path::PathBuf};

use clap::Parser;
use indexmap::IndexMap;
use strum::IntoEnumIterator;

use crate::{
    common::open_write_maybe_gz,
    pgx::{Drug, Gene},
};

/// Command line arguments for `supported` sub command.
#[derive(Parser, Debug, Default)]
#[command(about = "List the supported drugs and genes", long_about = None)]
pub struct Args {
    /// Path to the output JSON file, written to stdout if not given.
    #[arg(long)]
    pub path_output: Option<PathBuf>,
}

/// The supported catalog.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Catalog {
    /// Drug names, sorted.
    pub supported_drugs: Vec<String>,
    /// Primary gene of each drug, sorted by drug.
    pub drug_gene_map: IndexMap<String, String>,
    /// Gene symbols, sorted.
    pub supported_genes: Vec<String>,
}

impl Catalog {
    pub fn new() -> Self {
        let mut drugs = Drug::iter().collect::<Vec<_>>();
        drugs.sort_by_key(|drug| drug.to_string());

        Self {
            supported_drugs: Drug::supported(),
            drug_gene_map: drugs
                .into_iter()
                .map(|drug| (drug.to_string(), drug.primary_gene().to_string()))
                .collect(),
            supported_genes: Gene::supported(),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Main entry point for the `supported` command.
pub fn run(common_args: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::debug!("  common_args = {:?}", &common_args);
    tracing::debug!("  args = {:?}", &args);

    let catalog = Catalog::new();
    match &args.path_output {
        Some(path_output) => {
            let mut writer = open_write_maybe_gz(path_output)?;
            serde_json::to_writer_pretty(&mut writer, &catalog)?;
            writeln!(writer)?;
            writer.flush()?;
        }
        None => println!("{}", serde_json::to_string_pretty(&catalog)?),
    }

    Ok(())
}
