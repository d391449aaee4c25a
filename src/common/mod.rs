//! Common functionality.

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

pub mod io;

pub use io::{open_read_maybe_gz, open_write_maybe_gz, read_to_string_maybe_gz};

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            verbose: Verbosity::new(0, 0),
        }
    }
}

/// Helper type for encoding genotypes in parsing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Genotype {
    /// hom. ref.
    HomRef,
    /// het.
    Het,
    /// hom. alt.
    HomAlt,
    /// other, includes no-call
    WithNoCall,
}

/// Supporting code for `Genotype`.
pub mod genotype {
    /// Error type for `Genotype::from_str()`.
    #[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
    pub enum Error {
        #[error("invalid genotype value: {0:?}")]
        InvalidValue(String),
    }
}

impl std::str::FromStr for Genotype {
    type Err = genotype::Error;

    /// Parse a diploid genotype; phased calls are normalized to unphased ones.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.replace('|', "/").as_str() {
            "0/0" => Genotype::HomRef,
            "0/1" | "1/0" => Genotype::Het,
            "1/1" => Genotype::HomAlt,
            "./." | "./0" | "./1" | "0/." | "1/." | "." => Genotype::WithNoCall,
            _ => return Err(genotype::Error::InvalidValue(s.to_string())),
        })
    }
}

impl std::fmt::Display for Genotype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Genotype::HomRef => "0/0",
            Genotype::Het => "0/1",
            Genotype::HomAlt => "1/1",
            Genotype::WithNoCall => "./.",
        };
        write!(f, "{}", s)
    }
}

/// Return the version of the `pgx-risk-worker` crate and `x.y.z` in tests.
pub fn worker_version() -> &'static str {
    if cfg!(test) {
        "x.y.z"
    } else {
        env!("CARGO_PKG_VERSION")
    }
}
