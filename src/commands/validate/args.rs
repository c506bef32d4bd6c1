use bcdemux_lib::core::error::DemuxError;
use bcdemux_lib::validate::{HeaderMatch, ValidatorConfig};
use std::path::PathBuf;
use structopt::StructOpt;

use super::input::discover_pairs;

/// CLI arguments for the `validate` subcommand.
///
/// Either give one pair with `--r1`/`--r2`, or a directory whose files sort
/// so that mates are adjacent (`x_1.fq`, `x_2.fq`, ...).
#[derive(Debug, Clone, StructOpt)]
#[structopt(author, name = "validate")]
pub struct ValidateArgs {
    /// First file of a single pair.
    #[structopt(long = "r1", short = "1", parse(from_os_str), requires = "r2")]
    pub r1: Option<PathBuf>,

    /// Second file of a single pair.
    #[structopt(long = "r2", short = "2", parse(from_os_str), requires = "r1")]
    pub r2: Option<PathBuf>,

    /// Directory scanned for FASTQ pairs.
    #[structopt(long, short = "i", parse(from_os_str), conflicts_with = "r1")]
    pub input_dir: Option<PathBuf>,

    /// Extension of the FASTQ files in `--input-dir`.
    #[structopt(long, short = "e", default_value = ".fq")]
    pub ext: String,

    /// Header comparison: exact, mate-suffix or read-name.
    #[structopt(long, default_value = "mate-suffix")]
    pub header_match: HeaderMatch,

    /// Write the run summary to this TSV file.
    #[structopt(long, parse(from_os_str))]
    pub summary: Option<PathBuf>,
}

impl ValidateArgs {
    /// The file pairs to validate, in order.
    pub fn pairs(&self) -> Result<Vec<(PathBuf, PathBuf)>, DemuxError> {
        match (&self.r1, &self.r2, &self.input_dir) {
            (Some(r1), Some(r2), None) => Ok(vec![(r1.clone(), r2.clone())]),
            (None, None, Some(dir)) => discover_pairs(dir, &self.ext),
            _ => Err(DemuxError::config(
                "specify either --r1 and --r2, or --input-dir",
            )),
        }
    }

    pub fn validator_config(&self) -> ValidatorConfig {
        ValidatorConfig {
            header_match: self.header_match,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_pair() {
        let args =
            ValidateArgs::from_iter_safe(&["validate", "--r1", "a_1.fq", "--r2", "a_2.fq"]).unwrap();
        assert_eq!(args.header_match, HeaderMatch::MateSuffix);
        assert_eq!(
            args.pairs().unwrap(),
            vec![(PathBuf::from("a_1.fq"), PathBuf::from("a_2.fq"))]
        );
    }

    #[test]
    fn needs_some_input() {
        let args = ValidateArgs::from_iter_safe(&["validate"]).unwrap();
        assert!(args.pairs().unwrap_err().is_config());
    }

    #[test]
    fn rejects_unknown_header_mode() {
        assert!(ValidateArgs::from_iter_safe(&[
            "validate",
            "-i",
            "fastq",
            "--header-match",
            "fuzzy"
        ])
        .is_err());
    }
}
