use bcdemux_lib::allow_set::TableFormat;
use bcdemux_lib::config::{RouterConfig, DEFAULT_TAG};
use std::path::PathBuf;
use structopt::StructOpt;

use crate::commands::common::parse_delimiter;

/// CLI arguments for the `filter` subcommand.
#[derive(Debug, Clone, StructOpt)]
#[structopt(author, name = "filter")]
pub struct FilterArgs {
    /// Input BAM/SAM file, `-` for stdin.
    #[structopt(default_value = "-", parse(from_os_str))]
    pub input: PathBuf,

    /// Table of allowed barcodes; the first column of each row is used.
    #[structopt(long, short = "b", parse(from_os_str))]
    pub barcodes: PathBuf,

    /// Output BAM/SAM file, `-` for stdout.
    #[structopt(long, short = "o", default_value = "-", parse(from_os_str))]
    pub output: PathBuf,

    /// Tag holding the cell barcode.
    #[structopt(long, short = "t", default_value = DEFAULT_TAG)]
    pub tag: String,

    /// Also drop records that carry no barcode tag.
    #[structopt(long)]
    pub filter_undetermined: bool,

    /// Column delimiter of the barcode table (`tab` for tabs).
    #[structopt(long, default_value = ",", parse(try_from_str = parse_delimiter))]
    pub delimiter: u8,

    /// The barcode table starts with a header row.
    #[structopt(long)]
    pub header: bool,

    /// htslib threads for reading and writing.
    #[structopt(long, short = "@", default_value = "1")]
    pub threads: usize,

    /// Write the run summary to this TSV file.
    #[structopt(long, parse(from_os_str))]
    pub summary: Option<PathBuf>,
}

impl From<&FilterArgs> for RouterConfig {
    fn from(args: &FilterArgs) -> RouterConfig {
        RouterConfig {
            tag: Some(args.tag.clone()),
            output: Some(args.output.clone()),
            filter_undetermined: args.filter_undetermined,
            allow_set_source: Some(args.barcodes.clone()),
            allow_format: TableFormat {
                delimiter: args.delimiter,
                has_header: args.header,
            },
            ..Default::default()
        }
    }
}

/// CLI arguments for the `qc-filter` subcommand.
#[derive(Debug, Clone, StructOpt)]
#[structopt(author, name = "qc-filter")]
pub struct QcFilterArgs {
    /// Input BAM/SAM file, `-` for stdin.
    #[structopt(default_value = "-", parse(from_os_str))]
    pub input: PathBuf,

    /// Output BAM/SAM file, `-` for stdout.
    #[structopt(long, short = "o", default_value = "-", parse(from_os_str))]
    pub output: PathBuf,

    /// htslib threads for reading and writing.
    #[structopt(long, short = "@", default_value = "1")]
    pub threads: usize,

    /// Write the run summary to this TSV file.
    #[structopt(long, parse(from_os_str))]
    pub summary: Option<PathBuf>,
}

impl From<&QcFilterArgs> for RouterConfig {
    fn from(args: &QcFilterArgs) -> RouterConfig {
        RouterConfig {
            tag: None,
            output: Some(args.output.clone()),
            ..Default::default()
        }
    }
}
