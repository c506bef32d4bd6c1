use bcdemux_lib::allow_set::TableFormat;
use bcdemux_lib::config::{RouterConfig, DEFAULT_TAG};
use bcdemux_lib::external::DEFAULT_SAMTOOLS;
use bcdemux_lib::validate::HeaderMatch;
use std::path::PathBuf;
use structopt::StructOpt;

use crate::commands::common::parse_delimiter;

/// CLI arguments for the `pipeline` subcommand.
///
/// Output layout under `--output-dir`:
/// `filtered.bam` (only with `--barcodes`), `splits/`, `collate/`, `fastq/`.
#[derive(Debug, Clone, StructOpt)]
#[structopt(author, name = "pipeline")]
pub struct PipelineArgs {
    /// Input BAM file.
    #[structopt(parse(from_os_str))]
    pub bam: PathBuf,

    /// Root directory for every intermediate and final output.
    #[structopt(long, short = "o", parse(from_os_str))]
    pub output_dir: PathBuf,

    /// Restrict the input to barcodes listed in this table before splitting.
    #[structopt(long, short = "b", parse(from_os_str))]
    pub barcodes: Option<PathBuf>,

    /// Column delimiter of the barcode table (`tab` for tabs).
    #[structopt(long, default_value = ",", parse(try_from_str = parse_delimiter))]
    pub delimiter: u8,

    /// The barcode table starts with a header row.
    #[structopt(long)]
    pub header: bool,

    /// Tag holding the cell barcode.
    #[structopt(long, short = "t", default_value = DEFAULT_TAG)]
    pub tag: String,

    /// Drop untagged records during the allow-list pass.
    #[structopt(long)]
    pub filter_undetermined: bool,

    /// Worker threads for per-split conversion and htslib IO.
    #[structopt(long, short = "@", default_value = "1")]
    pub threads: usize,

    /// samtools executable used for collate and fastq.
    #[structopt(long, default_value = DEFAULT_SAMTOOLS, parse(from_os_str))]
    pub samtools: PathBuf,

    /// Header comparison for FASTQ validation: exact, mate-suffix or read-name.
    #[structopt(long, default_value = "mate-suffix")]
    pub header_match: HeaderMatch,

    /// Write the run summary to this TSV file.
    #[structopt(long, parse(from_os_str))]
    pub summary: Option<PathBuf>,
}

impl PipelineArgs {
    pub fn filtered_bam(&self) -> PathBuf {
        self.output_dir.join("filtered.bam")
    }

    pub fn splits_dir(&self) -> PathBuf {
        self.output_dir.join("splits")
    }

    pub fn collate_dir(&self) -> PathBuf {
        self.output_dir.join("collate")
    }

    pub fn fastq_dir(&self) -> PathBuf {
        self.output_dir.join("fastq")
    }

    /// Router options for the optional allow-list pass.
    pub fn filter_config(&self) -> Option<RouterConfig> {
        self.barcodes.as_ref().map(|barcodes| RouterConfig {
            tag: Some(self.tag.clone()),
            output: Some(self.filtered_bam()),
            filter_undetermined: self.filter_undetermined,
            allow_set_source: Some(barcodes.clone()),
            allow_format: TableFormat {
                delimiter: self.delimiter,
                has_header: self.header,
            },
            ..Default::default()
        })
    }

    /// Router options for the split pass.
    pub fn demux_config(&self) -> RouterConfig {
        RouterConfig {
            tag: Some(self.tag.clone()),
            output_dir: Some(self.splits_dir()),
            ..Default::default()
        }
    }
}
