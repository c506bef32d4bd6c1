//! bcdemux - cell barcode demultiplexing for single-cell BAM files
//!
//! Splits a BAM file into one output per cell barcode, filters records by a
//! barcode allow-list or by sequence/quality consistency, and validates the
//! paired FASTQ files derived from each split.
//!
//! # Tools
//!
//! - `demux`: Split a BAM by a barcode tag into `{dir}/{barcode}.bam`
//! - `filter`: Keep records whose barcode appears in an allow-list
//! - `qc-filter`: Drop records whose sequence and quality lengths differ
//! - `validate`: Check paired FASTQ files record by record
//! - `pipeline`: filter, demux, collate, convert to FASTQ and validate
//!
//! # Usage
//!
//! ```bash
//! # One BAM per barcode, untagged records go to undetermined.bam
//! bcdemux demux input.bam -o splits
//!
//! # Keep only called cells
//! bcdemux filter input.bam -b metrics.csv -o filtered.bam
//!
//! # Validate every pair in a directory
//! bcdemux validate -i fastq --ext .fq --summary summary.tsv
//!
//! # Everything at once, eight workers
//! bcdemux pipeline input.bam -o out -b metrics.csv -@ 8
//! ```
//!
//! Exit status: 0 on success, 1 on a fatal error, 2 on a configuration error
//! and 3 when the run completed but recorded anomalies.

extern crate bcdemux_lib;
pub mod commands;
use anyhow::Result;
use bcdemux_lib::core::prelude::{exit_code_for, is_broken_pipe};
use commands::Outcome;
use env_logger::Env;
use log::*;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case", author, about)]
/// Cell barcode demultiplexing and paired FASTQ validation
struct Args {
    #[structopt(subcommand)]
    subcommand: Subcommand,
}

#[derive(StructOpt)]
enum Subcommand {
    /// Split a BAM file into one file per barcode
    Demux(commands::DemuxArgs),
    /// Keep records whose barcode is in an allow-list
    Filter(commands::FilterArgs),
    /// Drop records whose sequence and quality lengths differ
    QcFilter(commands::QcFilterArgs),
    /// Validate paired FASTQ files
    Validate(commands::ValidateArgs),
    /// Filter, split, convert and validate in one run
    Pipeline(commands::PipelineArgs),
}

impl Subcommand {
    fn run(self) -> Result<Outcome> {
        match self {
            Subcommand::Demux(args) => commands::run_demux(args),
            Subcommand::Filter(args) => commands::run_filter(args),
            Subcommand::QcFilter(args) => commands::run_qc_filter(args),
            Subcommand::Validate(args) => commands::run_validate(args),
            Subcommand::Pipeline(args) => commands::run_pipeline(args),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    match Args::from_args().subcommand.run() {
        Ok(Outcome::Clean) => {}
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(err) => {
            if is_broken_pipe(&err) {
                std::process::exit(0);
            }
            error!("{:#}", err);
            std::process::exit(exit_code_for(&err));
        }
    }
}
