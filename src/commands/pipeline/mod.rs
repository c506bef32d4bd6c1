mod args;
mod workflow;

use anyhow::{Context, Result};
use bcdemux_lib::config::{RouteMode, DEFAULT_EXTENSION};
use bcdemux_lib::core::prelude::configure_global_thread_pool;
use bcdemux_lib::external::Samtools;
use bcdemux_lib::report::RunSummary;
use bcdemux_lib::validate::{Validator, ValidatorConfig};
use bcdemux_lib::workflow::route_bam;
use log::{info, warn};
use std::fs;

use crate::commands::common::{self, Outcome};

pub use args::PipelineArgs;
pub use workflow::{list_splits, SplitConverter, SplitOutcome};

/// Execute the full pipeline: optional allow-list filter, split by barcode,
/// then collate, convert and validate every split.
pub fn run_pipeline(args: PipelineArgs) -> Result<Outcome> {
    let threads = configure_global_thread_pool(args.threads)?;
    info!("pipeline on {:?} with {} threads", args.bam, threads);

    // Plans are resolved up front so configuration errors surface before any IO.
    let filter_plan = match args.filter_config() {
        Some(config) => {
            fs::create_dir_all(&args.output_dir)?;
            Some(config.plan(RouteMode::AllowList)?)
        }
        None => None,
    };
    let demux_plan = args.demux_config().plan(RouteMode::Demultiplex)?;

    let mut summary = RunSummary::new();

    let split_input = match &filter_plan {
        Some(plan) => {
            let stats = route_bam(&args.bam, plan, args.threads)
                .with_context(|| format!("Failed to filter {}", args.bam.display()))?;
            summary.record_routing("filter", &stats);
            args.filtered_bam()
        }
        None => args.bam.clone(),
    };

    let stats = route_bam(&split_input, &demux_plan, args.threads)
        .with_context(|| format!("Failed to demultiplex {}", split_input.display()))?;
    summary.record_routing("demux", &stats);

    let collate_dir = args.collate_dir();
    let fastq_dir = args.fastq_dir();
    fs::create_dir_all(&collate_dir)?;
    fs::create_dir_all(&fastq_dir)?;

    let splits = list_splits(&args.splits_dir(), DEFAULT_EXTENSION)?;
    let samtools = Samtools::new(&args.samtools);
    let validator = Validator::new(ValidatorConfig {
        header_match: args.header_match,
    });
    let converter = SplitConverter {
        samtools: &samtools,
        validator: &validator,
        collate_dir: &collate_dir,
        fastq_dir: &fastq_dir,
    };

    for outcome in converter.process_all(&splits) {
        match outcome {
            SplitOutcome::Validated { stem, report } => {
                if !report.valid() {
                    warn!("fastq pair for {} has {} errors", stem, report.errors());
                }
                summary.record_validation("validate", &report);
            }
            SplitOutcome::Failed { stem, error } => {
                warn!("no fastq produced for {}: {}", stem, error);
                summary.record_error("convert");
            }
        }
    }

    common::finish(&summary, &args.summary)
}
