mod args;

use anyhow::{Context, Result};
use bcdemux_lib::config::{RouteMode, RouterConfig};
use bcdemux_lib::report::RunSummary;
use bcdemux_lib::workflow::route_bam;
use log::info;

use crate::commands::common::{self, Outcome};

pub use args::{FilterArgs, QcFilterArgs};

/// Execute the `filter` command: keep records whose barcode is allowed.
pub fn run_filter(args: FilterArgs) -> Result<Outcome> {
    info!(
        "filtering {:?} by barcodes in {:?} and tag={}",
        args.input, args.barcodes, args.tag
    );
    let plan = RouterConfig::from(&args).plan(RouteMode::AllowList)?;

    let stats = route_bam(&args.input, &plan, args.threads)
        .with_context(|| format!("Failed to filter {}", args.input.display()))?;

    let mut summary = RunSummary::new();
    summary.record_routing("filter", &stats);
    common::finish(&summary, &args.summary)
}

/// Execute the `qc-filter` command: drop records whose aligned sequence and
/// quality lengths disagree.
pub fn run_qc_filter(args: QcFilterArgs) -> Result<Outcome> {
    info!("filtering {:?} for sequence/quality length mismatches", args.input);
    let plan = RouterConfig::from(&args).plan(RouteMode::QualityFilter)?;

    let stats = route_bam(&args.input, &plan, args.threads)
        .with_context(|| format!("Failed to filter {}", args.input.display()))?;

    let mut summary = RunSummary::new();
    summary.record_routing("qc-filter", &stats);
    common::finish(&summary, &args.summary)
}
