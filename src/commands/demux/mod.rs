mod args;

use anyhow::{Context, Result};
use bcdemux_lib::config::{RouteMode, RouterConfig};
use bcdemux_lib::report::RunSummary;
use bcdemux_lib::workflow::route_bam;
use log::info;

use crate::commands::common::{self, Outcome};

pub use args::DemuxArgs;

/// Execute the `demux` command end-to-end.
pub fn run_demux(args: DemuxArgs) -> Result<Outcome> {
    info!("splitting {:?} by tag {}", args.input, args.tag);
    let plan = RouterConfig::from(&args).plan(RouteMode::Demultiplex)?;

    let stats = route_bam(&args.input, &plan, args.threads)
        .with_context(|| format!("Failed to demultiplex {}", args.input.display()))?;

    let mut summary = RunSummary::new();
    summary.record_routing("demux", &stats);
    info!(
        "Demultiplexing complete: {} sinks in {:?}",
        stats.sinks_opened, args.output_dir
    );
    common::finish(&summary, &args.summary)
}
