//! BAM-backed router passes.

use std::path::Path;

use log::info;
use rust_htslib::bam::Read;

use crate::config::RoutePlan;
use crate::core::error::Result;
use crate::router::{Router, RunStats};
use crate::sink::{BamSinkFactory, SinkRegistry};
use crate::source::{open_reader, records};

/// Run one router pass over a BAM/SAM input (`-` for stdin).
///
/// Output headers are copied from the input header.
pub fn route_bam<P: AsRef<Path>>(input: P, plan: &RoutePlan, threads: usize) -> Result<RunStats> {
    let input = input.as_ref();
    info!("Reading alignments from {}", input.display());

    let mut reader = open_reader(input, threads)?;
    let factory = BamSinkFactory::new(reader.header(), plan.layout.clone()).with_threads(threads);
    let router = Router::new(plan.policy.clone()).with_progress_interval(plan.progress_interval);

    router.route(records(&mut reader), SinkRegistry::new(factory))
}
