//! Single-pass classify-and-route engine.
//!
//! The [`Router`] pulls each record from a source exactly once, asks its
//! [`RoutingPolicy`] where the record belongs and forwards it to the
//! [`SinkRegistry`]. Nothing is buffered between records, so memory stays
//! bounded by the registry's handle table regardless of input length.

mod policy;

use log::{debug, info, warn};

use crate::core::error::Result;
use crate::record::{RoutingKey, TaggedRecord};
use crate::sink::{RecordSink, SinkFactory, SinkRegistry};

pub use policy::{Decision, DropReason, RoutingPolicy};

/// Key under which filtering policies open their single output.
pub const PASSTHROUGH: &str = "passthrough";

/// Default number of records between progress lines.
pub const PROGRESS_INTERVAL: u64 = 1_000_000;

/// Counters for one router pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub records_seen: u64,
    pub records_written: u64,
    pub records_dropped: u64,
    /// Subset of `records_dropped` caused by sequence/quality length mismatch.
    pub quality_mismatches: u64,
    pub sinks_opened: u64,
    pub sink_close_failures: u64,
}

impl RunStats {
    /// Non-fatal integrity anomalies recorded during the pass.
    pub fn anomalies(&self) -> u64 {
        self.quality_mismatches + self.sink_close_failures
    }
}

#[derive(Debug, Clone)]
pub struct Router {
    policy: RoutingPolicy,
    progress_interval: u64,
}

impl Router {
    pub fn new(policy: RoutingPolicy) -> Self {
        Self {
            policy,
            progress_interval: PROGRESS_INTERVAL,
        }
    }

    /// Emit a progress line every `interval` records; `0` disables progress.
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Consume `source` in delivery order and route every record.
    ///
    /// The registry is closed before returning on every path. A source or sink
    /// error aborts the pass; per-record anomalies are counted and skipped.
    pub fn route<I, F>(&self, source: I, mut sinks: SinkRegistry<F>) -> Result<RunStats>
    where
        I: IntoIterator<Item = Result<F::Record>>,
        F: SinkFactory,
        F::Record: TaggedRecord,
    {
        info!("Routing records with the {} policy", self.policy.name());
        let mut stats = RunStats::default();

        let outcome = self.pump(source, &mut sinks, &mut stats);
        stats.sinks_opened = sinks.len() as u64;

        let failures = sinks.close_all();
        stats.sink_close_failures = failures.len() as u64;

        outcome?;
        info!(
            "Routed {} records: {} written, {} dropped across {} sinks",
            stats.records_seen, stats.records_written, stats.records_dropped, stats.sinks_opened
        );
        Ok(stats)
    }

    fn pump<I, F>(
        &self,
        source: I,
        sinks: &mut SinkRegistry<F>,
        stats: &mut RunStats,
    ) -> Result<()>
    where
        I: IntoIterator<Item = Result<F::Record>>,
        F: SinkFactory,
        F::Record: TaggedRecord,
    {
        let passthrough = RoutingKey::new(PASSTHROUGH);
        // The shared output exists even when every record is dropped.
        if self.policy.is_pass_through() {
            sinks.get_or_create(&passthrough)?;
        }

        for record in source {
            let record = record?;
            stats.records_seen += 1;

            match self.policy.decide(&record) {
                Decision::Route(key) => {
                    sinks.get_or_create(&key)?.write(&record)?;
                    stats.records_written += 1;
                }
                Decision::Forward => {
                    sinks.get_or_create(&passthrough)?.write(&record)?;
                    stats.records_written += 1;
                }
                Decision::Drop(reason) => {
                    stats.records_dropped += 1;
                    match reason {
                        DropReason::NotAllowed(key) => debug!("dropping barcode {}", key),
                        DropReason::Undetermined => {
                            debug!("dropping untagged record {}", record.query_name())
                        }
                        DropReason::QualityMismatch { .. } => {
                            stats.quality_mismatches += 1;
                            warn!(
                                "Dropping record with sequence/quality length mismatch: {}",
                                record.describe()
                            );
                        }
                    }
                }
            }

            if self.progress_interval > 0 && stats.records_seen % self.progress_interval == 0 {
                info!(
                    "Processed {} records ({} written, {} dropped, {} sinks)",
                    stats.records_seen,
                    stats.records_written,
                    stats.records_dropped,
                    sinks.len()
                );
            }
        }
        Ok(())
    }
}

/// Route `source` through `policy` into `sinks` with default progress output.
pub fn route<I, F>(source: I, policy: RoutingPolicy, sinks: SinkRegistry<F>) -> Result<RunStats>
where
    I: IntoIterator<Item = Result<F::Record>>,
    F: SinkFactory,
    F::Record: TaggedRecord,
{
    Router::new(policy).route(source, sinks)
}
