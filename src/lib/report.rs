//! Per-run summary counts collected across router and validator passes.

use std::collections::BTreeMap;
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::core::error::Result;
use crate::core::fs::is_gzipped;
use crate::core::io::get_writer;
use crate::router::RunStats;
use crate::validate::ValidationReport;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounts {
    pub files_processed: u64,
    pub total_reads: u64,
    pub total_errors: u64,
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    run: &'a str,
    files_processed: u64,
    total_reads: u64,
    total_errors: u64,
}

/// Run name -> counts. Callers own it and thread it through their passes.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    runs: BTreeMap<String, RunCounts>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, name: &str) -> &mut RunCounts {
        self.runs.entry(name.to_string()).or_default()
    }

    /// Add one router pass over a single input file.
    pub fn record_routing(&mut self, name: &str, stats: &RunStats) {
        let counts = self.entry(name);
        counts.files_processed += 1;
        counts.total_reads += stats.records_seen;
        counts.total_errors += stats.anomalies();
    }

    /// Add one validated file pair.
    pub fn record_validation(&mut self, name: &str, report: &ValidationReport) {
        let counts = self.entry(name);
        counts.files_processed += 2;
        counts.total_reads += report.total_reads();
        counts.total_errors += report.errors();
    }

    /// Count a failure that happened outside the router or validator,
    /// e.g. an external conversion step.
    pub fn record_error(&mut self, name: &str) {
        self.entry(name).total_errors += 1;
    }

    pub fn get(&self, name: &str) -> Option<&RunCounts> {
        self.runs.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RunCounts)> {
        self.runs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn total_errors(&self) -> u64 {
        self.runs.values().map(|c| c.total_errors).sum()
    }

    pub fn log(&self) {
        for (name, counts) in self.iter() {
            info!(
                "summary stats [{}]: files={} reads={} errors={}",
                name, counts.files_processed, counts.total_reads, counts.total_errors
            );
        }
    }

    /// Write the summary as TSV; `None` or `-` writes to stdout.
    pub fn write_tsv<P: AsRef<Path>>(&self, path: Option<P>) -> Result<()> {
        let gzipped = path.as_ref().map_or(false, |p| is_gzipped(p));
        let mut writer = get_writer(&path, gzipped, true, 1, 6)?;
        for (run, counts) in self.iter() {
            writer.serialize(SummaryRow {
                run,
                files_processed: counts.files_processed,
                total_reads: counts.total_reads,
                total_errors: counts.total_errors,
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}
