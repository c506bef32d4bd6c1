use anyhow::{Context, Result};
use bcdemux_lib::core::prelude::{make_parent_dirs, EXIT_ANOMALIES};
use bcdemux_lib::report::RunSummary;
use log::{info, warn};
use std::path::PathBuf;

/// How a command that ran to completion ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    /// Non-fatal anomalies were counted during the run.
    Anomalies(u64),
}

impl Outcome {
    pub fn from_summary(summary: &RunSummary) -> Self {
        match summary.total_errors() {
            0 => Outcome::Clean,
            n => Outcome::Anomalies(n),
        }
    }

    #[inline]
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Clean => 0,
            Outcome::Anomalies(_) => EXIT_ANOMALIES,
        }
    }
}

/// Log the summary, optionally persist it as TSV and derive the outcome.
pub fn finish(summary: &RunSummary, summary_path: &Option<PathBuf>) -> Result<Outcome> {
    summary.log();
    if let Some(path) = summary_path {
        make_parent_dirs(path)?;
        summary
            .write_tsv(Some(path))
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        info!("Summary written to {}", path.display());
    }

    let outcome = Outcome::from_summary(summary);
    if let Outcome::Anomalies(n) = outcome {
        warn!("Run completed with {} recorded anomalies; check the log", n);
    }
    Ok(outcome)
}

/// Parse a single-byte table delimiter; `tab` and `\t` mean a tab.
pub fn parse_delimiter(raw: &str) -> std::result::Result<u8, String> {
    match raw {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        s if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        other => Err(format!("delimiter must be a single ASCII character, got '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcdemux_lib::router::RunStats;

    #[test]
    fn outcome_reflects_errors() {
        let mut summary = RunSummary::new();
        summary.record_routing("demux", &RunStats::default());
        assert_eq!(Outcome::from_summary(&summary), Outcome::Clean);
        assert_eq!(Outcome::Clean.exit_code(), 0);

        summary.record_error("pipeline");
        let outcome = Outcome::from_summary(&summary);
        assert_eq!(outcome, Outcome::Anomalies(1));
        assert_eq!(outcome.exit_code(), EXIT_ANOMALIES);
    }

    #[test]
    fn delimiters() {
        assert_eq!(parse_delimiter(",").unwrap(), b',');
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert!(parse_delimiter(";;").is_err());
    }
}
