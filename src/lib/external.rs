//! Opaque external transform steps (collate, BAM -> paired FASTQ).
//!
//! These are delegated to `samtools`; only the exit status is inspected.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};

use crate::core::error::{DemuxError, Result};

pub const DEFAULT_SAMTOOLS: &str = "samtools";

/// Paths of the two mate files produced for one split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastqPair {
    pub r1: PathBuf,
    pub r2: PathBuf,
}

impl FastqPair {
    /// `{dir}/{stem}_1.fq` and `{dir}/{stem}_2.fq`.
    pub fn in_dir<P: AsRef<Path>>(dir: P, stem: &str) -> Self {
        let dir = dir.as_ref();
        FastqPair {
            r1: dir.join(format!("{}_1.fq", stem)),
            r2: dir.join(format!("{}_2.fq", stem)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Samtools {
    binary: PathBuf,
}

impl Default for Samtools {
    fn default() -> Self {
        Self::new(DEFAULT_SAMTOOLS)
    }
}

impl Samtools {
    pub fn new<P: AsRef<Path>>(binary: P) -> Self {
        Self {
            binary: binary.as_ref().to_path_buf(),
        }
    }

    /// Group mates together: `samtools collate -o OUT IN`.
    pub fn collate(&self, input: &Path, output: &Path) -> Result<()> {
        info!("collating bam file {}", input.display());
        self.run(
            "collate",
            &[OsStr::new("-o"), output.as_os_str(), input.as_os_str()],
        )
    }

    /// Convert a collated BAM into paired FASTQ, discarding singletons and
    /// secondary/supplementary alignments.
    pub fn fastq(&self, input: &Path, pair: &FastqPair) -> Result<()> {
        info!("generating fastq files for {}", input.display());
        self.run(
            "fastq",
            &[
                OsStr::new("-1"),
                pair.r1.as_os_str(),
                OsStr::new("-2"),
                pair.r2.as_os_str(),
                OsStr::new("-0"),
                OsStr::new("/dev/null"),
                OsStr::new("-s"),
                OsStr::new("/dev/null"),
                OsStr::new("-n"),
                OsStr::new("-F"),
                OsStr::new("0x900"),
                input.as_os_str(),
            ],
        )
    }

    fn run(&self, step: &str, args: &[&OsStr]) -> Result<()> {
        debug!("{} {} {:?}", self.binary.display(), step, args);
        let status = Command::new(&self.binary)
            .arg(step)
            .args(args)
            .status()
            .map_err(|e| {
                DemuxError::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to launch {}: {}", self.binary.display(), e),
                ))
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(DemuxError::External {
                step: step.to_string(),
                status: status.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fastq_pair_naming() {
        let pair = FastqPair::in_dir("/out/fastq", "AAACGG-1");
        assert_eq!(pair.r1, PathBuf::from("/out/fastq/AAACGG-1_1.fq"));
        assert_eq!(pair.r2, PathBuf::from("/out/fastq/AAACGG-1_2.fq"));
    }

    #[test]
    fn failing_step_is_reported() {
        let tool = Samtools::new("false");
        let err = tool
            .collate(Path::new("in.bam"), Path::new("out.bam"))
            .unwrap_err();
        match err {
            DemuxError::External { step, .. } => assert_eq!(step, "collate"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn successful_step_passes() {
        let tool = Samtools::new("true");
        let pair = FastqPair::in_dir("/tmp", "x");
        assert!(tool.fastq(Path::new("in.bam"), &pair).is_ok());
    }

    #[test]
    fn missing_binary_is_an_io_error() {
        let tool = Samtools::new("/no/such/samtools");
        let err = tool
            .collate(Path::new("in.bam"), Path::new("out.bam"))
            .unwrap_err();
        assert!(matches!(err, DemuxError::Io(_)));
    }
}
