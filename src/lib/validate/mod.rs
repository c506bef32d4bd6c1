//! Paired FASTQ consistency checks.
//!
//! Two files produced from the same split are walked in lock-step. For every
//! aligned pair the headers must agree (after optional mate-suffix
//! normalisation) and each side's sequence and quality strings must have the
//! same length. Afterwards the record counts of both files are compared.
//! Anomalies are counted in a [`ValidationReport`] rather than raised; only IO
//! failures abort validation.

mod fastq;

use std::borrow::Cow;
use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

use log::{error, info};

use crate::core::error::{DemuxError, Result};
use crate::core::io::open_text;

pub use fastq::{ReadPairReader, ReadPairRecord};

/// How pair headers are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderMatch {
    /// Byte-for-byte equality.
    Exact,
    /// Ignore a trailing `/1` or `/2` on the read name.
    #[default]
    MateSuffix,
    /// Compare only the read name (first word), ignoring `/1`/`/2` and any comment.
    ReadName,
}

impl HeaderMatch {
    pub fn normalize<'a>(&self, header: &'a str) -> Cow<'a, str> {
        match self {
            HeaderMatch::Exact => Cow::Borrowed(header),
            HeaderMatch::MateSuffix => {
                let (name, rest) = match header.find(char::is_whitespace) {
                    Some(idx) => header.split_at(idx),
                    None => (header, ""),
                };
                match strip_mate_suffix(name) {
                    Some(stripped) if rest.is_empty() => Cow::Borrowed(stripped),
                    Some(stripped) => Cow::Owned(format!("{}{}", stripped, rest)),
                    None => Cow::Borrowed(header),
                }
            }
            HeaderMatch::ReadName => {
                let name = header.split_whitespace().next().unwrap_or("");
                Cow::Borrowed(strip_mate_suffix(name).unwrap_or(name))
            }
        }
    }

    /// Whether two headers denote the same fragment under this mode.
    pub fn matches(&self, a: &str, b: &str) -> bool {
        self.normalize(a) == self.normalize(b)
    }
}

fn strip_mate_suffix(name: &str) -> Option<&str> {
    name.strip_suffix("/1").or_else(|| name.strip_suffix("/2"))
}

impl FromStr for HeaderMatch {
    type Err = DemuxError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "exact" => Ok(HeaderMatch::Exact),
            "mate-suffix" => Ok(HeaderMatch::MateSuffix),
            "read-name" => Ok(HeaderMatch::ReadName),
            other => Err(DemuxError::config(format!(
                "unknown header match mode '{}' (expected exact, mate-suffix or read-name)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatorConfig {
    pub header_match: HeaderMatch,
}

/// Outcome of validating one pair of files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub records_a: u64,
    pub records_b: u64,
    pub mismatched_headers: u64,
    pub length_mismatches_a: u64,
    pub length_mismatches_b: u64,
    /// 1 when the files hold a different number of records.
    pub file_length_mismatch: u64,
    pub truncated_a: u64,
    pub truncated_b: u64,
}

impl ValidationReport {
    /// `true` iff no anomaly of any kind was recorded.
    pub fn valid(&self) -> bool {
        self.errors() == 0
    }

    pub fn errors(&self) -> u64 {
        self.mismatched_headers
            + self.length_mismatches_a
            + self.length_mismatches_b
            + self.file_length_mismatch
            + self.truncated_a
            + self.truncated_b
    }

    pub fn total_reads(&self) -> u64 {
        self.records_a + self.records_b
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Validate two FASTQ files by path (plain, gzip, or `-` for stdin).
    pub fn validate_paths<P1: AsRef<Path>, P2: AsRef<Path>>(
        &self,
        a: P1,
        b: P2,
    ) -> Result<ValidationReport> {
        info!(
            "Validating pair {} {}",
            a.as_ref().display(),
            b.as_ref().display()
        );
        self.validate(open_text(a)?, open_text(b)?)
    }

    /// Walk both streams in lock-step and tally anomalies.
    pub fn validate<A: BufRead, B: BufRead>(&self, a: A, b: B) -> Result<ValidationReport> {
        let mut reader_a = ReadPairReader::new(a);
        let mut reader_b = ReadPairReader::new(b);
        let mut report = ValidationReport::default();

        loop {
            let (rec_a, rec_b) = (reader_a.next_record()?, reader_b.next_record()?);
            if rec_a.is_none() && rec_b.is_none() {
                break;
            }

            if let (Some(ra), Some(rb)) = (&rec_a, &rec_b) {
                if !self.config.header_match.matches(&ra.header, &rb.header) {
                    error!(
                        "mismatched tags at line {}: {} {}",
                        ra.line, ra.header, rb.header
                    );
                    report.mismatched_headers += 1;
                }
            }

            if let Some(ra) = &rec_a {
                if !ra.lengths_match() {
                    error!(
                        "r1 sequence-quality length mismatch at line {}: {}",
                        ra.line,
                        ra.describe()
                    );
                    report.length_mismatches_a += 1;
                }
            }
            if let Some(rb) = &rec_b {
                if !rb.lengths_match() {
                    error!(
                        "r2 sequence-quality length mismatch at line {}: {}",
                        rb.line,
                        rb.describe()
                    );
                    report.length_mismatches_b += 1;
                }
            }
        }

        report.records_a = reader_a.records();
        report.records_b = reader_b.records();

        if reader_a.is_truncated() {
            error!("r1 ends with an incomplete record after line {}", reader_a.lines_read());
            report.truncated_a = 1;
        }
        if reader_b.is_truncated() {
            error!("r2 ends with an incomplete record after line {}", reader_b.lines_read());
            report.truncated_b = 1;
        }

        if report.records_a != report.records_b {
            error!(
                "different number of reads found: {}, {}",
                report.records_a, report.records_b
            );
            report.file_length_mismatch = 1;
        }

        if report.valid() {
            info!("Fastq files are valid ({} read pairs)", report.records_a);
        } else {
            error!("{} errors found in fastq pair", report.errors());
        }
        Ok(report)
    }
}

/// Validate two streams with the default configuration.
pub fn validate<A: BufRead, B: BufRead>(a: A, b: B) -> Result<ValidationReport> {
    Validator::default().validate(a, b)
}
