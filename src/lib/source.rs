//! Record sources: BAM/SAM input from a path or stdin.

use std::path::Path;

use rust_htslib::bam::{self, Read, Record};

use crate::core::error::{DemuxError, Result};
use crate::core::fs::is_stdio;

/// Open an alignment file, or stdin when `path` is `-`.
pub fn open_reader<P: AsRef<Path>>(path: P, threads: usize) -> Result<bam::Reader> {
    let path = path.as_ref();
    let mut reader = if is_stdio(path) {
        bam::Reader::from_stdin()?
    } else {
        bam::Reader::from_path(path)?
    };
    if threads > 1 {
        reader.set_threads(threads)?;
    }
    Ok(reader)
}

/// Ordered stream of records, each allocated fresh and handed to the caller.
pub fn records(reader: &mut bam::Reader) -> impl Iterator<Item = Result<Record>> + '_ {
    reader.records().map(|r| r.map_err(DemuxError::from))
}
