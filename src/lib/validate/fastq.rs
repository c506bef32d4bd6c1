//! Lazy grouping of FASTQ text into four-line records.
//!
//! Lines are read as raw bytes so non-UTF-8 content in a sequence or quality
//! line is counted like any other record instead of aborting the pair.

use std::io::BufRead;

use crate::core::error::Result;

/// One four-line FASTQ entry: header, sequence, separator, quality.
///
/// The header is decoded lossily for comparison and logging; lengths are
/// measured in bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPairRecord {
    pub header: String,
    pub sequence: Vec<u8>,
    pub separator: Vec<u8>,
    pub quality: Vec<u8>,
    /// 1-based line number of the header within its file.
    pub line: u64,
}

impl ReadPairRecord {
    #[inline]
    pub fn lengths_match(&self) -> bool {
        self.sequence.len() == self.quality.len()
    }

    /// Header plus both lengths, for log lines.
    pub fn describe(&self) -> String {
        format!(
            "{} (sequence {} bp, quality {} bp)",
            self.header,
            self.sequence.len(),
            self.quality.len()
        )
    }
}

/// Reads [`ReadPairRecord`]s from a line-oriented source without buffering
/// more than one record.
pub struct ReadPairReader<R: BufRead> {
    inner: R,
    buffer: Vec<u8>,
    lines_read: u64,
    records: u64,
    /// Lines of a trailing record that ended before its fourth line.
    partial_lines: u64,
}

impl<R: BufRead> ReadPairReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: Vec::with_capacity(256),
            lines_read: 0,
            records: 0,
            partial_lines: 0,
        }
    }

    fn next_line(&mut self) -> Result<Option<Vec<u8>>> {
        self.buffer.clear();
        if self.inner.read_until(b'\n', &mut self.buffer)? == 0 {
            return Ok(None);
        }
        self.lines_read += 1;
        let mut end = self.buffer.len();
        while end > 0 && matches!(self.buffer[end - 1], b'\n' | b'\r') {
            end -= 1;
        }
        Ok(Some(self.buffer[..end].to_vec()))
    }

    /// Next complete record, or `None` at end of input.
    ///
    /// A trailing incomplete record is not returned; it is reported through
    /// [`is_truncated`](Self::is_truncated).
    pub fn next_record(&mut self) -> Result<Option<ReadPairRecord>> {
        let line = self.lines_read + 1;
        let header = match self.next_line()? {
            Some(h) => h,
            None => return Ok(None),
        };
        let mut rest: [Vec<u8>; 3] = Default::default();
        for (i, slot) in rest.iter_mut().enumerate() {
            match self.next_line()? {
                Some(l) => *slot = l,
                None => {
                    self.partial_lines = i as u64 + 1;
                    return Ok(None);
                }
            }
        }
        let [sequence, separator, quality] = rest;
        self.records += 1;
        Ok(Some(ReadPairRecord {
            header: String::from_utf8_lossy(&header).into_owned(),
            sequence,
            separator,
            quality,
            line,
        }))
    }

    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    pub fn is_truncated(&self) -> bool {
        self.partial_lines > 0
    }
}

impl<R: BufRead> Iterator for ReadPairReader<R> {
    type Item = Result<ReadPairRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
