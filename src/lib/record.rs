//! Record abstraction consumed by the router.
//!
//! The router never looks inside the binary layout of an alignment. It only
//! needs tag lookup, the query name and the aligned sequence/quality lengths,
//! which are captured by [`TaggedRecord`]. The BAM codec backs this trait with
//! `rust_htslib` records; tests use an in-memory implementation.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use rust_htslib::bam::record::{Aux, Cigar, Record};

use crate::core::error::DemuxError;

/// Bucket for records that lack the configured tag.
pub const UNDETERMINED: &str = "undetermined";

/// Missing base qualities are stored as a run of `0xFF` bytes.
const MISSING_QUALITY: u8 = 0xFF;

/// Two-character SAM auxiliary tag, e.g. `CB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag([u8; 2]);

impl Tag {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        // Construction only admits ASCII alphanumerics.
        std::str::from_utf8(&self.0).unwrap_or("??")
    }
}

impl FromStr for Tag {
    type Err = DemuxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 || !bytes.iter().all(|b| b.is_ascii_alphanumeric()) {
            return Err(DemuxError::config(format!(
                "tag must be two alphanumeric characters, got '{}'",
                s
            )));
        }
        if !bytes[0].is_ascii_alphabetic() {
            return Err(DemuxError::config(format!(
                "tag must start with a letter, got '{}'",
                s
            )));
        }
        Ok(Tag([bytes[0], bytes[1]]))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key a record is routed on: a stringified tag value or [`UNDETERMINED`].
///
/// Compared by exact, case-sensitive value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoutingKey(String);

impl RoutingKey {
    pub fn new<S: Into<String>>(value: S) -> Self {
        RoutingKey(value.into())
    }

    pub fn undetermined() -> Self {
        RoutingKey(UNDETERMINED.to_string())
    }

    /// Key for a record under `tag`, falling back to [`UNDETERMINED`].
    pub fn for_record<R: TaggedRecord + ?Sized>(record: &R, tag: &Tag) -> Self {
        record
            .tag_value(tag)
            .map(RoutingKey)
            .unwrap_or_else(RoutingKey::undetermined)
    }

    #[inline]
    pub fn is_undetermined(&self) -> bool {
        self.0 == UNDETERMINED
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoutingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read access the router needs from an alignment record.
pub trait TaggedRecord {
    /// Stringified value of `tag`, or `None` when the record does not carry it.
    fn tag_value(&self, tag: &Tag) -> Option<String>;

    fn query_name(&self) -> Cow<'_, str>;

    /// Length of the aligned portion of the sequence (soft clips excluded).
    fn aligned_sequence_len(&self) -> usize;

    /// Length of the aligned portion of the base qualities (soft clips excluded).
    fn aligned_quality_len(&self) -> usize;

    /// Diagnostic one-line rendering used in warnings.
    fn describe(&self) -> String {
        format!(
            "{} aligned_seq_len={} aligned_qual_len={}",
            self.query_name(),
            self.aligned_sequence_len(),
            self.aligned_quality_len()
        )
    }
}

fn join_array<T: ToString>(values: impl Iterator<Item = T>) -> String {
    values.map(|v| v.to_string()).collect::<Vec<_>>().join(",")
}

fn stringify_aux(value: Aux<'_>) -> Option<String> {
    let s = match value {
        Aux::String(s) | Aux::HexByteArray(s) => s.to_string(),
        Aux::Char(c) => (c as char).to_string(),
        Aux::I8(v) => v.to_string(),
        Aux::U8(v) => v.to_string(),
        Aux::I16(v) => v.to_string(),
        Aux::U16(v) => v.to_string(),
        Aux::I32(v) => v.to_string(),
        Aux::U32(v) => v.to_string(),
        Aux::Float(v) => v.to_string(),
        Aux::Double(v) => v.to_string(),
        Aux::ArrayI8(arr) => join_array(arr.iter()),
        Aux::ArrayU8(arr) => join_array(arr.iter()),
        Aux::ArrayI16(arr) => join_array(arr.iter()),
        Aux::ArrayU16(arr) => join_array(arr.iter()),
        Aux::ArrayI32(arr) => join_array(arr.iter()),
        Aux::ArrayU32(arr) => join_array(arr.iter()),
        Aux::ArrayFloat(arr) => join_array(arr.iter()),
    };
    Some(s)
}

fn soft_clipped(record: &Record) -> usize {
    record
        .cigar()
        .iter()
        .map(|op| match op {
            Cigar::SoftClip(len) => *len as usize,
            _ => 0,
        })
        .sum()
}

impl TaggedRecord for Record {
    fn tag_value(&self, tag: &Tag) -> Option<String> {
        self.aux(tag.as_bytes()).ok().and_then(stringify_aux)
    }

    fn query_name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.qname())
    }

    fn aligned_sequence_len(&self) -> usize {
        self.seq_len().saturating_sub(soft_clipped(self))
    }

    fn aligned_quality_len(&self) -> usize {
        let qual = self.qual();
        if qual.first().map_or(true, |&q| q == MISSING_QUALITY) {
            return 0;
        }
        qual.len().saturating_sub(soft_clipped(self))
    }

    fn describe(&self) -> String {
        format!(
            "{} cigar={} seq_len={} aligned_seq_len={} aligned_qual_len={}",
            self.query_name(),
            self.cigar(),
            self.seq_len(),
            self.aligned_sequence_len(),
            self.aligned_quality_len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_htslib::bam::record::CigarString;

    fn record(qname: &[u8], cigar: Vec<Cigar>, seq: &[u8], qual: &[u8]) -> Record {
        let mut rec = Record::new();
        let cigar = CigarString(cigar);
        rec.set(qname, Some(&cigar), seq, qual);
        rec
    }

    #[test]
    fn parses_valid_tags() {
        assert_eq!("CB".parse::<Tag>().unwrap().as_bytes(), b"CB");
        assert_eq!("X0".parse::<Tag>().unwrap().to_string(), "X0");
    }

    #[test]
    fn rejects_malformed_tags() {
        for bad in ["", "C", "CBX", "C-", "1B"] {
            let err = bad.parse::<Tag>().unwrap_err();
            assert!(err.is_config(), "{} should be a config error", bad);
        }
    }

    #[test]
    fn key_falls_back_to_undetermined() {
        let tag: Tag = "CB".parse().unwrap();
        let mut rec = record(b"r1", vec![Cigar::Match(4)], b"ACGT", &[30; 4]);
        assert!(RoutingKey::for_record(&rec, &tag).is_undetermined());

        rec.push_aux(b"CB", Aux::String("AAACGG-1")).unwrap();
        assert_eq!(RoutingKey::for_record(&rec, &tag).as_str(), "AAACGG-1");
    }

    #[test]
    fn numeric_tags_are_stringified() {
        let tag: Tag = "NH".parse().unwrap();
        let mut rec = record(b"r1", vec![Cigar::Match(4)], b"ACGT", &[30; 4]);
        rec.push_aux(b"NH", Aux::I32(3)).unwrap();
        assert_eq!(rec.tag_value(&tag).as_deref(), Some("3"));
    }

    #[test]
    fn aligned_lengths_exclude_soft_clips() {
        let rec = record(
            b"r1",
            vec![Cigar::SoftClip(2), Cigar::Match(6), Cigar::SoftClip(1)],
            b"ACGTACGTA",
            &[30; 9],
        );
        assert_eq!(rec.aligned_sequence_len(), 6);
        assert_eq!(rec.aligned_quality_len(), 6);
    }

    #[test]
    fn missing_qualities_have_zero_aligned_length() {
        let rec = record(b"r1", vec![Cigar::Match(4)], b"ACGT", &[0xFF; 4]);
        assert_eq!(rec.aligned_sequence_len(), 4);
        assert_eq!(rec.aligned_quality_len(), 0);
        assert!(rec.describe().contains("r1"));
    }
}
