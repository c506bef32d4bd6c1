//! In-memory records and sinks shared by unit tests.

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::core::error::{DemuxError, Result};
use crate::record::{RoutingKey, Tag, TaggedRecord};
use crate::sink::{RecordSink, SinkFactory};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemRecord {
    pub name: String,
    pub tags: HashMap<String, String>,
    pub seq_len: usize,
    pub qual_len: usize,
}

impl MemRecord {
    pub fn new(name: &str) -> Self {
        MemRecord {
            name: name.to_string(),
            tags: HashMap::new(),
            seq_len: 4,
            qual_len: 4,
        }
    }

    pub fn tagged(name: &str, tag: &str, value: &str) -> Self {
        let mut rec = MemRecord::new(name);
        rec.tags.insert(tag.to_string(), value.to_string());
        rec
    }

    pub fn with_lengths(mut self, seq_len: usize, qual_len: usize) -> Self {
        self.seq_len = seq_len;
        self.qual_len = qual_len;
        self
    }
}

impl TaggedRecord for MemRecord {
    fn tag_value(&self, tag: &Tag) -> Option<String> {
        self.tags.get(tag.as_str()).cloned()
    }

    fn query_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }

    fn aligned_sequence_len(&self) -> usize {
        self.seq_len
    }

    fn aligned_quality_len(&self) -> usize {
        self.qual_len
    }
}

/// Shared view of everything written, keyed by sink key in creation order.
#[derive(Debug, Default)]
pub struct MemStore {
    pub order: Vec<RoutingKey>,
    pub written: FxHashMap<RoutingKey, Vec<MemRecord>>,
    pub closed: Vec<RoutingKey>,
}

pub struct MemSink {
    key: RoutingKey,
    store: Rc<RefCell<MemStore>>,
    fail_close: bool,
}

impl RecordSink<MemRecord> for MemSink {
    fn write(&mut self, record: &MemRecord) -> Result<()> {
        self.store
            .borrow_mut()
            .written
            .entry(self.key.clone())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    fn close(self) -> Result<()> {
        self.store.borrow_mut().closed.push(self.key.clone());
        if self.fail_close {
            return Err(DemuxError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("close failed for {}", self.key),
            )));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemFactory {
    pub store: Rc<RefCell<MemStore>>,
    /// Keys whose creation fails.
    pub refuse: Vec<String>,
    /// Keys whose close fails.
    pub fail_close: Vec<String>,
}

impl SinkFactory for MemFactory {
    type Record = MemRecord;
    type Sink = MemSink;

    fn create(&self, key: &RoutingKey) -> Result<MemSink> {
        if self.refuse.iter().any(|k| k == key.as_str()) {
            return Err(DemuxError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "output directory is not writable",
            )));
        }
        self.store.borrow_mut().order.push(key.clone());
        Ok(MemSink {
            key: key.clone(),
            store: Rc::clone(&self.store),
            fail_close: self.fail_close.iter().any(|k| k == key.as_str()),
        })
    }

    fn target_path(&self, key: &RoutingKey) -> std::path::PathBuf {
        std::path::PathBuf::from(format!("mem://{}", key))
    }
}
