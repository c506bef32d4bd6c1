//! Cell barcode allow-list.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use log::info;
use rustc_hash::FxHashSet;

use crate::core::error::Result;
use crate::core::io::get_reader;

/// How the allow-list table is laid out. Only the first column is read.
#[derive(Debug, Clone, Copy)]
pub struct TableFormat {
    pub delimiter: u8,
    pub has_header: bool,
}

impl Default for TableFormat {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: false,
        }
    }
}

/// Immutable set of routing keys loaded once from a summary table.
#[derive(Debug, Clone, Default)]
pub struct AllowSet {
    keys: Arc<FxHashSet<String>>,
}

impl AllowSet {
    /// Load the first column of a (optionally gzipped) delimited table.
    pub fn from_path<P: AsRef<Path>>(path: P, format: TableFormat) -> Result<Self> {
        let path = path.as_ref();
        let reader = get_reader(&Some(path), format.delimiter, format.has_header)?;
        let set = Self::from_csv(reader)?;
        info!("Loaded {} allowed barcodes from {:?}", set.len(), path);
        Ok(set)
    }

    pub fn from_reader<R: Read>(reader: R, format: TableFormat) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .delimiter(format.delimiter)
            .has_headers(format.has_header)
            .flexible(true)
            .from_reader(reader);
        Self::from_csv(reader)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let mut keys = FxHashSet::default();
        for row in reader.records() {
            let row = row?;
            if let Some(first) = row.get(0).map(str::trim) {
                if !first.is_empty() {
                    keys.insert(first.to_string());
                }
            }
        }
        keys.shrink_to_fit();
        Ok(AllowSet {
            keys: Arc::new(keys),
        })
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for AllowSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        AllowSet {
            keys: Arc::new(iter.into_iter().map(Into::into).collect()),
        }
    }
}
