//! Output sinks and the registry that owns them.
//!
//! A [`SinkFactory`] knows how to open an output for a [`RoutingKey`] (for BAM
//! output it carries the header template copied from the input), and the
//! [`SinkRegistry`] guarantees one open sink per key and closes all of them
//! exactly once, whether the run succeeds or not.

pub mod bam;
mod registry;

use std::path::PathBuf;

use crate::core::error::Result;
use crate::record::RoutingKey;

pub use self::bam::{BamSink, BamSinkFactory, OutputLayout};
pub use registry::{CloseError, SinkRegistry};

/// Write-only, append-only output handle.
pub trait RecordSink<R> {
    fn write(&mut self, record: &R) -> Result<()>;

    /// Flush and release the underlying resource.
    fn close(self) -> Result<()>;
}

/// Opens sinks on demand for the registry.
pub trait SinkFactory {
    type Record;
    type Sink: RecordSink<Self::Record>;

    fn create(&self, key: &RoutingKey) -> Result<Self::Sink>;

    /// Where the sink for `key` lands; used in error messages.
    fn target_path(&self, key: &RoutingKey) -> PathBuf;
}
