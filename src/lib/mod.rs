//! bcdemux: cell barcode demultiplexing for single-cell BAM files
//!
//! The library provides:
//! 1. A single-pass router that classifies alignment records and forwards them
//!    to per-key output sinks (demultiplexing, allow-list and quality filtering)
//! 2. A sink registry that owns one output per key and always closes them
//! 3. A lock-step validator for the paired FASTQ files derived from each split
//! 4. Summary reporting across router and validator runs
//!
//! # Modules
//!
//! - [`router`]: Routing engine and policies
//! - [`sink`]: Output sinks and the registry that owns them
//! - [`record`]: The record abstraction and tag handling
//! - [`allow_set`]: Barcode allow-lists
//! - [`validate`]: Paired FASTQ validation
//! - [`report`]: Run summaries
//! - [`external`]: Collate and FASTQ conversion through `samtools`

pub mod allow_set;
pub mod config;
pub mod core;
pub mod external;
pub mod record;
pub mod report;
pub mod router;
pub mod sink;
pub mod source;
pub mod validate;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub mod prelude {
    pub use crate::allow_set::{AllowSet, TableFormat};
    pub use crate::config::{RouteMode, RoutePlan, RouterConfig};
    pub use crate::core::prelude::*;
    pub use crate::record::{RoutingKey, Tag, TaggedRecord};
    pub use crate::report::{RunCounts, RunSummary};
    pub use crate::router::{route, Router, RoutingPolicy, RunStats};
    pub use crate::sink::{SinkFactory, SinkRegistry};
    pub use crate::validate::{HeaderMatch, ValidationReport, Validator, ValidatorConfig};
}
