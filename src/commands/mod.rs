pub mod common;
pub mod demux;
pub mod filter;
pub mod pipeline;
pub mod validate;

pub use common::Outcome;
pub use demux::{run_demux, DemuxArgs};
pub use filter::{run_filter, run_qc_filter, FilterArgs, QcFilterArgs};
pub use pipeline::{run_pipeline, PipelineArgs};
pub use validate::{run_validate, ValidateArgs};
