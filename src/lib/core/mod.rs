pub mod concurrency;
pub mod error;
pub mod errors;
pub mod fs;
pub mod io;

pub mod prelude {
    pub use super::concurrency::{configure_global_thread_pool, determine_allowed_cpus};
    pub use super::error::{DemuxError, Result};
    pub use super::errors::{exit_code_for, is_broken_pipe, EXIT_ANOMALIES};
    pub use super::fs::{is_gzipped, is_stdio, make_parent_dirs, stem_without_ext};
    pub use super::io::{get_reader, get_writer, open_text};
}
