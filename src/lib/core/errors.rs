use super::error::DemuxError;
use anyhow::Error;
use std::io;

/// Exit code for a pass that completed but recorded integrity anomalies.
pub const EXIT_ANOMALIES: i32 = 3;

/// Returns `true` if the error originated from a broken pipe.
#[inline]
pub fn is_broken_pipe(err: &Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .map(|io_err| io_err.kind() == io::ErrorKind::BrokenPipe)
            .or_else(|| {
                cause.downcast_ref::<DemuxError>().map(|e| match e {
                    DemuxError::Io(io_err) => io_err.kind() == io::ErrorKind::BrokenPipe,
                    _ => false,
                })
            })
            .unwrap_or(false)
    })
}

/// Map a fatal error onto the process exit code used by the CLI.
///
/// Configuration problems exit with 2 and everything else with 1.
pub fn exit_code_for(err: &Error) -> i32 {
    let is_config = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<DemuxError>())
        .any(DemuxError::is_config);
    if is_config {
        2
    } else {
        1
    }
}
