mod buffer;
mod copier;
mod progress;
mod types;

use crate::error::TeetailError;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

pub use buffer::TailBuffer;
pub use copier::StreamCopier;
pub use types::*;

/// Tees stdin to stdout, then writes the retained tail to the destination.
///
/// The destination is written exactly once, however the copy loop ended.
pub fn run(options: &TailOptions) -> Result<u64, TeetailError> {
    let mut tail = TailBuffer::new(options.capacity)?;
    tracing::debug!(capacity = options.capacity, "allocated tail buffer");

    let summary = StreamCopier::new(&options.copy, tail.capacity())?.run(
        io::stdin().lock(),
        io::stdout().lock(),
        io::stderr().lock(),
        &mut tail,
    );

    write_tail_file(&options.destination, &tail)?;
    tracing::debug!(
        path = %options.destination.display(),
        retained = tail.len(),
        "wrote tail file"
    );

    finish(summary, options.on_echo_error)
}

/// Truncates (or creates) `path` and writes the retained window to it.
pub fn write_tail_file(path: &Path, tail: &TailBuffer) -> Result<(), TeetailError> {
    let file = File::create(path).map_err(|source| TeetailError::OpenDestination {
        path: path.to_path_buf(),
        source,
    })?;

    tail.write_to(BufWriter::new(file))
        .map_err(|source| TeetailError::WriteDestination {
            path: path.to_path_buf(),
            source,
        })
}

/// Maps how the copy loop ended onto the run's result.
pub fn finish(summary: CopySummary, on_echo_error: EchoFailurePolicy) -> Result<u64, TeetailError> {
    match summary.outcome {
        CopyOutcome::Completed => Ok(summary.total_bytes),
        CopyOutcome::InputFailed(e) => Err(TeetailError::Input(e)),
        CopyOutcome::EchoFailed(e) => match on_echo_error {
            EchoFailurePolicy::Fatal => Err(TeetailError::Echo(e)),
            EchoFailurePolicy::Ignore => {
                tracing::warn!("stopped echoing after stdout failed: {}", e);
                Ok(summary.total_bytes)
            }
        },
    }
}
