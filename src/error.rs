use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TeetailError {
    #[error("buffer size must be greater than zero")]
    ZeroCapacity,

    #[error("{what} of {value} bytes doesn't fit in this platform's size type")]
    SizeTooLarge { what: &'static str, value: u64 },

    #[error("error allocating {size} bytes of buffer memory: {source}")]
    Allocation {
        size: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("error reading standard input: {0}")]
    Input(#[source] io::Error),

    #[error("error writing to stdout: {0}")]
    Echo(#[source] io::Error),

    #[error("error opening {} for writing: {source}", .path.display())]
    OpenDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error writing to {}: {source}", .path.display())]
    WriteDestination {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
