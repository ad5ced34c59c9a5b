use std::io;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BLOCK_SIZE: usize = 1024 * 1024;
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(250);

/// What the driver hands to [`super::run`].
pub struct TailOptions {
    pub destination: PathBuf,
    pub capacity: usize,
    pub copy: CopyOptions,
    pub on_echo_error: EchoFailurePolicy,
}

pub struct CopyOptions {
    pub block_size: usize,
    pub echo: bool,
    pub progress: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            echo: true,
            progress: false,
        }
    }
}

/// Exit status policy when echoing to stdout fails. The tail file is
/// written either way.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EchoFailurePolicy {
    #[default]
    Fatal,
    Ignore,
}

#[derive(Debug)]
pub enum CopyOutcome {
    Completed,
    InputFailed(io::Error),
    EchoFailed(io::Error),
}

#[derive(Debug)]
pub struct CopySummary {
    pub total_bytes: u64,
    pub outcome: CopyOutcome,
}
