use clap::Parser;
use colored::Colorize;
use std::io::IsTerminal;
use std::path::PathBuf;
use teetail::error::TeetailError;
use teetail::tail::{self, CopyOptions, EchoFailurePolicy, TailOptions, DEFAULT_BLOCK_SIZE};
use teetail::utils::{parse_size, to_usize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "teetail",
    version,
    about = "tee standard input to standard output and a file, but limit file size",
    long_about = "teetail duplicates standard input to standard output and also writes the last \
                  CAPACITY bytes to the named file when its standard input reaches EOF.\n\n\
                  e.g. teetail -o last_log -c 1024"
)]
struct Cli {
    /// File that receives the tail of the stream
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,
    /// Number of trailing bytes to keep (accepts K, M, G suffixes)
    #[arg(short, long, value_name = "SIZE", value_parser = parse_size)]
    capacity: u64,
    /// Attempt IO in chunks of this many bytes
    #[arg(short = 'B', long, value_name = "SIZE", value_parser = parse_size)]
    block_size: Option<u64>,
    /// Echo nothing to standard output
    #[arg(short, long)]
    quiet: bool,
    /// Track progress on standard error
    #[arg(short = 'P', long)]
    progress: bool,
    /// Log diagnostics to standard error
    #[arg(short, long)]
    verbose: bool,
    /// Exit successfully even if writing to standard output fails
    #[arg(long)]
    ignore_echo_errors: bool,
}

impl Cli {
    fn into_options(self) -> Result<TailOptions, TeetailError> {
        let block_size = match self.block_size {
            Some(size) => to_usize("block size", size)?,
            None => DEFAULT_BLOCK_SIZE,
        };
        Ok(TailOptions {
            destination: self.output,
            capacity: to_usize("buffer size", self.capacity)?,
            copy: CopyOptions {
                block_size,
                echo: !self.quiet,
                progress: self.progress,
            },
            on_echo_error: if self.ignore_echo_errors {
                EchoFailurePolicy::Ignore
            } else {
                EchoFailurePolicy::Fatal
            },
        })
    }
}

fn init_tracing(verbose: bool, ansi: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}={}", env!("CARGO_CRATE_NAME"), level).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(ansi),
        )
        .init();
}

fn main() {
    let cli: Cli = Cli::parse();
    let ansi = std::io::stderr().is_terminal();
    if !ansi {
        colored::control::set_override(false);
    }
    init_tracing(cli.verbose, ansi);

    let result = cli.into_options().and_then(|options| tail::run(&options));

    match result {
        Ok(total) => tracing::debug!("copied {} bytes", total),
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}
