//! Command-line surface: translates flags into a `RunConfig`. The
//! `--process-worker` flag is intentionally undocumented — it is the
//! re-exec entry point used by the `processes` execution policy, never
//! meant to be typed by a user.

use crate::execution::ExecutionPolicy;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "routing-cycle-detector", about = "Find the longest simple routing cycle per claim/status group")]
pub struct Cli {
    /// In normal mode: the pipe-delimited input file. Under `--process-worker`:
    /// the bucket files to process, one result line per bucket printed to stdout.
    pub paths: Vec<PathBuf>,

    /// Number of hash-partition buckets; must be a power of two
    #[arg(long, default_value_t = 1024)]
    pub buckets: usize,

    /// Override automatic executor selection (serial, threads, processes)
    #[arg(long, value_parser = parse_policy)]
    pub executor: Option<ExecutionPolicy>,

    /// Cap on concurrent workers (threads or worker processes)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Logging verbosity, also settable via RUST_LOG
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Disable the progress bar during partitioning
    #[arg(long)]
    pub no_progress: bool,

    /// Hidden re-exec entry point: process `paths` as bucket files and exit.
    #[arg(long = "process-worker", hide = true)]
    pub process_worker: bool,
}

impl Cli {
    pub fn input_file(&self) -> Option<&PathBuf> {
        self.paths.first()
    }
}

fn parse_policy(s: &str) -> Result<ExecutionPolicy, String> {
    match s.to_lowercase().as_str() {
        "serial" => Ok(ExecutionPolicy::Serial),
        "threads" => Ok(ExecutionPolicy::Threads),
        "processes" => Ok(ExecutionPolicy::Processes),
        other => Err(format!("unknown executor policy '{other}' (expected serial, threads, or processes)")),
    }
}
