//! Execution policy selection and bucket-pass dispatch.
//!
//! Rust has no global interpreter lock, so auto-detection always resolves to
//! the thread pool; `processes` remains selectable as an explicit override,
//! implemented by re-exec'ing this binary as a hidden worker subcommand.

use crate::bucket::{process_bucket, BucketResult};
use crate::concurrency::for_each_bucket_limited;
use anyhow::{bail, Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

pub const EXECUTOR_ENV: &str = "ROUTING_CYCLES_EXECUTOR";
pub const PROCESS_WORKER_FLAG: &str = "--process-worker";

/// Buckets handed to one child process per `processes` dispatch round.
pub const PROCESS_CHUNK_SIZE: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionPolicy {
    Serial,
    Threads,
    Processes,
}

impl ExecutionPolicy {
    pub fn describe(self) -> &'static str {
        match self {
            ExecutionPolicy::Serial => "serial",
            ExecutionPolicy::Threads => "threads",
            ExecutionPolicy::Processes => "processes",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "serial" => Some(ExecutionPolicy::Serial),
            "threads" => Some(ExecutionPolicy::Threads),
            "processes" => Some(ExecutionPolicy::Processes),
            _ => None,
        }
    }
}

/// Resolve the effective execution policy.
///
/// Priority: an explicit `override_policy` (e.g. set by the CLI), then the
/// `ROUTING_CYCLES_EXECUTOR` environment variable, then auto-detection —
/// which always resolves to `Threads` since Rust has no GIL to escape.
pub fn resolve_policy(override_policy: Option<ExecutionPolicy>) -> ExecutionPolicy {
    if let Some(p) = override_policy {
        return p;
    }
    if let Ok(val) = env::var(EXECUTOR_ENV) {
        if let Some(p) = ExecutionPolicy::from_str(&val) {
            return p;
        }
    }
    ExecutionPolicy::Threads
}

/// Run the second pass over every bucket path under the given policy and
/// worker limit, returning one result per bucket (`None` entries are
/// filtered by the caller).
pub fn run_bucket_pass(bucket_paths: &[PathBuf], policy: ExecutionPolicy, worker_limit: Option<usize>) -> Result<Vec<Option<BucketResult>>> {
    match policy {
        ExecutionPolicy::Serial => bucket_paths.iter().map(|p| process_bucket(p)).collect(),
        ExecutionPolicy::Threads => {
            let limit = worker_limit.unwrap_or_else(|| rayon::current_num_threads());
            for_each_bucket_limited(bucket_paths, limit, |p| process_bucket(p))
        }
        ExecutionPolicy::Processes => run_via_process_pool(bucket_paths, worker_limit),
    }
}

/// Dispatch bucket chunks to worker processes with up to `worker_limit`
/// children in flight at once: every child in a batch is spawned before any
/// of them is waited on, so the batch actually runs concurrently at the OS
/// level rather than one chunk's process exiting before the next is spawned.
fn run_via_process_pool(bucket_paths: &[PathBuf], worker_limit: Option<usize>) -> Result<Vec<Option<BucketResult>>> {
    let exe = env::current_exe().context("resolve current executable for process pool")?;
    let limit = worker_limit.unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)).max(1);

    let chunks: Vec<&[PathBuf]> = bucket_paths.chunks(PROCESS_CHUNK_SIZE).collect();
    let mut out = Vec::with_capacity(bucket_paths.len());
    for batch in chunks.chunks(limit) {
        let children: Vec<Child> = batch.iter().map(|&chunk| spawn_worker_chunk(&exe, chunk)).collect::<Result<Vec<_>>>()?;
        for child in children {
            out.extend(collect_worker_chunk(child)?);
        }
    }
    Ok(out)
}

fn spawn_worker_chunk(exe: &Path, chunk: &[PathBuf]) -> Result<Child> {
    Command::new(exe)
        .arg(PROCESS_WORKER_FLAG)
        .args(chunk)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawn process worker for {} buckets", chunk.len()))
}

fn collect_worker_chunk(child: Child) -> Result<Vec<Option<BucketResult>>> {
    let output = child.wait_with_output().context("wait for process worker to exit")?;

    if !output.status.success() {
        bail!("process worker exited with {}: {}", output.status, String::from_utf8_lossy(&output.stderr));
    }

    let stdout = String::from_utf8(output.stdout).context("process worker stdout was not valid UTF-8")?;
    stdout.lines().map(parse_worker_line).collect()
}

/// Entry point for the hidden `--process-worker` subcommand: process each
/// bucket path given as an argument and print one encoded line per result
/// (cycle-free buckets print nothing) to stdout.
pub fn process_worker_main(bucket_paths: &[PathBuf]) -> Result<()> {
    for path in bucket_paths {
        if let Some(result) = process_bucket(path)? {
            println!("{}", encode_worker_line(&result));
        }
    }
    Ok(())
}

fn encode_worker_line(result: &BucketResult) -> String {
    format!("{}|{}|{}", hex_encode(&result.claim_id), hex_encode(&result.status_code), result.cycle_length)
}

fn parse_worker_line(line: &str) -> Result<Option<BucketResult>> {
    let mut parts = line.splitn(3, '|');
    let claim_hex = parts.next().context("missing claim_id field in worker output")?;
    let status_hex = parts.next().context("missing status_code field in worker output")?;
    let len_str = parts.next().context("missing cycle_length field in worker output")?;
    Ok(Some(BucketResult {
        claim_id: hex_decode(claim_hex)?,
        status_code: hex_decode(status_hex)?,
        cycle_length: len_str.parse().context("cycle_length was not a valid integer")?,
    }))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(s: &str) -> Result<Vec<u8>> {
    if s.len() % 2 != 0 {
        bail!("odd-length hex string in worker protocol");
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).context("invalid hex byte in worker protocol"))
        .collect()
}
