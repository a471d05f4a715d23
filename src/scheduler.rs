//! Top-level orchestration: partition, dispatch, reduce, cleanup.

use crate::bucket::BucketResult;
use crate::config::RunConfig;
use crate::execution::{resolve_policy, run_bucket_pass};
use crate::partition::partition_to_buckets;
use crate::progress::ProgressScope;
use crate::util::remove_dir_all_with_backoff;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Owns a scratch directory for the duration of one run and removes it on
/// drop, so every exit path — success, error, or panic — still cleans up.
struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    fn create(root: Option<&Path>) -> Result<Self> {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_nanos();
        let unique = COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir_name = format!("routing_cycles_{}_{}_{}", std::process::id(), nanos, unique);

        let base = root.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir);
        let path = base.join(dir_name);
        fs::create_dir_all(&path).with_context(|| format!("create scratch dir {}", path.display()))?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = remove_dir_all_with_backoff(&self.path, 4, 20) {
            warn!("failed to remove scratch dir {}: {e:#}", self.path.display());
        }
    }
}

/// Run the full two-pass pipeline and return the winning `(claim_id,
/// status_code, cycle_length)` group across the entire file, if any group
/// contains a cycle.
pub fn solve(config: &RunConfig) -> Result<Option<BucketResult>> {
    config.validate()?;

    let policy = resolve_policy(config.executor);
    info!(
        input = %config.input_path.display(),
        buckets = config.buckets,
        executor = policy.describe(),
        "starting routing cycle detection"
    );

    let scratch = ScratchDir::create(config.scratch_root.as_deref())?;

    let (bucket_paths, stats) =
        partition_to_buckets(&config.input_path, config.buckets, scratch.path()).context("partition pass failed")?;

    if stats.malformed_lines > 0 {
        warn!(
            malformed = stats.malformed_lines,
            read = stats.lines_read,
            written = stats.lines_written,
            "skipped malformed lines during partitioning"
        );
    }
    info!(buckets_non_empty = bucket_paths.len(), lines_read = stats.lines_read, "partition pass complete");

    if bucket_paths.is_empty() {
        info!("no cycles found: input produced no non-empty buckets");
        return Ok(None);
    }

    let progress = config.progress.then(|| ProgressScope::count("processing buckets", bucket_paths.len() as u64));

    let results = run_bucket_pass(&bucket_paths, policy, config.worker_limit).context("bucket processing pass failed")?;
    if let Some(p) = &progress {
        p.inc(bucket_paths.len() as u64);
        p.finish("done");
    }

    let mut best: Option<BucketResult> = None;
    for result in results.into_iter().flatten() {
        if best.as_ref().map_or(true, |b| result.cycle_length > b.cycle_length) {
            debug!(claim_id = %String::from_utf8_lossy(&result.claim_id), cycle_length = result.cycle_length, "new best result");
            best = Some(result);
        }
    }

    match &best {
        Some(b) => info!(cycle_length = b.cycle_length, "result found"),
        None => info!("no cycles found across any bucket"),
    }

    Ok(best)
}
