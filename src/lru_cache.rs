//! Bounded-capacity pool of open bucket-file handles, replacing the
//! least-recently-**written** handle when full.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// One MiB.
pub const DEFAULT_BUFFER_BYTES: usize = 1024 * 1024;

/// Default cap on simultaneously open bucket handles.
pub const DEFAULT_MAX_OPEN_HANDLES: usize = 128;

struct Entry {
    writer: BufWriter<File>,
    /// Write-time recency counter; higher is more recent. Ordering is purely
    /// by write-time, never by bucket index.
    last_write: u64,
}

/// LRU cache of append-mode file handles, one per bucket index.
pub struct LruFileCache {
    tmp_dir: PathBuf,
    max_handles: usize,
    buffer_bytes: usize,
    open: HashMap<usize, Entry>,
    clock: u64,
}

impl LruFileCache {
    pub fn new(tmp_dir: impl Into<PathBuf>, max_handles: usize, buffer_bytes: usize) -> Self {
        Self {
            tmp_dir: tmp_dir.into(),
            max_handles: max_handles.max(1),
            buffer_bytes: buffer_bytes.max(8 * 1024),
            open: HashMap::new(),
            clock: 0,
        }
    }

    pub fn bucket_path(&self, bucket_idx: usize) -> PathBuf {
        self.tmp_dir.join(format!("bucket_{bucket_idx:04}.bin"))
    }

    /// Write `data` to the given bucket, opening (or evicting to make room
    /// for) a handle as needed.
    pub fn write(&mut self, bucket_idx: usize, data: &[u8]) -> Result<()> {
        self.clock += 1;
        let clock = self.clock;

        if let Some(entry) = self.open.get_mut(&bucket_idx) {
            entry.last_write = clock;
            entry
                .writer
                .write_all(data)
                .with_context(|| format!("write to {}", self.bucket_path(bucket_idx).display()))?;
            return Ok(());
        }

        if self.open.len() >= self.max_handles {
            self.evict_oldest()?;
        }

        let path = self.bucket_path(bucket_idx);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open {}", path.display()))?;
        let mut writer = BufWriter::with_capacity(self.buffer_bytes, file);
        writer
            .write_all(data)
            .with_context(|| format!("write to {}", path.display()))?;
        self.open.insert(bucket_idx, Entry { writer, last_write: clock });
        Ok(())
    }

    fn evict_oldest(&mut self) -> Result<()> {
        let oldest = self
            .open
            .iter()
            .min_by_key(|(_, e)| e.last_write)
            .map(|(idx, _)| *idx);
        if let Some(idx) = oldest {
            if let Some(mut entry) = self.open.remove(&idx) {
                entry
                    .writer
                    .flush()
                    .with_context(|| format!("flush {}", self.bucket_path(idx).display()))?;
            }
        }
        Ok(())
    }

    /// Number of handles currently open. Exposed for tests of the LRU policy.
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Whether the given bucket currently has an open handle. Exposed for tests.
    pub fn is_open(&self, bucket_idx: usize) -> bool {
        self.open.contains_key(&bucket_idx)
    }

    /// Flush and close every open handle.
    pub fn close_all(&mut self) -> Result<()> {
        for (idx, mut entry) in self.open.drain() {
            entry
                .writer
                .flush()
                .with_context(|| format!("flush {}", self.tmp_dir.join(format!("bucket_{idx:04}.bin")).display()))?;
        }
        Ok(())
    }
}

impl Drop for LruFileCache {
    fn drop(&mut self) {
        let _ = self.close_all();
    }
}

/// List the non-empty `bucket_NNNN.bin` files under `tmp_dir`, for the
/// `buckets` possible indices, in ascending index order.
pub fn non_empty_bucket_paths(tmp_dir: &Path, buckets: usize) -> Vec<PathBuf> {
    (0..buckets)
        .filter_map(|i| {
            let path = tmp_dir.join(format!("bucket_{i:04}.bin"));
            match std::fs::metadata(&path) {
                Ok(meta) if meta.len() > 0 => Some(path),
                _ => None,
            }
        })
        .collect()
}
