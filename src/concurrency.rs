//! Shared-memory parallel dispatch over bucket files, chunked over a
//! `rayon` thread pool.

use anyhow::Result;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Run `f` over every path in `buckets`, using up to `limit` worker threads
/// worth of concurrency (chunked so only `limit * 8` tasks are in flight at
/// once). `limit <= 1` runs serially on the calling thread, preserving order.
pub fn for_each_bucket_limited<F, R>(buckets: &[PathBuf], limit: usize, f: F) -> Result<Vec<R>>
where
    F: Sync + Fn(&Path) -> Result<R>,
    R: Send,
{
    if limit <= 1 {
        return buckets.iter().map(|b| f(b)).collect();
    }

    let mut out = Vec::with_capacity(buckets.len());
    for chunk in buckets.chunks(limit.max(1) * 8) {
        let results: Vec<R> = chunk.par_iter().map(|b| f(b)).collect::<Result<Vec<R>>>()?;
        out.extend(results);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_path_preserves_order() {
        let paths: Vec<PathBuf> = (0..5).map(|i| PathBuf::from(format!("{i}"))).collect();
        let out = for_each_bucket_limited(&paths, 1, |p| Ok(p.to_string_lossy().to_string())).unwrap();
        assert_eq!(out, vec!["0", "1", "2", "3", "4"]);
    }

    #[test]
    fn parallel_path_visits_every_item() {
        let paths: Vec<PathBuf> = (0..40).map(|i| PathBuf::from(format!("{i}"))).collect();
        let out = for_each_bucket_limited(&paths, 4, |p| Ok(p.to_string_lossy().to_string())).unwrap();
        assert_eq!(out.len(), 40);
    }

    #[test]
    fn propagates_first_error() {
        let paths: Vec<PathBuf> = (0..3).map(|i| PathBuf::from(format!("{i}"))).collect();
        let result: Result<Vec<String>> = for_each_bucket_limited(&paths, 2, |_| anyhow::bail!("boom"));
        assert!(result.is_err());
    }
}
