//! Pass 1: stream the input file once, routing each record into one of
//! `buckets` on-disk bucket files keyed by a stable hash of its group key.

use crate::hashing::bucket_index;
use crate::lru_cache::{non_empty_bucket_paths, LruFileCache, DEFAULT_BUFFER_BYTES, DEFAULT_MAX_OPEN_HANDLES};
use crate::record::trim_trailing_newline;
use crate::util::open_with_backoff;
use anyhow::{Context, Result};
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Counters produced by a partition pass; `lines_read == empty_lines +
/// malformed_lines + lines_written` always holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PartitionStats {
    pub lines_read: u64,
    pub empty_lines: u64,
    pub malformed_lines: u64,
    pub lines_written: u64,
}

/// Partition `input_path` into `buckets` bucket files under `tmp_dir`.
/// Returns the list of non-empty bucket paths (in ascending index order)
/// plus counters. `buckets` must already be validated as a power of two.
pub fn partition_to_buckets(input_path: &Path, buckets: usize, tmp_dir: &Path) -> Result<(Vec<PathBuf>, PartitionStats)> {
    fs::create_dir_all(tmp_dir).with_context(|| format!("create scratch dir {}", tmp_dir.display()))?;

    let mut cache = LruFileCache::new(tmp_dir, DEFAULT_MAX_OPEN_HANDLES, DEFAULT_BUFFER_BYTES);
    let mut stats = PartitionStats::default();

    let file = open_with_backoff(input_path, 8, 50).with_context(|| format!("open {}", input_path.display()))?;
    let mut reader = BufReader::with_capacity(DEFAULT_BUFFER_BYTES, file);

    let mut raw = Vec::with_capacity(4096);
    loop {
        raw.clear();
        let n = reader.read_until(b'\n', &mut raw).with_context(|| format!("read {}", input_path.display()))?;
        if n == 0 {
            break;
        }
        stats.lines_read += 1;

        let line = trim_trailing_newline(&raw);
        if line.is_empty() {
            stats.empty_lines += 1;
            continue;
        }

        let Some((claim_id, status_code)) = group_fields(line) else {
            stats.malformed_lines += 1;
            continue;
        };

        let idx = bucket_index(claim_id, status_code, buckets);
        let mut out_line = Vec::with_capacity(line.len() + 1);
        out_line.extend_from_slice(line);
        out_line.push(b'\n');
        cache.write(idx, &out_line)?;
        stats.lines_written += 1;
    }

    cache.close_all()?;
    let non_empty = non_empty_bucket_paths(tmp_dir, buckets);
    Ok((non_empty, stats))
}

/// Extract `(claim_id, status_code)` from a trimmed line, without allocating
/// the other two fields — partitioning only needs the group key.
/// Returns `None` if fewer than four `|`-separated fields are present.
fn group_fields(line: &[u8]) -> Option<(&[u8], &[u8])> {
    let first = position(line, 0)?;
    let second = position(line, first + 1)?;
    let third = position(line, second + 1)?;
    let claim_id = &line[second + 1..third];
    let status_code = &line[third + 1..];
    Some((claim_id, status_code))
}

fn position(line: &[u8], from: usize) -> Option<usize> {
    line[from..].iter().position(|&b| b == b'|').map(|p| p + from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_input(dir: &Path, lines: &[&str]) -> PathBuf {
        let path = dir.join("input.txt");
        let mut f = fs::File::create(&path).unwrap();
        for l in lines {
            writeln!(f, "{l}").unwrap();
        }
        path
    }

    #[test]
    fn routes_same_group_to_same_bucket() {
        let tmp = tempfile::tempdir().unwrap();
        let input = write_input(tmp.path(), &["A|B|CLM001|200", "C|D|CLM001|200", "E|F|CLM002|404"]);
        let out_dir = tmp.path().join("out");

        let (paths, stats) = partition_to_buckets(&input, 4, &out_dir).unwrap();
        assert!(!paths.is_empty());

        let mut all_lines = Vec::new();
        for p in &paths {
            let contents = fs::read_to_string(p).unwrap();
            all_lines.extend(contents.lines().map(|s| s.to_string()));
        }
        assert_eq!(all_lines.len(), 3);

        let expected_idx = bucket_index(b"CLM001", b"200", 4);
        let expected_path = out_dir.join(format!("bucket_{expected_idx:04}.bin"));
        let clm001_lines: Vec<_> = fs::read_to_string(&expected_path)
            .unwrap()
            .lines()
            .filter(|l| l.contains("CLM001|200"))
            .map(|s| s.to_string())
            .collect();
        assert_eq!(clm001_lines.len(), 2);
        assert_eq!(stats.lines_written, 3);
        assert_eq!(stats.lines_read, 3);
    }

    #[test]
    fn skips_empty_and_counts_them() {
        let tmp = tempfile::tempdir().unwrap();
        let input = write_input(tmp.path(), &["A|B|CLM001|200", "", "C|D|CLM002|404"]);
        let out_dir = tmp.path().join("out");

        let (_paths, stats) = partition_to_buckets(&input, 4, &out_dir).unwrap();
        assert_eq!(stats.empty_lines, 1);
        assert_eq!(stats.lines_written, 2);
        assert_eq!(stats.lines_read, 3);
    }

    #[test]
    fn counts_malformed_lines_without_failing() {
        let tmp = tempfile::tempdir().unwrap();
        let input = write_input(tmp.path(), &["A|B|CLM001", "A|B|CLM001|200"]);
        let out_dir = tmp.path().join("out");

        let (_paths, stats) = partition_to_buckets(&input, 4, &out_dir).unwrap();
        assert_eq!(stats.malformed_lines, 1);
        assert_eq!(stats.lines_written, 1);
    }

    #[test]
    fn returns_only_non_empty_buckets() {
        let tmp = tempfile::tempdir().unwrap();
        let input = write_input(tmp.path(), &["A|B|CLM001|200"]);
        let out_dir = tmp.path().join("out");

        let (paths, _stats) = partition_to_buckets(&input, 1024, &out_dir).unwrap();
        assert_eq!(paths.len(), 1);
        assert!(fs::metadata(&paths[0]).unwrap().len() > 0);
    }

    #[test]
    fn preserves_raw_line_content_byte_for_byte() {
        let tmp = tempfile::tempdir().unwrap();
        let input = write_input(tmp.path(), &["NodeA|NodeB|CLM001|200"]);
        let out_dir = tmp.path().join("out");

        let (paths, _stats) = partition_to_buckets(&input, 4, &out_dir).unwrap();
        let content = fs::read_to_string(&paths[0]).unwrap();
        assert_eq!(content.trim_end(), "NodeA|NodeB|CLM001|200");
    }

    #[test]
    fn counters_sum_to_lines_read() {
        let tmp = tempfile::tempdir().unwrap();
        let input = write_input(tmp.path(), &["A|B|CLM001|200", "", "bad|line", "C|D|CLM002|404"]);
        let out_dir = tmp.path().join("out");

        let (_paths, stats) = partition_to_buckets(&input, 4, &out_dir).unwrap();
        assert_eq!(stats.lines_read, stats.empty_lines + stats.malformed_lines + stats.lines_written);
    }

    #[test]
    fn reordering_input_preserves_bucket_membership() {
        let tmp = tempfile::tempdir().unwrap();
        let input_a = write_input(tmp.path(), &["A|B|CLM001|200", "C|D|CLM002|404"]);
        let input_b = write_input(tmp.path(), &["C|D|CLM002|404", "A|B|CLM001|200"]);

        let (paths_a, _) = partition_to_buckets(&input_a, 4, &tmp.path().join("out_a")).unwrap();
        let (paths_b, _) = partition_to_buckets(&input_b, 4, &tmp.path().join("out_b")).unwrap();

        let mut lines_a: Vec<String> = paths_a.iter().flat_map(|p| fs::read_to_string(p).unwrap().lines().map(String::from).collect::<Vec<_>>()).collect();
        let mut lines_b: Vec<String> = paths_b.iter().flat_map(|p| fs::read_to_string(p).unwrap().lines().map(String::from).collect::<Vec<_>>()).collect();
        lines_a.sort();
        lines_b.sort();
        assert_eq!(lines_a, lines_b);
    }
}
