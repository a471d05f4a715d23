//! Bucket processing: parse one bucket file, build grouped adjacency, and
//! run the appropriate cycle algorithm per group.

use crate::adjacency::build_grouped_adjacency;
use crate::cycle::find_longest_cycle;
use crate::record::parse_line;
use crate::util::open_with_backoff;
use anyhow::{Context, Result};
use std::io::{BufRead, BufReader};
use std::path::Path;

/// `(claim_id, status_code, cycle_length)`, the winning group within one
/// bucket. `cycle_length >= 2` always holds when `Some`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BucketResult {
    pub claim_id: Vec<u8>,
    pub status_code: Vec<u8>,
    pub cycle_length: usize,
}

/// Process one bucket file and return its longest-cycle group, if any.
pub fn process_bucket(bucket_path: &Path) -> Result<Option<BucketResult>> {
    let file = open_with_backoff(bucket_path, 8, 50).with_context(|| format!("open {}", bucket_path.display()))?;
    let mut reader = BufReader::new(file);

    let mut records = Vec::new();
    let mut raw = Vec::with_capacity(4096);
    loop {
        raw.clear();
        let n = reader.read_until(b'\n', &mut raw).with_context(|| format!("read {}", bucket_path.display()))?;
        if n == 0 {
            break;
        }
        if let Some(rec) = parse_line(&raw) {
            records.push(rec);
        }
    }

    let (edges, max_out_degree) = build_grouped_adjacency(records);

    let mut best: Option<BucketResult> = None;
    for (key, adj) in edges.iter() {
        let is_functional = max_out_degree.get(key).copied().unwrap_or(0) <= 1;
        let cycle_len = find_longest_cycle(adj, is_functional);
        if cycle_len > 0 && best.as_ref().map_or(true, |b| cycle_len > b.cycle_length) {
            best = Some(BucketResult {
                claim_id: key.0.clone(),
                status_code: key.1.clone(),
                cycle_length: cycle_len,
            });
        }
    }

    Ok(best)
}
