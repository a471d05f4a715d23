//! Progress reporting: a thin `indicatif` wrapper covering the two modes the
//! pipeline drives — bytes read during partitioning, and buckets processed
//! during the second pass.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::{Arc, OnceLock};

/// Optional global MultiProgress so multiple bars can render concurrently.
static GLOBAL_MP: OnceLock<Arc<MultiProgress>> = OnceLock::new();

/// Install a global MultiProgress used by all subsequently created bars.
/// Safe to call once; additional calls are ignored.
pub fn set_global_multiprogress(mp: Arc<MultiProgress>) {
    let _ = GLOBAL_MP.set(mp);
}

fn new_bar(total: u64) -> ProgressBar {
    if let Some(mp) = GLOBAL_MP.get() {
        mp.add(ProgressBar::new(total))
    } else {
        ProgressBar::new(total)
    }
}

fn bytes_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.green} {msg} {bytes:>10}/{total_bytes:<10} [{bar:.cyan/blue}] {percent:>3}%  \
         {bytes_per_sec}  elapsed: {elapsed_precise}  eta: {eta_precise}",
    )
    .unwrap()
    .progress_chars("█▉▊▋▌▍▎▏  ")
}

fn count_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.green} {msg} {pos}/{len} [{bar:.cyan/blue}] {percent:>3}%  \
         it/s: {per_sec}  elapsed: {elapsed_precise}  eta: {eta_precise}",
    )
    .unwrap()
    .progress_chars("█▉▊▋▌▍▎▏  ")
}

/// A small, ergonomic wrapper around `indicatif` progress bars. Use
/// `ProgressScope::bytes(..)` for the partition pass or `ProgressScope::count(..)`
/// for the bucket-processing pass.
pub struct ProgressScope {
    pb: ProgressBar,
}

impl ProgressScope {
    pub fn bytes<T: Into<String>>(label: T, total_bytes: u64) -> Self {
        let pb = new_bar(total_bytes);
        pb.set_style(bytes_style());
        pb.set_message(label.into());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { pb }
    }

    pub fn count<T: Into<String>>(label: T, total: u64) -> Self {
        let pb = new_bar(total);
        pb.set_style(count_style());
        let label = label.into();
        if !label.is_empty() {
            pb.set_message(label);
        }
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { pb }
    }

    #[inline]
    pub fn inc(&self, delta: u64) {
        self.pb.inc(delta);
    }

    pub fn finish<T: Into<String>>(&self, msg: T) {
        self.pb.finish_with_message(msg.into());
    }
}
