//! Robust file I/O helpers: open/remove with retry-backoff for transient
//! errors (sharing violations, AV/backup filter drivers briefly holding a
//! handle).

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::thread::sleep;
use std::time::Duration;

/// Return true for transient/retriable I/O errors (e.g. sharing violations,
/// AV/backup filter drivers holding a handle momentarily).
fn is_retriable_io_error(e: &io::Error) -> bool {
    matches!(e.raw_os_error(), Some(5) | Some(32) | Some(33) | Some(225) | Some(433) | Some(1006) | Some(1117) | Some(1224) | Some(21))
}

/// Open a file with retries/backoff for transient errors.
pub fn open_with_backoff(path: &Path, tries: usize, delay_ms: u64) -> io::Result<File> {
    let mut last_err: Option<io::Error> = None;
    let tries = tries.max(1);
    for i in 0..tries {
        match File::open(path) {
            Ok(f) => return Ok(f),
            Err(e) if is_retriable_io_error(&e) => {
                last_err = Some(e);
                sleep(Duration::from_millis(delay_ms.saturating_mul((i + 1) as u64)));
                continue;
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err.unwrap_or_else(|| io::Error::other("open failed")))
}

/// Recursively remove a directory with retries/backoff; succeeds if the
/// directory no longer exists by the time we try.
pub fn remove_dir_all_with_backoff(path: &Path, tries: usize, delay_ms: u64) -> Result<()> {
    let mut last_err: Option<io::Error> = None;
    for i in 0..tries.max(1) {
        match fs::remove_dir_all(path) {
            Ok(_) => return Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) if is_retriable_io_error(&e) => {
                last_err = Some(e);
                sleep(Duration::from_millis(delay_ms.saturating_mul((i + 1) as u64)));
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("remove_dir_all {}", path.display())),
        }
    }
    Err(last_err.unwrap_or_else(|| io::Error::other("remove_dir_all failed")))
        .with_context(|| format!("remove_dir_all (retries) {}", path.display()))
}
