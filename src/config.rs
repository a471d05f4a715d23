//! Run configuration, assembled from CLI flags and environment overrides.
//! Builder-style chaining so callers (the CLI, tests) can override only
//! what they need.

use crate::error::PipelineError;
use crate::execution::ExecutionPolicy;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct RunConfig {
    pub input_path: PathBuf,
    pub buckets: usize,
    pub executor: Option<ExecutionPolicy>,
    pub worker_limit: Option<usize>,
    pub scratch_root: Option<PathBuf>,
    pub progress: bool,
}

impl RunConfig {
    pub fn new(input_path: impl AsRef<Path>) -> Self {
        Self {
            input_path: input_path.as_ref().to_path_buf(),
            buckets: 1024,
            executor: None,
            worker_limit: None,
            scratch_root: None,
            progress: true,
        }
    }

    pub fn with_buckets(mut self, buckets: usize) -> Self {
        self.buckets = buckets;
        self
    }

    pub fn with_executor(mut self, executor: Option<ExecutionPolicy>) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_worker_limit(mut self, limit: Option<usize>) -> Self {
        self.worker_limit = limit;
        self
    }

    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }

    /// Reject configurations that can be rejected before any I/O happens.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.buckets == 0 {
            return Err(PipelineError::ZeroBuckets(self.buckets));
        }
        if !self.buckets.is_power_of_two() {
            return Err(PipelineError::NotPowerOfTwo(self.buckets));
        }
        if !self.input_path.exists() {
            return Err(PipelineError::InputNotFound(self.input_path.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_power_of_two_buckets() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let cfg = RunConfig::new(tmp.path()).with_buckets(100);
        assert!(matches!(cfg.validate(), Err(PipelineError::NotPowerOfTwo(100))));
    }

    #[test]
    fn rejects_zero_buckets() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let cfg = RunConfig::new(tmp.path()).with_buckets(0);
        assert!(matches!(cfg.validate(), Err(PipelineError::ZeroBuckets(0))));
    }

    #[test]
    fn rejects_missing_input() {
        let cfg = RunConfig::new("/no/such/input.txt").with_buckets(1024);
        assert!(matches!(cfg.validate(), Err(PipelineError::InputNotFound(_))));
    }

    #[test]
    fn accepts_valid_config() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let cfg = RunConfig::new(tmp.path()).with_buckets(64);
        assert!(cfg.validate().is_ok());
    }
}
