//! User-facing configuration errors. Internal/IO failures stay as
//! `anyhow::Error` with `.context(...)`; this enum covers the small set of
//! mistakes a caller can make before any work starts.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("bucket count {0} is not a power of two")]
    NotPowerOfTwo(usize),

    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("bucket count {0} must be at least 1")]
    ZeroBuckets(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = PipelineError::NotPowerOfTwo(100);
        assert!(err.to_string().contains("100"));

        let err = PipelineError::InputNotFound(PathBuf::from("/no/such/file"));
        assert!(err.to_string().contains("/no/such/file"));
    }
}
