mod adjacency;
mod bucket;
mod cli;
mod concurrency;
mod config;
mod cycle;
mod error;
mod execution;
mod hashing;
mod logging;
mod lru_cache;
mod partition;
mod progress;
mod record;
mod scheduler;
mod util;

pub use crate::adjacency::{build_grouped_adjacency, AdjacencyMap, GroupedAdjacency, OutDegreeByGroup};
pub use crate::bucket::{process_bucket, BucketResult};
pub use crate::cli::Cli;
pub use crate::config::RunConfig;
pub use crate::cycle::{find_cycle_dfs, find_cycle_functional, find_longest_cycle};
pub use crate::error::PipelineError;
pub use crate::execution::{process_worker_main, resolve_policy, run_bucket_pass, ExecutionPolicy, EXECUTOR_ENV, PROCESS_WORKER_FLAG};
pub use crate::hashing::bucket_index;
pub use crate::logging::init_tracing_once;
pub use crate::partition::{partition_to_buckets, PartitionStats};
pub use crate::progress::{set_global_multiprogress, ProgressScope};
pub use crate::record::{parse_line, trim_trailing_newline, GroupKey, Record};
pub use crate::scheduler::solve;
