//! Parallel execution of the per-candidate pipeline.
//!
//! This module provides:
//! - The `ComputeExecutor` boundary used by search sessions
//! - The derive, encode, match pipeline run by each lane
//! - A CPU executor backed by a worker thread pool

mod cpu;
mod executor;
mod lane;
mod pool;

pub use cpu::{CpuLane, WorkerStats};
pub use executor::{BatchHandle, BatchPoll, ComputeExecutor};
pub use lane::{evaluate_candidate, LaneResult};
pub use pool::{CpuExecutor, DEFAULT_MAX_BATCH_SIZE};
