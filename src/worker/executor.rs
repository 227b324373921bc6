//! The boundary between the search coordinator and whatever runs lanes.

use std::sync::Arc;

use crate::error::ExecutorError;
use crate::matcher::PatternSet;

use super::LaneResult;

/// Opaque handle to a submitted batch.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct BatchHandle(u64);

impl BatchHandle {
    /// Wraps an executor-assigned batch id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the batch id.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// What a single `poll` observed for one batch.
#[derive(Debug, Default)]
pub struct BatchPoll {
    /// Records produced since the previous poll
    pub results: Vec<LaneResult>,
    /// Candidates evaluated since the previous poll
    pub evaluated: u64,
    /// True once every lane has finished and all records were returned
    pub complete: bool,
}

/// Runs the derive, encode, match pipeline over batches of candidate seeds.
///
/// Implementations choose how to spread a batch across lanes. They report
/// back only through `poll` and never touch session state.
pub trait ComputeExecutor: Send + Sync {
    /// Starts evaluating `seeds` against `patterns` on up to `lanes`
    /// parallel lanes.
    fn submit(
        &self,
        seeds: Vec<[u8; 32]>,
        patterns: Arc<PatternSet>,
        lanes: usize,
    ) -> Result<BatchHandle, ExecutorError>;

    /// Drains whatever the batch has produced so far. Never blocks.
    fn poll(&self, handle: &BatchHandle) -> Result<BatchPoll, ExecutorError>;

    /// Stops admitting work for the batch and discards anything it still
    /// produces. Lanes already running may finish in the background.
    fn release(&self, handle: BatchHandle);
}
