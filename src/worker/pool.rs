//! Thread-pool executor that runs batches on CPU lanes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossbeam_channel::{unbounded, Receiver, TryRecvError};
use log::{debug, trace};

use crate::error::ExecutorError;
use crate::matcher::PatternSet;

use super::cpu::{CpuLane, WorkerStats};
use super::executor::{BatchHandle, BatchPoll, ComputeExecutor};
use super::LaneResult;

/// Default cap on seeds per batch. A full batch holds 32 MiB of seeds.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1 << 20;

/// Bookkeeping for one submitted batch.
struct BatchState {
    /// Channel receiver for lane results
    result_rx: Receiver<LaneResult>,
    /// Shared cancel flag
    cancel: Arc<AtomicBool>,
    /// Shared batch statistics
    stats: Arc<WorkerStats>,
    /// `stats.total_keys()` at the previous poll
    reported_keys: u64,
}

/// Runs batches on a fixed pool of worker threads.
///
/// Each batch is split into contiguous chunks, one per lane, and every
/// chunk is queued on the pool. Lanes stream matches back over a channel
/// owned by the batch.
pub struct CpuExecutor {
    /// Worker threads
    pool: rayon::ThreadPool,
    /// Largest batch accepted by `submit`
    max_batch_size: usize,
    /// Next batch id
    next_id: AtomicU64,
    /// Batches that have been submitted and not yet released
    batches: Mutex<HashMap<u64, BatchState>>,
}

impl CpuExecutor {
    /// Creates an executor with `num_threads` worker threads.
    pub fn new(num_threads: usize) -> Result<Self, ExecutorError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads.max(1))
            .thread_name(|id| format!("vanity-lane-{}", id))
            .build()
            .map_err(|e| ExecutorError::PoolBuild(e.to_string()))?;

        debug!("CPU executor started with {} threads", pool.current_num_threads());

        Ok(Self {
            pool,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            next_id: AtomicU64::new(0),
            batches: Mutex::new(HashMap::new()),
        })
    }

    /// Creates an executor with one thread per CPU core.
    pub fn with_default_threads() -> Result<Self, ExecutorError> {
        Self::new(num_cpus::get())
    }

    /// Sets the largest batch `submit` accepts.
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Returns the largest batch `submit` accepts.
    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Returns the number of worker threads.
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Returns the number of batches not yet released.
    pub fn active_batches(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u64, BatchState>> {
        self.batches.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ComputeExecutor for CpuExecutor {
    fn submit(
        &self,
        seeds: Vec<[u8; 32]>,
        patterns: Arc<PatternSet>,
        lanes: usize,
    ) -> Result<BatchHandle, ExecutorError> {
        if seeds.len() > self.max_batch_size {
            return Err(ExecutorError::CapacityExceeded {
                requested: seeds.len(),
                capacity: self.max_batch_size,
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (result_tx, result_rx) = unbounded();
        let cancel = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(WorkerStats::new());

        let total = seeds.len();
        let lanes = lanes.clamp(1, total.max(1));
        let chunk = total.div_ceil(lanes).max(1);
        let seeds = Arc::new(seeds);

        for (lane_id, start) in (0..total).step_by(chunk).enumerate() {
            let lane = CpuLane::new(
                lane_id,
                seeds.clone(),
                start..(start + chunk).min(total),
                patterns.clone(),
                result_tx.clone(),
                cancel.clone(),
                stats.clone(),
            );
            self.pool.spawn(move || {
                trace!("lane {} of batch {} running", lane.id(), id);
                lane.run();
            });
        }

        // Drop the extra sender so the channel closes when all lanes finish
        drop(result_tx);

        debug!("batch {}: {} seeds across {} lanes", id, total, lanes);

        self.lock().insert(
            id,
            BatchState {
                result_rx,
                cancel,
                stats,
                reported_keys: 0,
            },
        );

        Ok(BatchHandle::new(id))
    }

    fn poll(&self, handle: &BatchHandle) -> Result<BatchPoll, ExecutorError> {
        let mut batches = self.lock();
        let state = batches
            .get_mut(&handle.id())
            .ok_or(ExecutorError::UnknownHandle(handle.id()))?;

        let mut results = Vec::new();
        let complete = loop {
            match state.result_rx.try_recv() {
                Ok(result) => results.push(result),
                Err(TryRecvError::Empty) => break false,
                Err(TryRecvError::Disconnected) => break true,
            }
        };

        let keys = state.stats.total_keys();
        let evaluated = keys - state.reported_keys;
        state.reported_keys = keys;

        Ok(BatchPoll {
            results,
            evaluated,
            complete,
        })
    }

    fn release(&self, handle: BatchHandle) {
        if let Some(state) = self.lock().remove(&handle.id()) {
            state.cancel.store(true, Ordering::Relaxed);
            trace!(
                "batch {} released after {} keys, {} matches",
                handle.id(),
                state.stats.total_keys(),
                state.stats.total_matches()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::Pattern;
    use std::time::{Duration, Instant};

    fn all_match() -> Arc<PatternSet> {
        Arc::new(PatternSet::new(vec![Pattern::prefix("", false)]).unwrap())
    }

    fn drain(executor: &CpuExecutor, handle: &BatchHandle) -> (Vec<LaneResult>, u64) {
        let deadline = Instant::now() + Duration::from_secs(60);
        let mut results = Vec::new();
        let mut evaluated = 0;
        loop {
            let poll = executor.poll(handle).unwrap();
            results.extend(poll.results);
            evaluated += poll.evaluated;
            if poll.complete {
                return (results, evaluated);
            }
            assert!(Instant::now() < deadline, "batch did not finish");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_batch_reports_every_seed_once() {
        let executor = CpuExecutor::new(4).unwrap();
        let seeds: Vec<[u8; 32]> = (0..37u8).map(|i| [i; 32]).collect();
        let handle = executor.submit(seeds, all_match(), 5).unwrap();

        let (results, evaluated) = drain(&executor, &handle);
        let mut firsts: Vec<u8> = results.iter().map(|r| r.seed[0]).collect();
        firsts.sort_unstable();
        assert_eq!(firsts, (0..37u8).collect::<Vec<_>>());
        assert_eq!(evaluated, 37);

        executor.release(handle);
        assert_eq!(executor.active_batches(), 0);
    }

    #[test]
    fn test_empty_batch_completes() {
        let executor = CpuExecutor::new(1).unwrap();
        let handle = executor.submit(Vec::new(), all_match(), 8).unwrap();
        let poll = executor.poll(&handle).unwrap();
        assert!(poll.complete);
        assert!(poll.results.is_empty());
    }

    #[test]
    fn test_capacity_exceeded() {
        let executor = CpuExecutor::new(1).unwrap().with_max_batch_size(2);
        let err = executor.submit(vec![[0u8; 32]; 3], all_match(), 1).unwrap_err();
        assert_eq!(
            err,
            ExecutorError::CapacityExceeded {
                requested: 3,
                capacity: 2
            }
        );
    }

    #[test]
    fn test_default_capacity_bounds_seed_memory() {
        let executor = CpuExecutor::new(1).unwrap();
        assert_eq!(executor.max_batch_size(), DEFAULT_MAX_BATCH_SIZE);
        assert!(executor.max_batch_size() * std::mem::size_of::<[u8; 32]>() <= 32 << 20);

        let oversized = vec![[0u8; 32]; DEFAULT_MAX_BATCH_SIZE + 1];
        assert!(matches!(
            executor.submit(oversized, all_match(), 1),
            Err(ExecutorError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_poll_after_release_is_unknown() {
        let executor = CpuExecutor::new(1).unwrap();
        let handle = executor.submit(vec![[1u8; 32]], all_match(), 1).unwrap();
        let id = handle.id();
        executor.release(handle);
        assert_eq!(
            executor.poll(&BatchHandle::new(id)).unwrap_err(),
            ExecutorError::UnknownHandle(id)
        );
    }
}
