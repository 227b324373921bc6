//! Search session management.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::crypto::Keypair;
use crate::error::{ExecutorError, SearchError};
use crate::matcher::{Pattern, PatternSet};
use crate::worker::{BatchHandle, ComputeExecutor, CpuExecutor, LaneResult};

use super::candidates::candidate_range;

/// A candidate seed whose address matched a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// The 32-byte seed
    pub seed: [u8; 32],
    /// The Base58 address derived from the seed
    pub address: String,
    /// Index of the first matching pattern, in pattern list order
    pub matched_pattern_index: usize,
    /// Always true for reported results
    pub found: bool,
}

impl SearchResult {
    /// Re-derives the full keypair for this result.
    pub fn keypair(&self) -> Keypair {
        Keypair::from_seed(self.seed)
    }

    /// Seed as hex.
    pub fn seed_hex(&self) -> String {
        hex::encode(self.seed)
    }
}

impl From<LaneResult> for SearchResult {
    fn from(result: LaneResult) -> Self {
        Self {
            seed: result.seed,
            address: result.address,
            matched_pattern_index: result.matched_pattern_index,
            found: result.found,
        }
    }
}

/// Describes a batch accepted by [`SearchSession::dispatch_batch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingBatch {
    /// Candidate index of the first seed in the batch
    pub start: u64,
    /// Number of seeds in the batch
    pub size: usize,
}

/// Creates search sessions that share one executor.
pub struct SearchEngine<E: ComputeExecutor = CpuExecutor> {
    executor: Arc<E>,
}

impl SearchEngine<CpuExecutor> {
    /// Creates an engine backed by a CPU executor with `num_threads` threads.
    pub fn cpu(num_threads: usize) -> Result<Self, SearchError> {
        Ok(Self::new(CpuExecutor::new(num_threads)?))
    }
}

impl<E: ComputeExecutor> SearchEngine<E> {
    /// Creates an engine around `executor`.
    pub fn new(executor: E) -> Self {
        Self::with_shared(Arc::new(executor))
    }

    /// Creates an engine around an executor that is also used elsewhere.
    pub fn with_shared(executor: Arc<E>) -> Self {
        Self { executor }
    }

    /// Returns the executor.
    pub fn executor(&self) -> &Arc<E> {
        &self.executor
    }

    /// Starts a session enumerating candidates from `base_seed`.
    ///
    /// Patterns are validated here and no session is created if any check
    /// fails. [`SearchError::InvalidPattern`] is returned for an empty list,
    /// for a pattern longer than a Base58 address, and for a pattern
    /// containing a character that never occurs in Base58 (`0`, `O`, `I`,
    /// `l`; only `0` when the pattern ignores case).
    pub fn start(
        &self,
        base_seed: [u8; 32],
        patterns: Vec<Pattern>,
    ) -> Result<SearchSession<E>, SearchError> {
        let patterns = PatternSet::new(patterns)?;

        info!("session started with {} pattern(s)", patterns.len());

        Ok(SearchSession {
            base_seed,
            patterns: Arc::new(patterns),
            executor: self.executor.clone(),
            result_cap: None,
            state: Mutex::new(SessionState::default()),
            start_time: Instant::now(),
        })
    }
}

/// A submitted batch that has not been fully collected.
struct InFlight {
    handle: BatchHandle,
    batch: PendingBatch,
    /// Seeds of this batch already reported. Seeds never repeat across
    /// batches, so this is dropped with the batch.
    reported: HashSet<[u8; 32]>,
}

/// Mutable session state, serialized behind the session mutex.
#[derive(Default)]
struct SessionState {
    /// Index of the next candidate to dispatch
    cursor: u64,
    /// Batches not yet complete
    in_flight: Vec<InFlight>,
    /// Distinct matches gathered
    matches: u64,
    /// Results handed out by `collect`
    delivered: usize,
    /// Results gathered but not yet returned by `collect`
    ready: Vec<SearchResult>,
    /// Candidates evaluated across all batches
    evaluated: u64,
    /// Set by `stop` or by reaching the result cap
    closed: bool,
}

/// One ongoing vanity search.
///
/// All methods take `&self`; the enumeration cursor and the result
/// accumulator are guarded by a mutex, so a session can be shared across
/// threads. Dropping the session releases its in-flight batches.
pub struct SearchSession<E: ComputeExecutor = CpuExecutor> {
    /// Enumeration origin
    base_seed: [u8; 32],
    /// Active patterns
    patterns: Arc<PatternSet>,
    /// Lane executor
    executor: Arc<E>,
    /// Close the session after this many results
    result_cap: Option<usize>,
    /// Cursor, in-flight batches and accumulator
    state: Mutex<SessionState>,
    /// Start time
    start_time: Instant,
}

impl<E: ComputeExecutor> SearchSession<E> {
    /// Closes the session automatically once `cap` results have been
    /// collected. Results past the cap are discarded.
    pub fn with_result_cap(mut self, cap: usize) -> Self {
        self.result_cap = Some(cap);
        self
    }

    /// Dispatches the next `batch_size` candidates across up to
    /// `lane_count` lanes.
    ///
    /// The cursor advances as soon as the executor accepts the batch, so
    /// later dispatches never reuse a seed even while this batch is still
    /// running. If the executor refuses the batch the cursor is left
    /// unchanged and the session stays usable.
    pub fn dispatch_batch(
        &self,
        batch_size: usize,
        lane_count: usize,
    ) -> Result<PendingBatch, SearchError> {
        let mut state = self.lock();
        if state.closed {
            return Err(SearchError::SessionClosed);
        }

        let start = state.cursor;
        let end = start
            .checked_add(batch_size as u64)
            .ok_or(SearchError::EnumerationExhausted(start))?;

        let seeds = candidate_range(&self.base_seed, start, batch_size as u64);
        let handle = self
            .executor
            .submit(seeds, self.patterns.clone(), lane_count)
            .map_err(|e| {
                warn!("batch at cursor {} rejected: {}", start, e);
                e
            })?;

        state.cursor = end;
        let batch = PendingBatch {
            start,
            size: batch_size,
        };
        state.in_flight.push(InFlight {
            handle,
            batch,
            reported: HashSet::new(),
        });

        debug!(
            "dispatched {} seeds from cursor {} on {} lanes ({} in flight)",
            batch_size,
            start,
            lane_count,
            state.in_flight.len()
        );

        Ok(batch)
    }

    /// Returns the matches that completed since the previous call.
    ///
    /// Never blocks; returns an empty list if nothing new is ready. Each
    /// matching seed is returned once per session. Batches that have
    /// finished are released here.
    ///
    /// If the executor fails while polling, the error is returned and any
    /// results already gathered are kept for the next call.
    pub fn collect(&self) -> Result<Vec<SearchResult>, SearchError> {
        let mut state = self.lock();
        if state.closed {
            return Err(SearchError::SessionClosed);
        }

        let failure = self.poll_in_flight(&mut state);

        if let Some(cap) = self.result_cap {
            let remaining = cap.saturating_sub(state.delivered);
            if state.ready.len() >= remaining {
                state.ready.truncate(remaining);
                let results = std::mem::take(&mut state.ready);
                state.delivered += results.len();
                self.close(&mut state);
                info!("result cap of {} reached", cap);
                return Ok(results);
            }
        }

        if let Some(e) = failure {
            warn!("collect failed: {}", e);
            return Err(e.into());
        }

        let results = std::mem::take(&mut state.ready);
        state.delivered += results.len();
        Ok(results)
    }

    /// Polls every in-flight batch, moving new matches into `ready`.
    /// Returns the first executor error encountered.
    fn poll_in_flight(&self, state: &mut SessionState) -> Option<ExecutorError> {
        let SessionState {
            in_flight,
            ready,
            evaluated,
            matches,
            ..
        } = state;

        let mut failure = None;
        let mut finished = Vec::new();

        for (index, entry) in in_flight.iter_mut().enumerate() {
            let poll = match self.executor.poll(&entry.handle) {
                Ok(poll) => poll,
                Err(e) => {
                    failure.get_or_insert(e);
                    continue;
                }
            };

            *evaluated += poll.evaluated;
            for result in poll.results {
                if result.found && entry.reported.insert(result.seed) {
                    *matches += 1;
                    ready.push(result.into());
                }
            }

            if poll.complete {
                finished.push(index);
            }
        }

        for index in finished.into_iter().rev() {
            let entry = in_flight.remove(index);
            debug!(
                "batch at cursor {} complete ({} seeds)",
                entry.batch.start, entry.batch.size
            );
            self.executor.release(entry.handle);
        }

        failure
    }

    /// Stops the session.
    ///
    /// In-flight batches are released: lanes stop picking up seeds and any
    /// results they still produce are discarded. Later calls to
    /// `dispatch_batch`, `collect` or `stop` fail with
    /// [`SearchError::SessionClosed`].
    pub fn stop(&self) -> Result<(), SearchError> {
        let mut state = self.lock();
        if state.closed {
            return Err(SearchError::SessionClosed);
        }
        self.close(&mut state);
        Ok(())
    }

    fn close(&self, state: &mut SessionState) {
        state.closed = true;
        state.ready.clear();
        for entry in state.in_flight.drain(..) {
            self.executor.release(entry.handle);
        }
        info!(
            "session stopped: cursor {}, {} evaluated, {} matches in {:.2}s",
            state.cursor,
            state.evaluated,
            state.matches,
            self.start_time.elapsed().as_secs_f64()
        );
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the base seed.
    pub fn base_seed(&self) -> &[u8; 32] {
        &self.base_seed
    }

    /// Returns the active patterns.
    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// Returns the index of the next candidate to dispatch.
    pub fn cursor(&self) -> u64 {
        self.lock().cursor
    }

    /// Returns the number of batches not yet complete.
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight.len()
    }

    /// Returns the total candidates evaluated so far.
    pub fn total_evaluated(&self) -> u64 {
        self.lock().evaluated
    }

    /// Returns the number of distinct matches reported so far.
    pub fn total_matches(&self) -> u64 {
        self.lock().matches
    }

    /// Returns true once the session has been stopped.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Returns the elapsed time since the session started.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the current evaluation rate (keys per second).
    pub fn keys_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_evaluated() as f64 / elapsed
        } else {
            0.0
        }
    }
}

impl<E: ComputeExecutor> Drop for SearchSession<E> {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        for entry in state.in_flight.drain(..) {
            self.executor.release(entry.handle);
        }
    }
}
