//! CPU lane that evaluates a slice of a batch.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::matcher::PatternSet;

use super::lane::{evaluate_candidate, LaneResult};

/// Counters shared by every lane of one batch.
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Candidates evaluated
    pub keys_evaluated: AtomicU64,
    /// Matches found
    pub matches_found: AtomicU64,
}

impl WorkerStats {
    /// Creates new worker stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total candidates evaluated.
    pub fn total_keys(&self) -> u64 {
        self.keys_evaluated.load(Ordering::Acquire)
    }

    /// Returns the total matches found.
    pub fn total_matches(&self) -> u64 {
        self.matches_found.load(Ordering::Relaxed)
    }
}

/// A CPU lane covering `range` of a batch's seeds.
pub struct CpuLane {
    /// Lane ID within the batch
    id: usize,
    /// All seeds of the batch
    seeds: Arc<Vec<[u8; 32]>>,
    /// The slice of `seeds` this lane owns
    range: Range<usize>,
    /// Patterns to match against
    patterns: Arc<PatternSet>,
    /// Channel to send results
    result_tx: Sender<LaneResult>,
    /// Set when the batch is released
    cancel: Arc<AtomicBool>,
    /// Batch statistics
    stats: Arc<WorkerStats>,
}

impl CpuLane {
    /// Creates a new lane.
    pub fn new(
        id: usize,
        seeds: Arc<Vec<[u8; 32]>>,
        range: Range<usize>,
        patterns: Arc<PatternSet>,
        result_tx: Sender<LaneResult>,
        cancel: Arc<AtomicBool>,
        stats: Arc<WorkerStats>,
    ) -> Self {
        Self {
            id,
            seeds,
            range,
            patterns,
            result_tx,
            cancel,
            stats,
        }
    }

    /// Runs the lane.
    ///
    /// Evaluates its seeds in order until:
    /// - Every seed has been evaluated
    /// - The cancel flag is set
    /// - The result channel is closed
    ///
    /// Progress is flushed before the lane returns, and the sender is
    /// dropped only after that, so a closed channel means the counters are
    /// final.
    pub fn run(self) {
        // Flush progress in chunks to reduce atomic operation overhead
        const FLUSH_INTERVAL: u64 = 256;

        let mut pending = 0u64;

        for seed in &self.seeds[self.range.clone()] {
            if self.cancel.load(Ordering::Relaxed) {
                break;
            }

            let result = evaluate_candidate(*seed, &self.patterns);
            pending += 1;

            if result.found {
                self.stats.matches_found.fetch_add(1, Ordering::Relaxed);
                if self.result_tx.send(result).is_err() {
                    break;
                }
            }

            if pending == FLUSH_INTERVAL {
                self.stats.keys_evaluated.fetch_add(pending, Ordering::Release);
                pending = 0;
            }
        }

        self.stats.keys_evaluated.fetch_add(pending, Ordering::Release);
    }

    /// Returns the lane ID.
    pub fn id(&self) -> usize {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::Pattern;
    use crossbeam_channel::unbounded;

    fn lane_over(count: usize, range: Range<usize>, cancel: bool) -> (CpuLane, crossbeam_channel::Receiver<LaneResult>, Arc<WorkerStats>) {
        let seeds: Vec<[u8; 32]> = (0..count as u8).map(|i| [i; 32]).collect();
        let patterns = Arc::new(PatternSet::new(vec![Pattern::prefix("", false)]).unwrap());
        let (tx, rx) = unbounded();
        let stats = Arc::new(WorkerStats::new());
        let lane = CpuLane::new(
            0,
            Arc::new(seeds),
            range,
            patterns,
            tx,
            Arc::new(AtomicBool::new(cancel)),
            stats.clone(),
        );
        (lane, rx, stats)
    }

    #[test]
    fn test_lane_covers_its_range() {
        let (lane, rx, stats) = lane_over(8, 2..6, false);
        lane.run();
        let seeds: Vec<u8> = rx.iter().map(|r| r.seed[0]).collect();
        assert_eq!(seeds, vec![2, 3, 4, 5]);
        assert_eq!(stats.total_keys(), 4);
        assert_eq!(stats.total_matches(), 4);
    }

    #[test]
    fn test_cancelled_lane_does_nothing() {
        let (lane, rx, stats) = lane_over(4, 0..4, true);
        lane.run();
        assert_eq!(rx.iter().count(), 0);
        assert_eq!(stats.total_keys(), 0);
    }
}
