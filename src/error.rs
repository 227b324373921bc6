//! Error types for the search engine and the compute executor boundary.

/// Errors reported by a [`ComputeExecutor`](crate::worker::ComputeExecutor).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutorError {
    #[error("Failed to build the lane pool: {0}")]
    PoolBuild(String),

    #[error("Batch size {requested} exceeds executor capacity {capacity}")]
    CapacityExceeded { requested: usize, capacity: usize },

    #[error("Unknown batch handle {0}")]
    UnknownHandle(u64),
}

/// Errors reported by a search session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// Raised at session start; the session is never created.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// The session was stopped.
    #[error("Session is closed")]
    SessionClosed,

    /// Dispatching another batch would overflow the 64-bit candidate cursor.
    #[error("Candidate space exhausted at cursor {0}")]
    EnumerationExhausted(u64),

    /// The executor failed. The session stays open; retrying with a smaller
    /// batch is allowed.
    #[error("Executor failure: {0}")]
    Executor(#[from] ExecutorError),
}
