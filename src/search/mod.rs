//! Search sessions: candidate enumeration, batch dispatch and result
//! aggregation.

mod candidates;
mod session;

pub use candidates::{candidate_range, candidate_seed};
pub use session::{PendingBatch, SearchEngine, SearchResult, SearchSession};
