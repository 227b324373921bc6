//! # ed25519_vanity
//!
//! High-performance Ed25519 vanity address search.
//!
//! ## Architecture
//!
//! - `crypto`: Field arithmetic, curve operations, keypair and address derivation
//! - `matcher`: Prefix/suffix pattern matching
//! - `worker`: Compute executor boundary and the CPU lane pool
//! - `search`: Search sessions, candidate enumeration and result aggregation
//! - `config`: Runtime configuration

pub mod config;
pub mod crypto;
pub mod error;
pub mod matcher;
pub mod search;
pub mod worker;

pub use config::Config;
pub use crypto::{Address, FieldElement, Keypair};
pub use error::{ExecutorError, SearchError};
pub use matcher::{MatchResult, Pattern, PatternSet, PatternType};
pub use search::{candidate_seed, PendingBatch, SearchEngine, SearchResult, SearchSession};
pub use worker::{ComputeExecutor, CpuExecutor};
