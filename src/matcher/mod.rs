//! Pattern matching for Base58 addresses.
//!
//! Supports multiple matching strategies:
//! - Prefix: Match at the start of the address
//! - Suffix: Match at the end of the address
//! - Both: Match the start and the end at once

mod pattern;
mod set;

pub use pattern::{MatchResult, Pattern, PatternType};
pub use set::PatternSet;
