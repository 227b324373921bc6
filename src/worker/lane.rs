//! The per-candidate pipeline run by every lane.

use crate::crypto::Keypair;
use crate::matcher::PatternSet;

/// Raw record produced by a lane for one candidate seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneResult {
    /// The candidate seed
    pub seed: [u8; 32],
    /// Base58 address of the derived public key
    pub address: String,
    /// Whether any pattern matched
    pub found: bool,
    /// Index of the first matching pattern (0 when `found` is false)
    pub matched_pattern_index: usize,
}

/// Derives the keypair for `seed`, encodes its address and tests it
/// against `patterns` in list order.
#[inline]
pub fn evaluate_candidate(seed: [u8; 32], patterns: &PatternSet) -> LaneResult {
    let address = Keypair::from_seed(seed).address().into_string();
    let matched = patterns.first_match(&address);

    LaneResult {
        seed,
        address,
        found: matched.is_some(),
        matched_pattern_index: matched.unwrap_or(0),
    }
}
