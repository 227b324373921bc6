//! Ordered collections of patterns.

use crate::error::SearchError;

use super::Pattern;

/// A non-empty, ordered list of validated patterns. Each pattern is
/// identified by its index when reporting matches.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// Validates and wraps `patterns`.
    ///
    /// Fails with [`SearchError::InvalidPattern`] if the list is empty or
    /// any pattern is out of bounds.
    pub fn new(patterns: Vec<Pattern>) -> Result<Self, SearchError> {
        if patterns.is_empty() {
            return Err(SearchError::InvalidPattern("pattern list is empty".into()));
        }
        for (index, pattern) in patterns.iter().enumerate() {
            pattern.validate().map_err(|e| match e {
                SearchError::InvalidPattern(msg) => {
                    SearchError::InvalidPattern(format!("pattern #{}: {}", index, msg))
                }
                other => other,
            })?;
        }
        Ok(Self { patterns })
    }

    /// Returns the index of the first pattern, in list order, that matches
    /// `address`.
    #[inline]
    pub fn first_match(&self, address: &str) -> Option<usize> {
        self.patterns
            .iter()
            .position(|pattern| pattern.matches(address).is_match())
    }

    /// Returns the pattern at `index`.
    pub fn get(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get(index)
    }

    /// Returns the number of patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Iterates over the patterns in order.
    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }
}
