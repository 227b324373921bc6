//! Pattern matching implementation.

use std::fmt;
use std::str::FromStr;

use crate::crypto::{is_base58_char, MAX_ADDRESS_LEN};
use crate::error::SearchError;

/// The type of pattern matching to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternType {
    /// Match at the beginning of the address
    #[default]
    Prefix,
    /// Match at the end of the address
    Suffix,
    /// Match both prefix and suffix
    Both,
}

impl FromStr for PatternType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prefix" | "start" | "begin" => Ok(PatternType::Prefix),
            "suffix" | "end" => Ok(PatternType::Suffix),
            "both" | "prefixandsuffix" => Ok(PatternType::Both),
            _ => Err(format!("Unknown pattern type: {}", s)),
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternType::Prefix => write!(f, "prefix"),
            PatternType::Suffix => write!(f, "suffix"),
            PatternType::Both => write!(f, "prefix+suffix"),
        }
    }
}

/// Result of a pattern match operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// Full match found
    Match,
    /// No match
    NoMatch,
}

impl MatchResult {
    #[inline]
    pub fn is_match(self) -> bool {
        matches!(self, MatchResult::Match)
    }
}

impl From<bool> for MatchResult {
    #[inline]
    fn from(matched: bool) -> Self {
        if matched {
            MatchResult::Match
        } else {
            MatchResult::NoMatch
        }
    }
}

/// A compiled pattern for matching addresses.
///
/// Under `ignore_case` the prefix and suffix are stored ASCII-lowercased and
/// the address is folded the same way at match time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// Prefix text (normalized); empty always matches
    prefix: String,
    /// Suffix text (normalized); empty always matches
    suffix: String,
    /// The pattern type
    pattern_type: PatternType,
    /// Whether matching folds case
    ignore_case: bool,
}

impl Pattern {
    /// Creates a pattern. The half of the rule not used by `pattern_type`
    /// is cleared, so a prefix pattern never inspects its suffix.
    pub fn new(
        pattern_type: PatternType,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
        ignore_case: bool,
    ) -> Self {
        let normalize = |s: String| if ignore_case { s.to_ascii_lowercase() } else { s };
        let (prefix, suffix) = match pattern_type {
            PatternType::Prefix => (normalize(prefix.into()), String::new()),
            PatternType::Suffix => (String::new(), normalize(suffix.into())),
            PatternType::Both => (normalize(prefix.into()), normalize(suffix.into())),
        };

        Self {
            prefix,
            suffix,
            pattern_type,
            ignore_case,
        }
    }

    /// Creates a prefix pattern.
    pub fn prefix(prefix: impl Into<String>, ignore_case: bool) -> Self {
        Self::new(PatternType::Prefix, prefix, "", ignore_case)
    }

    /// Creates a suffix pattern.
    pub fn suffix(suffix: impl Into<String>, ignore_case: bool) -> Self {
        Self::new(PatternType::Suffix, "", suffix, ignore_case)
    }

    /// Creates a prefix+suffix pattern.
    pub fn both(prefix: impl Into<String>, suffix: impl Into<String>, ignore_case: bool) -> Self {
        Self::new(PatternType::Both, prefix, suffix, ignore_case)
    }

    /// Returns the prefix text.
    pub fn prefix_text(&self) -> &str {
        &self.prefix
    }

    /// Returns the suffix text.
    pub fn suffix_text(&self) -> &str {
        &self.suffix
    }

    /// Returns the pattern type.
    pub fn pattern_type(&self) -> PatternType {
        self.pattern_type
    }

    /// Returns whether matching folds case.
    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// Checks the length bound and that every character can occur in a
    /// Base58 address.
    pub fn validate(&self) -> Result<(), SearchError> {
        for (half, text) in [("prefix", &self.prefix), ("suffix", &self.suffix)] {
            if text.len() > MAX_ADDRESS_LEN {
                return Err(SearchError::InvalidPattern(format!(
                    "{} is {} bytes, longer than {}",
                    half,
                    text.len(),
                    MAX_ADDRESS_LEN
                )));
            }

            let bad = text.chars().find(|&c| {
                let other_case = if c.is_ascii_lowercase() {
                    c.to_ascii_uppercase()
                } else {
                    c
                };
                !(is_base58_char(c) || (self.ignore_case && is_base58_char(other_case)))
            });
            if let Some(c) = bad {
                return Err(SearchError::InvalidPattern(format!(
                    "{} contains '{}', which never appears in a Base58 address",
                    half, c
                )));
            }
        }
        Ok(())
    }

    /// Matches an address against this pattern.
    ///
    /// Addresses shorter than the required prefix or suffix never match.
    /// Under `Both` the prefix and suffix regions may overlap.
    #[inline]
    pub fn matches(&self, address: &str) -> MatchResult {
        let addr = address.as_bytes();

        let matched = match self.pattern_type {
            PatternType::Prefix => self.prefix_holds(addr),
            PatternType::Suffix => self.suffix_holds(addr),
            PatternType::Both => self.prefix_holds(addr) && self.suffix_holds(addr),
        };

        matched.into()
    }

    #[inline]
    fn prefix_holds(&self, addr: &[u8]) -> bool {
        let want = self.prefix.as_bytes();
        match addr.get(..want.len()) {
            Some(head) => self.bytes_equal(head, want),
            None => false,
        }
    }

    #[inline]
    fn suffix_holds(&self, addr: &[u8]) -> bool {
        let want = self.suffix.as_bytes();
        match addr.len().checked_sub(want.len()) {
            Some(start) => self.bytes_equal(&addr[start..], want),
            None => false,
        }
    }

    /// Compares without allocating; `want` is already normalized.
    #[inline]
    fn bytes_equal(&self, got: &[u8], want: &[u8]) -> bool {
        if self.ignore_case {
            got.iter()
                .zip(want)
                .all(|(g, w)| g.to_ascii_lowercase() == *w)
        } else {
            got == want
        }
    }

    /// Returns the estimated difficulty (number of attempts to find a match).
    ///
    /// Each Base58 character has 58 possible values. Under `ignore_case`
    /// most letters have two accepted forms, which is approximated as 34
    /// distinct classes per character.
    pub fn estimated_difficulty(&self) -> u64 {
        let base: u64 = if self.ignore_case { 34 } else { 58 };
        let total_len = self.prefix.len() + self.suffix.len();
        base.saturating_pow(total_len as u32)
    }

    /// Returns a human-readable difficulty estimate.
    pub fn difficulty_description(&self) -> String {
        let diff = self.estimated_difficulty();
        match diff {
            0..=1_000 => "Very Easy (< 1 second)".into(),
            1_001..=100_000 => "Easy (seconds)".into(),
            100_001..=10_000_000 => "Medium (minutes)".into(),
            10_000_001..=1_000_000_000 => "Hard (hours)".into(),
            _ => "Very Hard (days or more)".into(),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pattern_type {
            PatternType::Prefix => write!(f, "{}...", self.prefix)?,
            PatternType::Suffix => write!(f, "...{}", self.suffix)?,
            PatternType::Both => write!(f, "{}...{}", self.prefix, self.suffix)?,
        }
        if self.ignore_case {
            write!(f, " (ignore case)")?;
        }
        Ok(())
    }
}
