//! Runtime configuration for the vanity address search.

use crate::matcher::{Pattern, PatternSet, PatternType};
use clap::Parser;
use rand::RngCore;

/// Ed25519 Vanity Address Search
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Pattern to search for (Base58 characters); repeat for several patterns
    #[arg(short, long = "pattern", required = true)]
    pub patterns: Vec<String>,

    /// Suffix pattern (when used, every --pattern becomes a prefix and matching uses both)
    #[arg(short = 's', long)]
    pub suffix: Option<String>,

    /// Pattern type: prefix, suffix, or both
    #[arg(short = 't', long, default_value = "prefix")]
    pub pattern_type: PatternType,

    /// Case insensitive matching
    #[arg(short = 'i', long, default_value = "false")]
    pub ignore_case: bool,

    /// Number of parallel lanes (default: number of CPU cores)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Candidate seeds per dispatched batch
    #[arg(short = 'b', long, default_value = "65536")]
    pub batch_size: usize,

    /// Stop after finding N addresses (0 = run forever)
    #[arg(short = 'n', long, default_value = "1")]
    pub count: usize,

    /// Progress report interval in seconds
    #[arg(short = 'r', long, default_value = "5")]
    pub report_interval: u64,

    /// Base seed as 64 hex characters (default: random)
    #[arg(long)]
    pub seed: Option<String>,
}

impl Config {
    /// Returns the number of workers, defaulting to CPU count
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize);
        }

        if self.effective_pattern_type() == PatternType::Both
            && self.suffix.as_deref().unwrap_or("").is_empty()
        {
            return Err(ConfigError::InvalidPattern(
                "Pattern type 'both' needs a non-empty --suffix".into(),
            ));
        }

        if self.patterns.iter().any(|p| p.is_empty()) && self.suffix.is_none() {
            return Err(ConfigError::InvalidPattern("Pattern cannot be empty".into()));
        }

        self.pattern_set()?;
        if self.seed.is_some() {
            self.base_seed()?;
        }

        Ok(())
    }

    /// Returns the effective pattern type, accounting for --suffix flag
    pub fn effective_pattern_type(&self) -> PatternType {
        if self.suffix.is_some() {
            PatternType::Both
        } else {
            self.pattern_type
        }
    }

    /// Builds the patterns in command-line order.
    pub fn patterns(&self) -> Vec<Pattern> {
        let suffix = self.suffix.clone().unwrap_or_default();
        self.patterns
            .iter()
            .map(|text| match self.effective_pattern_type() {
                PatternType::Prefix => Pattern::prefix(text.as_str(), self.ignore_case),
                PatternType::Suffix => Pattern::suffix(text.as_str(), self.ignore_case),
                PatternType::Both => Pattern::both(text.as_str(), suffix.as_str(), self.ignore_case),
            })
            .collect()
    }

    /// Builds and validates the pattern set.
    pub fn pattern_set(&self) -> Result<PatternSet, ConfigError> {
        PatternSet::new(self.patterns()).map_err(|e| ConfigError::InvalidPattern(e.to_string()))
    }

    /// Returns the base seed, drawing a random one when none was given.
    pub fn base_seed(&self) -> Result<[u8; 32], ConfigError> {
        match &self.seed {
            Some(text) => {
                let bytes = hex::decode(text.trim_start_matches("0x"))
                    .map_err(|e| ConfigError::InvalidSeed(e.to_string()))?;
                bytes.try_into().map_err(|bytes: Vec<u8>| {
                    ConfigError::InvalidSeed(format!("expected 32 bytes, got {}", bytes.len()))
                })
            }
            None => {
                let mut seed = [0u8; 32];
                rand::thread_rng().fill_bytes(&mut seed);
                Ok(seed)
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0}")]
    InvalidPattern(String),

    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    #[error("Batch size must be at least 1")]
    InvalidBatchSize,
}
