//! Annotator settings.
//!
//! [`AnnotatorConfig::default`] matches the formatter's built-in behavior; a
//! JSON file may override any subset of fields.

use crate::GlossaryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_MAX_DESCRIPTION_LENGTH: usize = 100;
pub const DEFAULT_READ_MORE_LABEL: &str = "Read more";

/// How term names are located in the input text.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Single scan, longest name wins, inserted markup is never rescanned.
    #[default]
    Longest,
    /// One full replace pass per term in vocabulary order. Later terms can
    /// match inside markup produced for earlier ones.
    Ordered,
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStrategy::Longest => write!(f, "longest"),
            MatchStrategy::Ordered => write!(f, "ordered"),
        }
    }
}

impl FromStr for MatchStrategy {
    type Err = GlossaryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "longest" => Ok(MatchStrategy::Longest),
            "ordered" | "legacy" => Ok(MatchStrategy::Ordered),
            _ => Err(GlossaryError::UnknownStrategy(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatorConfig {
    #[serde(default = "default_max_description_length")]
    pub max_description_length: usize,
    #[serde(default)]
    pub strategy: MatchStrategy,
    #[serde(default = "default_read_more_label")]
    pub read_more_label: String,
    /// Prefix for detail links of terms without an explicit URL.
    #[serde(default)]
    pub detail_base_url: Option<String>,
}

fn default_max_description_length() -> usize {
    DEFAULT_MAX_DESCRIPTION_LENGTH
}

fn default_read_more_label() -> String {
    DEFAULT_READ_MORE_LABEL.to_string()
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            max_description_length: default_max_description_length(),
            strategy: MatchStrategy::default(),
            read_more_label: default_read_more_label(),
            detail_base_url: None,
        }
    }
}

impl AnnotatorConfig {
    pub fn with_max_description_length(mut self, max: usize) -> Self {
        self.max_description_length = max;
        self
    }

    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, GlossaryError> {
        let file = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(file)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: AnnotatorConfig =
            serde_json::from_str(r#"{"strategy": "ordered"}"#).unwrap();
        assert_eq!(config.strategy, MatchStrategy::Ordered);
        assert_eq!(config.max_description_length, 100);
        assert_eq!(config.read_more_label, "Read more");
        assert_eq!(config.detail_base_url, None);
    }

    #[test]
    fn strategy_parses_case_insensitively() {
        assert_eq!("Longest".parse::<MatchStrategy>().unwrap(), MatchStrategy::Longest);
        assert_eq!("legacy".parse::<MatchStrategy>().unwrap(), MatchStrategy::Ordered);
        assert!("fuzzy".parse::<MatchStrategy>().is_err());
    }
}
