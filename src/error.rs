//! Error types for foldrules
//!
//! Errors are split by blast radius. `ConfigError` and `PatternError` describe
//! problems with configuration; when they concern a single rule they are wrapped
//! in a `RuleError`, reported to the diagnostics sink and the rule is dropped.
//! Nothing in the scanning path returns an error.

use std::path::PathBuf;

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration syntax or field types
    #[error("Invalid configuration syntax: {0}")]
    Parse(String),

    /// Configuration parsed but failed validation
    #[error("Invalid configuration: {0}")]
    Validation(String),

    /// A single rule object is structurally unusable
    #[error("Malformed rule {rule}: {reason}")]
    MalformedRule { rule: String, reason: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// A rule pattern failed to compile as a regular expression
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid pattern '{pattern}' in rule {rule}: {message}")]
pub struct PatternError {
    /// Label of the rule declaring the pattern
    pub rule: String,
    /// Source text of the pattern
    pub pattern: String,
    /// Message from the regex compiler
    pub message: String,
}

/// Reason a single rule was dropped from a rule set
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Rule object is malformed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Rule pattern does not compile
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

impl RuleError {
    pub(crate) fn malformed(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        RuleError::Config(ConfigError::MalformedRule {
            rule: rule.into(),
            reason: reason.into(),
        })
    }
}

/// Top-level error type for foldrules
#[derive(Debug, thiserror::Error)]
pub enum FoldError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rule error
    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    /// Document could not be read
    #[error("Failed to read {file}: {source}")]
    Read {
        file: PathBuf,
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
