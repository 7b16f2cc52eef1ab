#![forbid(unsafe_code)]

//! Core domain types for foldrules
//!
//! This module defines the fundamental types shared by the compiler, the
//! matching engine and the output layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a compiled rule
///
/// A `RuleId` is the rule's index in its `RuleSet` arena. Ids are assigned in
/// compile order, so comparing two ids compares rule precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(usize);

impl RuleId {
    pub(crate) fn new(index: usize) -> Self {
        RuleId(index)
    }

    /// Returns the arena index of the rule
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of a folding range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoldKind {
    /// Plain foldable region
    #[default]
    Region,
    /// Comment block, offered separately by "fold all comments"
    Comment,
}

impl fmt::Display for FoldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoldKind::Region => write!(f, "region"),
            FoldKind::Comment => write!(f, "comment"),
        }
    }
}

/// A foldable line span produced by the engine
///
/// Lines are 0-indexed and `start_line < end_line` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FoldingRange {
    pub start_line: usize,
    pub end_line: usize,
    pub kind: FoldKind,
}

impl FoldingRange {
    pub fn new(start_line: usize, end_line: usize, kind: FoldKind) -> Self {
        Self {
            start_line,
            end_line,
            kind,
        }
    }

    /// Returns true if `other` lies within this range (bounds included)
    pub fn contains(&self, other: &FoldingRange) -> bool {
        self.start_line <= other.start_line && other.end_line <= self.end_line
    }
}

/// A normalized language key
///
/// Keys are trimmed and lower-cased, and editor-settings style brackets
/// (`"[rust]"`) are removed. The wildcard key `*` matches every language.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageId(String);

impl LanguageId {
    /// The wildcard language key
    pub const WILDCARD: &'static str = "*";

    /// Creates a new LanguageId, normalizing the input
    ///
    /// Returns None if the key is empty after normalization or contains
    /// whitespace.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = Self::normalize(id.into());
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            return None;
        }
        Some(LanguageId(id))
    }

    /// Returns the wildcard language
    pub fn wildcard() -> Self {
        LanguageId(Self::WILDCARD.to_string())
    }

    /// Returns true for the `*` key
    pub fn is_wildcard(&self) -> bool {
        self.0 == Self::WILDCARD
    }

    fn normalize(id: String) -> String {
        let trimmed = id.trim();
        let unbracketed = trimmed
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(trimmed);
        unbracketed.trim().to_lowercase()
    }

    /// Returns the language key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for LanguageId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        LanguageId::new(value.clone()).ok_or_else(|| format!("Invalid language key '{}'", value))
    }
}

impl From<LanguageId> for String {
    fn from(language: LanguageId) -> Self {
        language.0
    }
}

/// A glob pattern for file matching
///
/// This is a simple wrapper around a string that will be used with the `globset` crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobPattern(String);

impl GlobPattern {
    /// Creates a new GlobPattern
    pub fn new(pattern: impl Into<String>) -> Self {
        GlobPattern(pattern.into())
    }

    /// Returns the pattern as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GlobPattern {
    fn from(pattern: &str) -> Self {
        GlobPattern(pattern.to_string())
    }
}
