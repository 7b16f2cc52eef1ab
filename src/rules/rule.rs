#![forbid(unsafe_code)]

//! Compiled rule model
//!
//! A `RuleSet` is an arena of compiled `Rule`s addressed by `RuleId`, plus the
//! ordered list of top-level rule ids. Nested rules refer to their children by
//! id, so self-recursive nesting needs no shared ownership.

use crate::types::{FoldKind, LanguageId, RuleId};
use regex::Regex;

/// What a rule matches and how
#[derive(Debug, Clone)]
pub enum RuleKind {
    /// Separate begin and end patterns
    BeginEnd { begin: Regex, end: EndPattern },
    /// One pattern with named groups `begin` and `end`
    SinglePattern { pattern: Regex },
    /// Runs of at least two adjacent lines matching `line`
    Consecutive { line: Regex },
    /// Off-side blocks derived from leading whitespace
    Indentation,
}

impl RuleKind {
    /// Short name used in logs and diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::BeginEnd { .. } => "begin_end",
            RuleKind::SinglePattern { .. } => "single_pattern",
            RuleKind::Consecutive { .. } => "consecutive",
            RuleKind::Indentation => "indentation",
        }
    }
}

/// End pattern of a begin/end rule
#[derive(Debug, Clone)]
pub enum EndPattern {
    /// Fixed regex shared by every open entry
    Static(Regex),
    /// Regex source referencing begin captures, resolved per open entry
    Backreference(BackreferenceTemplate),
}

/// How a closing match chooses among open entries of the same rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    /// Close the innermost matching entry and discard unrelated entries opened after it
    Innermost,
    /// Close the nearest matching entry and leave unrelated entries open
    Nearest,
}

/// Which rules are tried inside a region opened by a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nesting {
    /// The enclosing scope stays active
    Inherit,
    /// Nothing but the rule's own end is tried inside
    Opaque,
    /// These rules are tried first, then the enclosing scope
    Rules(Vec<RuleId>),
}

/// A compiled folding rule
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: RuleId,
    /// Human readable label for diagnostics
    pub label: String,
    pub kind: RuleKind,
    pub pairing: Pairing,
    pub nesting: Nesting,
    /// Same-line pairs separated only by whitespace do not collapse
    pub strict: bool,
    /// Whether the line holding the end delimiter stays inside the fold
    pub fold_last_line: bool,
    pub fold_kind: FoldKind,
}

impl Rule {
    /// Returns true for rules that open entries on the scanning stack
    pub fn is_delimited(&self) -> bool {
        matches!(
            self.kind,
            RuleKind::BeginEnd { .. } | RuleKind::SinglePattern { .. }
        )
    }
}

/// The ordered, compiled rules effective for one language
#[derive(Debug, Clone)]
pub struct RuleSet {
    language: LanguageId,
    rules: Vec<Rule>,
    top_level: Vec<RuleId>,
}

impl RuleSet {
    pub(crate) fn new(language: LanguageId, rules: Vec<Rule>, top_level: Vec<RuleId>) -> Self {
        Self {
            language,
            rules,
            top_level,
        }
    }

    /// An empty rule set; scanning with it yields no ranges
    pub fn empty(language: LanguageId) -> Self {
        Self::new(language, Vec::new(), Vec::new())
    }

    pub fn language(&self) -> &LanguageId {
        &self.language
    }

    /// Looks up a rule by id
    ///
    /// Ids always come from this set, so lookups never miss.
    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id.index()]
    }

    /// Top-level rules in precedence order
    pub fn top_level(&self) -> &[RuleId] {
        &self.top_level
    }

    /// Iterate over every compiled rule, nested ones included
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Number of compiled rules, nested ones included
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// A group reference inside an end pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupRef {
    Index(usize),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Source(String),
    Group(GroupRef),
}

/// An end pattern with `\1`..`\9` or `\k<name>` references to begin captures
///
/// The regex engine has no backreferences, so each open entry resolves the
/// template by substituting the escaped text its begin match captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackreferenceTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl BackreferenceTemplate {
    /// Parses `pattern`, returning None when it has no group references
    pub fn parse(pattern: &str) -> Option<Self> {
        let mut segments = Vec::new();
        let mut source = String::new();
        let mut rest = pattern;

        while let Some(pos) = rest.find('\\') {
            source.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let Some(next) = after.chars().next() else {
                source.push('\\');
                rest = after;
                break;
            };

            if let Some(digit) = next.to_digit(10).filter(|d| *d > 0) {
                flush_source(&mut segments, &mut source);
                segments.push(Segment::Group(GroupRef::Index(digit as usize)));
                rest = &after[1..];
                continue;
            }

            if next == 'k'
                && after[1..].starts_with('<')
                && let Some(close) = after.find('>')
                && close > 2
            {
                flush_source(&mut segments, &mut source);
                segments.push(Segment::Group(GroupRef::Name(after[2..close].to_string())));
                rest = &after[close + 1..];
                continue;
            }

            source.push('\\');
            source.push(next);
            rest = &after[next.len_utf8()..];
        }
        source.push_str(rest);
        flush_source(&mut segments, &mut source);

        if segments.iter().any(|s| matches!(s, Segment::Group(_))) {
            Some(Self {
                source: pattern.to_string(),
                segments,
            })
        } else {
            None
        }
    }

    /// The pattern as written in the configuration
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Group references in order of appearance
    pub fn groups(&self) -> impl Iterator<Item = &GroupRef> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Group(group) => Some(group),
            Segment::Source(_) => None,
        })
    }

    /// Builds the concrete end regex for one begin match
    ///
    /// `captures` is indexed by group number; unknown or unmatched groups
    /// substitute the empty string.
    pub fn resolve(&self, begin: &Regex, captures: &[Option<String>]) -> Result<Regex, regex::Error> {
        let mut pattern = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Source(source) => pattern.push_str(source),
                Segment::Group(group) => {
                    let index = match group {
                        GroupRef::Index(index) => Some(*index),
                        GroupRef::Name(name) => group_index(begin, name),
                    };
                    if let Some(text) = index.and_then(|i| captures.get(i)).and_then(Option::as_deref) {
                        pattern.push_str(&regex::escape(text));
                    }
                }
            }
        }
        Regex::new(&pattern)
    }
}

fn flush_source(segments: &mut Vec<Segment>, source: &mut String) {
    if !source.is_empty() {
        segments.push(Segment::Source(std::mem::take(source)));
    }
}

/// Index of the named capture group in `regex`
pub(crate) fn group_index(regex: &Regex, name: &str) -> Option<usize> {
    regex.capture_names().position(|n| n == Some(name))
}
