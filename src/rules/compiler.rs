#![forbid(unsafe_code)]

//! Rule compiler
//!
//! Turns raw rule objects into a `RuleSet`. Per-language rules are compiled
//! before wildcard rules, so they take precedence. A malformed rule or a
//! pattern that does not compile drops only that rule; the problem goes to
//! the diagnostics sink and the rest of the set is unaffected.

use crate::config::{Config, NestedValue, RawRule, RuleEntry};
use crate::error::{PatternError, RuleError};
use crate::rules::diagnostics::DiagnosticsSink;
use crate::rules::rule::{
    BackreferenceTemplate, EndPattern, GroupRef, Nesting, Pairing, Rule, RuleKind, RuleSet,
    group_index,
};
use crate::types::{FoldKind, LanguageId, RuleId};
use regex::Regex;

const DESCENDANTS_FIELD: &str = "descendants";

/// A labelled rule list item: the parsed rule, or why it could not be parsed
type Item<'a> = (String, Result<&'a RawRule, &'a str>);

/// Compiles raw rules into a rule arena
pub struct RuleCompiler<'s> {
    sink: &'s mut dyn DiagnosticsSink,
    rules: Vec<Rule>,
    deprecation_reported: bool,
    dropped: usize,
}

impl<'s> RuleCompiler<'s> {
    pub fn new(sink: &'s mut dyn DiagnosticsSink) -> Self {
        Self {
            sink,
            rules: Vec::new(),
            deprecation_reported: false,
            dropped: 0,
        }
    }

    /// Compile the rule set for `language` from a loaded configuration
    ///
    /// Rules under the language's own keys come first, then wildcard rules.
    /// Compiling for the wildcard language yields the wildcard rules only.
    pub fn compile_config(
        config: &Config,
        language: &LanguageId,
        sink: &'s mut dyn DiagnosticsSink,
    ) -> RuleSet {
        let specific = if language.is_wildcard() {
            Vec::new()
        } else {
            config.rules_for(language)
        };
        let wildcard = config.rules_for(&LanguageId::wildcard());

        let mut top: Vec<Item<'_>> = Vec::with_capacity(specific.len() + wildcard.len());
        top.extend(entry_items(&specific, |i| format!("{}[{}]", language, i)));
        top.extend(entry_items(&wildcard, |i| format!("*[{}]", i)));
        Self::new(sink).compile_items(language, &top)
    }

    /// Compile per-language and wildcard rules into one ordered set
    pub fn compile(self, language: &LanguageId, specific: &[&RawRule], wildcard: &[&RawRule]) -> RuleSet {
        let mut top: Vec<Item<'_>> = Vec::with_capacity(specific.len() + wildcard.len());
        top.extend(
            specific
                .iter()
                .enumerate()
                .map(|(i, raw)| (label_for(raw.name.as_deref(), || format!("{}[{}]", language, i)), Ok(*raw))),
        );
        top.extend(
            wildcard
                .iter()
                .enumerate()
                .map(|(i, raw)| (label_for(raw.name.as_deref(), || format!("*[{}]", i)), Ok(*raw))),
        );
        self.compile_items(language, &top)
    }

    fn compile_items(mut self, language: &LanguageId, top: &[Item<'_>]) -> RuleSet {
        let top_level = self.compile_list(top);

        tracing::debug!(
            language = %language,
            compiled = self.rules.len(),
            top_level = top_level.len(),
            dropped = self.dropped,
            "compiled folding rules"
        );

        RuleSet::new(language.clone(), self.rules, top_level)
    }

    /// Compile one ordered list of sibling rules, returning the kept ids
    fn compile_list(&mut self, items: &[Item<'_>]) -> Vec<RuleId> {
        let mut ids = Vec::with_capacity(items.len());
        let mut sibling_scoped = Vec::new();

        for (label, item) in items {
            let compiled = match item {
                Ok(raw) => self.compile_rule(label, raw),
                Err(reason) => Err(RuleError::malformed(label, *reason)),
            };
            match compiled {
                Ok((id, wants_siblings)) => {
                    ids.push(id);
                    if wants_siblings {
                        sibling_scoped.push(id);
                    }
                }
                Err(err) => {
                    self.dropped += 1;
                    tracing::debug!(rule = %label, error = %err, "rule failed to compile");
                    self.sink.on_invalid_rule(label, &err);
                }
            }
        }

        // `descendants = true` recurses into the list the rule was declared in
        for id in sibling_scoped {
            self.rules[id.index()].nesting = Nesting::Rules(ids.clone());
        }

        ids
    }

    /// Compile a single rule and its children
    ///
    /// The second value is true when the rule's nesting must be resolved to
    /// its own sibling list once that list is complete.
    fn compile_rule(&mut self, label: &str, raw: &RawRule) -> Result<(RuleId, bool), RuleError> {
        let kind = compile_kind(label, raw)?;
        let id = RuleId::new(self.rules.len());
        let is_line_rule = matches!(
            kind,
            RuleKind::Consecutive { .. } | RuleKind::Indentation
        );

        let pairing = if raw.fold_end_regex.is_some() {
            Pairing::Nearest
        } else {
            Pairing::Innermost
        };
        let fold_kind = raw.kind.unwrap_or(match kind {
            RuleKind::Consecutive { .. } => FoldKind::Comment,
            _ => FoldKind::Region,
        });

        self.rules.push(Rule {
            id,
            label: label.to_string(),
            kind,
            pairing,
            nesting: Nesting::Inherit,
            strict: raw.strict.unwrap_or(false),
            fold_last_line: raw.fold_last_line.unwrap_or(true),
            fold_kind,
        });

        if raw.descendants.is_some() && !self.deprecation_reported {
            self.deprecation_reported = true;
            self.sink.on_deprecated_field(DESCENDANTS_FIELD);
        }

        if is_line_rule {
            if raw.nested.is_some() || raw.descendants.is_some() {
                tracing::debug!(rule = label, "ignoring nesting on a line rule");
            }
            return Ok((id, false));
        }

        let mut wants_siblings = false;
        let nesting = match (&raw.nested, raw.descendants) {
            (Some(NestedValue::Flag(true)), _) => Nesting::Inherit,
            (Some(NestedValue::Flag(false)), _) => Nesting::Opaque,
            (Some(NestedValue::Rules(list)), _) => {
                let entries: Vec<&RuleEntry> = list.as_slice().iter().collect();
                let children = entry_items(&entries, |i| format!("{}.nested[{}]", label, i));
                Nesting::Rules(self.compile_list(&children))
            }
            (None, Some(true)) => {
                wants_siblings = true;
                Nesting::Inherit
            }
            (None, Some(false)) => Nesting::Opaque,
            (None, None) => Nesting::Inherit,
        };
        self.rules[id.index()].nesting = nesting;

        Ok((id, wants_siblings))
    }
}

fn label_for(name: Option<&str>, default: impl FnOnce() -> String) -> String {
    name.map_or_else(default, str::to_string)
}

fn entry_items<'a>(
    entries: &[&'a RuleEntry],
    default_label: impl Fn(usize) -> String,
) -> Vec<Item<'a>> {
    entries
        .iter()
        .enumerate()
        .map(|(i, &entry)| (label_for(entry.name(), || default_label(i)), entry.rule()))
        .collect()
}

/// Decide the rule kind from the fields present and compile its patterns
fn compile_kind(label: &str, raw: &RawRule) -> Result<RuleKind, RuleError> {
    let begin = raw
        .begin_regex
        .clone()
        .or_else(|| raw.begin.as_deref().map(regex::escape));
    let off_side = raw.off_side.unwrap_or(false);
    let consecutive = raw.consecutive.unwrap_or(false);

    let mut declared = Vec::new();
    if off_side {
        declared.push("offSide");
    }
    if consecutive {
        declared.push("consecutive");
    }
    if raw.begin_end_regex.is_some() {
        declared.push("beginEndRegex");
    }
    if begin.is_some() && !consecutive {
        declared.push("begin/end");
    }
    if declared.len() > 1 {
        return Err(RuleError::malformed(
            label,
            format!("conflicting rule kinds: {}", declared.join(", ")),
        ));
    }

    if off_side {
        return Ok(RuleKind::Indentation);
    }

    if consecutive {
        let Some(line) = begin else {
            return Err(RuleError::malformed(
                label,
                "consecutive rule needs `begin` or `beginRegex`",
            ));
        };
        return Ok(RuleKind::Consecutive {
            line: compile_pattern(label, &line)?,
        });
    }

    if let Some(pattern) = &raw.begin_end_regex {
        let pattern = compile_pattern(label, pattern)?;
        if group_index(&pattern, "begin").is_none() || group_index(&pattern, "end").is_none() {
            return Err(RuleError::malformed(
                label,
                "beginEndRegex needs named groups `begin` and `end`",
            ));
        }
        return Ok(RuleKind::SinglePattern { pattern });
    }

    let end = match (&raw.end_regex, &raw.fold_end_regex, &raw.end) {
        (Some(_), Some(_), _) => {
            return Err(RuleError::malformed(
                label,
                "`endRegex` and `foldEndRegex` are mutually exclusive",
            ));
        }
        (Some(pattern), None, _) | (None, Some(pattern), _) => Some(pattern.clone()),
        (None, None, Some(literal)) => Some(regex::escape(literal)),
        (None, None, None) => None,
    };

    match (begin, end) {
        (Some(begin), Some(end)) => {
            let begin = compile_pattern(label, &begin)?;
            let end = compile_end(label, &begin, &end)?;
            Ok(RuleKind::BeginEnd { begin, end })
        }
        (Some(_), None) => Err(RuleError::malformed(label, "missing end pattern")),
        (None, Some(_)) => Err(RuleError::malformed(label, "end pattern without a begin pattern")),
        (None, None) => Err(RuleError::malformed(
            label,
            "rule declares no begin/end, beginEndRegex, offSide or consecutive marker",
        )),
    }
}

fn compile_pattern(label: &str, pattern: &str) -> Result<Regex, RuleError> {
    if pattern.is_empty() {
        return Err(RuleError::malformed(label, "empty pattern"));
    }
    Regex::new(pattern).map_err(|e| {
        RuleError::Pattern(PatternError {
            rule: label.to_string(),
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
    })
}

/// Compile an end pattern, keeping it as a template when it references begin groups
fn compile_end(label: &str, begin: &Regex, pattern: &str) -> Result<EndPattern, RuleError> {
    let Some(template) = BackreferenceTemplate::parse(pattern) else {
        return Ok(EndPattern::Static(compile_pattern(label, pattern)?));
    };

    for group in template.groups() {
        let known = match group {
            GroupRef::Index(index) => *index < begin.captures_len(),
            GroupRef::Name(name) => group_index(begin, name).is_some(),
        };
        if !known {
            return Err(RuleError::malformed(
                label,
                format!("end pattern references unknown begin group {:?}", group),
            ));
        }
    }

    // Resolving with empty captures checks that the surrounding source compiles
    template.resolve(begin, &[]).map_err(|e| {
        RuleError::Pattern(PatternError {
            rule: label.to_string(),
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
    })?;

    Ok(EndPattern::Backreference(template))
}
