//! Range assembly
//!
//! Turns scanner events into the final range list: applies `fold_last_line`,
//! clips to the document, drops zero-height folds, sorts outer-first and
//! removes duplicate spans.

use crate::engine::scanner::FoldEvent;
use crate::rules::RuleSet;
use crate::types::{FoldingRange, RuleId};

/// Builds the ordered range list for one document
#[derive(Debug, Clone, Copy)]
pub struct RangeAssembler<'r> {
    rules: &'r RuleSet,
    line_count: usize,
}

impl<'r> RangeAssembler<'r> {
    pub fn new(rules: &'r RuleSet, line_count: usize) -> Self {
        Self { rules, line_count }
    }

    /// Assemble ranges sorted by start ascending, then end descending
    ///
    /// When two events cover the same span, the one from the rule compiled
    /// first is kept.
    pub fn assemble(&self, events: Vec<FoldEvent>) -> Vec<FoldingRange> {
        let Some(last_line) = self.line_count.checked_sub(1) else {
            return Vec::new();
        };

        let mut candidates: Vec<(FoldingRange, RuleId)> = events
            .into_iter()
            .filter_map(|event| self.to_range(&event, last_line).map(|range| (range, event.rule)))
            .collect();

        candidates.sort_by(|(a, a_rule), (b, b_rule)| {
            a.start_line
                .cmp(&b.start_line)
                .then(b.end_line.cmp(&a.end_line))
                .then(a_rule.cmp(b_rule))
        });
        candidates.dedup_by(|(next, _), (kept, _)| {
            next.start_line == kept.start_line && next.end_line == kept.end_line
        });

        candidates.into_iter().map(|(range, _)| range).collect()
    }

    fn to_range(&self, event: &FoldEvent, last_line: usize) -> Option<FoldingRange> {
        let rule = self.rules.rule(event.rule);

        let mut end_line = event.end_line;
        if event.closed_by_delimiter && !rule.fold_last_line {
            end_line = end_line.checked_sub(1)?;
        }
        let end_line = end_line.min(last_line);

        // Zero-height folds are dropped even when the closing line is kept
        if event.start_line >= end_line {
            return None;
        }

        Some(FoldingRange::new(event.start_line, end_line, rule.fold_kind))
    }
}
