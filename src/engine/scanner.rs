#![forbid(unsafe_code)]

//! Line-by-line matching engine
//!
//! The scanner walks a document once and turns a compiled `RuleSet` into close
//! events. Delimited rules live on one explicit stack of open entries; the
//! stack also decides which rules are in scope, so nesting never recurses.
//! Consecutive and indentation rules keep small per-rule state beside it.
//!
//! Each entry carries the scope in effect while it is innermost, built once
//! when the entry is pushed. Per-line work depends on the number of rules and
//! distinct end patterns in scope, not on how many entries are open.

use crate::rules::{EndPattern, Nesting, Pairing, Rule, RuleKind, RuleSet};
use crate::types::RuleId;
use regex::Regex;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Columns a tab advances to for off-side rules
pub const TAB_WIDTH: usize = 4;

/// A matched region, before clipping and de-duplication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldEvent {
    /// Rule that produced the region
    pub rule: RuleId,
    /// Line of the opening match
    pub start_line: usize,
    /// Line of the closing match, or the last line of a run or block
    pub end_line: usize,
    /// True when `end_line` holds an end delimiter, so `fold_last_line` applies
    pub closed_by_delimiter: bool,
}

/// Open entries that share one end search
#[derive(Debug, Clone, PartialEq, Eq)]
enum EndKey {
    /// Every entry of the rule uses the rule's own end pattern
    Rule(RuleId),
    /// End pattern resolved from the entry's begin captures
    Resolved(RuleId, String),
}

/// Rules and ends in effect while an entry is the innermost open one
#[derive(Debug, Clone)]
struct Scope {
    /// Rules whose begins are tried, innermost scope first
    active: Rc<[RuleId]>,
    /// Rules that are active here or become active again once inner regions close
    reachable: Rc<[RuleId]>,
    /// Innermost stack index for each distinct end, innermost first
    ends: Rc<[(EndKey, usize)]>,
}

/// One element of the scanning stack
#[derive(Debug)]
struct OpenEntry {
    rule: RuleId,
    line: usize,
    column: usize,
    /// Byte offset just past the begin match
    body_column: usize,
    /// Begin captures by group number, kept only for backreference ends
    captures: Vec<Option<String>>,
    /// End regex resolved from a backreference template
    resolved_end: Option<Regex>,
    scope: Scope,
}

#[derive(Debug, Clone, Copy)]
struct Run {
    first: usize,
    last: usize,
}

#[derive(Debug, Default)]
struct IndentState {
    /// Implicit opens as (width, line), widths strictly increasing
    opens: Vec<(usize, usize)>,
    last_line: usize,
}

#[derive(Debug)]
enum Action {
    Close(usize),
    Open {
        rule: RuleId,
        captures: Vec<Option<String>>,
    },
}

#[derive(Debug)]
struct Hit {
    start: usize,
    end: usize,
    action: Action,
}

/// Stateful scanner for a single pass over one document
#[derive(Debug)]
pub struct Scanner<'r> {
    rules: &'r RuleSet,
    /// Scope with no open entries
    base: Scope,
    stack: Vec<OpenEntry>,
    runs: BTreeMap<RuleId, Run>,
    indents: BTreeMap<RuleId, IndentState>,
    events: Vec<FoldEvent>,
    /// Index of the first event emitted on the current line
    line_events: usize,
}

impl<'r> Scanner<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        let top: Rc<[RuleId]> = Rc::from(rules.top_level());
        Self {
            rules,
            base: Scope {
                active: Rc::clone(&top),
                reachable: top,
                ends: Rc::from(Vec::new()),
            },
            stack: Vec::new(),
            runs: BTreeMap::new(),
            indents: BTreeMap::new(),
            events: Vec::new(),
            line_events: 0,
        }
    }

    /// Scan every line and return the close events in emission order
    pub fn scan<'a>(mut self, lines: impl IntoIterator<Item = &'a str>) -> Vec<FoldEvent> {
        for (line_no, text) in lines.into_iter().enumerate() {
            self.scan_line(line_no, text);
        }
        self.finish()
    }

    fn scan_line(&mut self, line_no: usize, text: &str) {
        self.line_events = self.events.len();
        let active = Rc::clone(&self.scope().active);
        self.feed_line_rules(line_no, text, &active);

        let mut pos = 0;
        while let Some(hit) = self.next_hit(line_no, text, pos) {
            match hit.action {
                Action::Close(index) => self.close(index, line_no),
                Action::Open { rule, captures } => {
                    self.open(rule, line_no, hit.start, hit.end, captures)
                }
            }

            pos = if hit.end > hit.start {
                hit.end
            } else {
                match next_boundary(text, hit.end) {
                    Some(next) => next,
                    None => break,
                }
            };
        }
    }

    /// Discard unclosed entries and close what the end of the document closes
    fn finish(mut self) -> Vec<FoldEvent> {
        if !self.stack.is_empty() {
            tracing::trace!(
                unclosed = self.stack.len(),
                "discarding unbalanced opens at end of document"
            );
            self.stack.clear();
        }

        let runs: Vec<RuleId> = self.runs.keys().copied().collect();
        for id in runs {
            self.close_run(id, usize::MAX);
        }

        let indents: Vec<RuleId> = self.indents.keys().copied().collect();
        for id in indents {
            self.flush_indent(id, usize::MAX);
        }

        self.events
    }

    fn scope(&self) -> &Scope {
        self.stack.last().map_or(&self.base, |entry| &entry.scope)
    }

    /// Scope inside a region of rule `id` opened at stack `index` over `below`
    ///
    /// Nested rules come before the enclosing scope. An opaque region hides
    /// every begin and every end but its own.
    fn enter(&self, below: &Scope, id: RuleId, key: Option<EndKey>, index: usize) -> Scope {
        let rule = self.rules.rule(id);
        let (active, reachable) = match &rule.nesting {
            Nesting::Inherit => (Rc::clone(&below.active), Rc::clone(&below.reachable)),
            Nesting::Opaque => (Rc::from(Vec::new()), Rc::clone(&below.reachable)),
            Nesting::Rules(children) => (
                prepend(children, &below.active),
                prepend(children, &below.reachable),
            ),
        };

        let mut ends = Vec::with_capacity(below.ends.len() + 1);
        if let Some(key) = &key {
            ends.push((key.clone(), index));
        }
        if !matches!(rule.nesting, Nesting::Opaque) {
            ends.extend(
                below
                    .ends
                    .iter()
                    .filter(|(other, _)| key.as_ref() != Some(other))
                    .cloned(),
            );
        }

        Scope {
            active,
            reachable,
            ends: Rc::from(ends),
        }
    }

    /// Rebuild the scopes of entries at and above `from` after a removal below them
    fn rebuild_scopes(&mut self, from: usize) {
        for index in from..self.stack.len() {
            let below = match index.checked_sub(1) {
                Some(prev) => self.stack[prev].scope.clone(),
                None => self.base.clone(),
            };
            let entry = &self.stack[index];
            let key = end_key(self.rules.rule(entry.rule), entry.resolved_end.as_ref());
            let scope = self.enter(&below, entry.rule, key, index);
            self.stack[index].scope = scope;
        }
    }

    fn feed_line_rules(&mut self, line_no: usize, text: &str, active: &[RuleId]) {
        let rules = self.rules;
        for &id in active {
            match &rules.rule(id).kind {
                RuleKind::Consecutive { line } => {
                    if line.is_match(text) {
                        self.runs
                            .entry(id)
                            .and_modify(|run| run.last = line_no)
                            .or_insert(Run {
                                first: line_no,
                                last: line_no,
                            });
                    }
                }
                RuleKind::Indentation => self.feed_indent(id, line_no, text),
                RuleKind::BeginEnd { .. } | RuleKind::SinglePattern { .. } => {}
            }
        }

        // A run not extended by this line is over, including runs whose rule is suspended
        let ended: Vec<RuleId> = self
            .runs
            .iter()
            .filter(|(_, run)| run.last != line_no)
            .map(|(id, _)| *id)
            .collect();
        for id in ended {
            self.close_run(id, usize::MAX);
        }
    }

    /// Emit a run of two or more lines, cut at `limit`
    fn close_run(&mut self, id: RuleId, limit: usize) {
        if let Some(run) = self.runs.remove(&id) {
            let last = run.last.min(limit);
            if last > run.first {
                self.events.push(FoldEvent {
                    rule: id,
                    start_line: run.first,
                    end_line: last,
                    closed_by_delimiter: false,
                });
            }
        }
    }

    fn feed_indent(&mut self, id: RuleId, line_no: usize, text: &str) {
        let Some(width) = indent_width(text) else {
            return;
        };

        let state = self.indents.entry(id).or_default();
        while let Some(&(open_width, open_line)) = state.opens.last() {
            if open_width < width {
                break;
            }
            state.opens.pop();
            self.events.push(FoldEvent {
                rule: id,
                start_line: open_line,
                end_line: line_no.saturating_sub(1),
                closed_by_delimiter: false,
            });
        }
        state.opens.push((width, line_no));
        state.last_line = line_no;
    }

    /// Close every implicit open of an indentation rule at the last line it saw, cut at `limit`
    fn flush_indent(&mut self, id: RuleId, limit: usize) {
        if let Some(state) = self.indents.remove(&id) {
            let end_line = state.last_line.min(limit);
            for (_, open_line) in state.opens.into_iter().rev() {
                if open_line > end_line {
                    continue;
                }
                self.events.push(FoldEvent {
                    rule: id,
                    start_line: open_line,
                    end_line,
                    closed_by_delimiter: false,
                });
            }
        }
    }

    /// Earliest end or begin match at or after `pos`
    ///
    /// At equal positions ends win over begins, inner entries over outer ones,
    /// and begins follow rule order. Entries sharing an end pattern are
    /// searched once; the innermost of them claims the match.
    fn next_hit(&self, line_no: usize, text: &str, pos: usize) -> Option<Hit> {
        let scope = self.scope();
        let mut best: Option<Hit> = None;

        for (_, index) in scope.ends.iter() {
            let entry = &self.stack[*index];
            let rule = self.rules.rule(entry.rule);
            if let Some((start, end)) = find_end(rule, entry, line_no, text, pos)
                && best.as_ref().is_none_or(|b| start < b.start)
            {
                best = Some(Hit {
                    start,
                    end,
                    action: Action::Close(*index),
                });
            }
        }

        for &id in scope.active.iter() {
            let rule = self.rules.rule(id);
            if let Some((start, end, captures)) = find_begin(rule, text, pos)
                && best.as_ref().is_none_or(|b| start < b.start)
            {
                best = Some(Hit {
                    start,
                    end,
                    action: Action::Open { rule: id, captures },
                });
            }
        }

        best
    }

    fn open(
        &mut self,
        id: RuleId,
        line_no: usize,
        column: usize,
        body_column: usize,
        captures: Vec<Option<String>>,
    ) {
        let rules = self.rules;
        let rule = rules.rule(id);
        let resolved_end = match &rule.kind {
            RuleKind::BeginEnd {
                begin,
                end: EndPattern::Backreference(template),
            } => match template.resolve(begin, &captures) {
                Ok(end) => Some(end),
                Err(e) => {
                    tracing::warn!(
                        rule = %rule.label,
                        line = line_no,
                        error = %e,
                        "end pattern does not compile after substitution, region cannot close"
                    );
                    None
                }
            },
            _ => None,
        };

        let key = end_key(rule, resolved_end.as_ref());
        let scope = self.enter(self.scope(), id, key, self.stack.len());
        self.stack.push(OpenEntry {
            rule: id,
            line: line_no,
            column,
            body_column,
            captures,
            resolved_end,
            scope,
        });
    }

    fn close(&mut self, index: usize, line_no: usize) {
        let rules = self.rules;
        let rule = rules.rule(self.stack[index].rule);
        let reachable_before = Rc::clone(&self.scope().reachable);

        let entry = match rule.pairing {
            Pairing::Innermost => {
                let discarded = self.stack.len() - index - 1;
                if discarded > 0 {
                    tracing::trace!(
                        rule = %rule.label,
                        line = line_no,
                        discarded,
                        "closing outer region over unclosed inner regions"
                    );
                }
                self.stack.truncate(index + 1);
                self.stack.pop()
            }
            Pairing::Nearest => {
                let entry = self.stack.remove(index);
                self.rebuild_scopes(index);
                Some(entry)
            }
        };

        if let Some(entry) = entry {
            tracing::trace!(
                rule = %rule.label,
                start_line = entry.line,
                start_column = entry.column,
                captured = entry.captures.len(),
                end_line = line_no,
                "closed region"
            );
            self.events.push(FoldEvent {
                rule: entry.rule,
                start_line: entry.line,
                end_line: line_no,
                closed_by_delimiter: true,
            });
        }

        let last_inside = if rule.fold_last_line {
            line_no
        } else {
            line_no.saturating_sub(1)
        };
        self.leave_scope(&reachable_before, last_inside);
    }

    /// End the state of rules that went out of scope when a region closed
    ///
    /// Their ranges may not reach past `last_inside`, the last line the
    /// closed region folds.
    fn leave_scope(&mut self, reachable_before: &[RuleId], last_inside: usize) {
        let reachable = Rc::clone(&self.scope().reachable);
        let left: Vec<RuleId> = reachable_before
            .iter()
            .filter(|id| !reachable.contains(*id))
            .copied()
            .collect();
        if left.is_empty() {
            return;
        }

        for event in &mut self.events[self.line_events..] {
            if event.end_line > last_inside && left.contains(&event.rule) {
                event.end_line = last_inside;
                event.closed_by_delimiter = false;
            }
        }

        for id in left {
            self.close_run(id, last_inside);
            self.flush_indent(id, last_inside);
        }
    }
}

/// Search key shared by open entries of `rule` with the same end pattern
///
/// None when a backreference end could not be resolved; such entries never close.
fn end_key(rule: &Rule, resolved_end: Option<&Regex>) -> Option<EndKey> {
    match &rule.kind {
        RuleKind::BeginEnd {
            end: EndPattern::Backreference(_),
            ..
        } => resolved_end.map(|end| EndKey::Resolved(rule.id, end.as_str().to_string())),
        _ => Some(EndKey::Rule(rule.id)),
    }
}

/// `ids` followed by the members of `rest` not already present
fn prepend(ids: &[RuleId], rest: &[RuleId]) -> Rc<[RuleId]> {
    let mut list = Vec::with_capacity(ids.len() + rest.len());
    push_unique(&mut list, ids);
    push_unique(&mut list, rest);
    Rc::from(list)
}

fn push_unique(list: &mut Vec<RuleId>, ids: &[RuleId]) {
    for id in ids {
        if !list.contains(id) {
            list.push(*id);
        }
    }
}

/// Begin match of a delimited rule at or after `pos`
fn find_begin(rule: &Rule, text: &str, pos: usize) -> Option<(usize, usize, Vec<Option<String>>)> {
    match &rule.kind {
        RuleKind::BeginEnd { begin, end } => {
            if matches!(end, EndPattern::Backreference(_)) {
                let caps = begin.captures_at(text, pos)?;
                let whole = caps.get(0)?;
                let captures = caps
                    .iter()
                    .map(|group| group.map(|m| m.as_str().to_string()))
                    .collect();
                Some((whole.start(), whole.end(), captures))
            } else {
                let m = begin.find_at(text, pos)?;
                Some((m.start(), m.end(), Vec::new()))
            }
        }
        RuleKind::SinglePattern { pattern } => {
            let (start, end) = find_group(pattern, text, pos, "begin")?;
            Some((start, end, Vec::new()))
        }
        RuleKind::Consecutive { .. } | RuleKind::Indentation => None,
    }
}

/// End match for an open entry at or after `pos`
fn find_end(
    rule: &Rule,
    entry: &OpenEntry,
    line_no: usize,
    text: &str,
    pos: usize,
) -> Option<(usize, usize)> {
    let mut at = pos;
    loop {
        let (start, end) = match &rule.kind {
            RuleKind::BeginEnd {
                end: EndPattern::Static(end),
                ..
            } => end.find_at(text, at).map(|m| (m.start(), m.end()))?,
            RuleKind::BeginEnd {
                end: EndPattern::Backreference(_),
                ..
            } => entry
                .resolved_end
                .as_ref()?
                .find_at(text, at)
                .map(|m| (m.start(), m.end()))?,
            RuleKind::SinglePattern { pattern } => find_group(pattern, text, at, "end")?,
            RuleKind::Consecutive { .. } | RuleKind::Indentation => return None,
        };

        // Strict rules keep a region open when only whitespace follows its begin on the same line
        let whitespace_gap = entry.line == line_no
            && text
                .get(entry.body_column..start)
                .is_some_and(|gap| gap.trim().is_empty());
        if rule.strict && whitespace_gap {
            at = if end > start {
                end
            } else {
                next_boundary(text, end)?
            };
            continue;
        }

        return Some((start, end));
    }
}

/// First match of `regex` at or after `pos` in which the named group took part
fn find_group(regex: &Regex, text: &str, pos: usize, name: &str) -> Option<(usize, usize)> {
    let mut at = pos;
    loop {
        let caps = regex.captures_at(text, at)?;
        let whole = caps.get(0)?;
        if caps.name(name).is_some() {
            return Some((whole.start(), whole.end()));
        }
        at = if whole.end() > whole.start() {
            whole.end()
        } else {
            next_boundary(text, whole.end())?
        };
    }
}

/// Byte offset of the character after the one starting at `index`
fn next_boundary(text: &str, index: usize) -> Option<usize> {
    text.get(index..)?
        .chars()
        .next()
        .map(|c| index + c.len_utf8())
}

/// Leading whitespace width, or None for a blank line
pub fn indent_width(text: &str) -> Option<usize> {
    if text.trim().is_empty() {
        return None;
    }
    let mut width = 0;
    for c in text.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += TAB_WIDTH - width % TAB_WIDTH,
            _ => break,
        }
    }
    Some(width)
}
