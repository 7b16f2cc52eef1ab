//! Folding range engine, file discovery and parallel execution

pub mod assembler;
pub mod cache;
pub mod executor;
pub mod file_walker;
pub mod scanner;

pub use assembler::RangeAssembler;
pub use cache::RangeCache;
pub use executor::{ExecutionEngine, ExecutionResult, FileRanges};
pub use scanner::{FoldEvent, Scanner};

use crate::rules::RuleSet;
use crate::types::FoldingRange;

/// Computes folding ranges for documents with one compiled rule set
///
/// The engine holds no per-document state; every call scans from scratch and
/// returns identical output for identical input.
#[derive(Debug, Clone, Copy)]
pub struct FoldingEngine<'r> {
    rules: &'r RuleSet,
}

impl<'r> FoldingEngine<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'r RuleSet {
        self.rules
    }

    /// Ranges for `text`, split into lines on `\n` or `\r\n`
    pub fn compute(&self, text: &str) -> Vec<FoldingRange> {
        let lines: Vec<&str> = text.lines().collect();
        self.compute_lines(&lines)
    }

    /// Ranges for a document given as lines
    pub fn compute_lines<S: AsRef<str>>(&self, lines: &[S]) -> Vec<FoldingRange> {
        let events = self.events(lines);
        RangeAssembler::new(self.rules, lines.len()).assemble(events)
    }

    /// Raw close events, before clipping, sorting and de-duplication
    pub fn events<S: AsRef<str>>(&self, lines: &[S]) -> Vec<FoldEvent> {
        Scanner::new(self.rules).scan(lines.iter().map(AsRef::as_ref))
    }
}

/// Shorthand for `FoldingEngine::new(rules).compute(text)`
pub fn compute_ranges(rules: &RuleSet, text: &str) -> Vec<FoldingRange> {
    FoldingEngine::new(rules).compute(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawRule;
    use crate::rules::{NullSink, RuleCompiler};
    use crate::types::{FoldKind, LanguageId};

    fn rule_set(json: &str) -> RuleSet {
        let raws: Vec<RawRule> = serde_json::from_str(json).unwrap();
        let refs: Vec<&RawRule> = raws.iter().collect();
        RuleCompiler::new(&mut NullSink).compile(&LanguageId::new("test").unwrap(), &refs, &[])
    }

    #[test]
    fn test_compute_splits_crlf() {
        let rules = rule_set(r#"[{"begin": "{", "end": "}"}]"#);
        let ranges = compute_ranges(&rules, "a {\r\nb\r\n}\r\n");
        assert_eq!(ranges, vec![FoldingRange::new(0, 2, FoldKind::Region)]);
    }

    #[test]
    fn test_empty_document_and_empty_rules() {
        let rules = rule_set(r#"[{"begin": "{", "end": "}"}]"#);
        assert!(compute_ranges(&rules, "").is_empty());

        let empty = RuleSet::empty(LanguageId::wildcard());
        assert!(compute_ranges(&empty, "a {\nb\n}").is_empty());
    }

    #[test]
    fn test_compute_lines_accepts_owned_lines() {
        let rules = rule_set(r#"[{"beginRegex": "^\\s*//", "consecutive": true}]"#);
        let lines = vec!["// a".to_string(), "// b".to_string(), "code".to_string()];
        let ranges = FoldingEngine::new(&rules).compute_lines(&lines);
        assert_eq!(ranges, vec![FoldingRange::new(0, 1, FoldKind::Comment)]);
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let rules = rule_set(
            r#"[{"begin": "{", "end": "}"}, {"beginRegex": "^\\s*//", "consecutive": true}]"#,
        );
        let text = "// a\n// b\nfn x() {\n  {\n  }\n}\n";
        let engine = FoldingEngine::new(&rules);
        assert_eq!(engine.compute(text), engine.compute(text));
    }
}
