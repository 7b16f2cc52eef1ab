#![forbid(unsafe_code)]

//! Parallel execution engine for computing ranges across files
//!
//! This module provides the ExecutionEngine which reads discovered files,
//! picks each file's rule set from the registry and computes its folding
//! ranges in parallel using rayon.

use crate::engine::FoldingEngine;
use crate::engine::file_walker::FileEntry;
use crate::rules::RuleSetRegistry;
use crate::types::{FoldingRange, LanguageId};
use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Ranges computed for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRanges {
    pub path: PathBuf,
    pub language: Option<LanguageId>,
    pub ranges: Vec<FoldingRange>,
}

/// Result of computing ranges for all files
#[derive(Debug, Default)]
pub struct ExecutionResult {
    /// Per-file results, sorted by path
    pub files: Vec<FileRanges>,
    /// Files that could not be read, with the reason
    pub unreadable: Vec<(PathBuf, String)>,
}

impl ExecutionResult {
    /// Total number of ranges across all files
    pub fn range_count(&self) -> usize {
        self.files.iter().map(|f| f.ranges.len()).sum()
    }
}

/// Execution engine that computes ranges for many files in parallel
///
/// Rule sets are compiled once up front and shared read-only between workers.
pub struct ExecutionEngine {
    registry: Arc<RuleSetRegistry>,
}

impl ExecutionEngine {
    pub fn new(registry: RuleSetRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Compute ranges for every file
    pub fn execute(&self, files: Vec<FileEntry>) -> ExecutionResult {
        let outcomes: Vec<Result<FileRanges, (PathBuf, String)>> =
            files.par_iter().map(|file| self.execute_file(file)).collect();

        let mut result = ExecutionResult::default();
        for outcome in outcomes {
            match outcome {
                Ok(file) => result.files.push(file),
                Err(failure) => result.unreadable.push(failure),
            }
        }
        result.files.sort_by(|a, b| a.path.cmp(&b.path));
        result.unreadable.sort();

        tracing::debug!(
            files = result.files.len(),
            unreadable = result.unreadable.len(),
            ranges = result.range_count(),
            "computed folding ranges"
        );
        result
    }

    fn execute_file(&self, file: &FileEntry) -> Result<FileRanges, (PathBuf, String)> {
        let content = fs::read_to_string(&file.path).map_err(|e| {
            tracing::warn!(path = %file.path.display(), error = %e, "failed to read file");
            (file.path.clone(), e.to_string())
        })?;

        let rules = self.registry.get(file.language.as_ref());
        let ranges = FoldingEngine::new(&rules).compute(&content);

        Ok(FileRanges {
            path: file.path.clone(),
            language: file.language.clone(),
            ranges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::rules::NullSink;
    use crate::types::FoldKind;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
[rules."*"]
begin = "{"
end = "}"

[rules.python]
offSide = true
"#;

    fn engine() -> ExecutionEngine {
        let config = Config::parse(CONFIG).unwrap();
        ExecutionEngine::new(RuleSetRegistry::build(&config, &mut NullSink))
    }

    #[test]
    fn test_execute_uses_language_rules() {
        let temp_dir = TempDir::new().unwrap();
        let py = temp_dir.path().join("a.py");
        let txt = temp_dir.path().join("b.txt");
        fs::write(&py, "def f():\n    x\n    y\n").unwrap();
        fs::write(&txt, "a {\nb\n}\n").unwrap();

        let result = engine().execute(vec![
            FileEntry::with_language(txt.clone(), None),
            FileEntry::with_language(py.clone(), LanguageId::new("python")),
        ]);

        assert_eq!(result.files.len(), 2);
        assert_eq!(result.files[0].path, py);
        assert_eq!(result.files[0].ranges, vec![FoldingRange::new(0, 2, FoldKind::Region)]);
        assert_eq!(result.files[1].ranges, vec![FoldingRange::new(0, 2, FoldKind::Region)]);
        assert_eq!(result.range_count(), 2);
    }

    #[test]
    fn test_unreadable_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.rs");

        let result = engine().execute(vec![FileEntry::with_language(missing.clone(), None)]);

        assert!(result.files.is_empty());
        assert_eq!(result.unreadable.len(), 1);
        assert_eq!(result.unreadable[0].0, missing);
    }

    #[test]
    fn test_execute_empty() {
        let result = engine().execute(Vec::new());
        assert!(result.files.is_empty());
        assert_eq!(result.range_count(), 0);
    }
}
