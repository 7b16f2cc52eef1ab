#![forbid(unsafe_code)]

//! File discovery and traversal with gitignore support
//!
//! This module provides gitignore-aware file walking with glob-based
//! exclusion and language detection from the `[languages]` table of the
//! configuration.

use crate::types::{GlobPattern, LanguageId};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during file walking
#[derive(Debug, Error)]
pub enum FileWalkerError {
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        source: globset::Error,
    },

    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),
}

/// Detects a file's language from configured glob patterns
///
/// Languages are tried in key order; the first whose patterns match wins.
#[derive(Debug, Clone, Default)]
pub struct LanguageDetector {
    matchers: Vec<(LanguageId, GlobSet)>,
}

impl LanguageDetector {
    pub fn new(languages: &BTreeMap<LanguageId, Vec<GlobPattern>>) -> Result<Self, FileWalkerError> {
        let mut matchers = Vec::with_capacity(languages.len());
        for (language, patterns) in languages {
            matchers.push((language.clone(), build_globset(patterns)?));
        }
        Ok(Self { matchers })
    }

    /// Returns the first matching language, or None
    ///
    /// Patterns are matched against the full path and, failing that, the file
    /// name, so `*.rs` matches files in any directory.
    pub fn detect(&self, path: &Path) -> Option<LanguageId> {
        let file_name = path.file_name().map(Path::new);
        self.matchers
            .iter()
            .find(|(_, set)| set.is_match(path) || file_name.is_some_and(|name| set.is_match(name)))
            .map(|(language, _)| language.clone())
    }

    /// Returns true when no languages are configured
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

/// A discovered file with its language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    /// Detected or forced language; None scans with wildcard rules only
    pub language: Option<LanguageId>,
}

impl FileEntry {
    pub fn new(path: PathBuf, detector: &LanguageDetector) -> Self {
        let language = detector.detect(&path);
        Self { path, language }
    }

    pub fn with_language(path: PathBuf, language: Option<LanguageId>) -> Self {
        Self { path, language }
    }
}

/// Iterator over discovered files
pub struct FileWalker {
    walker: ignore::Walk,
    exclude_set: GlobSet,
    detector: LanguageDetector,
    forced: Option<LanguageId>,
}

impl FileWalker {
    /// Creates a new FileWalker
    ///
    /// When `detector` has languages, only files it recognizes are yielded;
    /// with no languages configured every file is yielded.
    pub fn new(
        root: &Path,
        detector: LanguageDetector,
        exclude: &[GlobPattern],
    ) -> Result<Self, FileWalkerError> {
        let walker = WalkBuilder::new(root)
            .hidden(false)
            .git_ignore(true)
            .build();

        let mut exclude_patterns = Vec::from(exclude);
        exclude_patterns.push(GlobPattern::new("**/.git/**"));

        Ok(Self {
            walker,
            exclude_set: build_globset(&exclude_patterns)?,
            detector,
            forced: None,
        })
    }

    /// Assign `language` to every file instead of detecting it
    pub fn force_language(mut self, language: LanguageId) -> Self {
        self.forced = Some(language);
        self
    }

    /// Walks the directory tree and returns an iterator over matching files
    pub fn walk(self) -> impl Iterator<Item = Result<FileEntry, FileWalkerError>> {
        let Self {
            walker,
            exclude_set,
            detector,
            forced,
        } = self;

        walker.filter_map(move |result| {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => return Some(Err(FileWalkerError::Walk(e))),
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                return None;
            }

            let path = entry.path();
            if exclude_set.is_match(path) {
                tracing::trace!(path = %path.display(), "excluded by pattern");
                return None;
            }

            if let Some(language) = &forced {
                return Some(Ok(FileEntry::with_language(
                    path.to_path_buf(),
                    Some(language.clone()),
                )));
            }

            let file = FileEntry::new(path.to_path_buf(), &detector);
            if file.language.is_none() && !detector.is_empty() {
                tracing::trace!(path = %path.display(), "no matching language");
                return None;
            }
            Some(Ok(file))
        })
    }
}

/// Builds a GlobSet from patterns
pub fn build_globset(patterns: &[GlobPattern]) -> Result<GlobSet, FileWalkerError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern.as_str()).map_err(|e| FileWalkerError::InvalidGlob {
            pattern: pattern.as_str().to_string(),
            source: e,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| FileWalkerError::InvalidGlob {
        pattern: "<globset>".to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn detector() -> LanguageDetector {
        let mut languages = BTreeMap::new();
        languages.insert(
            LanguageId::new("rust").unwrap(),
            vec![GlobPattern::new("*.rs")],
        );
        languages.insert(
            LanguageId::new("python").unwrap(),
            vec![GlobPattern::new("*.py"), GlobPattern::new("*.pyi")],
        );
        LanguageDetector::new(&languages).unwrap()
    }

    #[test]
    fn test_detect_by_file_name() {
        let detector = detector();
        assert_eq!(
            detector.detect(Path::new("src/deep/lib.rs")),
            LanguageId::new("rust")
        );
        assert_eq!(detector.detect(Path::new("stub.pyi")), LanguageId::new("python"));
        assert_eq!(detector.detect(Path::new("notes.txt")), None);
    }

    #[test]
    fn test_invalid_glob_is_error() {
        let mut languages = BTreeMap::new();
        languages.insert(
            LanguageId::new("rust").unwrap(),
            vec![GlobPattern::new("[invalid")],
        );
        assert!(matches!(
            LanguageDetector::new(&languages),
            Err(FileWalkerError::InvalidGlob { .. })
        ));
    }

    #[test]
    fn test_walk_filters_unknown_languages() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("main.rs"), "fn main() {}").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "hello").unwrap();

        let walker = FileWalker::new(temp_dir.path(), detector(), &[]).unwrap();
        let files: Vec<FileEntry> = walker.walk().filter_map(Result::ok).collect();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].language, LanguageId::new("rust"));
    }

    #[test]
    fn test_walk_without_languages_yields_everything() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("main.rs"), "fn main() {}").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "hello").unwrap();

        let walker = FileWalker::new(temp_dir.path(), LanguageDetector::default(), &[]).unwrap();
        let files: Vec<FileEntry> = walker.walk().filter_map(Result::ok).collect();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.language.is_none()));
    }

    #[test]
    fn test_walk_exclude_and_force_language() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("target")).unwrap();
        fs::write(temp_dir.path().join("target/gen.rs"), "").unwrap();
        fs::write(temp_dir.path().join("script"), "if x:\n    y\n").unwrap();

        let walker = FileWalker::new(
            temp_dir.path(),
            detector(),
            &[GlobPattern::new("**/target/**")],
        )
        .unwrap()
        .force_language(LanguageId::new("python").unwrap());
        let files: Vec<FileEntry> = walker.walk().filter_map(Result::ok).collect();

        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("script"));
        assert_eq!(files[0].language, LanguageId::new("python"));
    }
}
