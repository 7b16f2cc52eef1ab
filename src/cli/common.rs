//! Common helper functions shared across CLI commands
//!
//! This module provides shared functionality for loading configuration,
//! discovering files and compiling rule sets.

use crate::cli::args::{ColorChoice, DEFAULT_CONFIG};
use crate::config::{ColorOption, Config};
use crate::engine::file_walker::{FileEntry, FileWalker, FileWalkerError, LanguageDetector};
use crate::error::ConfigError;
use crate::rules::{DiagnosticsSink, RuleSetRegistry};
use crate::types::LanguageId;
use std::path::{Path, PathBuf};

/// Process exit codes
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_INVALID_RULES: i32 = 1;
pub const EXIT_ERROR: i32 = 2;
pub const EXIT_PARSE_ERROR: i32 = 3;

/// Load the rule configuration
///
/// # Errors
///
/// Returns `ConfigError::Io` if the file does not exist or cannot be read.
/// Returns `ConfigError::Parse` if it is not valid TOML or JSON.
pub(crate) fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        let hint = if path == Path::new(DEFAULT_CONFIG) {
            " Run 'foldrules init' to create it."
        } else {
            ""
        };
        return Err(ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found.{}", path.display(), hint),
        )));
    }

    Config::load(path)
}

/// Compile the registry, sending diagnostics to `sink`
pub(crate) fn build_registry(config: &Config, sink: &mut dyn DiagnosticsSink) -> RuleSetRegistry {
    RuleSetRegistry::build(config, sink)
}

/// Discover files to scan
///
/// Directories are walked with the configured exclusions and only files
/// with a detected language are kept. Paths naming a file are always kept.
///
/// # Errors
///
/// Returns `FileWalkerError` if a language glob is invalid or walking fails.
pub(crate) fn discover_files(
    paths: &[PathBuf],
    config: &Config,
    forced: Option<&LanguageId>,
) -> Result<Vec<FileEntry>, FileWalkerError> {
    let detector = LanguageDetector::new(&config.languages)?;
    let mut all_files = Vec::new();

    for path in paths {
        if path.is_file() {
            let language = forced.cloned().or_else(|| detector.detect(path));
            all_files.push(FileEntry::with_language(path.clone(), language));
            continue;
        }

        let mut walker = FileWalker::new(path, detector.clone(), &config.exclude)?;
        if let Some(language) = forced {
            walker = walker.force_language(language.clone());
        }
        for result in walker.walk() {
            all_files.push(result?);
        }
    }

    Ok(all_files)
}

/// Resolve the terminal color choice from the flag, then the configuration
pub(crate) fn color_choice(flag: Option<ColorChoice>, config: &Config) -> termcolor::ColorChoice {
    let choice = flag.unwrap_or(match config.output.color {
        ColorOption::Auto => ColorChoice::Auto,
        ColorOption::Always => ColorChoice::Always,
        ColorOption::Never => ColorChoice::Never,
    });

    match choice {
        ColorChoice::Always => termcolor::ColorChoice::Always,
        ColorChoice::Never => termcolor::ColorChoice::Never,
        ColorChoice::Auto => {
            if std::io::IsTerminal::is_terminal(&std::io::stdout()) {
                termcolor::ColorChoice::Auto
            } else {
                termcolor::ColorChoice::Never
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::NullSink;
    use std::fs;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
exclude = ["**/vendor/**"]

[languages]
rust = ["*.rs"]

[rules.rust]
begin = "{"
end = "}"
"#;

    #[test]
    fn test_load_config_missing_file_has_hint() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_config(&temp_dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(!err.to_string().contains("foldrules init"));

        let err = load_config(Path::new(DEFAULT_CONFIG));
        if let Err(err) = err {
            assert!(err.to_string().contains("foldrules init"));
        }
    }

    #[test]
    fn test_discover_files_walks_and_detects() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("vendor")).unwrap();
        fs::write(temp_dir.path().join("main.rs"), "fn main() {}").unwrap();
        fs::write(temp_dir.path().join("vendor/dep.rs"), "").unwrap();
        fs::write(temp_dir.path().join("README"), "").unwrap();

        let config = Config::parse(CONFIG).unwrap();
        let files = discover_files(&[temp_dir.path().to_path_buf()], &config, None).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].language, LanguageId::new("rust"));
    }

    #[test]
    fn test_discover_explicit_file_without_language() {
        let temp_dir = TempDir::new().unwrap();
        let readme = temp_dir.path().join("README");
        fs::write(&readme, "").unwrap();

        let config = Config::parse(CONFIG).unwrap();
        let files = discover_files(&[readme.clone()], &config, None).unwrap();
        assert_eq!(files, vec![FileEntry::with_language(readme, None)]);
    }

    #[test]
    fn test_discover_files_with_empty_paths() {
        let files = discover_files(&[], &Config::default(), None).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_build_registry_from_config() {
        let config = Config::parse(CONFIG).unwrap();
        let registry = build_registry(&config, &mut NullSink);
        assert!(registry.has_language(&LanguageId::new("rust").unwrap()));
    }

    #[test]
    fn test_color_choice_flag_overrides_config() {
        let mut config = Config::default();
        config.output.color = ColorOption::Always;
        assert_eq!(color_choice(None, &config), termcolor::ColorChoice::Always);
        assert_eq!(
            color_choice(Some(ColorChoice::Never), &config),
            termcolor::ColorChoice::Never
        );
    }
}
