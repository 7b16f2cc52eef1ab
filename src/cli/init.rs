//! Initialize a foldrules configuration
//!
//! Writes a starter folding.toml with rules for a few common languages.

use crate::cli::args::DEFAULT_CONFIG;
use std::fs;
use std::path::{Path, PathBuf};

/// Default content for folding.toml
pub(crate) const DEFAULT_FOLDING_TOML: &str = r#"# foldrules configuration
#
# Each key under [rules] is a language id; "*" applies to every language.
# A key holds one rule table or an array of rule tables. Language rules are
# tried before wildcard rules.

exclude = ["**/target/**", "**/node_modules/**"]

# File globs used to detect each language
[languages]
rust = ["*.rs"]
python = ["*.py", "*.pyi"]
shell = ["*.sh", "*.bash"]
markdown = ["*.md"]

[output]
format = "human"
color = "auto"

# Editor regions in any language
[[rules."*"]]
name = "region-markers"
beginRegex = '^\s*(//|#)\s*region\b'
foldEndRegex = '^\s*(//|#)\s*endregion\b'

[[rules.rust]]
begin = "{"
end = "}"

[[rules.rust]]
beginRegex = '^\s*//'
consecutive = true

[[rules.rust]]
begin = "/*"
end = "*/"
nested = false
kind = "comment"

[[rules.python]]
offSide = true

[[rules.python]]
beginRegex = '^\s*#'
consecutive = true

# Heredocs close on the word that opened them
[[rules.shell]]
beginRegex = '<<-?\s*(\w+)'
endRegex = '^\s*\1$'
nested = false

[[rules.markdown]]
beginRegex = '^(?<fence>`{3,}|~{3,})'
endRegex = '^\k<fence>\s*$'
nested = false
"#;

/// Error type for init command
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Path error
    #[error("Path error: {0}")]
    Path(String),
}

/// What init did with the configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    Created(PathBuf),
    /// File already existed and `force` was not set
    Skipped(PathBuf),
    Overwritten(PathBuf),
}

/// Write folding.toml into `dir`
///
/// # Arguments
/// * `dir` - Directory to write into
/// * `force` - If true, overwrite an existing file. If false, leave it alone.
pub fn run_init(dir: &Path, force: bool) -> Result<InitOutcome, InitError> {
    if !dir.is_dir() {
        return Err(InitError::Path(format!(
            "'{}' is not a directory",
            dir.display()
        )));
    }

    let path = dir.join(DEFAULT_CONFIG);
    if path.is_dir() {
        return Err(InitError::Path(format!(
            "'{}' exists but is a directory",
            path.display()
        )));
    }

    if path.exists() {
        if !force {
            return Ok(InitOutcome::Skipped(path));
        }
        fs::write(&path, DEFAULT_FOLDING_TOML)?;
        Ok(InitOutcome::Overwritten(path))
    } else {
        fs::write(&path, DEFAULT_FOLDING_TOML)?;
        Ok(InitOutcome::Created(path))
    }
}
