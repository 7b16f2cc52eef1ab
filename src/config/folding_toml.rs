//! Parsing and validation for folding.toml configuration files

use crate::config::raw_rule::{RuleEntry, RuleList};
use crate::error::ConfigError;
use crate::types::{GlobPattern, LanguageId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Main configuration struct for folding.toml
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    /// CLI walk exclusions
    #[serde(default)]
    pub exclude: Vec<GlobPattern>,

    /// Rules per language key; `*` applies to every language
    #[serde(default)]
    pub rules: BTreeMap<String, RuleList>,

    /// File globs used to detect a document's language
    #[serde(default)]
    pub languages: BTreeMap<LanguageId, Vec<GlobPattern>>,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML or JSON file
    ///
    /// Files with a `.json` extension are parsed as JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            Self::parse_json(&content)
        } else {
            Self::parse(&content)
        }
    }

    /// Parse configuration from a TOML string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a JSON string
    pub fn parse_json(s: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        for key in self.rules.keys() {
            if LanguageId::new(key.as_str()).is_none() {
                return Err(ConfigError::Validation(format!(
                    "Invalid language key '{}' in [rules]",
                    key
                )));
            }
        }

        for (language, patterns) in &self.languages {
            for pattern in patterns {
                globset::Glob::new(pattern.as_str()).map_err(|e| {
                    ConfigError::Validation(format!(
                        "Invalid glob pattern '{}' for language '{}': {}",
                        pattern.as_str(),
                        language,
                        e
                    ))
                })?;
            }
        }

        for pattern in &self.exclude {
            globset::Glob::new(pattern.as_str()).map_err(|e| {
                ConfigError::Validation(format!(
                    "Invalid exclude glob pattern '{}': {}",
                    pattern.as_str(),
                    e
                ))
            })?;
        }

        Ok(())
    }

    /// Rules declared under keys that normalize to `language`, in key order
    pub fn rules_for(&self, language: &LanguageId) -> Vec<&RuleEntry> {
        self.rules
            .iter()
            .filter(|(key, _)| LanguageId::new(key.as_str()).as_ref() == Some(language))
            .flat_map(|(_, list)| list.as_slice())
            .collect()
    }

    /// All non-wildcard language keys with rules, sorted and deduplicated
    pub fn rule_languages(&self) -> Vec<LanguageId> {
        let mut languages: Vec<LanguageId> = self
            .rules
            .keys()
            .filter_map(|key| LanguageId::new(key.as_str()))
            .filter(|language| !language.is_wildcard())
            .collect();
        languages.sort();
        languages.dedup();
        languages
    }
}

/// Output configuration section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Color output setting
    #[serde(default)]
    pub color: ColorOption,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON Lines format
    Jsonl,
}

/// Color output options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorOption {
    /// Auto-detect based on terminal capabilities
    #[default]
    Auto,
    /// Always use color
    Always,
    /// Never use color
    Never,
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_CONFIG: &str = r##"
exclude = ["**/target/**"]

[languages]
rust = ["**/*.rs"]
python = ["**/*.py", "**/*.pyi"]

[output]
format = "jsonl"
color = "never"

[[rules."*"]]
beginRegex = "#region\\b"
foldEndRegex = "#endregion\\b"

[rules.rust]
begin = "{"
end = "}"

[[rules.python]]
offSide = true

[[rules."[python]"]]
beginRegex = "^\\s*#"
consecutive = true
"##;

    #[test]
    fn test_valid_config_parsing() {
        let config = Config::parse(VALID_CONFIG).unwrap();

        assert_eq!(config.exclude.len(), 1);
        assert_eq!(config.languages.len(), 2);
        assert_eq!(config.output.format, OutputFormat::Jsonl);
        assert_eq!(config.output.color, ColorOption::Never);

        let rust = LanguageId::new("rust").unwrap();
        let rules = config.rules_for(&rust);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].rule().unwrap().begin.as_deref(), Some("{"));
    }

    #[test]
    fn test_bracketed_keys_merge_with_plain_keys() {
        let config = Config::parse(VALID_CONFIG).unwrap();
        let python = LanguageId::new("python").unwrap();

        // Keys are visited in sorted order, so "[python]" precedes "python"
        let rules = config.rules_for(&python);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].rule().unwrap().consecutive, Some(true));
        assert_eq!(rules[1].rule().unwrap().off_side, Some(true));
    }

    #[test]
    fn test_rule_languages_excludes_wildcard() {
        let config = Config::parse(VALID_CONFIG).unwrap();
        let languages: Vec<String> = config
            .rule_languages()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(languages, vec!["python", "rust"]);
    }

    #[test]
    fn test_empty_config() {
        let config = Config::parse("").unwrap();
        assert!(config.rules.is_empty());
        assert_eq!(config.output.format, OutputFormat::Human);
        assert_eq!(config.output.color, ColorOption::Auto);
    }

    #[test]
    fn test_json_config() {
        let json = r#"{
            "rules": {
                "*": {"begin": "{", "end": "}"},
                "[markdown]": [{"beginRegex": "^```", "endRegex": "^```"}]
            }
        }"#;
        let config = Config::parse_json(json).unwrap();
        assert_eq!(config.rules_for(&LanguageId::wildcard()).len(), 1);
        assert_eq!(
            config
                .rules_for(&LanguageId::new("markdown").unwrap())
                .len(),
            1
        );
    }

    #[test]
    fn test_invalid_language_key() {
        let invalid = r#"
[rules."two words"]
begin = "{"
end = "}"
"#;
        let result = Config::parse(invalid);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid language key")
        );
    }

    #[test]
    fn test_invalid_glob_pattern() {
        let invalid = r#"
[languages]
rust = ["[invalid"]
"#;
        let result = Config::parse(invalid);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid glob pattern")
        );
    }

    #[test]
    fn test_wrong_field_type_is_kept_per_rule() {
        let config = Config::parse(
            r#"
[[rules.rust]]
begin = "{"
end = "}"

[[rules.rust]]
begin = 5
"#,
        )
        .unwrap();
        let rules = config.rules_for(&LanguageId::new("rust").unwrap());
        assert_eq!(rules.len(), 2);
        assert!(rules[0].rule().is_ok());
        assert!(rules[1].rule().is_err());
    }

    #[test]
    fn test_scalar_rule_list_is_parse_error() {
        let result = Config::parse("[rules]\nrust = 5\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
