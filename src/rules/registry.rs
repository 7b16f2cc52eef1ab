#![forbid(unsafe_code)]

//! Rule set registry
//!
//! The RuleSetRegistry is responsible for:
//! - Compiling one rule set per language key found in the configuration
//! - Compiling a wildcard-only fallback set for every other language
//! - Providing shared access to the compiled sets by language

use crate::config::Config;
use crate::rules::compiler::RuleCompiler;
use crate::rules::diagnostics::DiagnosticsSink;
use crate::rules::rule::RuleSet;
use crate::types::LanguageId;
use std::collections::HashMap;
use std::sync::Arc;

/// Compiled rule sets keyed by language
///
/// Sets are immutable after construction and shared through `Arc`, so one
/// registry can serve scans on many threads.
#[derive(Debug, Clone)]
pub struct RuleSetRegistry {
    sets: HashMap<LanguageId, Arc<RuleSet>>,
    fallback: Arc<RuleSet>,
}

impl RuleSetRegistry {
    /// Compile every language section of `config`
    ///
    /// Wildcard rules are compiled once per language set and once for the
    /// fallback, so their diagnostics may be reported more than once.
    pub fn build(config: &Config, sink: &mut dyn DiagnosticsSink) -> Self {
        let mut sets = HashMap::new();

        for language in config.rule_languages() {
            let set = RuleCompiler::compile_config(config, &language, &mut *sink);
            sets.insert(language, Arc::new(set));
        }

        let fallback = Arc::new(RuleCompiler::compile_config(
            config,
            &LanguageId::wildcard(),
            &mut *sink,
        ));

        Self { sets, fallback }
    }

    /// Rule set for `language`, or the wildcard fallback
    pub fn get(&self, language: Option<&LanguageId>) -> Arc<RuleSet> {
        language
            .and_then(|language| self.sets.get(language))
            .unwrap_or(&self.fallback)
            .clone()
    }

    /// Returns true if `language` has its own rules
    pub fn has_language(&self, language: &LanguageId) -> bool {
        self.sets.contains_key(language)
    }

    /// Languages with their own rule sets, sorted
    pub fn languages(&self) -> Vec<&LanguageId> {
        let mut languages: Vec<&LanguageId> = self.sets.keys().collect();
        languages.sort();
        languages
    }

    /// Number of language-specific rule sets
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Returns true if no rules at all were compiled
    pub fn is_empty(&self) -> bool {
        self.fallback.is_empty() && self.sets.values().all(|set| set.is_empty())
    }
}
