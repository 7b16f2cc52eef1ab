//! Observational diagnostics reported while compiling rules
//!
//! A sink is always passed explicitly; nothing here is global. Sinks never
//! influence which ranges are produced.

use crate::error::RuleError;

/// Receiver for compile-time diagnostics
pub trait DiagnosticsSink {
    /// A deprecated configuration field was used
    fn on_deprecated_field(&mut self, name: &str) {
        let _ = name;
    }

    /// A rule was dropped from the rule set
    fn on_invalid_rule(&mut self, rule: &str, reason: &RuleError) {
        let _ = (rule, reason);
    }
}

/// Discards every diagnostic
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticsSink for NullSink {}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn on_deprecated_field(&mut self, name: &str) {
        tracing::warn!(field = name, "deprecated folding rule field, use `nested` instead");
    }

    fn on_invalid_rule(&mut self, rule: &str, reason: &RuleError) {
        tracing::warn!(rule, %reason, "dropping folding rule");
    }
}

/// A recorded diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    DeprecatedField { name: String },
    InvalidRule { rule: String, reason: String },
}

/// Records diagnostics in arrival order
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of dropped rules seen so far
    pub fn invalid_rule_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::InvalidRule { .. }))
            .count()
    }

    pub fn deprecated_fields(&self) -> Vec<&str> {
        self.diagnostics
            .iter()
            .filter_map(|d| match d {
                Diagnostic::DeprecatedField { name } => Some(name.as_str()),
                Diagnostic::InvalidRule { .. } => None,
            })
            .collect()
    }
}

impl DiagnosticsSink for CollectingSink {
    fn on_deprecated_field(&mut self, name: &str) {
        self.diagnostics.push(Diagnostic::DeprecatedField {
            name: name.to_string(),
        });
    }

    fn on_invalid_rule(&mut self, rule: &str, reason: &RuleError) {
        self.diagnostics.push(Diagnostic::InvalidRule {
            rule: rule.to_string(),
            reason: reason.to_string(),
        });
    }
}
