#![forbid(unsafe_code)]

//! Rule model, compiler and registry

pub mod compiler;
pub mod diagnostics;
pub mod registry;
mod rule;

// Re-export core types
pub use compiler::RuleCompiler;
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticsSink, NullSink, TracingSink};
pub use registry::RuleSetRegistry;
pub use rule::{
    BackreferenceTemplate, EndPattern, GroupRef, Nesting, Pairing, Rule, RuleKind, RuleSet,
};
