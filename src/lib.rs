#![forbid(unsafe_code)]

//! foldrules: code folding ranges from declarative rules
//!
//! A rule set compiled from configuration drives a single generic matching
//! engine, so folding for a language needs configuration rather than a
//! parser.
//!
//! ```
//! use foldrules::{Config, FoldKind, FoldingEngine, FoldingRange, LanguageId, NullSink, RuleCompiler};
//!
//! let config = Config::parse("[rules.\"*\"]\nbegin = \"{\"\nend = \"}\"\n").unwrap();
//! let rules = RuleCompiler::compile_config(&config, &LanguageId::wildcard(), &mut NullSink);
//! let ranges = FoldingEngine::new(&rules).compute("a {\nb\n}\n");
//! assert_eq!(ranges, vec![FoldingRange::new(0, 2, FoldKind::Region)]);
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod rules;
pub mod types;

// Re-export error types for convenient access
pub use error::{ConfigError, FoldError, PatternError, RuleError};

// Re-export the main entry points
pub use config::{Config, RawRule};
pub use engine::{FoldingEngine, RangeCache, compute_ranges};
pub use rules::{
    CollectingSink, DiagnosticsSink, NullSink, RuleCompiler, RuleSet, RuleSetRegistry, TracingSink,
};
pub use types::{FoldKind, FoldingRange, LanguageId, RuleId};
