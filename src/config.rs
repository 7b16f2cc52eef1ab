//! Configuration file parsing and validation

pub mod folding_toml;
pub mod raw_rule;

pub use folding_toml::{ColorOption, Config, OutputConfig, OutputFormat};
pub use raw_rule::{NestedValue, RawRule, RuleEntry, RuleList};
