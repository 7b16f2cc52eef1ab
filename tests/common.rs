//! Test utilities for foldrules integration tests

#![allow(dead_code)]

use foldrules::{CollectingSink, LanguageId, RawRule, RuleCompiler, RuleSet};

/// Result type alias for tests
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Extract Ok value or panic with context
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("assertion failed: expected Ok, got Err({:?})", e),
        }
    };
    ($expr:expr, $msg:literal) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Extract Some value or panic with context
#[macro_export]
macro_rules! assert_some {
    ($expr:expr) => {
        match $expr {
            Some(v) => v,
            None => panic!("assertion failed: expected Some, got None"),
        }
    };
    ($expr:expr, $msg:literal) => {
        match $expr {
            Some(v) => v,
            None => panic!("{}: got None", $msg),
        }
    };
}

/// Compile a JSON array of rule objects for a test language
pub fn compile_rules(json: &str) -> (RuleSet, CollectingSink) {
    let raws: Vec<RawRule> = assert_ok!(serde_json::from_str(json), "rule JSON should parse");
    let refs: Vec<&RawRule> = raws.iter().collect();
    let mut sink = CollectingSink::new();
    let language = assert_some!(LanguageId::new("test"));
    let set = RuleCompiler::new(&mut sink).compile(&language, &refs, &[]);
    (set, sink)
}

/// Compile rules that are expected to be valid
pub fn rules(json: &str) -> RuleSet {
    let (set, sink) = compile_rules(json);
    assert!(
        sink.diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        sink.diagnostics
    );
    set
}
