#![forbid(unsafe_code)]

//! JSONL output formatter for machine-readable output
//!
//! Outputs one JSON object per line in a deterministic order:
//! 1. All range records (sorted by file, then outer-first within a file)
//! 2. One record per unreadable file
//! 3. One summary record
//!
//! Line numbers are 0-based.

use crate::engine::ExecutionResult;
use crate::types::FoldKind;
use serde::Serialize;
use std::path::PathBuf;

/// JSONL output formatter
pub struct JsonlFormatter;

impl JsonlFormatter {
    pub fn new() -> Self {
        JsonlFormatter
    }

    /// Format the execution result as JSONL
    pub fn format(&self, result: &ExecutionResult) -> String {
        let mut output = String::new();

        for file in &result.files {
            for range in &file.ranges {
                push_record(
                    &mut output,
                    &RangeRecord {
                        record_type: "range",
                        file: file.path.clone(),
                        language: file.language.as_ref().map(|l| l.as_str().to_string()),
                        start_line: range.start_line,
                        end_line: range.end_line,
                        kind: range.kind,
                    },
                );
            }
        }

        for (path, reason) in &result.unreadable {
            push_record(
                &mut output,
                &SkippedRecord {
                    record_type: "skipped",
                    file: path.clone(),
                    reason: reason.clone(),
                },
            );
        }

        push_record(
            &mut output,
            &SummaryRecord {
                record_type: "summary",
                files: result.files.len(),
                ranges: result.range_count(),
                skipped: result.unreadable.len(),
            },
        );

        output
    }
}

impl Default for JsonlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn push_record(output: &mut String, record: &impl Serialize) {
    if let Ok(json) = serde_json::to_string(record) {
        output.push_str(&json);
        output.push('\n');
    }
}

/// Range record for JSONL output
#[derive(Debug, Serialize)]
struct RangeRecord {
    #[serde(rename = "type")]
    record_type: &'static str,
    file: PathBuf,
    language: Option<String>,
    start_line: usize,
    end_line: usize,
    kind: FoldKind,
}

#[derive(Debug, Serialize)]
struct SkippedRecord {
    #[serde(rename = "type")]
    record_type: &'static str,
    file: PathBuf,
    reason: String,
}

/// Summary record for JSONL output
#[derive(Debug, Serialize)]
struct SummaryRecord {
    #[serde(rename = "type")]
    record_type: &'static str,
    files: usize,
    ranges: usize,
    skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FileRanges;
    use crate::types::{FoldingRange, LanguageId};

    fn sample() -> ExecutionResult {
        ExecutionResult {
            files: vec![
                FileRanges {
                    path: PathBuf::from("a.py"),
                    language: LanguageId::new("python"),
                    ranges: vec![FoldingRange::new(0, 3, FoldKind::Region)],
                },
                FileRanges {
                    path: PathBuf::from("b.txt"),
                    language: None,
                    ranges: vec![FoldingRange::new(2, 5, FoldKind::Comment)],
                },
            ],
            unreadable: Vec::new(),
        }
    }

    #[test]
    fn test_jsonl_empty() {
        let output = JsonlFormatter::new().format(&ExecutionResult::default());
        assert_eq!(
            output,
            "{\"type\":\"summary\",\"files\":0,\"ranges\":0,\"skipped\":0}\n"
        );
    }

    #[test]
    fn test_jsonl_records_in_order() {
        let output = JsonlFormatter::new().format(&sample());
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["type"], "range");
        assert_eq!(lines[0]["file"], "a.py");
        assert_eq!(lines[0]["language"], "python");
        assert_eq!(lines[0]["start_line"], 0);
        assert_eq!(lines[0]["end_line"], 3);
        assert_eq!(lines[0]["kind"], "region");
        assert_eq!(lines[1]["language"], serde_json::Value::Null);
        assert_eq!(lines[1]["kind"], "comment");
        assert_eq!(lines[2]["type"], "summary");
        assert_eq!(lines[2]["ranges"], 2);
    }

    #[test]
    fn test_jsonl_skipped_record() {
        let mut result = sample();
        result
            .unreadable
            .push((PathBuf::from("gone.rs"), "No such file".to_string()));
        let output = JsonlFormatter::new().format(&result);
        let skipped: serde_json::Value = serde_json::from_str(output.lines().nth(2).unwrap()).unwrap();
        assert_eq!(skipped["type"], "skipped");
        assert_eq!(skipped["file"], "gone.rs");
    }
}
