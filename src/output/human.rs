#![forbid(unsafe_code)]

//! Human-readable output formatter
//!
//! Prints one `path:start-end kind` line per range, with 1-based line numbers
//! as an editor shows them, followed by a summary line.

use crate::engine::ExecutionResult;
use crate::types::FoldKind;
use std::io;
use termcolor::{Color, ColorSpec, WriteColor};

/// Human-readable formatter for computed ranges
pub struct HumanFormatter;

impl HumanFormatter {
    pub fn new() -> Self {
        HumanFormatter
    }

    /// Write the ranges of every file, then a summary line
    pub fn write(&self, out: &mut dyn WriteColor, result: &ExecutionResult) -> io::Result<()> {
        for file in &result.files {
            for range in &file.ranges {
                out.set_color(ColorSpec::new().set_bold(true))?;
                write!(out, "{}", file.path.display())?;
                out.reset()?;
                write!(out, ":{}-{} ", range.start_line + 1, range.end_line + 1)?;

                let color = match range.kind {
                    FoldKind::Region => Color::Cyan,
                    FoldKind::Comment => Color::Green,
                };
                out.set_color(ColorSpec::new().set_fg(Some(color)))?;
                write!(out, "{}", range.kind)?;
                out.reset()?;
                writeln!(out)?;
            }
        }

        for (path, reason) in &result.unreadable {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
            write!(out, "skipped")?;
            out.reset()?;
            writeln!(out, " {}: {}", path.display(), reason)?;
        }

        writeln!(
            out,
            "{} {} in {} {}",
            result.range_count(),
            plural(result.range_count(), "range", "ranges"),
            result.files.len(),
            plural(result.files.len(), "file", "files"),
        )
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FileRanges;
    use crate::types::{FoldingRange, LanguageId};
    use std::path::PathBuf;
    use termcolor::Buffer;

    fn render(result: &ExecutionResult) -> String {
        let mut buffer = Buffer::no_color();
        HumanFormatter::new().write(&mut buffer, result).unwrap();
        String::from_utf8(buffer.into_inner()).unwrap()
    }

    #[test]
    fn test_empty_result() {
        assert_eq!(render(&ExecutionResult::default()), "0 ranges in 0 files\n");
    }

    #[test]
    fn test_ranges_are_one_based() {
        let result = ExecutionResult {
            files: vec![FileRanges {
                path: PathBuf::from("src/lib.rs"),
                language: LanguageId::new("rust"),
                ranges: vec![
                    FoldingRange::new(0, 4, FoldKind::Region),
                    FoldingRange::new(1, 2, FoldKind::Comment),
                ],
            }],
            unreadable: Vec::new(),
        };

        assert_eq!(
            render(&result),
            "src/lib.rs:1-5 region\nsrc/lib.rs:2-3 comment\n2 ranges in 1 file\n"
        );
    }

    #[test]
    fn test_unreadable_files_listed() {
        let result = ExecutionResult {
            files: Vec::new(),
            unreadable: vec![(PathBuf::from("gone.rs"), "not found".to_string())],
        };
        assert!(render(&result).starts_with("skipped gone.rs: not found\n"));
    }

    #[test]
    fn test_colored_output_has_escapes() {
        let result = ExecutionResult {
            files: vec![FileRanges {
                path: PathBuf::from("a.rs"),
                language: None,
                ranges: vec![FoldingRange::new(0, 1, FoldKind::Region)],
            }],
            unreadable: Vec::new(),
        };
        let mut buffer = Buffer::ansi();
        HumanFormatter::new().write(&mut buffer, &result).unwrap();
        let output = String::from_utf8(buffer.into_inner()).unwrap();
        assert!(output.contains("\x1b["));
        assert!(output.contains("region"));
    }
}
