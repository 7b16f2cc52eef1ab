//! Performance benchmarks for foldrules
//!
//! These benchmarks measure the performance of key operations:
//! - Rule compilation from configuration
//! - Single-document scanning with delimiter, line and indentation rules
//! - Repeated lookups through the range cache
//! - Parallel scanning of a directory tree
//!
//! ## Running Benchmarks
//!
//! To run all benchmarks:
//! ```bash
//! cargo bench
//! ```
//!
//! To run specific benchmarks:
//! ```bash
//! cargo bench scan
//! cargo bench full_workflow
//! ```
//!
//! ## Expected Performance Characteristics
//!
//! ### Scanning
//! - One pass over the lines; each line is searched once per active rule
//! - Time scales linearly with document size
//! - Open regions sharing an end pattern are searched once per position
//!
//! ### Parallel Execution
//! - Uses rayon for parallelism
//! - File I/O and scanning happen in parallel
//! - Should scale well up to number of CPU cores

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use foldrules::engine::ExecutionEngine;
use foldrules::engine::file_walker::{FileEntry, FileWalker, LanguageDetector};
use foldrules::{Config, FoldingEngine, LanguageId, NullSink, RangeCache, RuleCompiler, RuleSetRegistry};
use std::fs;
use tempfile::TempDir;

const CONFIG: &str = r#"
[languages]
rust = ["*.rs"]
python = ["*.py"]

[[rules."*"]]
beginRegex = '//\s*#region\b'
foldEndRegex = '//\s*#endregion\b'

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

[rules.python]
offSide = true
"#;

// ============================================================================
// Helper Functions
// ============================================================================

fn config() -> Config {
    Config::parse(CONFIG).unwrap()
}

fn language(name: &str) -> LanguageId {
    LanguageId::new(name).unwrap()
}

/// Rust-like source with roughly `size` bytes
fn rust_source(size: usize) -> String {
    let block = "// helper\n// docs\nfn f() {\n    if x {\n        y();\n    }\n    /* a\n     * b */\n}\n";
    block.repeat(size / block.len() + 1)
}

/// Python-like source with roughly `size` bytes
fn python_source(size: usize) -> String {
    let block = "class A:\n    def f(self):\n        if x:\n            return 1\n\n        return 2\n";
    block.repeat(size / block.len() + 1)
}

/// Create a temporary directory with Rust files
fn create_test_files(count: usize, size: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let content = rust_source(size);
    for i in 0..count {
        fs::write(temp_dir.path().join(format!("file{}.rs", i)), &content).unwrap();
    }
    temp_dir
}

// ============================================================================
// Compilation Benchmarks
// ============================================================================

fn bench_compile(c: &mut Criterion) {
    let config = config();
    let rust = language("rust");

    c.bench_function("compile_rust_rules", |b| {
        b.iter(|| black_box(RuleCompiler::compile_config(&config, &rust, &mut NullSink)));
    });

    c.bench_function("build_registry", |b| {
        b.iter(|| black_box(RuleSetRegistry::build(&config, &mut NullSink)));
    });
}

// ============================================================================
// Scanning Benchmarks
// ============================================================================

/// Benchmark single-document scanning
///
/// Tests with different document sizes to show scaling characteristics.
fn bench_scan(c: &mut Criterion) {
    let config = config();
    let rust = RuleCompiler::compile_config(&config, &language("rust"), &mut NullSink);
    let python = RuleCompiler::compile_config(&config, &language("python"), &mut NullSink);

    let mut group = c.benchmark_group("scan");
    for size in [1_000, 10_000, 100_000].iter() {
        group.throughput(Throughput::Bytes(*size as u64));

        let source = rust_source(*size);
        group.bench_with_input(BenchmarkId::new("delimiters", size), &source, |b, source| {
            let engine = FoldingEngine::new(&rust);
            b.iter(|| black_box(engine.compute(source)));
        });

        let source = python_source(*size);
        group.bench_with_input(BenchmarkId::new("indentation", size), &source, |b, source| {
            let engine = FoldingEngine::new(&python);
            b.iter(|| black_box(engine.compute(source)));
        });
    }
    group.finish();
}

/// Benchmark cache hits against recomputation
fn bench_cache(c: &mut Criterion) {
    let config = config();
    let rust = RuleCompiler::compile_config(&config, &language("rust"), &mut NullSink);
    let engine = FoldingEngine::new(&rust);
    let source = rust_source(10_000);

    let mut group = c.benchmark_group("range_cache");

    group.bench_function("hit", |b| {
        let cache = RangeCache::new();
        cache.get_or_compute("doc", 1, || engine.compute(&source));
        b.iter(|| black_box(cache.get_or_compute("doc", 1, || engine.compute(&source))));
    });

    group.bench_function("new_revision", |b| {
        let cache = RangeCache::new();
        let mut revision = 0u64;
        b.iter(|| {
            revision += 1;
            black_box(cache.get_or_compute("doc", revision, || engine.compute(&source)))
        });
    });

    group.finish();
}

// ============================================================================
// End-to-End Workflow Benchmarks
// ============================================================================

/// Benchmark the complete ranges workflow
///
/// This measures file walking, language detection, parallel scanning and
/// result aggregation.
fn bench_full_workflow(c: &mut Criterion) {
    let config = config();
    let mut group = c.benchmark_group("full_workflow");
    group.sample_size(10);

    for file_count in [10, 100].iter() {
        let temp_dir = create_test_files(*file_count, 5_000);
        group.throughput(Throughput::Elements(*file_count as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(file_count),
            file_count,
            |b, _| {
                b.iter(|| {
                    let detector = LanguageDetector::new(&config.languages).unwrap();
                    let walker = FileWalker::new(temp_dir.path(), detector, &[]).unwrap();
                    let files: Vec<FileEntry> = walker.walk().filter_map(Result::ok).collect();

                    let registry = RuleSetRegistry::build(&config, &mut NullSink);
                    black_box(ExecutionEngine::new(registry).execute(files))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_compile,
    bench_scan,
    bench_cache,
    bench_full_workflow
);
criterion_main!(benches);
