//! Criterion benchmarks for themevars critical paths
//!
//! Benchmarks the core performance-critical operations:
//! - Scanner: top-level expression ranges in CSS values
//! - String resolver: var() substitution in mixed values
//! - Color: hex normalization of resolved colors
//! - Batch: whole-record resolution against an in-memory document

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use themevars::batch::resolve_record;
use themevars::color::normalize_css_color;
use themevars::dom::{MemoryDocument, NodeId};
use themevars::expression::{extract_distinct, resolve_in_string, scan};
use themevars::host::StyleHost;

// =============================================================================
// Test Data Generators
// =============================================================================

/// Generate a value with n space-separated tokens, every other one a var()
fn make_value(n: usize) -> String {
    (0..n)
        .map(|i| if i % 2 == 0 { format!("var(--v{}, {}px)", i % 16, i) } else { format!("{}px", i) })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Document with 16 themed color variables on the root
fn make_document() -> (MemoryDocument, NodeId) {
    let mut doc = MemoryDocument::new();
    let root = doc.root();
    for i in 0..16 {
        let value = format!("#{:02x}{:02x}{:02x}", i * 16, i * 8, 255 - i * 16);
        doc.set_property(&root, &format!("--v{}", i), &value);
    }
    (doc, root)
}

/// Generate a record of n entries mixing variables, color functions and literals
fn make_record(n: usize) -> Vec<(String, String)> {
    (0..n)
        .map(|i| {
            let value = match i % 4 {
                0 => format!("var(--v{})", i % 16),
                1 => format!("color-mix(in srgb, var(--v{}) 50%, white)", i % 16),
                2 => format!("1px solid var(--v{})", i % 16),
                _ => format!("{}px", i),
            };
            (format!("key{}", i), value)
        })
        .collect()
}

// =============================================================================
// Scanner Benchmarks
// =============================================================================

fn bench_scanner(c: &mut Criterion) {
    let mut group = c.benchmark_group("scanner");

    for size in [1, 4, 16, 64].iter() {
        let value = make_value(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("scan", size), &value, |b, value| {
            b.iter(|| scan(black_box(value)))
        });
    }

    // Deep nesting: fallbacks inside fallbacks
    let nested = (0..16).fold("red".to_string(), |acc, i| format!("var(--n{}, {})", i, acc));
    group.bench_function("scan_nested_16", |b| b.iter(|| scan(black_box(&nested))));

    // Worst case: unbalanced input scanned to the end
    let unbalanced = format!("{} var(--open", make_value(32));
    group.bench_function("scan_unbalanced", |b| b.iter(|| scan(black_box(&unbalanced))));

    group.finish();
}

// =============================================================================
// String Resolver Benchmarks
// =============================================================================

fn bench_string_resolver(c: &mut Criterion) {
    let mut group = c.benchmark_group("string_resolver");

    for size in [1, 4, 16, 64].iter() {
        let value = make_value(*size);
        group.bench_with_input(BenchmarkId::new("resolve_in_string", size), &value, |b, value| {
            b.iter(|| resolve_in_string(|expr| expr.len().to_string(), black_box(value)))
        });
    }

    let record = make_record(256);
    group.bench_function("extract_distinct_256", |b| {
        b.iter(|| extract_distinct(black_box(&record).iter().map(|(k, v)| (k, v))))
    });

    group.finish();
}

// =============================================================================
// Color Normalization Benchmarks
// =============================================================================

fn bench_color(c: &mut Criterion) {
    let mut group = c.benchmark_group("color");

    // Hex fast path
    group.bench_function("normalize_hex_6", |b| {
        b.iter(|| normalize_css_color(black_box("#112233"), false))
    });

    // Computed background-color strings (uses lightningcss)
    group.bench_function("normalize_rgb", |b| {
        b.iter(|| normalize_css_color(black_box("rgb(17, 34, 51)"), true))
    });

    group.bench_function("normalize_rgba", |b| {
        b.iter(|| normalize_css_color(black_box("rgba(0, 0, 0, 0.5)"), true))
    });

    group.bench_function("normalize_color_mix", |b| {
        b.iter(|| normalize_css_color(black_box("color-mix(in srgb, #112233 50%, white)"), false))
    });

    group.finish();
}

// =============================================================================
// Batch Resolution Benchmarks
// =============================================================================

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");
    group.sample_size(20);

    for size in [8, 64, 256].iter() {
        let record = make_record(*size);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("resolve_record", size), &record, |b, record| {
            let (mut doc, root) = make_document();
            b.iter(|| {
                let entries = black_box(record).iter().map(|(k, v)| (k, v));
                resolve_record(&mut doc, &root, entries, false)
            })
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(benches, bench_scanner, bench_string_resolver, bench_color, bench_batch);

criterion_main!(benches);
