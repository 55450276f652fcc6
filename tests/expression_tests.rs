//! Integration tests for expression scanning and string resolution
//!
//! Covers:
//! - Top-level range scanning, including nested and unbalanced input
//! - Substitution of var() expressions in mixed values
//! - Distinct expression extraction across a record

use std::collections::{HashMap, HashSet};
use themevars::expression::{extract_distinct, resolve_in_string, scan, ExpressionRange};

fn ranges(pairs: &[(usize, usize)]) -> Vec<ExpressionRange> {
    pairs.iter().map(|&(s, e)| ExpressionRange::new(s, e)).collect()
}

// ========== Scanner ==========

#[test]
fn test_scan_documented_examples() {
    assert_eq!(scan("var(--aaa-aa) #fff var(--bbb-bb)"), ranges(&[(0, 12), (14, 17), (19, 31)]));
    assert_eq!(
        scan("var(--ccc-cc, var(--aaa-aa, green)) var(--bbb-bb)"),
        ranges(&[(0, 34), (36, 48)])
    );
}

#[test]
fn test_scan_balanced_values_reconstruct() {
    let values = [
        "1px solid var(--border-color)",
        "var(--a)",
        "  leading",
        "trailing   ",
        "calc(var(--gap) * 2) auto",
        "linear-gradient(to right, var(--from, red), var(--to, rgb(0 0 255)))",
        "a\tb\nc",
    ];

    for value in values {
        let found = scan(value);
        assert!(!found.is_empty(), "no ranges for {value:?}");

        // Ordered and non-overlapping
        for pair in found.windows(2) {
            assert!(pair[0].end < pair[1].start, "overlap in {value:?}");
        }

        // Concatenating the tokens gives back the value minus separators
        let mut rebuilt = String::new();
        let mut cursor = 0;
        for range in &found {
            assert!(value[cursor..range.start].trim().is_empty());
            rebuilt.push_str(range.text(value));
            cursor = range.end + 1;
        }
        assert!(value[cursor..].trim().is_empty());
        assert_eq!(
            rebuilt.split_whitespace().collect::<String>(),
            value.split_whitespace().collect::<String>()
        );
    }
}

#[test]
fn test_scan_unbalanced_values_are_empty() {
    for value in ["var(--a", "var(--a))", "rgb(0, 0, 0", "((a) b", "a (b"] {
        assert!(scan(value).is_empty(), "expected no ranges for {value:?}");
    }
}

#[test]
fn test_scan_close_then_open_balances() {
    // Depth dips below zero but ends balanced
    assert_eq!(scan(")(").len(), 1);
}

// ========== String resolver ==========

#[test]
fn test_resolve_mixed_value() {
    let lookup = HashMap::from([
        ("var(--border-width)", "2px"),
        ("var(--border-color, var(--fallback))", "#333"),
    ]);

    let resolved = resolve_in_string(
        |expr| lookup.get(expr).map(|v| v.to_string()).unwrap_or_default(),
        "var(--border-width) solid var(--border-color, var(--fallback))",
    );
    assert_eq!(resolved, "2px solid #333");
}

#[test]
fn test_resolve_identity_without_var_references() {
    let values = ["", "red", "1px solid #fff", "rgb(1, 2, 3) 50%", " spaced  out ", "var(x)"];
    for value in values {
        let resolved = resolve_in_string(|_| panic!("resolver must not be called"), value);
        assert_eq!(resolved, value);
    }
}

#[test]
fn test_resolve_idempotent_with_plain_outputs() {
    let resolver = |expr: &str| format!("resolved-{}", expr.len());
    let values = ["var(--a) var(--bb) x", "  var(--c, 1px)  ", "none"];

    for value in values {
        let once = resolve_in_string(resolver, value);
        let twice = resolve_in_string(resolver, &once);
        assert_eq!(once, twice);
    }
}

#[test]
fn test_resolve_unbalanced_returns_original() {
    let value = "var(--a) var(--b";
    assert_eq!(resolve_in_string(|_| "X".to_string(), value), value);
}

// ========== Extractor ==========

#[test]
fn test_extract_distinct_scenario() {
    let record = HashMap::from([("a", "var(--x) #fff"), ("b", "var(--x)")]);
    assert_eq!(extract_distinct(&record), HashSet::from(["var(--x)".to_string()]));
}

#[test]
fn test_extract_distinct_ignores_literals_and_malformed() {
    let record = [
        ("border", "1px solid var(--border)"),
        ("shadow", "0 0 4px var(--shadow, rgba(0, 0, 0, 0.5))"),
        ("font", "Arial"),
        ("broken", "var(--open"),
        ("dup", "var(--border) var(--border)"),
    ];

    let set = extract_distinct(record);
    let mut sorted: Vec<_> = set.into_iter().collect();
    sorted.sort();
    assert_eq!(sorted, vec!["var(--border)", "var(--shadow, rgba(0, 0, 0, 0.5))"]);
}
