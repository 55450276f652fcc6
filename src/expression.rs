//! Top-level expression scanning for CSS property values
//!
//! A CSS value such as `var(--border-width) solid var(--accent, blue)` is a
//! sequence of whitespace-separated tokens. Tokens may contain parentheses,
//! and whitespace inside parentheses does not split a token. This module:
//! - Finds the byte ranges of the top-level tokens (`scan`)
//! - Rebuilds a value, substituting only `var(--...)` tokens (`resolve_in_string`)
//! - Collects the distinct `var(--...)` tokens of a record (`extract_distinct`)
//!
//! # Example
//!
//! ```
//! use themevars::expression::{resolve_in_string, scan, ExpressionRange};
//!
//! let ranges = scan("var(--aaa-aa) #fff var(--bbb-bb)");
//! assert_eq!(
//!     ranges,
//!     vec![ExpressionRange::new(0, 12), ExpressionRange::new(14, 17), ExpressionRange::new(19, 31)]
//! );
//!
//! let resolved = resolve_in_string(|_| "red".to_string(), "1px solid var(--accent)");
//! assert_eq!(resolved, "1px solid red");
//! ```

use std::collections::HashSet;

/// Marker identifying a token that references a custom property
pub const VAR_EXPRESSION_PREFIX: &str = "var(--";

/// Inclusive byte range of one top-level expression within a value string
///
/// `end` is the index of the last byte of the expression, so the expression
/// text is `&value[start..=end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpressionRange {
    pub start: usize,
    pub end: usize,
}

impl ExpressionRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Slice the expression text out of the string the range was scanned from
    pub fn text<'a>(&self, value: &'a str) -> &'a str {
        &value[self.start..=self.end]
    }

    /// Length of the expression in bytes
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Ranges always cover at least one character
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Check whether an expression references a custom property
pub fn is_var_expression(expression: &str) -> bool {
    expression.contains(VAR_EXPRESSION_PREFIX)
}

/// Identify the start and end of every top-level expression in `value`.
///
/// Nested expressions are not reported separately; only the outermost
/// boundary is returned:
///
/// ```
/// use themevars::expression::{scan, ExpressionRange};
///
/// let ranges = scan("var(--ccc-cc, var(--aaa-aa, green)) var(--bbb-bb)");
/// assert_eq!(ranges, vec![ExpressionRange::new(0, 34), ExpressionRange::new(36, 48)]);
/// ```
///
/// Unbalanced parentheses are logged and produce an empty result rather than
/// an error, so callers treat the value as having nothing to resolve.
pub fn scan(value: &str) -> Vec<ExpressionRange> {
    let mut ranges = Vec::new();

    // Whitespace-only and empty values have no tokens; starting at 0 here
    // would report a bogus range made of whitespace
    let Some(mut start) = value.find(|c: char| !c.is_whitespace()) else {
        return ranges;
    };

    let mut paren_level: i32 = 0;
    let offset = start;
    let mut chars = value[offset..].char_indices().map(move |(i, c)| (i + offset, c)).peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '(' => paren_level += 1,
            ')' => paren_level -= 1,
            _ => {}
        }

        let at_boundary = match chars.peek() {
            None => true,
            Some(&(_, next)) => next.is_whitespace() && paren_level == 0,
        };

        if at_boundary {
            ranges.push(ExpressionRange::new(start, i + c.len_utf8() - 1));

            while chars.next_if(|&(_, next)| next.is_whitespace()).is_some() {}

            start = chars.peek().map_or(value.len(), |&(j, _)| j);
        }
    }

    if paren_level != 0 {
        log::warn!("Unbalanced parentheses in css var expression: '{}'", value);
        return Vec::new();
    }

    ranges
}

/// Replace every `var(--...)` expression in `value` with the resolver's output.
///
/// Tokens that are not variable references, and the whitespace between
/// tokens, are copied verbatim. When no ranges can be determined (empty
/// value, or unbalanced parentheses) the original value is returned
/// unchanged.
pub fn resolve_in_string<F>(mut resolver: F, value: &str) -> String
where
    F: FnMut(&str) -> String,
{
    let ranges = scan(value);
    if ranges.is_empty() {
        return value.to_string();
    }

    let mut result = String::with_capacity(value.len());
    let mut i = 0;

    for range in &ranges {
        result.push_str(&value[i..range.start]);

        let expression = range.text(value);
        if is_var_expression(expression) {
            result.push_str(&resolver(expression));
        } else {
            result.push_str(expression);
        }

        i = range.end + 1;
    }

    // Trailing whitespace after the last token
    result.push_str(&value[i..]);

    result
}

/// Collect the unique `var(--...)` expressions used across a record's values.
///
/// Accepts anything iterable as key/value pairs, e.g. `&HashMap<String, String>`
/// or an array of `(&str, &str)` tuples.
///
/// ```
/// use themevars::expression::extract_distinct;
/// use std::collections::HashMap;
///
/// let record = HashMap::from([("a", "var(--x) #fff"), ("b", "var(--x)")]);
/// let expressions = extract_distinct(&record);
/// assert_eq!(expressions.len(), 1);
/// assert!(expressions.contains("var(--x)"));
/// ```
pub fn extract_distinct<I, K, V>(record: I) -> HashSet<String>
where
    I: IntoIterator<Item = (K, V)>,
    V: AsRef<str>,
{
    let mut set = HashSet::new();

    for (_, value) in record {
        let value = value.as_ref();
        for range in scan(value) {
            let expression = range.text(value);
            if is_var_expression(expression) {
                set.insert(expression.to_string());
            }
        }
    }

    set
}
