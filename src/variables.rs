//! Custom property substitution for computed styles
//!
//! Computes the custom properties (`--name`) of one element from the values
//! declared on it and the computed values inherited from its parent:
//! - `var(--name)` and `var(--name, fallback)` substitution
//! - Nested references in declared values and in fallbacks
//! - Circular dependency detection
//!
//! A declaration whose references cannot be satisfied is invalid at
//! computed-value time; [`CustomPropertyScope::compute`] leaves it out of the
//! result, which hosts report as `""`.
//!
//! # Example
//!
//! ```
//! use themevars::variables::CustomPropertyScope;
//! use std::collections::HashMap;
//!
//! let inherited = HashMap::from([("--primary".to_string(), "#FF0000".to_string())]);
//! let declared = HashMap::from([("--accent".to_string(), "var(--primary)".to_string())]);
//!
//! let scope = CustomPropertyScope::new(&declared, &inherited);
//! assert_eq!(scope.substitute("var(--accent)").unwrap(), "#FF0000");
//! assert_eq!(scope.substitute("var(--missing, blue)").unwrap(), "blue");
//! ```

use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Error type for variable substitution failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariableError {
    /// Variable is not defined and no fallback was provided
    #[error("undefined variable '{0}' with no fallback")]
    Undefined(String),
    /// Circular dependency detected between declared variables
    #[error("circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<String>),
    /// Invalid `var()` syntax
    #[error("invalid variable syntax: {0}")]
    InvalidSyntax(String),
    /// Maximum substitution depth exceeded
    #[error("maximum variable resolution depth exceeded")]
    MaxDepthExceeded,
}

/// Maximum depth for variable substitution to prevent stack overflow
const MAX_RESOLUTION_DEPTH: usize = 100;

/// A `var()` occurrence located in a value
struct VarReference {
    /// Byte offset of `var(`
    start: usize,
    /// Byte offset just past the closing paren
    end: usize,
    name: String,
    fallback: Option<String>,
}

/// Custom properties visible to one element
///
/// `declared` holds the raw values set on the element itself (they may
/// contain `var()` references); `inherited` holds the parent's already
/// computed custom properties.
#[derive(Debug, Clone, Copy)]
pub struct CustomPropertyScope<'a> {
    declared: &'a HashMap<String, String>,
    inherited: &'a HashMap<String, String>,
}

impl<'a> CustomPropertyScope<'a> {
    pub fn new(declared: &'a HashMap<String, String>, inherited: &'a HashMap<String, String>) -> Self {
        Self { declared, inherited }
    }

    /// Compute every custom property of the element.
    ///
    /// Inherited values are overridden by declared ones. Declarations that
    /// fail substitution are dropped.
    pub fn compute(&self) -> HashMap<String, String> {
        let mut computed = self.inherited.clone();

        for name in self.declared.keys() {
            match self.resolve_name(name, &mut HashSet::new(), 0) {
                Ok(value) => {
                    computed.insert(name.clone(), value);
                }
                Err(e) => {
                    log::debug!("Custom property '{}' is invalid at computed-value time: {}", name, e);
                    computed.remove(name);
                }
            }
        }

        computed
    }

    /// Substitute all `var()` references in a value
    pub fn substitute(&self, value: &str) -> Result<String, VariableError> {
        let mut visited = HashSet::new();
        self.substitute_internal(value, &mut visited, 0)
    }

    /// Computed value of a single custom property
    fn resolve_name(
        &self,
        name: &str,
        visited: &mut HashSet<String>,
        depth: usize,
    ) -> Result<String, VariableError> {
        if depth > MAX_RESOLUTION_DEPTH {
            return Err(VariableError::MaxDepthExceeded);
        }

        match self.declared.get(name) {
            Some(raw) => {
                if visited.contains(name) {
                    let mut chain: Vec<String> = visited.iter().cloned().collect();
                    chain.sort();
                    chain.push(name.to_string());
                    return Err(VariableError::Circular(chain));
                }

                visited.insert(name.to_string());
                let resolved = self.substitute_internal(raw, visited, depth + 1);
                visited.remove(name);
                resolved.map(|v| v.trim().to_string())
            }
            None => {
                self.inherited.get(name).cloned().ok_or_else(|| VariableError::Undefined(name.to_string()))
            }
        }
    }

    fn substitute_internal(
        &self,
        value: &str,
        visited: &mut HashSet<String>,
        depth: usize,
    ) -> Result<String, VariableError> {
        if depth > MAX_RESOLUTION_DEPTH {
            return Err(VariableError::MaxDepthExceeded);
        }

        if !value.contains("var(") {
            return Ok(value.to_string());
        }

        let mut result = value.to_string();
        let mut cursor = 0;

        while let Some(reference) = find_var_reference(&result, cursor)? {
            let replacement = match self.resolve_name(&reference.name, visited, depth + 1) {
                Ok(resolved) => resolved,
                // Cycles invalidate the reference even when a fallback exists
                Err(VariableError::Circular(chain)) => return Err(VariableError::Circular(chain)),
                Err(e) => match &reference.fallback {
                    Some(fallback) => self.substitute_internal(fallback, visited, depth + 1)?,
                    None => return Err(e),
                },
            };

            result = format!("{}{}{}", &result[..reference.start], replacement, &result[reference.end..]);
            cursor = reference.start + replacement.len();
        }

        Ok(result)
    }
}

/// Find the first `var()` reference at or after `from`
fn find_var_reference(s: &str, from: usize) -> Result<Option<VarReference>, VariableError> {
    let Some(offset) = s[from..].find("var(") else {
        return Ok(None);
    };
    let start = from + offset;

    // Find matching closing paren, handling nested parens
    let rest = &s[start + 4..];
    let mut paren_depth = 1;
    let mut end_offset = None;
    let mut comma_pos: Option<usize> = None;

    for (i, c) in rest.char_indices() {
        match c {
            '(' => paren_depth += 1,
            ')' => {
                paren_depth -= 1;
                if paren_depth == 0 {
                    end_offset = Some(i);
                    break;
                }
            }
            ',' if paren_depth == 1 && comma_pos.is_none() => {
                comma_pos = Some(i);
            }
            _ => {}
        }
    }

    let Some(end_offset) = end_offset else {
        return Err(VariableError::InvalidSyntax(format!("unclosed var() in '{}'", s)));
    };

    let content = &rest[..end_offset];
    let (name, fallback) = match comma_pos {
        Some(comma) => (content[..comma].trim(), Some(content[comma + 1..].trim().to_string())),
        None => (content.trim(), None),
    };

    if !name.starts_with("--") {
        return Err(VariableError::InvalidSyntax(format!("'{}' is not a custom property name", name)));
    }

    Ok(Some(VarReference { start, end: start + 4 + end_offset + 1, name: name.to_string(), fallback }))
}
