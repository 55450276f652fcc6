//! Batched resolution of records of CSS values
//!
//! Resolving values one at a time against a live document forces a reflow
//! per value. [`RecordResolver`] instead runs three passes over a single
//! scratch container:
//! 1. **Stage**: create a detached container, set one scratch custom property
//!    per entry and create one child per entry whose `background-color` is the
//!    raw value, then attach the container once
//! 2. **Evaluate**: take one computed style snapshot of the container, read
//!    each scratch property back and normalize colors to hex
//! 3. **Teardown**: detach the container and release its elements
//!
//! Teardown is tied to the lifetime of [`ScratchContainer`], so the container
//! is removed on every exit path, including a failed style computation.
//!
//! # Example
//!
//! ```
//! use themevars::batch::resolve_record;
//! use themevars::dom::MemoryDocument;
//! use themevars::host::StyleHost;
//!
//! let mut doc = MemoryDocument::new();
//! let root = doc.root();
//! doc.set_property(&root, "--x", "#112233");
//!
//! let resolved = resolve_record(&mut doc, &root, [("a", "var(--x)"), ("b", "1px")], false).unwrap();
//! assert_eq!(resolved, vec![("a", "#112233ff".to_string()), ("b", "1px".to_string())]);
//! ```

use crate::color::{is_hex_color, parse_color, HexColor};
use crate::expression::is_var_expression;
use crate::host::{StyleError, StyleHost, StyleSnapshot};
use std::fmt;
use std::time::Instant;

/// Default prefix of the scratch custom properties (`--tv-tmp-0`, `--tv-tmp-1`, ...)
pub const DEFAULT_SCRATCH_PREFIX: &str = "tv-tmp";

/// Outcome of resolving one record value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedValue {
    /// No variable reference and no usable color; the raw value untouched
    Literal(String),
    /// Contained a variable reference that resolved to a non-color
    Variable(String),
    /// Resolved to a color, normalized to hex
    Color(HexColor),
}

impl ResolvedValue {
    pub fn is_color(&self) -> bool {
        matches!(self, ResolvedValue::Color(_))
    }

    pub fn into_string(self) -> String {
        match self {
            ResolvedValue::Literal(s) | ResolvedValue::Variable(s) => s,
            ResolvedValue::Color(hex) => hex.to_string(),
        }
    }
}

impl fmt::Display for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedValue::Literal(s) | ResolvedValue::Variable(s) => f.write_str(s),
            ResolvedValue::Color(hex) => hex.fmt(f),
        }
    }
}

/// A detached-then-attached container that holds the scratch declarations.
///
/// Dropping it detaches the container from the document and releases it
/// along with its children.
pub struct ScratchContainer<'h, H: StyleHost> {
    host: &'h mut H,
    container: H::Element,
    children: Vec<H::Element>,
}

impl<H: StyleHost> Drop for ScratchContainer<'_, H> {
    fn drop(&mut self) {
        self.host.remove(&self.container);
        self.host.discard(&self.container);
    }
}

/// Resolves whole records of CSS values against a target element
#[derive(Debug, Clone)]
pub struct RecordResolver {
    scratch_prefix: String,
    alpha_optional: bool,
}

impl Default for RecordResolver {
    fn default() -> Self {
        Self { scratch_prefix: DEFAULT_SCRATCH_PREFIX.to_string(), alpha_optional: false }
    }
}

impl RecordResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix for the scratch custom property names
    pub fn with_scratch_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.scratch_prefix = prefix.into();
        self
    }

    /// Drop the alpha channel of opaque colors (`#rrggbb` instead of `#rrggbbff`)
    pub fn with_alpha_optional(mut self, alpha_optional: bool) -> Self {
        self.alpha_optional = alpha_optional;
        self
    }

    pub fn alpha_optional(&self) -> bool {
        self.alpha_optional
    }

    fn scratch_property(&self, index: usize) -> String {
        format!("--{}-{}", self.scratch_prefix, index)
    }

    /// Resolve every value of a record, preserving key order.
    ///
    /// Each value is replaced by its resolved form when it contains a
    /// `var(--...)` reference or resolves to a color; otherwise the raw value
    /// is kept.
    ///
    /// # Errors
    ///
    /// Returns the host's `StyleError` if a style snapshot cannot be taken.
    /// The scratch container is detached before the error is returned.
    pub fn resolve_values<H, I, K, V>(
        &self,
        host: &mut H,
        target: &H::Element,
        record: I,
    ) -> Result<Vec<(K, ResolvedValue)>, StyleError>
    where
        H: StyleHost,
        I: IntoIterator<Item = (K, V)>,
        V: AsRef<str>,
    {
        let perf_start = Instant::now();
        let entries: Vec<(K, V)> = record.into_iter().collect();

        let result = {
            let mut scratch = self.stage(host, target, &entries);
            self.evaluate(&mut scratch, entries)
        };

        log::debug!("Resolved css variables in {:?}", perf_start.elapsed());
        result
    }

    /// Resolve a record to plain strings
    pub fn resolve<H, I, K, V>(
        &self,
        host: &mut H,
        target: &H::Element,
        record: I,
    ) -> Result<Vec<(K, String)>, StyleError>
    where
        H: StyleHost,
        I: IntoIterator<Item = (K, V)>,
        V: AsRef<str>,
    {
        let values = self.resolve_values(host, target, record)?;
        Ok(values.into_iter().map(|(key, value)| (key, value.into_string())).collect())
    }

    /// Pass 1: build the scratch container off-document, then attach it once
    fn stage<'h, H, K, V>(
        &self,
        host: &'h mut H,
        target: &H::Element,
        entries: &[(K, V)],
    ) -> ScratchContainer<'h, H>
    where
        H: StyleHost,
        V: AsRef<str>,
    {
        let container = host.create_element();
        let mut scratch =
            ScratchContainer { host, container, children: Vec::with_capacity(entries.len()) };
        scratch.host.set_property(&scratch.container, "display", "none");

        for (i, (_, value)) in entries.iter().enumerate() {
            let value = value.as_ref();
            scratch.host.set_property(&scratch.container, &self.scratch_property(i), value);

            // Cheaper to create these now while the container is detached.
            // background-color rather than color avoids inherited values.
            let child = scratch.host.create_element();
            scratch.host.set_property(&child, "background-color", value);
            scratch.host.append_child(&scratch.container, &child);
            scratch.children.push(child);
        }

        // Attach once so only a single reflow is forced
        scratch.host.append_child(target, &scratch.container);
        scratch
    }

    /// Pass 2: one snapshot of the container, then per-entry normalization
    fn evaluate<H, K, V>(
        &self,
        scratch: &mut ScratchContainer<'_, H>,
        entries: Vec<(K, V)>,
    ) -> Result<Vec<(K, ResolvedValue)>, StyleError>
    where
        H: StyleHost,
        V: AsRef<str>,
    {
        let snapshot = scratch.host.computed_style(&scratch.container)?;
        let mut result = Vec::with_capacity(entries.len());

        for (i, (key, value)) in entries.into_iter().enumerate() {
            let raw = value.as_ref();
            let resolved = snapshot.property_value(&self.scratch_property(i));
            let resolved = resolved.trim();

            let contains_var = is_var_expression(raw);
            let is_color = scratch.host.supports_color(resolved);

            let value = if is_color {
                match self.normalize_color(scratch, i, resolved)? {
                    Some(hex) => ResolvedValue::Color(hex),
                    None if contains_var => ResolvedValue::Variable(resolved.to_string()),
                    None => ResolvedValue::Literal(raw.to_string()),
                }
            } else if contains_var {
                ResolvedValue::Variable(resolved.to_string())
            } else {
                ResolvedValue::Literal(raw.to_string())
            };

            result.push((key, value));
        }

        Ok(result)
    }

    /// Convert a resolved color to hex.
    ///
    /// Non-hex colors are read back from the entry's child element, since the
    /// resolved text may still hold unevaluated functions like `color-mix()`
    /// while the computed `background-color` is fully evaluated.
    fn normalize_color<H: StyleHost>(
        &self,
        scratch: &mut ScratchContainer<'_, H>,
        index: usize,
        resolved: &str,
    ) -> Result<Option<HexColor>, StyleError> {
        let color = if is_hex_color(resolved) {
            resolved.to_string()
        } else {
            let child = &scratch.children[index];
            scratch.host.computed_style(child)?.property_value("background-color")
        };

        match parse_color(&color) {
            Ok(rgba) => Ok(Some(HexColor::new(rgba, self.alpha_optional))),
            Err(e) => {
                log::warn!("Could not normalize color '{}' (computed '{}'): {}", resolved, color, e);
                Ok(None)
            }
        }
    }
}

/// Resolve a record with the default scratch prefix.
///
/// Output keys and their order match the input.
pub fn resolve_record<H, I, K, V>(
    host: &mut H,
    target: &H::Element,
    record: I,
    alpha_optional: bool,
) -> Result<Vec<(K, String)>, StyleError>
where
    H: StyleHost,
    I: IntoIterator<Item = (K, V)>,
    V: AsRef<str>,
{
    RecordResolver::new().with_alpha_optional(alpha_optional).resolve(host, target, record)
}
