//! Resolving single custom properties against a style snapshot
//!
//! [`make_resolver`] snapshots an element's computed style once; every lookup
//! made through the returned [`SnapshotResolver`] reads that same snapshot.
//! Callers that need fresh values after the document changes build a new
//! resolver.
//!
//! # Example
//!
//! ```
//! use themevars::dom::MemoryDocument;
//! use themevars::host::StyleHost;
//! use themevars::resolver::make_resolver;
//! use std::collections::HashMap;
//!
//! let mut doc = MemoryDocument::new();
//! let root = doc.root();
//! doc.set_property(&root, "--bg", "#222");
//!
//! let defaults = HashMap::from([("--fg".to_string(), "#fff".to_string())]);
//! let resolver = make_resolver(&mut doc, &root, &defaults).unwrap();
//!
//! assert_eq!(resolver.resolve("--bg"), "#222");
//! assert_eq!(resolver.resolve("--fg"), "#fff");
//! assert_eq!(resolver.resolve("--unknown"), "");
//! ```

use crate::host::{StyleError, StyleHost, StyleSnapshot};
use std::collections::HashMap;

/// Looks up custom property values in one captured style snapshot
#[derive(Debug, Clone)]
pub struct SnapshotResolver<'d, S> {
    snapshot: S,
    defaults: &'d HashMap<String, String>,
}

impl<'d, S: StyleSnapshot> SnapshotResolver<'d, S> {
    pub fn new(snapshot: S, defaults: &'d HashMap<String, String>) -> Self {
        Self { snapshot, defaults }
    }

    /// Resolve a variable name such as `--accent`.
    ///
    /// Falls back to the default for the name when the computed value is
    /// empty, and to `""` when there is no default.
    pub fn resolve(&self, var_name: &str) -> String {
        let value = self.snapshot.property_value(var_name);
        if !value.is_empty() {
            return value;
        }

        self.defaults.get(var_name).cloned().unwrap_or_default()
    }
}

/// Capture `element`'s computed style and return a resolver over it
pub fn make_resolver<'d, H: StyleHost>(
    host: &mut H,
    element: &H::Element,
    defaults: &'d HashMap<String, String>,
) -> Result<SnapshotResolver<'d, H::Snapshot>, StyleError> {
    let snapshot = host.computed_style(element)?;
    Ok(SnapshotResolver::new(snapshot, defaults))
}

/// Build `:root{...}` style content for a set of preload variables.
///
/// Every key of `defaults` is resolved against `element`; variables that
/// are not set use their default. Keys are emitted in sorted order.
///
/// ```
/// use themevars::dom::MemoryDocument;
/// use themevars::host::StyleHost;
/// use themevars::resolver::preload_style_content;
/// use std::collections::HashMap;
///
/// let mut doc = MemoryDocument::new();
/// let root = doc.root();
/// doc.set_property(&root, "--bg", "#000");
///
/// let defaults = HashMap::from([
///     ("--bg".to_string(), "#111".to_string()),
///     ("--spinner".to_string(), "#0af".to_string()),
/// ]);
/// let content = preload_style_content(&mut doc, &root, &defaults).unwrap();
/// assert_eq!(content, ":root{--bg:#000;--spinner:#0af}");
/// ```
pub fn preload_style_content<H: StyleHost>(
    host: &mut H,
    element: &H::Element,
    defaults: &HashMap<String, String>,
) -> Result<String, StyleError> {
    let resolver = make_resolver(host, element, defaults)?;

    let mut keys: Vec<&String> = defaults.keys().collect();
    keys.sort();

    let pairs: Vec<String> = keys.into_iter().map(|key| format!("{}:{}", key, resolver.resolve(key))).collect();

    Ok(format!(":root{{{}}}", pairs.join(";")))
}
