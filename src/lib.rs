//! Themevars - CSS custom property expression resolution for themeable UIs
//!
//! This library provides functionality to:
//! - Scan CSS values into top-level expressions and substitute `var()` references
//! - Resolve custom properties against a captured computed style snapshot
//! - Batch-resolve records of values with a single reflow, normalizing colors to hex
//!
//! Style computation is supplied by a [`host::StyleHost`];
//! [`dom::MemoryDocument`] is the bundled in-memory implementation.

pub mod batch;
pub mod cli;
pub mod color;
pub mod config;
pub mod dom;
pub mod expression;
pub mod host;
pub mod resolver;
pub mod theme;
pub mod variables;

pub use batch::{resolve_record, RecordResolver, ResolvedValue};
pub use expression::{extract_distinct, resolve_in_string, scan, ExpressionRange};
pub use host::{StyleError, StyleHost, StyleSnapshot};
pub use resolver::{make_resolver, SnapshotResolver};
