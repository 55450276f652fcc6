//! Style computation boundary
//!
//! The resolvers never reach for an ambient document. Everything they need
//! from a rendering environment goes through [`StyleHost`]: creating and
//! attaching elements, writing inline declarations, taking computed style
//! snapshots, and asking whether a value is a valid color.
//!
//! [`crate::dom::MemoryDocument`] is the in-process implementation used by
//! the CLI and the tests.

use thiserror::Error;

/// Errors raised by a style host
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    /// Style was requested for an element that is not part of the document
    #[error("element {0} is not connected to the document")]
    Detached(String),
    /// Host-specific failure while computing style
    #[error("style computation failed: {0}")]
    Host(String),
}

/// A computed style snapshot of one element.
///
/// Snapshots are taken once and do not observe later changes to the
/// document.
pub trait StyleSnapshot {
    /// Computed value of a property, or `""` if it is unset or invalid
    fn property_value(&self, name: &str) -> String;
}

/// A rendering environment that can compute styles
pub trait StyleHost {
    /// Handle to an element owned by the host
    type Element: Clone + std::fmt::Debug;
    /// Computed style snapshot returned by [`StyleHost::computed_style`]
    type Snapshot: StyleSnapshot;

    /// Create a new element that is not yet attached to the document
    fn create_element(&mut self) -> Self::Element;

    /// Set an inline style declaration, e.g. `--accent` or `background-color`
    fn set_property(&mut self, element: &Self::Element, name: &str, value: &str);

    /// Append `child` as the last child of `parent`
    fn append_child(&mut self, parent: &Self::Element, child: &Self::Element);

    /// Detach `element` from its parent; no-op if already detached
    fn remove(&mut self, element: &Self::Element);

    /// Release a detached element and its descendants.
    ///
    /// The handles must not be used afterwards. Hosts whose elements are
    /// reclaimed once unreachable can keep the default no-op.
    fn discard(&mut self, _element: &Self::Element) {}

    /// Snapshot the computed style of a connected element.
    ///
    /// The first snapshot after the document changed may force a reflow.
    fn computed_style(&mut self, element: &Self::Element) -> Result<Self::Snapshot, StyleError>;

    /// Whether `value` is accepted as a CSS `<color>`
    fn supports_color(&self, value: &str) -> bool;
}
