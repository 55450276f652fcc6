//! In-memory document implementing [`StyleHost`]
//!
//! `MemoryDocument` is a minimal element tree with inline styles. It computes
//! the properties the resolvers depend on:
//! - Custom properties, inherited down the tree with `var()` substitution
//! - `color`, inherited, defaulting to black
//! - `background-color`, evaluated to a browser-style `rgb()`/`rgba()` string
//! - Any other inline property, with `var()` substitution applied
//!
//! It also counts reflows: the first style snapshot taken after a connected
//! element changed increments [`MemoryDocument::layout_count`].
//!
//! # Example
//!
//! ```
//! use themevars::dom::MemoryDocument;
//! use themevars::host::{StyleHost, StyleSnapshot};
//!
//! let mut doc = MemoryDocument::new();
//! let root = doc.root();
//! doc.set_property(&root, "--accent", "#112233");
//!
//! let style = doc.computed_style(&root).unwrap();
//! assert_eq!(style.property_value("--accent"), "#112233");
//! ```

use crate::color::{is_css_color, parse_color, serialize_computed_color};
use crate::host::{StyleError, StyleHost, StyleSnapshot};
use crate::variables::CustomPropertyScope;
use image::Rgba;
use std::collections::HashMap;
use std::fmt;

/// Computed value of an unset or invalid `background-color`
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Initial value of `color`
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Handle to an element in a [`MemoryDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Inline custom property declarations (`--*`)
    custom: HashMap<String, String>,
    /// Inline declarations for all other properties
    declarations: HashMap<String, String>,
}

/// Owned computed style of one element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedStyle {
    properties: HashMap<String, String>,
}

impl ComputedStyle {
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl StyleSnapshot for ComputedStyle {
    fn property_value(&self, name: &str) -> String {
        self.properties.get(name).cloned().unwrap_or_default()
    }
}

/// An arena-backed element tree with a permanently connected root
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    /// Discarded slots, reused by `create_element`
    free: Vec<NodeId>,
    layout_dirty: bool,
    layout_count: usize,
}

impl MemoryDocument {
    /// Create a document containing only its root element
    pub fn new() -> Self {
        Self { nodes: vec![Node::default()], free: Vec::new(), layout_dirty: true, layout_count: 0 }
    }

    /// The root element, which is always connected
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of reflows forced by style snapshots so far
    pub fn layout_count(&self) -> usize {
        self.layout_count
    }

    /// Parent of an element, if attached
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// Children of an element in document order
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Whether an element is reachable from the root
    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == self.root() {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Number of element slots in the arena, live or discarded
    pub fn allocated_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of elements connected to the document, including the root
    pub fn connected_count(&self) -> usize {
        (0..self.nodes.len()).filter(|&i| self.is_connected(NodeId(i))).count()
    }

    /// Declare several properties on one element
    pub fn set_properties<'a, I>(&mut self, node: &NodeId, properties: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (name, value) in properties {
            self.set_property(node, name, value);
        }
    }

    fn mark_dirty(&mut self, node: NodeId) {
        if self.is_connected(node) {
            self.layout_dirty = true;
        }
    }

    /// Root-to-node path
    fn ancestry(&self, node: NodeId) -> Vec<NodeId> {
        let mut path = vec![node];
        let mut current = node;
        while let Some(parent) = self.nodes[current.0].parent {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    fn compute(&self, node: NodeId) -> ComputedStyle {
        let empty = HashMap::new();

        // Custom properties and color cascade from the root down
        let mut inherited = HashMap::new();
        let mut color = BLACK;
        for id in self.ancestry(node) {
            let declared = &self.nodes[id.0].custom;
            inherited = CustomPropertyScope::new(declared, &inherited).compute();

            if let Some(raw) = self.nodes[id.0].declarations.get("color") {
                let scope = CustomPropertyScope::new(&empty, &inherited);
                if let Some(value) = scope.substitute(raw).ok().and_then(|v| computed_color(&v, color)) {
                    color = value;
                }
            }
        }

        let scope = CustomPropertyScope::new(&empty, &inherited);
        let mut properties = HashMap::new();

        for (name, raw) in &self.nodes[node.0].declarations {
            if let Ok(value) = scope.substitute(raw) {
                properties.insert(name.clone(), value.trim().to_string());
            }
        }

        // background-color always has a computed value
        let background = properties
            .get("background-color")
            .and_then(|value| computed_color(value, color))
            .unwrap_or(TRANSPARENT);
        properties.insert("background-color".to_string(), serialize_computed_color(background));
        properties.insert("color".to_string(), serialize_computed_color(color));

        properties.extend(inherited);
        ComputedStyle { properties }
    }
}

/// Evaluate a color value, with `currentcolor` taking the element's `color`
fn computed_color(value: &str, current: Rgba<u8>) -> Option<Rgba<u8>> {
    if value.trim().eq_ignore_ascii_case("currentcolor") {
        return Some(current);
    }
    parse_color(value).ok()
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleHost for MemoryDocument {
    type Element = NodeId;
    type Snapshot = ComputedStyle;

    fn create_element(&mut self) -> NodeId {
        if let Some(id) = self.free.pop() {
            return id;
        }
        self.nodes.push(Node::default());
        NodeId(self.nodes.len() - 1)
    }

    fn set_property(&mut self, element: &NodeId, name: &str, value: &str) {
        let node = &mut self.nodes[element.0];
        if name.starts_with("--") {
            node.custom.insert(name.to_string(), value.to_string());
        } else {
            node.declarations.insert(name.to_string(), value.to_string());
        }
        self.mark_dirty(*element);
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
        self.remove(child);
        self.nodes[child.0].parent = Some(*parent);
        self.nodes[parent.0].children.push(*child);
        self.mark_dirty(*child);
    }

    fn remove(&mut self, element: &NodeId) {
        let Some(parent) = self.nodes[element.0].parent else {
            return;
        };
        self.mark_dirty(parent);
        self.nodes[parent.0].children.retain(|c| c != element);
        self.nodes[element.0].parent = None;
    }

    fn discard(&mut self, element: &NodeId) {
        if *element == self.root() {
            return;
        }
        self.remove(element);

        let mut pending = vec![*element];
        while let Some(id) = pending.pop() {
            let node = std::mem::take(&mut self.nodes[id.0]);
            pending.extend(node.children);
            self.free.push(id);
        }
    }

    fn computed_style(&mut self, element: &NodeId) -> Result<ComputedStyle, StyleError> {
        if !self.is_connected(*element) {
            return Err(StyleError::Detached(element.to_string()));
        }

        if self.layout_dirty {
            self.layout_count += 1;
            self.layout_dirty = false;
            log::trace!("Reflow #{} for {}", self.layout_count, element);
        }

        Ok(self.compute(*element))
    }

    fn supports_color(&self, value: &str) -> bool {
        is_css_color(value)
    }
}
