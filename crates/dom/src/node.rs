//! Node definitions for the arena DOM
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Use SmallVec for child lists (most elements have few children)
//! 3. Attributes keep the order in which they were set

use ahash::RandomState;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Node identifier (index into arena)
pub type NodeId = u32;

/// Attribute storage on a built element
pub type NodeAttributes = IndexMap<String, String, RandomState>;

/// Node type matching the DOM specification numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Document = 9,
    /// Unparsed markup injected with `set_inner_html`
    DocumentFragment = 11,
}

impl NodeType {
    /// Whether nodes of this type may hold children
    pub fn is_container(self) -> bool {
        matches!(self, NodeType::Element | NodeType::Document)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeType::Element => "element",
            NodeType::Text => "text",
            NodeType::Document => "document",
            NodeType::DocumentFragment => "fragment",
        };
        f.write_str(name)
    }
}

/// A node stored in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomNode {
    pub node_id: NodeId,
    pub node_type: NodeType,

    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>,

    /// Tag name for elements, `#text` / `#document` / `#fragment` otherwise
    pub node_name: String,
    /// Text for text nodes, raw markup for fragments
    pub node_value: String,
    pub attributes: NodeAttributes,
}

impl DomNode {
    pub fn new(node_id: NodeId, node_type: NodeType, node_name: impl Into<String>) -> Self {
        Self {
            node_id,
            node_type,
            parent_id: None,
            children_ids: SmallVec::new(),
            node_name: node_name.into(),
            node_value: String::new(),
            attributes: NodeAttributes::default(),
        }
    }

    /// Get tag name for element nodes
    pub fn tag_name(&self) -> Option<&str> {
        if self.node_type == NodeType::Element {
            Some(&self.node_name)
        } else {
            None
        }
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Get attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Class names from the `class` attribute
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

/// Elements serialized without a closing tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];
