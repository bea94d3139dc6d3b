//! DOM Serializer - render arena nodes back to markup
//!
//! This module handles:
//! - `outer_html` / `inner_html` for any node
//! - Escaping text and attribute values
//! - Verbatim output of injected markup fragments
//! - Optional indented output for debugging

use crate::arena::DomArena;
use crate::error::Result;
use crate::node::*;

/// Serializer configuration
#[derive(Debug, Clone)]
pub struct SerializerConfig {
    /// One node per line, indented by depth
    pub pretty: bool,
    /// Escape `&`, `<`, `>` in text nodes
    pub escape_text: bool,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            escape_text: true,
        }
    }
}

impl SerializerConfig {
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }
}

/// DOM Tree Serializer
pub struct DomSerializer {
    config: SerializerConfig,
}

impl DomSerializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self { config }
    }

    /// Markup for the node itself and its subtree
    pub fn outer_html(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        let mut output = String::with_capacity(256);
        self.serialize_node(arena, node_id, 0, &mut output)?;
        Ok(output)
    }

    /// Markup for the children of a node
    pub fn inner_html(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        let mut output = String::with_capacity(256);
        for &child_id in &arena.get(node_id)?.children_ids {
            self.serialize_node(arena, child_id, 0, &mut output)?;
        }
        Ok(output)
    }

    /// Serialize a single node recursively
    fn serialize_node(
        &self,
        arena: &DomArena,
        node_id: NodeId,
        depth: usize,
        output: &mut String,
    ) -> Result<()> {
        let node = arena.get(node_id)?;
        let indent = if self.config.pretty {
            "  ".repeat(depth)
        } else {
            String::new()
        };
        let newline = if self.config.pretty { "\n" } else { "" };

        match node.node_type {
            NodeType::Element => {
                // Format: <tag id="123" class="foo">
                output.push_str(&indent);
                output.push('<');
                output.push_str(&node.node_name);

                for (name, value) in &node.attributes {
                    output.push(' ');
                    output.push_str(name);
                    output.push_str("=\"");
                    output.push_str(&escape_attribute(value));
                    output.push('"');
                }

                output.push('>');
                output.push_str(newline);

                if is_void(&node.node_name) {
                    return Ok(());
                }

                for &child_id in &node.children_ids {
                    self.serialize_node(arena, child_id, depth + 1, output)?;
                }

                output.push_str(&indent);
                output.push_str("</");
                output.push_str(&node.node_name);
                output.push('>');
                output.push_str(newline);
            }
            NodeType::Text => {
                output.push_str(&indent);
                if self.config.escape_text {
                    output.push_str(&escape_text(&node.node_value));
                } else {
                    output.push_str(&node.node_value);
                }
                output.push_str(newline);
            }
            NodeType::DocumentFragment => {
                output.push_str(&indent);
                output.push_str(&node.node_value);
                output.push_str(newline);
            }
            NodeType::Document => {
                // For document nodes, just serialize children
                for &child_id in &node.children_ids {
                    self.serialize_node(arena, child_id, depth, output)?;
                }
            }
        }

        Ok(())
    }
}

impl Default for DomSerializer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
