//! Arena-based DOM tree storage
//!
//! ## Memory Layout
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [#document][div][#text][li]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```
//!
//! Node 0 is always the document. Nodes are never freed: an element that was
//! created but not appended stays in the arena, detached, until `clear`.

use crate::error::{DomError, Result};
use crate::node::{DomNode, NodeId, NodeType};
use crate::selector;
use crate::sink::ElementSink;
use ahash::AHashMap;
use smallvec::SmallVec;

/// Arena allocator for DOM nodes
///
/// Design:
/// - Single Vec<DomNode> for sequential allocation
/// - HashMap for `id` attribute → NodeId lookup
/// - No Rc/Arc: use indices everywhere
#[derive(Debug)]
pub struct DomArena {
    /// All nodes stored sequentially (cache-friendly)
    nodes: Vec<DomNode>,

    /// `id` attribute value → every element carrying it, in the order set
    id_index: AHashMap<String, SmallVec<[NodeId; 1]>>,
}

const DOCUMENT_ID: NodeId = 0;

impl DomArena {
    /// Create an arena holding only the document node
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let mut arena = Self {
            nodes: Vec::with_capacity(capacity.max(1)),
            id_index: AHashMap::new(),
        };
        arena.push(NodeType::Document, "#document");
        arena
    }

    fn push(&mut self, node_type: NodeType, name: &str) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        self.nodes.push(DomNode::new(node_id, node_type, name));
        node_id
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// The document node
    pub fn root_id(&self) -> NodeId {
        DOCUMENT_ID
    }

    pub fn root(&self) -> &DomNode {
        &self.nodes[DOCUMENT_ID as usize]
    }

    /// Total number of nodes, document included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the document node exists
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterator over all nodes, attached or not
    pub fn iter(&self) -> impl Iterator<Item = &DomNode> {
        self.nodes.iter()
    }

    /// Get children of a node
    pub fn children(&self, node_id: NodeId) -> Result<Vec<&DomNode>> {
        let node = self.get(node_id)?;
        node.children_ids
            .iter()
            .map(|&child_id| self.get(child_id))
            .collect()
    }

    /// Get parent of a node
    pub fn parent(&self, node_id: NodeId) -> Result<Option<&DomNode>> {
        let node = self.get(node_id)?;
        match node.parent_id {
            Some(parent_id) => Ok(Some(self.get(parent_id)?)),
            None => Ok(None),
        }
    }

    /// Is `ancestor` on the parent chain of `node_id` (or the node itself)?
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node_id: NodeId) -> Result<bool> {
        let mut current = Some(node_id);
        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            current = self.get(id)?.parent_id;
        }
        Ok(false)
    }

    /// Traverse tree depth-first in document order (iterative, no recursion)
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&DomNode) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Push children in reverse order (so they're visited left-to-right)
            for &child_id in node.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }

    /// Find nodes matching predicate, in allocation order
    pub fn find<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&DomNode) -> bool,
    {
        self.nodes
            .iter()
            .filter(|node| predicate(node))
            .map(|node| node.node_id)
            .collect()
    }

    /// Find first node matching predicate
    pub fn find_one<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&DomNode) -> bool,
    {
        self.nodes
            .iter()
            .find(|node| predicate(node))
            .map(|node| node.node_id)
    }

    /// Find all elements by tag name (ASCII case-insensitive)
    pub fn find_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.find(|node| node.is_element() && node.node_name.eq_ignore_ascii_case(tag))
    }

    /// Find element by ID attribute.
    ///
    /// Ids need not be unique. The first attached carrier in document order
    /// wins; detached carriers are only returned when none is attached.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        if let Some(attached) = self.attached_by_id(id).into_iter().next() {
            return Some(attached);
        }
        self.id_index
            .get(id)?
            .iter()
            .copied()
            .find(|&node_id| self.nodes[node_id as usize].attr("id") == Some(id))
    }

    fn attached_by_id(&self, id: &str) -> Vec<NodeId> {
        let mut matches = Vec::new();
        if !self.id_index.contains_key(id) {
            return matches;
        }
        // traversal errors only on unknown ids, and the document always exists
        let _ = self.traverse_df(DOCUMENT_ID, |node| {
            if node.is_element() && node.attr("id") == Some(id) {
                matches.push(node.node_id);
            }
            Ok(())
        });
        matches
    }

    /// Find all elements carrying a class
    pub fn find_by_class(&self, class: &str) -> Vec<NodeId> {
        self.find(|node| node.is_element() && node.has_class(class))
    }

    /// All attached elements matching a selector, in document order.
    ///
    /// Accepts `#id` or anything the selector parser accepts; a parsed
    /// selector matches elements with its tag, all its classes and all its
    /// attributes.
    pub fn query_selector_all(&self, query: &str) -> Result<Vec<NodeId>> {
        if let Some(id) = query.strip_prefix('#') {
            return Ok(self.attached_by_id(id));
        }

        let descriptor = selector::parse(query)?;
        let mut matches = Vec::new();
        self.traverse_df(DOCUMENT_ID, |node| {
            if descriptor.matches(node) {
                matches.push(node.node_id);
            }
            Ok(())
        })?;
        Ok(matches)
    }

    /// First attached element matching a selector
    pub fn query_selector(&self, query: &str) -> Result<Option<NodeId>> {
        Ok(self.query_selector_all(query)?.into_iter().next())
    }

    /// Whether the node is connected to the document
    pub fn is_attached(&self, node_id: NodeId) -> bool {
        self.is_inclusive_ancestor(DOCUMENT_ID, node_id)
            .unwrap_or(false)
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, node_id: NodeId) -> Result<String> {
        let mut text = String::new();

        self.traverse_df(node_id, |node| {
            if node.is_text() {
                text.push_str(&node.node_value);
            }
            Ok(())
        })?;

        Ok(text)
    }

    fn detach(&mut self, child: NodeId) -> Result<()> {
        if let Some(old_parent) = self.get(child)?.parent_id {
            self.get_mut(old_parent)?
                .children_ids
                .retain(|id| *id != child);
            self.get_mut(child)?.parent_id = None;
        }
        Ok(())
    }

    /// Detach every child of a node
    pub fn remove_children(&mut self, node_id: NodeId) -> Result<()> {
        let children = std::mem::take(&mut self.get_mut(node_id)?.children_ids);
        for child in children {
            self.get_mut(child)?.parent_id = None;
        }
        Ok(())
    }

    /// Replace the children of a node with a single text node
    pub fn set_text_content(&mut self, node_id: NodeId, text: &str) -> Result<()> {
        self.remove_children(node_id)?;
        if !text.is_empty() {
            let text_id = self.create_text_node(text)?;
            self.append_child(node_id, text_id)?;
        }
        Ok(())
    }

    /// Replace the children of a node with unparsed markup.
    ///
    /// The markup is kept verbatim in a fragment node and serialized as-is.
    pub fn set_inner_html(&mut self, node_id: NodeId, markup: &str) -> Result<()> {
        self.remove_children(node_id)?;
        if !markup.is_empty() {
            let fragment = self.push(NodeType::DocumentFragment, "#fragment");
            self.get_mut(fragment)?.node_value = markup.to_string();
            self.append_child(node_id, fragment)?;
        }
        Ok(())
    }

    /// Drop every node except the document
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[DOCUMENT_ID as usize].children_ids.clear();
        self.id_index.clear();
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementSink for DomArena {
    type Node = NodeId;

    fn create_element(&mut self, tag: &str) -> Result<NodeId> {
        Ok(self.push(NodeType::Element, tag))
    }

    fn create_text_node(&mut self, text: &str) -> Result<NodeId> {
        let node_id = self.push(NodeType::Text, "#text");
        self.nodes[node_id as usize].node_value = text.to_string();
        Ok(node_id)
    }

    fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> Result<()> {
        let node = self.get_mut(element)?;
        if !node.is_element() {
            return Err(DomError::InvalidNodeType {
                expected: NodeType::Element.to_string(),
                actual: node.node_type.to_string(),
            });
        }

        let previous = node.attributes.insert(name.to_string(), value.to_string());

        if name == "id" {
            if let Some(previous) = previous {
                if let Some(carriers) = self.id_index.get_mut(&previous) {
                    carriers.retain(|id| *id != element);
                    if carriers.is_empty() {
                        self.id_index.remove(&previous);
                    }
                }
            }
            let carriers = self.id_index.entry(value.to_string()).or_default();
            if !carriers.contains(&element) {
                carriers.push(element);
            }
        }

        Ok(())
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_type = self.get(parent)?.node_type;
        if !parent_type.is_container() {
            return Err(DomError::InvalidNodeType {
                expected: "element or document".to_string(),
                actual: parent_type.to_string(),
            });
        }

        let child_type = self.get(child)?.node_type;
        if child_type == NodeType::Document {
            return Err(DomError::InvalidNodeType {
                expected: "element, text or fragment".to_string(),
                actual: child_type.to_string(),
            });
        }

        if self.is_inclusive_ancestor(child, parent)? {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        self.detach(child)?;
        self.get_mut(child)?.parent_id = Some(parent);
        self.get_mut(parent)?.children_ids.push(child);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_basic() {
        let mut arena = DomArena::new();
        assert!(arena.is_empty());

        let id = arena.create_element("div").unwrap();
        assert_eq!(id, 1);

        let retrieved = arena.get(id).unwrap();
        assert_eq!(retrieved.node_name, "div");
        assert_eq!(retrieved.parent_id, None);
        assert!(matches!(arena.get(99), Err(DomError::NodeNotFound(99))));
    }

    #[test]
    fn test_id_lookup_follows_attribute_changes() {
        let mut arena = DomArena::new();
        let div = arena.create_element("div").unwrap();

        arena.set_attribute(div, "id", "first").unwrap();
        assert_eq!(arena.find_by_id("first"), Some(div));

        arena.set_attribute(div, "id", "second").unwrap();
        assert_eq!(arena.find_by_id("first"), None);
        assert_eq!(arena.find_by_id("second"), Some(div));
    }

    #[test]
    fn test_duplicate_id_on_detached_element_does_not_hide_attached() {
        let mut arena = DomArena::new();
        let root = arena.root_id();
        let target = arena.create_element("div").unwrap();
        arena.set_attribute(target, "id", "target").unwrap();
        arena.append_child(root, target).unwrap();

        let stray = arena.create_element("span").unwrap();
        arena.set_attribute(stray, "id", "target").unwrap();
        assert_eq!(arena.query_selector("#target").unwrap(), Some(target));
        assert_eq!(arena.find_by_id("target"), Some(target));

        arena.set_attribute(stray, "id", "other").unwrap();
        assert_eq!(arena.query_selector("#target").unwrap(), Some(target));
        assert_eq!(arena.find_by_id("other"), Some(stray));
        assert_eq!(arena.query_selector("#other").unwrap(), None);
    }

    #[test]
    fn test_traverse_df() {
        let mut arena = DomArena::new();

        // root -> [child1, child2]
        let root = arena.create_element("div").unwrap();
        let child1 = arena.create_element("span").unwrap();
        let child2 = arena.create_element("p").unwrap();
        arena.append_child(root, child1).unwrap();
        arena.append_child(root, child2).unwrap();

        let mut visited = Vec::new();
        arena
            .traverse_df(root, |node| {
                visited.push(node.node_name.clone());
                Ok(())
            })
            .unwrap();

        assert_eq!(visited, vec!["div", "span", "p"]);
    }

    #[test]
    fn test_append_moves_between_parents() {
        let mut arena = DomArena::new();
        let a = arena.create_element("a").unwrap();
        let b = arena.create_element("b").unwrap();
        let c = arena.create_element("c").unwrap();

        arena.append_child(a, c).unwrap();
        arena.append_child(b, c).unwrap();

        assert!(arena.get(a).unwrap().children_ids.is_empty());
        assert_eq!(arena.get(b).unwrap().children_ids.as_slice(), &[c]);
        assert_eq!(arena.parent(c).unwrap().unwrap().node_id, b);
    }

    #[test]
    fn test_append_rejects_cycles_and_text_parents() {
        let mut arena = DomArena::new();
        let outer = arena.create_element("div").unwrap();
        let inner = arena.create_element("div").unwrap();
        let text = arena.create_text_node("x").unwrap();
        arena.append_child(outer, inner).unwrap();

        assert!(matches!(
            arena.append_child(inner, outer),
            Err(DomError::HierarchyRequest { .. })
        ));
        assert!(matches!(
            arena.append_child(outer, outer),
            Err(DomError::HierarchyRequest { .. })
        ));
        assert!(matches!(
            arena.append_child(text, inner),
            Err(DomError::InvalidNodeType { .. })
        ));
        assert!(matches!(
            arena.set_attribute(text, "id", "t"),
            Err(DomError::InvalidNodeType { .. })
        ));
    }

    #[test]
    fn test_query_selector_only_sees_attached_nodes() {
        let mut arena = DomArena::new();
        let root = arena.root_id();
        let list = arena.create_element("ul").unwrap();
        let item = arena.create_element("li").unwrap();
        let orphan = arena.create_element("li").unwrap();
        arena.set_attribute(item, "class", "item active").unwrap();
        arena.set_attribute(orphan, "class", "item").unwrap();
        arena.set_attribute(list, "id", "menu").unwrap();
        arena.append_child(list, item).unwrap();
        arena.append_child(root, list).unwrap();

        assert_eq!(arena.query_selector("#menu").unwrap(), Some(list));
        assert_eq!(arena.query_selector_all("li.item").unwrap(), vec![item]);
        assert_eq!(arena.query_selector("li.active").unwrap(), Some(item));
        assert_eq!(arena.query_selector("li.missing").unwrap(), None);
        assert!(arena.query_selector("li li").is_err());
        assert_eq!(arena.find_by_class("item"), vec![item, orphan]);
    }

    #[test]
    fn test_text_and_inner_html_replace_children() {
        let mut arena = DomArena::new();
        let div = arena.create_element("div").unwrap();
        let span = arena.create_element("span").unwrap();
        arena.append_child(div, span).unwrap();

        arena.set_text_content(div, "hello").unwrap();
        assert_eq!(arena.text_content(div).unwrap(), "hello");
        assert_eq!(arena.get(span).unwrap().parent_id, None);

        arena.set_inner_html(div, "<b>bold</b>").unwrap();
        let children = arena.children(div).unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].node_type, NodeType::DocumentFragment);
        assert_eq!(children[0].node_value, "<b>bold</b>");
    }

    #[test]
    fn test_clear_keeps_document() {
        let mut arena = DomArena::new();
        let div = arena.create_element("div").unwrap();
        arena.set_attribute(div, "id", "x").unwrap();
        let root = arena.root_id();
        arena.append_child(root, div).unwrap();

        arena.clear();
        assert!(arena.is_empty());
        assert!(arena.root().children_ids.is_empty());
        assert_eq!(arena.find_by_id("x"), None);
    }
}
