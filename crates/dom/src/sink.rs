//! Element sink - the native DOM capability the builder writes into

use crate::error::Result;

/// Host-side element construction.
///
/// The builder never touches a concrete DOM. It asks a sink to create nodes,
/// set attributes and link children. [`DomArena`](crate::DomArena) is the
/// in-process implementation.
pub trait ElementSink {
    /// Handle to a created node
    type Node: Copy;

    fn create_element(&mut self, tag: &str) -> Result<Self::Node>;

    fn create_text_node(&mut self, text: &str) -> Result<Self::Node>;

    fn set_attribute(&mut self, element: Self::Node, name: &str, value: &str) -> Result<()>;

    fn append_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<()>;
}

impl<S: ElementSink + ?Sized> ElementSink for &mut S {
    type Node = S::Node;

    fn create_element(&mut self, tag: &str) -> Result<Self::Node> {
        (**self).create_element(tag)
    }

    fn create_text_node(&mut self, text: &str) -> Result<Self::Node> {
        (**self).create_text_node(text)
    }

    fn set_attribute(&mut self, element: Self::Node, name: &str, value: &str) -> Result<()> {
        (**self).set_attribute(element, name, value)
    }

    fn append_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<()> {
        (**self).append_child(parent, child)
    }
}
