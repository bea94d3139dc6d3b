//! Hydra DOM building library
//!
//! Builds element trees from a compact selector language and lazily resolved
//! content values.
//!
//! ## Core Design
//!
//! ```text
//! "ul.menu[id=nav]" ──parse──> SelectorDescriptor ─┐
//!                                                  ├─> ElementBuilder ──> ElementSink (DomArena)
//! ContentValue ──resolve──> Empty | Scalar | Structured ─┘        ↑ recurses per SubElementSpec
//! ```
//!
//! ```
//! use hydra_dom::{create, ContentValue, DomArena, DomSerializer, SubElementSpec};
//!
//! let mut dom = DomArena::new();
//! let content = ContentValue::list(vec![
//!     SubElementSpec::tagged("li", "x"),
//!     SubElementSpec::tagged("li", "y"),
//! ]);
//! let ul = create(&mut dom, "ul.menu", &content, None)?;
//!
//! let html = DomSerializer::new().outer_html(&dom, ul)?;
//! assert_eq!(html, r#"<ul class="menu"><li>x</li><li>y</li></ul>"#);
//! # Ok::<(), hydra_dom::DomError>(())
//! ```

pub mod arena;
pub mod builder;
pub mod error;
pub mod node;
pub mod selector;
pub mod serializer;
pub mod sink;
pub mod types;

pub use arena::DomArena;
pub use builder::{create, ElementBuilder};
pub use error::{ContentError, DomError, Result};
pub use node::{DomNode, NodeId, NodeType};
pub use selector::{parse, SelectorDescriptor};
pub use serializer::{DomSerializer, SerializerConfig};
pub use sink::ElementSink;
pub use types::{
    resolve, stringify, Attributes, ContentValue, EntryKey, Scalar, Structured, SubElementSpec,
    Thunk,
};
