//! Error types for DOM building
//!
//! Two things can go wrong while building: the selector does not parse, or the
//! content handed to the builder does not describe elements. Everything else
//! comes from the element sink.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("cannot parse into DOM elements: invalid selector string \"{selector}\"")]
    Parse { selector: String },

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("Node not found: {0}")]
    NodeNotFound(u32),

    #[error("Invalid node type: expected {expected}, got {actual}")]
    InvalidNodeType { expected: String, actual: String },

    #[error("Cannot append node {child} to node {parent}: would create a cycle")]
    HierarchyRequest { parent: u32, child: u32 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Structured content that does not describe child elements.
///
/// `key` is the entry's position: the index for list entries, the name for
/// keyed entries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("subelement {key} must be an object")]
    NotAnElement { key: String },

    #[error("subelement {key} must have \"content\" property")]
    MissingContent { key: String },

    #[error("subelement {key} must have \"tag\" property")]
    MissingTag { key: String },
}

impl DomError {
    pub(crate) fn parse(selector: impl Into<String>) -> Self {
        DomError::Parse {
            selector: selector.into(),
        }
    }

    /// True for selector grammar failures.
    pub fn is_parse(&self) -> bool {
        matches!(self, DomError::Parse { .. })
    }

    /// The content error, if this is one.
    pub fn as_content(&self) -> Option<&ContentError> {
        match self {
            DomError::Content(err) => Some(err),
            _ => None,
        }
    }
}
