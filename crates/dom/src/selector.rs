//! Selector micro-language
//!
//! ```text
//! tag.lead1.lead2[key=value,key2=value2].trail1.trail2
//! └──── head ───┘└────── attributes ─────┘└── tail ──┘
//! ```
//!
//! The grammar is `^([\w.\-_]+)(\[[^\]]+\])?(\.[\w.]+)?$` with ASCII `\w`.
//! None of the three groups can borrow characters from the next, so a single
//! left-to-right scan decides a match without backtracking.

use crate::error::{DomError, Result};
use crate::node::DomNode;
use indexmap::IndexMap;
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;

/// Result of parsing one selector string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorDescriptor {
    pub tag: String,
    /// Leading classes followed by trailing classes. Duplicates are kept.
    pub classes: SmallVec<[String; 4]>,
    pub attributes: IndexMap<String, String>,
}

impl SelectorDescriptor {
    /// Does `node` have this tag, every class and every attribute?
    pub fn matches(&self, node: &DomNode) -> bool {
        node.tag_name()
            .is_some_and(|tag| tag.eq_ignore_ascii_case(&self.tag))
            && self.classes.iter().all(|class| node.has_class(class))
            && self
                .attributes
                .iter()
                .all(|(key, value)| node.attr(key) == Some(value.as_str()))
    }
}

impl fmt::Display for SelectorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)?;
        for class in &self.classes {
            write!(f, ".{}", class)?;
        }
        if !self.attributes.is_empty() {
            let pairs: Vec<String> = self
                .attributes
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            write!(f, "[{}]", pairs.join(","))?;
        }
        Ok(())
    }
}

/// The three capture groups of the grammar, brackets and leading dot stripped
#[derive(Debug, PartialEq, Eq)]
struct SelectorParts<'a> {
    head: &'a str,
    attributes: Option<&'a str>,
    tail: Option<&'a str>,
}

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn split_selector(source: &str) -> Option<SelectorParts<'_>> {
    let head_len = source
        .bytes()
        .take_while(|&b| is_word(b) || b == b'.' || b == b'-')
        .count();
    if head_len == 0 {
        return None;
    }

    let (head, mut rest) = source.split_at(head_len);

    let mut attributes = None;
    if let Some(after) = rest.strip_prefix('[') {
        let close = after.find(']')?;
        if close == 0 {
            return None;
        }
        attributes = Some(&after[..close]);
        rest = &after[close + 1..];
    }

    let mut tail = None;
    if !rest.is_empty() {
        let body = rest.strip_prefix('.')?;
        if body.is_empty() || !body.bytes().all(|b| is_word(b) || b == b'.') {
            return None;
        }
        tail = Some(body);
    }

    Some(SelectorParts {
        head,
        attributes,
        tail,
    })
}

/// Split the bracket body into `key=value` pairs.
///
/// Tokens are separated by runs of `,` or `;` and split once on `=`. Tokens
/// without `=` or with an empty key are dropped.
fn parse_attributes(body: &str) -> IndexMap<String, String> {
    body.split([',', ';'])
        .filter_map(|token| {
            let (key, value) = token.split_once('=')?;
            if key.is_empty() {
                None
            } else {
                Some((key.to_string(), value.to_string()))
            }
        })
        .collect()
}

fn dotted(segment: &str) -> impl Iterator<Item = String> + '_ {
    segment
        .split('.')
        .filter(|class| !class.is_empty())
        .map(str::to_string)
}

/// Parse a selector into tag, classes and attributes.
///
/// The input is coerced to its string form first. Fails with
/// [`DomError::Parse`] when the string does not conform to the grammar or has
/// no tag segment.
pub fn parse(selector: impl fmt::Display) -> Result<SelectorDescriptor> {
    let source = selector.to_string();
    let parts = split_selector(&source).ok_or_else(|| DomError::parse(source.as_str()))?;

    let mut head = parts.head.split('.');
    let tag = match head.next() {
        Some(tag) if !tag.is_empty() => tag.to_string(),
        _ => return Err(DomError::parse(source.as_str())),
    };

    let mut classes: SmallVec<[String; 4]> = head
        .filter(|class| !class.is_empty())
        .map(str::to_string)
        .collect();
    if let Some(tail) = parts.tail {
        classes.extend(dotted(tail));
    }

    let attributes = parts.attributes.map(parse_attributes).unwrap_or_default();

    Ok(SelectorDescriptor {
        tag,
        classes,
        attributes,
    })
}
