//! Element builder - selector + content → element tree
//!
//! One call builds one element and, for structured content, recurses once per
//! child spec. Nothing is retained between calls; all state lives in the sink.

use crate::error::{ContentError, Result};
use crate::selector::{self, SelectorDescriptor};
use crate::sink::ElementSink;
use crate::types::{resolve, stringify, Attributes, ContentValue, EntryKey};
use std::fmt;

/// Builds elements into an [`ElementSink`]
pub struct ElementBuilder<S> {
    sink: S,
}

impl<S: ElementSink> ElementBuilder<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_inner(self) -> S {
        self.sink
    }

    /// Build one element and its subtree.
    ///
    /// Attributes from the selector override `attributes` for the same key;
    /// selector classes are appended to any `class` already given. Content is
    /// resolved once, then:
    /// - empty → no children
    /// - structured → one child per entry, in enumeration order
    /// - a single spec → that spec as the only child
    /// - anything else → one text node
    ///
    /// On error the element (and any children already appended to it) is left
    /// detached in the sink.
    pub fn create(
        &mut self,
        selector: impl fmt::Display,
        content: &ContentValue,
        attributes: Option<&Attributes>,
    ) -> Result<S::Node> {
        let descriptor = selector::parse(selector)?;
        let attributes = merge_attributes(&descriptor, attributes);

        let element = self.sink.create_element(&descriptor.tag)?;
        tracing::trace!(tag = %descriptor.tag, attributes = attributes.len(), "created element");

        for (name, value) in &attributes {
            self.sink.set_attribute(element, name, &stringify(value))?;
        }

        let content = resolve(content);
        match content.as_ref() {
            ContentValue::Empty => {}
            ContentValue::Structured(structured) => {
                for (key, entry) in structured.entries() {
                    self.append_entry(element, key, entry)?;
                }
            }
            ContentValue::Element(_) => {
                self.append_entry(element, EntryKey::Index(0), content.as_ref())?;
            }
            other => {
                let text = self.sink.create_text_node(&stringify(other))?;
                self.sink.append_child(element, text)?;
            }
        }

        Ok(element)
    }

    fn append_entry(
        &mut self,
        parent: S::Node,
        key: EntryKey<'_>,
        entry: &ContentValue,
    ) -> Result<()> {
        let entry = resolve(entry);
        let spec = entry.as_element().ok_or_else(|| ContentError::NotAnElement {
            key: key.to_string(),
        })?;
        if spec.content.is_empty() {
            return Err(ContentError::MissingContent {
                key: key.to_string(),
            }
            .into());
        }

        let tag = match (spec.tag.as_deref(), key) {
            (Some(tag), _) => tag,
            (None, EntryKey::Name(name)) => name,
            (None, EntryKey::Index(_)) => {
                return Err(ContentError::MissingTag {
                    key: key.to_string(),
                }
                .into())
            }
        };

        let child = self.create(tag, &spec.content, spec.attributes.as_ref())?;
        self.sink.append_child(parent, child)
    }
}

/// Build one element into `sink`. See [`ElementBuilder::create`].
pub fn create<S: ElementSink>(
    sink: &mut S,
    selector: impl fmt::Display,
    content: &ContentValue,
    attributes: Option<&Attributes>,
) -> Result<S::Node> {
    ElementBuilder::new(sink).create(selector, content, attributes)
}

fn merge_attributes(descriptor: &SelectorDescriptor, base: Option<&Attributes>) -> Attributes {
    let mut merged = base.cloned().unwrap_or_default();

    for (name, value) in &descriptor.attributes {
        merged.insert(name.clone(), ContentValue::from(value.as_str()));
    }

    if !descriptor.classes.is_empty() {
        let existing = merged.get("class").map(stringify).unwrap_or_default();
        let classes: Vec<&str> = existing
            .split_whitespace()
            .chain(descriptor.classes.iter().map(String::as_str))
            .collect();
        merged.insert("class".to_string(), ContentValue::from(classes.join(" ")));
    }

    merged
}
