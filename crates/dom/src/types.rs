//! Content values and the value resolver
//!
//! Content handed to the builder is one of a handful of shapes. Each shape is
//! a variant of [`ContentValue`], so every consumer matches exhaustively
//! instead of inspecting runtime types.
//!
//! ```text
//! ContentValue ─┬─ Empty
//!               ├─ Thunk ──resolve()──> ContentValue   (one layer only)
//!               ├─ Scalar (text / number / bool)
//!               ├─ Structured ─┬─ List  [entry, entry, ...]
//!               │              └─ Keyed {name: entry, ...}
//!               └─ Element (SubElementSpec)
//! ```

use crate::error::ContentError;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

/// Attribute name → value. Values may be thunks or structured and are
/// rendered with [`stringify`] when set on an element.
pub type Attributes = IndexMap<String, ContentValue>;

type ThunkFn = dyn Fn(Option<&Thunk>) -> ContentValue;

/// Deferred computation producing another [`ContentValue`].
///
/// The closure receives the thunk itself when resolved through [`resolve`]
/// and `None` when rendered through [`stringify`].
#[derive(Clone)]
pub struct Thunk(Rc<ThunkFn>);

impl Thunk {
    /// Thunk that ignores the self argument.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> ContentValue + 'static,
    {
        Thunk(Rc::new(move |_| f()))
    }

    /// Thunk that may look at itself.
    pub fn with_self<F>(f: F) -> Self
    where
        F: Fn(Option<&Thunk>) -> ContentValue + 'static,
    {
        Thunk(Rc::new(f))
    }

    /// Invoke passing `self`.
    pub fn call(&self) -> ContentValue {
        (self.0)(Some(self))
    }

    /// Invoke with no argument.
    pub fn call_bare(&self) -> ContentValue {
        (self.0)(None)
    }
}

impl PartialEq for Thunk {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(
            Rc::as_ptr(&self.0) as *const (),
            Rc::as_ptr(&other.0) as *const (),
        )
    }
}

impl fmt::Debug for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Thunk(..)")
    }
}

/// Leaf value rendered as text.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Str(String),
    Number(f64),
    Bool(bool),
}

impl Scalar {
    fn to_json(&self) -> Value {
        match self {
            Scalar::Str(s) => Value::String(s.clone()),
            Scalar::Bool(b) => Value::Bool(*b),
            // 2^53: beyond this f64 no longer represents every integer
            Scalar::Number(n) if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 => {
                Value::from(*n as i64)
            }
            Scalar::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => f.write_str(s),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) if n.is_nan() => f.write_str("NaN"),
            Scalar::Number(n) if n.is_infinite() => {
                f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Scalar::Number(n) if *n == 0.0 => f.write_str("0"),
            Scalar::Number(n) if n.abs() >= 1e21 || n.abs() < 1e-6 => write_exponent(f, *n),
            Scalar::Number(n) if n.fract() == 0.0 => write!(f, "{:.0}", n),
            Scalar::Number(n) => write!(f, "{}", n),
        }
    }
}

/// `1e21`, `1.5e-7` → `1e+21`, `1.5e-7`
fn write_exponent(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    let formatted = format!("{:e}", n);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            write!(f, "{}e+{}", mantissa, exponent)
        }
        _ => f.write_str(&formatted),
    }
}

/// Position of an entry inside structured content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKey<'a> {
    /// Sequential position in a list
    Index(usize),
    /// Named member of a keyed collection
    Name(&'a str),
}

impl EntryKey<'_> {
    pub fn is_index(&self) -> bool {
        matches!(self, EntryKey::Index(_))
    }
}

impl fmt::Display for EntryKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKey::Index(i) => write!(f, "{}", i),
            EntryKey::Name(name) => f.write_str(name),
        }
    }
}

/// Collection of child element descriptions.
#[derive(Debug, Clone, PartialEq)]
pub enum Structured {
    List(Vec<ContentValue>),
    Keyed(Vec<(String, ContentValue)>),
}

impl Structured {
    pub fn len(&self) -> usize {
        match self {
            Structured::List(items) => items.len(),
            Structured::Keyed(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries in enumeration order.
    pub fn entries(&self) -> Box<dyn Iterator<Item = (EntryKey<'_>, &ContentValue)> + '_> {
        match self {
            Structured::List(items) => Box::new(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (EntryKey::Index(i), v)),
            ),
            Structured::Keyed(items) => {
                Box::new(items.iter().map(|(k, v)| (EntryKey::Name(k.as_str()), v)))
            }
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Structured::List(items) => Value::Array(
                items
                    .iter()
                    .map(|v| v.to_json().unwrap_or(Value::Null))
                    .collect(),
            ),
            Structured::Keyed(items) => Value::Object(
                items
                    .iter()
                    .filter_map(|(k, v)| v.to_json().map(|json| (k.clone(), json)))
                    .collect(),
            ),
        }
    }
}

/// Description of one child element inside structured content.
///
/// `content` must not be [`ContentValue::Empty`]. `tag` is required when the
/// spec sits at a sequential position; keyed specs fall back to their key.
#[derive(Debug, Clone, PartialEq)]
pub struct SubElementSpec {
    pub tag: Option<String>,
    pub content: ContentValue,
    pub attributes: Option<Attributes>,
    /// Members the builder ignores, kept so the spec renders back unchanged
    pub extra: Map<String, Value>,
}

impl SubElementSpec {
    /// Spec without a tag.
    pub fn new(content: impl Into<ContentValue>) -> Self {
        Self {
            tag: None,
            content: content.into(),
            attributes: None,
            extra: Map::new(),
        }
    }

    pub fn tagged(tag: impl Into<String>, content: impl Into<ContentValue>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::new(content)
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<ContentValue>) -> Self {
        self.attributes
            .get_or_insert_with(Attributes::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Validate a JSON object as a child spec.
    ///
    /// `key` only labels errors. A missing or `null` `content` member is
    /// rejected. Attribute values are plain data and never child specs.
    pub fn from_json(key: &str, value: &Value) -> std::result::Result<Self, ContentError> {
        let obj = value.as_object().ok_or_else(|| ContentError::NotAnElement {
            key: key.to_string(),
        })?;

        let mut spec = Self::new(ContentValue::Empty);
        for (name, member) in obj {
            match (name.as_str(), member) {
                ("content", Value::Null) => {}
                ("content", content) => spec.content = ContentValue::from_json(content)?,
                ("tag", Value::String(tag)) => spec.tag = Some(tag.clone()),
                ("attributes", Value::Object(attrs)) => {
                    spec.attributes = Some(
                        attrs
                            .iter()
                            .map(|(k, v)| (k.clone(), ContentValue::from_json_data(v)))
                            .collect(),
                    );
                }
                _ => {
                    spec.extra.insert(name.clone(), member.clone());
                }
            }
        }

        if spec.content.is_empty() {
            return Err(ContentError::MissingContent {
                key: key.to_string(),
            });
        }
        Ok(spec)
    }

    fn to_json(&self) -> Value {
        let mut obj = Map::new();
        if let Some(tag) = &self.tag {
            obj.insert("tag".to_string(), Value::String(tag.clone()));
        }
        if let Some(content) = self.content.to_json() {
            obj.insert("content".to_string(), content);
        }
        if let Some(attrs) = &self.attributes {
            let attrs = attrs
                .iter()
                .filter_map(|(k, v)| v.to_json().map(|json| (k.clone(), json)))
                .collect();
            obj.insert("attributes".to_string(), Value::Object(attrs));
        }
        for (name, member) in &self.extra {
            obj.entry(name.clone()).or_insert_with(|| member.clone());
        }
        Value::Object(obj)
    }
}

/// Any value the builder accepts as element content or attribute value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ContentValue {
    #[default]
    Empty,
    Thunk(Thunk),
    Scalar(Scalar),
    Structured(Structured),
    Element(Box<SubElementSpec>),
}

impl ContentValue {
    pub fn thunk<F>(f: F) -> Self
    where
        F: Fn() -> ContentValue + 'static,
    {
        ContentValue::Thunk(Thunk::new(f))
    }

    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ContentValue>,
    {
        ContentValue::Structured(Structured::List(
            items.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn keyed<I, K, T>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<ContentValue>,
    {
        ContentValue::Structured(Structured::Keyed(
            items
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ContentValue::Empty)
    }

    pub fn as_element(&self) -> Option<&SubElementSpec> {
        match self {
            ContentValue::Element(spec) => Some(spec),
            _ => None,
        }
    }

    /// Convert decoded JSON into element content.
    ///
    /// Arrays become lists and objects keyed collections; the members of
    /// either are child specs when they are objects. Other members are kept as
    /// plain data and rejected later by the builder.
    pub fn from_json(value: &Value) -> std::result::Result<Self, ContentError> {
        Ok(match value {
            Value::Array(items) => ContentValue::Structured(Structured::List(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| entry_from_json(&i.to_string(), v))
                    .collect::<std::result::Result<_, _>>()?,
            )),
            Value::Object(members) => ContentValue::Structured(Structured::Keyed(
                members
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), entry_from_json(k, v)?)))
                    .collect::<std::result::Result<_, ContentError>>()?,
            )),
            scalar => ContentValue::from_json_data(scalar),
        })
    }

    /// Convert decoded JSON into plain data, with no child specs.
    ///
    /// Used for values that are only ever rendered as text, such as
    /// attribute values.
    pub fn from_json_data(value: &Value) -> Self {
        match value {
            Value::Array(items) => ContentValue::Structured(Structured::List(
                items.iter().map(Self::from_json_data).collect(),
            )),
            Value::Object(members) => ContentValue::Structured(Structured::Keyed(
                members
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::from_json_data(v)))
                    .collect(),
            )),
            Value::Null => ContentValue::Empty,
            Value::Bool(b) => ContentValue::Scalar(Scalar::Bool(*b)),
            Value::Number(n) => ContentValue::Scalar(Scalar::Number(n.as_f64().unwrap_or(f64::NAN))),
            Value::String(s) => ContentValue::Scalar(Scalar::Str(s.clone())),
        }
    }

    /// Canonical JSON form. `None` for values JSON cannot hold (empty, thunks).
    pub fn to_json(&self) -> Option<Value> {
        match self {
            ContentValue::Empty | ContentValue::Thunk(_) => None,
            ContentValue::Scalar(s) => Some(s.to_json()),
            ContentValue::Structured(s) => Some(s.to_json()),
            ContentValue::Element(spec) => Some(spec.to_json()),
        }
    }
}

fn entry_from_json(key: &str, value: &Value) -> std::result::Result<ContentValue, ContentError> {
    match value {
        Value::Object(_) => Ok(ContentValue::Element(Box::new(SubElementSpec::from_json(
            key, value,
        )?))),
        other => Ok(ContentValue::from_json_data(other)),
    }
}

impl From<&str> for ContentValue {
    fn from(s: &str) -> Self {
        ContentValue::Scalar(Scalar::Str(s.to_string()))
    }
}

impl From<String> for ContentValue {
    fn from(s: String) -> Self {
        ContentValue::Scalar(Scalar::Str(s))
    }
}

impl From<f64> for ContentValue {
    fn from(n: f64) -> Self {
        ContentValue::Scalar(Scalar::Number(n))
    }
}

impl From<i64> for ContentValue {
    fn from(n: i64) -> Self {
        ContentValue::Scalar(Scalar::Number(n as f64))
    }
}

impl From<i32> for ContentValue {
    fn from(n: i32) -> Self {
        ContentValue::Scalar(Scalar::Number(n as f64))
    }
}

impl From<bool> for ContentValue {
    fn from(b: bool) -> Self {
        ContentValue::Scalar(Scalar::Bool(b))
    }
}

impl From<Thunk> for ContentValue {
    fn from(thunk: Thunk) -> Self {
        ContentValue::Thunk(thunk)
    }
}

impl From<SubElementSpec> for ContentValue {
    fn from(spec: SubElementSpec) -> Self {
        ContentValue::Element(Box::new(spec))
    }
}

impl From<Structured> for ContentValue {
    fn from(structured: Structured) -> Self {
        ContentValue::Structured(structured)
    }
}

impl<T: Into<ContentValue>> From<Option<T>> for ContentValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// Remove one layer of indirection.
///
/// A thunk is invoked once, receiving itself; its result is returned as-is
/// even when that result is another thunk. Everything else is borrowed back.
pub fn resolve(value: &ContentValue) -> Cow<'_, ContentValue> {
    match value {
        ContentValue::Thunk(thunk) => Cow::Owned(thunk.call()),
        other => Cow::Borrowed(other),
    }
}

/// Render any value as display text. No HTML escaping is applied.
///
/// Thunks are invoked without an argument. Structured values and specs render
/// as compact JSON.
pub fn stringify(value: &ContentValue) -> String {
    match value {
        ContentValue::Empty => String::new(),
        ContentValue::Thunk(thunk) => stringify(&thunk.call_bare()),
        ContentValue::Scalar(scalar) => scalar.to_string(),
        ContentValue::Structured(_) | ContentValue::Element(_) => value
            .to_json()
            .map(|json| json.to_string())
            .unwrap_or_default(),
    }
}
