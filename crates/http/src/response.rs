//! Responses and response parsing

use serde_json::Value;

/// How the transport classified the body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseType {
    #[default]
    Text,
    Document,
    Json,
}

/// A completed response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub body: String,
    pub response_type: ResponseType,
}

impl Response {
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: body.into(),
            response_type: ResponseType::default(),
        }
    }

    pub fn with_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Parsed response body
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Json(Value),
    Text(String),
    /// Document bodies, injected as markup
    Markup(String),
}

impl Parsed {
    /// Display text for the body.
    ///
    /// JSON strings come out unquoted, `null` as nothing, and everything else
    /// as compact JSON with every member kept.
    pub fn to_text(&self) -> String {
        match self {
            Parsed::Json(Value::String(text)) => text.clone(),
            Parsed::Json(Value::Null) => String::new(),
            Parsed::Json(value) => value.to_string(),
            Parsed::Text(text) | Parsed::Markup(text) => text.clone(),
        }
    }

    /// True for JSON objects shaped like a child element spec
    pub fn is_element_like(&self) -> bool {
        match self {
            Parsed::Json(Value::Object(obj)) => obj.contains_key("tag") && obj.contains_key("content"),
            _ => false,
        }
    }
}

/// Try JSON first, then fall back on the response type.
pub fn default_parse(response: &Response) -> Parsed {
    if let Ok(value) = serde_json::from_str::<Value>(&response.body) {
        return Parsed::Json(value);
    }

    match response.response_type {
        ResponseType::Document => Parsed::Markup(response.body.clone()),
        ResponseType::Text | ResponseType::Json => Parsed::Text(response.body.clone()),
    }
}
