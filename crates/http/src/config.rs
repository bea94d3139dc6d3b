//! Request defaults shared by every request a client makes

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Client-wide request defaults
///
/// Loadable from JSON:
/// ```json
/// { "url": "https://api.example.com", "headers": { "Accept": "application/json" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpDefaults {
    /// Prefix joined to every request path
    pub url: String,
    /// Sent with every request, before per-request headers
    pub headers: BTreeMap<String, String>,
}

impl HttpDefaults {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
