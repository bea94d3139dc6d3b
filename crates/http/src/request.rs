//! Request options and request preparation

use crate::config::HttpDefaults;
use crate::error::{HttpError, Result};
use crate::response::{Parsed, Response};
use hydra_dom::NodeId;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Supported request methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Options,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Patch => "PATCH",
        }
    }
}

impl FromStr for Method {
    type Err = HttpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Method::Get),
            "post" => Ok(Method::Post),
            "put" => Ok(Method::Put),
            "delete" => Ok(Method::Delete),
            "options" => Ok(Method::Options),
            "patch" => Ok(Method::Patch),
            _ => Err(HttpError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a response is injected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Looked up with `query_selector` when the response arrives
    Selector(String),
    Node(NodeId),
}

impl From<&str> for Target {
    fn from(selector: &str) -> Self {
        Target::Selector(selector.to_string())
    }
}

impl From<NodeId> for Target {
    fn from(node: NodeId) -> Self {
        Target::Node(node)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Selector(selector) => f.write_str(selector),
            Target::Node(node) => write!(f, "node {}", node),
        }
    }
}

/// Custom response parser. Receives the response and the default parse.
pub type Parser = Arc<dyn Fn(&Response, Parsed) -> Parsed + Send + Sync>;

/// Response callback
pub type Callback = Box<dyn FnOnce(&Parsed, &Response) + Send>;

/// Per-request options
#[derive(Default)]
pub struct RequestOptions {
    /// Method name, validated when the request is prepared
    pub method: String,
    /// Path joined to the default URL
    pub url: Option<String>,
    pub headers: Vec<(String, String)>,
    pub target: Option<Target>,
    pub parser: Option<Parser>,
    pub success: Option<Callback>,
    pub error: Option<Callback>,
    pub done: Option<Callback>,
}

impl RequestOptions {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new("get", url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new("post", url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn target(mut self, target: impl Into<Target>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn parser<F>(mut self, parser: F) -> Self
    where
        F: Fn(&Response, Parsed) -> Parsed + Send + Sync + 'static,
    {
        self.parser = Some(Arc::new(parser));
        self
    }

    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Parsed, &Response) + Send + 'static,
    {
        self.success = Some(Box::new(f));
        self
    }

    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Parsed, &Response) + Send + 'static,
    {
        self.error = Some(Box::new(f));
        self
    }

    pub fn on_done<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Parsed, &Response) + Send + 'static,
    {
        self.done = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// A validated request ready for a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl Request {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Validate options against defaults and build the request.
///
/// The URL is the default prefix followed by the request path; absolute
/// results are normalised. Per-request headers replace default headers of the
/// same name.
pub fn prepare(defaults: &HttpDefaults, options: &RequestOptions) -> Result<Request> {
    let method: Method = options.method.parse()?;

    let path = match options.url.as_deref() {
        Some(path) if !path.is_empty() => path,
        _ => return Err(HttpError::MissingUrl),
    };

    let joined = format!("{}{}", defaults.url, path);
    let url = match url::Url::parse(&joined) {
        Ok(parsed) => parsed.to_string(),
        Err(_) => joined,
    };

    let mut headers: Vec<(String, String)> = defaults
        .headers
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    for (name, value) in &options.headers {
        headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        headers.push((name.clone(), value.clone()));
    }

    Ok(Request {
        method,
        url,
        headers,
    })
}
