//! HTTP client - send a request, parse the response, inject it into the DOM
//!
//! Design decisions:
//! 1. One awaited call per request; no retries, no background tasks
//! 2. The transport is a trait object seam, the DOM is borrowed per call
//! 3. Callbacks run in order: success | error, then done

use crate::config::HttpDefaults;
use crate::error::{HttpError, Result};
use crate::request::{prepare, RequestOptions, Target};
use crate::response::{default_parse, Parsed, Response};
use crate::transport::Transport;
use hydra_dom::{create, ContentValue, DomArena, ElementSink, NodeId, SubElementSpec};
use tracing::Instrument;
use uuid::Uuid;

/// Result of a finished request
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub status: u16,
    pub parsed: Parsed,
    /// The element the response was injected into, if any
    pub target: Option<NodeId>,
}

/// Client holding request defaults and a transport
pub struct HttpClient<T> {
    defaults: HttpDefaults,
    transport: T,
}

impl<T: Transport> HttpClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_defaults(HttpDefaults::default(), transport)
    }

    pub fn with_defaults(defaults: HttpDefaults, transport: T) -> Self {
        Self {
            defaults,
            transport,
        }
    }

    pub fn defaults(&self) -> &HttpDefaults {
        &self.defaults
    }

    pub fn defaults_mut(&mut self) -> &mut HttpDefaults {
        &mut self.defaults
    }

    /// Send a request and inject the parsed response into its target.
    ///
    /// Method and URL are validated before anything is sent. On a 2xx status
    /// the target's children are replaced by the response; otherwise the
    /// target shows `ERROR: HTTP <status text>: <body>`.
    pub async fn request(&self, dom: &mut DomArena, mut options: RequestOptions) -> Result<Completion> {
        let request = prepare(&self.defaults, &options)?;

        let span = tracing::debug_span!("http", request_id = %Uuid::now_v7());
        span.in_scope(|| tracing::debug!("http: {} {}", request.method, request.url));

        let response = self.transport.send(&request).instrument(span.clone()).await?;
        let _entered = span.enter();

        let default = default_parse(&response);
        let parsed = match &options.parser {
            Some(parser) => parser(&response, default),
            None => default,
        };

        let target = if response.is_success() {
            let target = match &options.target {
                Some(target) => Some(
                    find_target(dom, target)?
                        .ok_or_else(|| HttpError::TargetNotFound(target.to_string()))?,
                ),
                None => None,
            };
            if let Some(success) = options.success.take() {
                success(&parsed, &response);
            }
            if let Some(target) = target {
                inject(dom, target, &parsed)?;
            }
            target
        } else {
            tracing::warn!(status = response.status, "http: {} {} failed", request.method, request.url);
            // a missing target only skips the error message
            let target = match &options.target {
                Some(target) => find_target(dom, target).ok().flatten(),
                None => None,
            };
            if let Some(error) = options.error.take() {
                error(&parsed, &response);
            }
            if let Some(target) = target {
                inject_error(dom, target, &response, &parsed)?;
            }
            target
        };

        if let Some(done) = options.done.take() {
            done(&parsed, &response);
        }

        Ok(Completion {
            status: response.status,
            parsed,
            target,
        })
    }
}

fn find_target(dom: &DomArena, target: &Target) -> Result<Option<NodeId>> {
    match target {
        Target::Node(node) => Ok(Some(dom.get(*node)?.node_id)),
        Target::Selector(selector) => Ok(dom.query_selector(selector)?),
    }
}

/// Replace the target's children with a successful response.
///
/// Element-like JSON is built into a real element, other JSON becomes text,
/// and text or document bodies are kept as markup.
pub fn inject(dom: &mut DomArena, target: NodeId, parsed: &Parsed) -> Result<()> {
    match parsed {
        Parsed::Json(value) if parsed.is_element_like() => {
            let spec = SubElementSpec::from_json("response", value).map_err(hydra_dom::DomError::from)?;
            let tag = spec.tag.clone().unwrap_or_default();
            let element = create(dom, tag, &spec.content, spec.attributes.as_ref())?;
            dom.remove_children(target)?;
            dom.append_child(target, element)?;
            tracing::debug!(target_node = target, element, "injected element");
        }
        Parsed::Json(_) => dom.set_text_content(target, &parsed.to_text())?,
        Parsed::Text(markup) | Parsed::Markup(markup) => dom.set_inner_html(target, markup)?,
    }
    Ok(())
}

fn inject_error(dom: &mut DomArena, target: NodeId, response: &Response, parsed: &Parsed) -> Result<()> {
    let message = format!("ERROR: HTTP {}: {}", response.status_text, parsed.to_text());
    dom.set_text_content(target, &message)?;
    Ok(())
}

/// Render arbitrary content into the target as text
pub fn inject_text(dom: &mut DomArena, target: NodeId, content: &ContentValue) -> Result<()> {
    dom.set_text_content(target, &hydra_dom::stringify(content))?;
    Ok(())
}
