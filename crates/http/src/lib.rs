//! Hydra HTTP - fetch content and inject it into the DOM
//!
//! A thin request wrapper around a pluggable [`Transport`]. Responses are
//! parsed (JSON first, text otherwise) and rendered into a target element
//! through the `hydra-dom` builder and value renderer.
//!
//! ```text
//! RequestOptions ──prepare──> Request ──Transport──> Response
//!                                                       │ default_parse / custom parser
//!                                                       ↓
//!                              DomArena target <──inject── Parsed
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod response;
pub mod transport;

pub use client::{inject, inject_text, Completion, HttpClient};
pub use config::HttpDefaults;
pub use error::{HttpError, Result};
pub use request::{prepare, Method, Request, RequestOptions, Target};
pub use response::{default_parse, Parsed, Response, ResponseType};
pub use transport::Transport;
