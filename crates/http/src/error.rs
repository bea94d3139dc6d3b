//! Error types for HTTP requests and response injection

use hydra_dom::DomError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HttpError>;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Unsupported HTTP method \"{0}\"")]
    UnsupportedMethod(String),

    #[error("HTTP request must specify a URL or path to be joined with the default URL")]
    MissingUrl,

    #[error("Target element not found: {0}")]
    TargetNotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Dom(#[from] DomError),
}
