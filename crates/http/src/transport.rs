//! Transport seam - whatever actually puts the request on the wire

use crate::error::Result;
use crate::request::Request;
use crate::response::Response;
use async_trait::async_trait;
use std::sync::Arc;

/// Sends one request and waits for the complete response.
///
/// No retries, no queuing. A failed send is returned as
/// [`HttpError::Transport`](crate::HttpError::Transport) and the caller decides.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &Request) -> Result<Response>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &Request) -> Result<Response> {
        (**self).send(request).await
    }
}
