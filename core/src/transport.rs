//! The one seam that performs I/O.
//!
//! `ExpenseClient` only builds and parses plain data; a `Transport` executes
//! each `HttpRequest`. Non-2xx statuses are returned as ordinary responses so
//! the codec can interpret them. `Err` is reserved for exchanges that never
//! produced a response.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// A request that did not produce any HTTP response.
#[derive(Debug, Clone, thiserror::Error)]
#[error("transport failure: {message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Executes one request/response exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request).await
    }
}

/// Execute one request, logging the route but never its headers or body.
pub(crate) async fn exchange<T: Transport + ?Sized>(
    transport: &T,
    request: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let method = request.method;
    let path = request.path.clone();
    tracing::debug!(%method, %path, "sending request");
    match transport.execute(request).await {
        Ok(response) => {
            tracing::debug!(%method, %path, status = response.status, "received response");
            Ok(response)
        }
        Err(error) => {
            tracing::warn!(%method, %path, error = %error, "request failed before a response");
            Err(ApiError::Transport(error))
        }
    }
}

/// `reqwest`-backed transport.
///
/// No request timeout is configured; the client's defaults apply.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self.client.request(method, &request.path);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.text().await.map_err(map_transport_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn map_transport_error(error: reqwest::Error) -> TransportError {
    TransportError::new(error.to_string())
}
