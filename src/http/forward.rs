//! Outbound calls carrying the trace context.
//!
//! # Responsibilities
//! - Decode one item of a `/test` request body
//! - Build a POST to the item's URL with its arguments as JSON
//! - Write `traceparent` / `tracestate` into the outgoing headers
//! - Bound each call with the upstream timeout

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, uri::InvalidUri, Method, Request, Response, StatusCode, Uri},
};
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::context::TraceContext;

/// One entry of a `/test` request body.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TestRequest {
    /// Where to send the next hop.
    pub url: String,

    /// Opaque payload forwarded verbatim as the next hop's body.
    #[serde(default)]
    pub arguments: Vec<serde_json::Value>,
}

/// Errors that can occur while forwarding one item.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported url scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("invalid request uri: {0}")]
    Uri(#[from] InvalidUri),

    #[error("failed to encode arguments: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to build request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),
}

impl ForwardError {
    /// Status reported back to the caller of `/test`.
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::InvalidUrl { .. }
            | ForwardError::UnsupportedScheme(_)
            | ForwardError::Uri(_)
            | ForwardError::Encode(_)
            | ForwardError::Request(_) => StatusCode::BAD_REQUEST,
            ForwardError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ForwardError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

/// HTTP client that stamps the trace context on every call.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
}

impl Forwarder {
    /// Create a forwarder whose calls give up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client, timeout }
    }

    /// Build the outgoing request for `item`.
    pub fn build_request(
        &self,
        context: &TraceContext,
        item: &TestRequest,
    ) -> Result<Request<Body>, ForwardError> {
        let url = Url::parse(&item.url).map_err(|source| ForwardError::InvalidUrl {
            url: item.url.clone(),
            source,
        })?;
        if url.scheme() != "http" {
            return Err(ForwardError::UnsupportedScheme(url.scheme().to_string()));
        }
        let uri: Uri = url.as_str().parse()?;
        let body = serde_json::to_vec(&item.arguments)?;

        let mut request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))?;
        context.set_headers(request.headers_mut());

        Ok(request)
    }

    /// Send `item` upstream and return the upstream status.
    pub async fn forward(
        &self,
        context: &TraceContext,
        item: &TestRequest,
    ) -> Result<StatusCode, ForwardError> {
        let request = self.build_request(context, item)?;

        tracing::debug!(
            url = %item.url,
            traceparent = %context.trace_parent,
            "Forwarding test request"
        );

        let response: Response<Incoming> =
            tokio::time::timeout(self.timeout, self.client.request(request))
                .await
                .map_err(|_| ForwardError::Timeout(self.timeout))??;

        Ok(response.status())
    }
}
