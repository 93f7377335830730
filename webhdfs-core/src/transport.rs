//! # HTTP Transport
//!
//! The dispatcher does not talk to `reqwest` directly. It hands fully rendered [`HttpRequest`]s to
//! an [`HttpTransport`] and receives [`HttpResponse`]s with the body already read, so the body is
//! an owned value that is released whenever the response is dropped.
//!
//! [`ReqwestTransport`] is the production implementation. Connection pooling, TLS and redirect
//! following (needed by the data-plane operations that bounce from a namenode to a datanode) are
//! all delegated to the wrapped `reqwest::Client`.
use crate::error::TransportError;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode, header::CONTENT_TYPE};
use std::future::Future;
use url::Url;

/// A request ready to be sent to one namenode.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// A response received from one namenode.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Pluggable HTTP backend used by [`crate::WebHdfsClient`].
pub trait HttpTransport: Send + Sync {
    /// Sends the request and reads the whole response body.
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// [`HttpTransport`] backed by a `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;
        let has_content_type = headers.contains_key(CONTENT_TYPE);
        let mut builder = self.client.request(method, url).headers(headers);

        if let Some(body) = body {
            if !has_content_type {
                builder = builder.header(CONTENT_TYPE, "application/octet-stream");
            }
            builder = builder.body(body);
        }

        async move {
            let response = builder
                .send()
                .await
                .map_err(|e| TransportError::Send(e.into()))?;

            let status = response.status();
            let headers = response.headers().clone();
            let body = response
                .bytes()
                .await
                .map_err(|e| TransportError::Body(e.into()))?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}
