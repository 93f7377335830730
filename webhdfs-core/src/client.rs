//! # WebHDFS Client
//!
//! This module implements the dispatcher shared by every WebHDFS operation.
//!
//! A call goes through the following steps:
//!
//! 1. **Validation**: the descriptor checks its required fields. Nothing is sent on failure.
//! 2. **Rendering**: the path, query string and headers are rendered once, with the client
//!    default [`RequestParams`] filling whatever the request leaves unset.
//! 3. **Failover**: the namenodes are tried one at a time, in the configured order. A transport
//!    failure or a `RemoteException` is recorded and the next namenode is tried. The first
//!    success is returned, tagged with the namenode that produced it.
//! 4. **Aggregation**: when every namenode failed, all the recorded failures are returned as one
//!    [`AggregateError`], in attempt order.
//!
//! Namenodes are never contacted concurrently. A mutating operation (e.g. `RENAME`) must not reach
//! two namenodes at the same time.
//!
//! ## Cancellation
//!
//! [`WebHdfsClient::call_with_cancel`] takes a [`CancellationToken`]. Cancelling it aborts the
//! in-flight attempt and the whole call: the remaining namenodes are not tried. This is different
//! from the per-attempt timeout, which only gives up on the current namenode.
//!
//! ## Example
//!
//! ```rust,no_run
//! use webhdfs_core::{WebHdfsClient, ops::file::ListStatus};
//! use webhdfs_core::tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = WebHdfsClient::builder()
//!     .addresses(["nn1:9870", "nn2:9870"])
//!     .build()?;
//!
//! let token = CancellationToken::new();
//! let listing = client.call_with_cancel(&ListStatus::new("/data"), &token).await?;
//! for entry in listing.value {
//!     println!("{}", entry.path_suffix);
//! }
//! # Ok(())
//! # }
//! ```
mod config;
mod types;

pub use config::{ClientConfig, ConfigError};
pub use types::Response;

use crate::{
    BoxError,
    error::{AggregateError, AttemptFailure, DispatchError, EndpointError, TransportError},
    protocol::{
        Operation, PATH_PREFIX, RequestDescriptor, RequestParams, ResponseDecoder, render_query,
    },
    transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport},
};
use std::{fmt, sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Hook run on every rendered request right before it is sent, e.g. to inject auth headers.
pub type PreSendHook = Arc<dyn Fn(&mut HttpRequest) -> Result<(), BoxError> + Send + Sync>;

/// Output type of an operation's decoder.
pub type OutputOf<O> = <<O as Operation>::Decoder as ResponseDecoder>::Output;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to build the HTTP client: '{0}'")]
    Http(#[from] reqwest::Error),
}

/// A WebHDFS client talking to a set of redundant namenodes.
#[derive(Clone)]
pub struct WebHdfsClient<T = ReqwestTransport> {
    transport: T,
    addresses: Arc<[String]>,
    scheme: &'static str,
    timeout: Option<Duration>,
    defaults: RequestParams,
    pre_send: Option<PreSendHook>,
}

impl<T: fmt::Debug> fmt::Debug for WebHdfsClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebHdfsClient")
            .field("transport", &self.transport)
            .field("addresses", &self.addresses)
            .field("scheme", &self.scheme)
            .field("timeout", &self.timeout)
            .field("defaults", &self.defaults)
            .field("pre_send", &self.pre_send.is_some())
            .finish()
    }
}

/// Builder of [`WebHdfsClient`].
#[derive(Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    pre_send: Option<PreSendHook>,
    http_client: Option<reqwest::Client>,
}

impl ClientBuilder {
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Appends a namenode `host:port` address.
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.config.addresses.push(address.into());
        self
    }

    pub fn addresses<I, S>(mut self, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config
            .addresses
            .extend(addresses.into_iter().map(Into::into));
        self
    }

    pub fn tls(mut self, tls: bool) -> Self {
        self.config.tls = tls;
        self
    }

    /// Upper bound of a single attempt. A namenode that doesn't answer in time is recorded as
    /// failed and the next one is tried.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Parameters applied to every request that doesn't set its own.
    pub fn params(mut self, params: RequestParams) -> Self {
        self.config.params = params;
        self
    }

    pub fn pre_send<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut HttpRequest) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.pre_send = Some(Arc::new(hook));
        self
    }

    /// Uses an existing `reqwest::Client` instead of building a default one.
    pub fn reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn build(mut self) -> Result<WebHdfsClient<ReqwestTransport>, BuildError> {
        let client = match self.http_client.take() {
            Some(client) => client,
            None => reqwest::Client::builder().build()?,
        };
        Ok(self.build_with(ReqwestTransport::new(client)))
    }

    /// Builds the client on top of a custom transport.
    pub fn build_with<T: HttpTransport>(self, transport: T) -> WebHdfsClient<T> {
        WebHdfsClient {
            transport,
            scheme: self.config.scheme(),
            timeout: self.config.timeout(),
            addresses: self.config.addresses.into(),
            defaults: self.config.params,
            pre_send: self.pre_send,
        }
    }
}

impl WebHdfsClient<ReqwestTransport> {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, BuildError> {
        ClientBuilder::from_config(config).build()
    }
}

impl<T: HttpTransport> WebHdfsClient<T> {
    /// The namenode addresses, in the order they are tried.
    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    /// Executes an operation.
    pub async fn call<O>(&self, op: &O) -> Result<Response<OutputOf<O>>, DispatchError>
    where
        O: Operation + ?Sized,
    {
        self.dispatch(op, &op.decoder(), None).await
    }

    /// Executes an operation, giving up on every remaining namenode once `cancel` is cancelled.
    pub async fn call_with_cancel<O>(
        &self,
        op: &O,
        cancel: &CancellationToken,
    ) -> Result<Response<OutputOf<O>>, DispatchError>
    where
        O: Operation + ?Sized,
    {
        self.dispatch(op, &op.decoder(), Some(cancel)).await
    }

    /// Sends `descriptor` to the namenodes in order and decodes the first answer with `decoder`.
    ///
    /// # Returns
    ///
    /// * `Ok(Response)` - The first namenode that succeeded, with its decoded payload.
    /// * `Err(DispatchError::Validation)` - The descriptor is invalid, nothing was sent.
    /// * `Err(DispatchError::MissingAddresses)` - No namenode is configured, nothing was sent.
    /// * `Err(DispatchError::Cancelled)` - The token was cancelled, remaining namenodes skipped.
    /// * `Err(DispatchError::AllFailed)` - Every namenode failed, one failure each.
    pub async fn dispatch<D, R>(
        &self,
        descriptor: &D,
        decoder: &R,
        cancel: Option<&CancellationToken>,
    ) -> Result<Response<R::Output>, DispatchError>
    where
        D: RequestDescriptor + ?Sized,
        R: ResponseDecoder,
    {
        descriptor.validate()?;

        let params = match descriptor.params() {
            Some(params) => params.merged_over(&self.defaults),
            None => self.defaults.clone(),
        };
        let headers = params.headers()?;

        if self.addresses.is_empty() {
            return Err(DispatchError::MissingAddresses);
        }

        let op = descriptor.op();
        let method = descriptor.method();
        let query = render_query(descriptor, &params).encode();
        let path = descriptor.path();
        let body = descriptor.body();

        let mut failures = Vec::with_capacity(self.addresses.len());

        for endpoint in self.addresses.iter() {
            if let Some(token) = cancel
                && token.is_cancelled()
            {
                tracing::info!(namenode = %endpoint, %op, "Call cancelled before attempt");
                return Err(DispatchError::cancelled(endpoint, failures));
            }

            let url = match self.url(endpoint, &path, &query) {
                Ok(url) => url,
                Err(error) => {
                    record_failure(&mut failures, endpoint, error.into());
                    continue;
                }
            };

            let mut request = HttpRequest {
                method: method.clone(),
                url,
                headers: headers.clone(),
                body: body.clone(),
            };

            if let Some(hook) = &self.pre_send {
                hook(&mut request).map_err(DispatchError::PreSend)?;
            }

            tracing::debug!(namenode = %endpoint, %op, %method, url = %request.url, "Sending request");

            let outcome = match cancel {
                Some(token) => {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => {
                            tracing::info!(namenode = %endpoint, %op, "Call cancelled during attempt");
                            return Err(DispatchError::cancelled(endpoint, failures));
                        }
                        outcome = self.send(request) => outcome,
                    }
                }
                None => self.send(request).await,
            };

            let HttpResponse {
                status,
                headers,
                body,
            } = match outcome {
                Ok(response) => response,
                Err(error) => {
                    record_failure(&mut failures, endpoint, error.into());
                    continue;
                }
            };

            match decoder.decode(status, &headers, body) {
                Ok(value) => {
                    tracing::debug!(namenode = %endpoint, %op, %status, "Request succeeded");
                    return Ok(Response {
                        namenode: endpoint.clone(),
                        status,
                        headers,
                        value,
                    });
                }
                Err(error) => record_failure(&mut failures, endpoint, error),
            }
        }

        Err(AggregateError::new(failures).into())
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.transport.send(request))
                .await
                .unwrap_or(Err(TransportError::Timeout(limit))),
            None => self.transport.send(request).await,
        }
    }

    fn url(&self, endpoint: &str, path: &str, query: &str) -> Result<Url, TransportError> {
        let base = format!("{}://{}", self.scheme, endpoint);
        let mut url = Url::parse(&base).map_err(|source| TransportError::InvalidUrl {
            url: base.clone(),
            source,
        })?;
        url.set_path(PATH_PREFIX);
        // Each segment is percent-encoded, `%` included, so the namenode sees the literal name.
        url.path_segments_mut()
            .map_err(|()| TransportError::InvalidUrl {
                url: base,
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            })?
            .extend(path.split('/').skip(1));
        url.set_query(Some(query));
        Ok(url)
    }
}

fn record_failure(failures: &mut Vec<AttemptFailure>, endpoint: &str, error: EndpointError) {
    tracing::warn!(namenode = %endpoint, %error, "Namenode attempt failed");
    failures.push(AttemptFailure {
        endpoint: endpoint.to_string(),
        error,
    });
}
