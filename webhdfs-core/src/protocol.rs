//! # WebHDFS Protocol
//!
//! This module contains the building blocks shared by every WebHDFS operation:
//!
//! * **[`Op`]**: the value of the mandatory `op` query parameter, and the HTTP method it uses.
//! * **[`Query`]**: an ordered list of query parameters that always starts with the `op` key.
//! * **[`RequestParams`]**: the optional fragments every operation accepts (delegation token,
//!   proxy user, CSRF header, connection options).
//! * **[`RequestDescriptor`]** and **[`Operation`]**: the traits a concrete operation implements so
//!   the dispatcher can render it without knowing anything about it.
//! * **[`decode`]**: the response side, see [`ResponseDecoder`].
pub mod decode;

pub use decode::{EmptyErrorBody, Json, Raw, ResponseDecoder, Void};

use crate::error::ValidationError;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed prefix of every WebHDFS URL path.
pub const PATH_PREFIX: &str = "/webhdfs/v1";

/// The operation name query key.
pub const OP_KEY: &str = "op";

pub const XSRF_HEADER: &str = "X-XSRF-HEADER";

/// WebHDFS operation names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Open,
    GetFileStatus,
    ListStatus,
    GetContentSummary,
    GetHomeDirectory,
    MkDirs,
    Rename,
    Delete,
    Create,
    Append,
    SetPermission,
    SetOwner,
    GetXAttrs,
    ListXAttrs,
    SetXAttr,
    RemoveXAttr,
    GetAllStoragePolicy,
    GetStoragePolicy,
    SetStoragePolicy,
    UnsetStoragePolicy,
    SatisfyStoragePolicy,
    GetECPolicy,
    EnableECPolicy,
    DisableECPolicy,
    SetECPolicy,
    UnsetECPolicy,
}

impl Op {
    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Open => "OPEN",
            Op::GetFileStatus => "GETFILESTATUS",
            Op::ListStatus => "LISTSTATUS",
            Op::GetContentSummary => "GETCONTENTSUMMARY",
            Op::GetHomeDirectory => "GETHOMEDIRECTORY",
            Op::MkDirs => "MKDIRS",
            Op::Rename => "RENAME",
            Op::Delete => "DELETE",
            Op::Create => "CREATE",
            Op::Append => "APPEND",
            Op::SetPermission => "SETPERMISSION",
            Op::SetOwner => "SETOWNER",
            Op::GetXAttrs => "GETXATTRS",
            Op::ListXAttrs => "LISTXATTRS",
            Op::SetXAttr => "SETXATTR",
            Op::RemoveXAttr => "REMOVEXATTR",
            Op::GetAllStoragePolicy => "GETALLSTORAGEPOLICY",
            Op::GetStoragePolicy => "GETSTORAGEPOLICY",
            Op::SetStoragePolicy => "SETSTORAGEPOLICY",
            Op::UnsetStoragePolicy => "UNSETSTORAGEPOLICY",
            Op::SatisfyStoragePolicy => "SATISFYSTORAGEPOLICY",
            Op::GetECPolicy => "GETECPOLICY",
            Op::EnableECPolicy => "ENABLEECPOLICY",
            Op::DisableECPolicy => "DISABLEECPOLICY",
            Op::SetECPolicy => "SETECPOLICY",
            Op::UnsetECPolicy => "UNSETECPOLICY",
        }
    }

    /// The HTTP method the namenode expects for this operation.
    pub fn method(&self) -> Method {
        match self {
            Op::Open
            | Op::GetFileStatus
            | Op::ListStatus
            | Op::GetContentSummary
            | Op::GetHomeDirectory
            | Op::GetXAttrs
            | Op::ListXAttrs
            | Op::GetAllStoragePolicy
            | Op::GetStoragePolicy
            | Op::GetECPolicy => Method::GET,
            Op::MkDirs
            | Op::Rename
            | Op::Create
            | Op::SetPermission
            | Op::SetOwner
            | Op::SetXAttr
            | Op::RemoveXAttr
            | Op::SetStoragePolicy
            | Op::SatisfyStoragePolicy
            | Op::EnableECPolicy
            | Op::DisableECPolicy
            | Op::SetECPolicy => Method::PUT,
            Op::Append | Op::UnsetStoragePolicy | Op::UnsetECPolicy => Method::POST,
            Op::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query parameters of a WebHDFS request.
///
/// The first pair is always `op`, and it is the only `op` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new(op: Op) -> Self {
        Self {
            pairs: vec![(OP_KEY.to_string(), op.as_str().to_string())],
        }
    }

    /// Appends a pair. Keys may repeat (e.g. `xattr.name`), except `op`.
    pub fn push(&mut self, key: &str, value: impl ToString) {
        debug_assert_ne!(key, OP_KEY, "the op key is set once by Query::new");
        if key == OP_KEY {
            return;
        }
        self.pairs.push((key.to_string(), value.to_string()));
    }

    /// Appends a pair only when the value is present.
    pub fn push_opt<T: ToString>(&mut self, key: &str, value: Option<T>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Returns the first value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// `application/x-www-form-urlencoded` rendering of the pairs.
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.pairs)
            .finish()
    }
}

/// Delegation token authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authentication {
    pub delegation: Option<String>,
}

/// Proxy user parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyUser {
    /// Authenticated user (`user.name`), when security is off.
    pub user_name: Option<String>,
    /// Proxied user (`doas`).
    pub doas: Option<String>,
}

/// Cross-site request forgery protection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Csrf {
    /// Value of the `X-XSRF-HEADER` header.
    pub xsrf_header: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpOptions {
    /// Ask the server to close the connection after the response.
    #[serde(default)]
    pub close: bool,
}

/// Optional parameters shared by every operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestParams {
    #[serde(default)]
    pub auth: Authentication,
    #[serde(default)]
    pub proxy: ProxyUser,
    #[serde(default)]
    pub csrf: Csrf,
    #[serde(default)]
    pub http: HttpOptions,
}

impl RequestParams {
    pub fn with_delegation(mut self, token: impl Into<String>) -> Self {
        self.auth.delegation = Some(token.into());
        self
    }

    pub fn with_user_name(mut self, user: impl Into<String>) -> Self {
        self.proxy.user_name = Some(user.into());
        self
    }

    pub fn with_doas(mut self, user: impl Into<String>) -> Self {
        self.proxy.doas = Some(user.into());
        self
    }

    pub fn with_xsrf_header(mut self, value: impl Into<String>) -> Self {
        self.csrf.xsrf_header = Some(value.into());
        self
    }

    pub fn with_connection_close(mut self, close: bool) -> Self {
        self.http.close = close;
        self
    }

    /// Fills every absent field of `self` from `defaults`.
    pub fn merged_over(&self, defaults: &RequestParams) -> RequestParams {
        RequestParams {
            auth: Authentication {
                delegation: self
                    .auth
                    .delegation
                    .clone()
                    .or_else(|| defaults.auth.delegation.clone()),
            },
            proxy: ProxyUser {
                user_name: self
                    .proxy
                    .user_name
                    .clone()
                    .or_else(|| defaults.proxy.user_name.clone()),
                doas: self
                    .proxy
                    .doas
                    .clone()
                    .or_else(|| defaults.proxy.doas.clone()),
            },
            csrf: Csrf {
                xsrf_header: self
                    .csrf
                    .xsrf_header
                    .clone()
                    .or_else(|| defaults.csrf.xsrf_header.clone()),
            },
            http: HttpOptions {
                close: self.http.close || defaults.http.close,
            },
        }
    }

    pub fn write_query(&self, query: &mut Query) {
        query.push_opt("delegation", self.auth.delegation.as_deref());
        query.push_opt("user.name", self.proxy.user_name.as_deref());
        query.push_opt("doas", self.proxy.doas.as_deref());
    }

    pub fn headers(&self) -> Result<HeaderMap, ValidationError> {
        let mut headers = HeaderMap::new();
        if let Some(value) = &self.csrf.xsrf_header {
            let value =
                HeaderValue::from_str(value).map_err(|e| ValidationError::InvalidValue {
                    field: XSRF_HEADER,
                    reason: e.to_string(),
                })?;
            headers.insert(HeaderName::from_static("x-xsrf-header"), value);
        }
        if self.http.close {
            headers.insert(http::header::CONNECTION, HeaderValue::from_static("close"));
        }
        Ok(headers)
    }
}

/// The request half of an operation.
///
/// Implementors render themselves as a filesystem path and a set of query parameters. The `op`
/// parameter and the shared [`RequestParams`] are added by the dispatcher.
pub trait RequestDescriptor: Send + Sync {
    fn op(&self) -> Op;

    fn method(&self) -> Method {
        self.op().method()
    }

    /// Absolute filesystem path, the root for cluster-wide operations.
    fn path(&self) -> &str {
        "/"
    }

    fn params(&self) -> Option<&RequestParams> {
        None
    }

    /// Appends the operation specific query parameters.
    fn write_query(&self, _query: &mut Query) {}

    /// Checks that every required field is present. Called before any network activity.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    fn body(&self) -> Option<Bytes> {
        None
    }
}

/// A request paired with the decoder of its response.
pub trait Operation: RequestDescriptor {
    type Decoder: ResponseDecoder;

    fn decoder(&self) -> Self::Decoder;
}

/// Builds the query string of `descriptor` with `params` applied.
pub fn render_query<D>(descriptor: &D, params: &RequestParams) -> Query
where
    D: RequestDescriptor + ?Sized,
{
    let mut query = Query::new(descriptor.op());
    params.write_query(&mut query);
    descriptor.write_query(&mut query);
    query
}

pub(crate) fn require_absolute(path: &str) -> Result<(), ValidationError> {
    if path.is_empty() {
        return Err(ValidationError::MissingField("path"));
    }
    if !path.starts_with('/') {
        return Err(ValidationError::RelativePath(path.to_string()));
    }
    Ok(())
}

pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}
