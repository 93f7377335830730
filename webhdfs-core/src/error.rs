//! # Error Taxonomy
//!
//! Failures are split by where they happen, so that callers can tell a bug in their request from a
//! namenode that is down from a namenode that answered "no".
//!
//! - **[`ValidationError`]**: the request is structurally invalid. Raised before any network call.
//! - **[`TransportError`]**: the request never produced a usable answer (connection refused,
//!   timeout, cancellation, or an error body the server should never have sent).
//! - **[`RemoteException`]**: the namenode answered with a well-formed `RemoteException` envelope
//!   (e.g. `StandbyException`, `FileNotFoundException`).
//! - **[`EndpointError`]**: any of the two above, recorded for a single namenode.
//! - **[`AggregateError`]**: every namenode failed. Holds one [`AttemptFailure`] per namenode, in
//!   attempt order.
//! - **[`DispatchError`]**: what a call returns to the caller.
use crate::BoxError;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Upper bound, in bytes, of a response body quoted inside an error message.
pub const MAX_BODY_PREVIEW: usize = 1024;

/// A required field of an operation is absent or unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),
    #[error("Path '{0}' must be absolute")]
    RelativePath(String),
    #[error("Invalid value for '{field}': '{reason}'")]
    InvalidValue { field: &'static str, reason: String },
}

/// Failures that occur below the protocol layer for a single namenode.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Invalid url '{url}': '{source}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Failed to send request: '{0}'")]
    Send(#[source] BoxError),
    #[error("Failed to read response body: '{0}'")]
    Body(#[source] BoxError),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Request was cancelled")]
    Cancelled,
    #[error("Malformed error envelope {preview}: {source}")]
    MalformedEnvelope {
        preview: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to decode response body {preview}: {source}")]
    MalformedBody {
        preview: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A server-side exception as reported in the WebHDFS error envelope.
///
/// ```json
/// {"RemoteException": {"exception": "StandbyException", "message": "...", "javaClassName": "..."}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{exception}: {message}")]
pub struct RemoteException {
    pub exception: String,
    pub message: String,
    pub java_class_name: String,
}

/// The failure recorded for one namenode.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Remote exception '{0}'")]
    Remote(#[from] RemoteException),
    #[error("Namenode responded with status {0} and no error detail")]
    Status(StatusCode),
}

impl EndpointError {
    /// Returns the remote exception, if the namenode reported one.
    pub fn remote_exception(&self) -> Option<&RemoteException> {
        match self {
            EndpointError::Remote(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, EndpointError::Transport(_))
    }
}

/// A failed attempt against a single namenode.
#[derive(Debug)]
pub struct AttemptFailure {
    pub endpoint: String,
    pub error: EndpointError,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}': {}", self.endpoint, self.error)
    }
}

/// Every configured namenode failed.
///
/// Failures are kept in the order the namenodes were tried.
#[derive(Debug)]
pub struct AggregateError {
    failures: Vec<AttemptFailure>,
}

impl AggregateError {
    pub(crate) fn new(failures: Vec<AttemptFailure>) -> Self {
        Self { failures }
    }

    pub fn failures(&self) -> &[AttemptFailure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<AttemptFailure> {
        self.failures
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Iterates over the remote exceptions reported by the namenodes, skipping transport failures.
    pub fn remote_exceptions(&self) -> impl Iterator<Item = &RemoteException> {
        self.failures
            .iter()
            .filter_map(|failure| failure.error.remote_exception())
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "All {} namenodes failed", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            write!(f, "; #{} {}", i + 1, failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

/// Errors returned by a dispatch.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Invalid request: '{0}'")]
    Validation(#[from] ValidationError),
    #[error("missing namenode addresses")]
    MissingAddresses,
    #[error("Pre-send hook failed: '{0}'")]
    PreSend(#[source] BoxError),
    #[error("Dispatch cancelled while contacting '{endpoint}'")]
    Cancelled {
        endpoint: String,
        #[source]
        source: TransportError,
        /// Namenodes that had already failed before the cancellation, in attempt order.
        failed: Vec<AttemptFailure>,
    },
    #[error(transparent)]
    AllFailed(#[from] AggregateError),
}

impl DispatchError {
    pub(crate) fn cancelled(endpoint: &str, failed: Vec<AttemptFailure>) -> Self {
        DispatchError::Cancelled {
            endpoint: endpoint.to_string(),
            source: TransportError::Cancelled,
            failed,
        }
    }

    /// True when the error comes from the caller's cancellation token.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DispatchError::Cancelled { .. })
    }
}

/// Renders at most [`MAX_BODY_PREVIEW`] bytes of `body`, cut on a char boundary.
pub(crate) fn body_preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= MAX_BODY_PREVIEW {
        return text.into_owned();
    }

    let mut end = MAX_BODY_PREVIEW;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(exception: &str) -> EndpointError {
        EndpointError::Remote(RemoteException {
            exception: exception.to_string(),
            message: "nope".to_string(),
            java_class_name: format!("org.apache.hadoop.{exception}"),
        })
    }

    #[test]
    fn test_short_body_is_not_truncated() {
        assert_eq!(body_preview(b"not json"), "not json");
    }

    #[test]
    fn test_long_body_is_truncated() {
        let body = "x".repeat(MAX_BODY_PREVIEW * 4);
        let preview = body_preview(body.as_bytes());

        assert_eq!(preview.len(), MAX_BODY_PREVIEW + 3);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        // 'é' is two bytes, so the limit falls in the middle of a char
        let body = format!("a{}", "é".repeat(MAX_BODY_PREVIEW));
        let preview = body_preview(body.as_bytes());

        assert!(preview.len() <= MAX_BODY_PREVIEW + 3);
        assert!(preview.starts_with("aé"));
    }

    #[test]
    fn test_aggregate_display_is_in_attempt_order() {
        let err = AggregateError::new(vec![
            AttemptFailure {
                endpoint: "h1:50070".to_string(),
                error: remote("StandbyException"),
            },
            AttemptFailure {
                endpoint: "h2:50070".to_string(),
                error: EndpointError::Transport(TransportError::Cancelled),
            },
            AttemptFailure {
                endpoint: "h3:50070".to_string(),
                error: EndpointError::Status(StatusCode::BAD_GATEWAY),
            },
        ]);

        let rendered = err.to_string();
        assert!(rendered.starts_with("All 3 namenodes failed"));

        let h1 = rendered.find("h1:50070").unwrap();
        let h2 = rendered.find("h2:50070").unwrap();
        let h3 = rendered.find("h3:50070").unwrap();
        assert!(h1 < h2 && h2 < h3);
        assert!(rendered.contains("StandbyException: nope"));
        assert!(rendered.contains("502"));
    }

    #[test]
    fn test_remote_exceptions_skips_transport_failures() {
        let err = AggregateError::new(vec![
            AttemptFailure {
                endpoint: "h1".to_string(),
                error: EndpointError::Transport(TransportError::Timeout(Duration::from_secs(1))),
            },
            AttemptFailure {
                endpoint: "h2".to_string(),
                error: remote("AccessControlException"),
            },
        ]);

        let names: Vec<_> = err.remote_exceptions().map(|e| e.exception.as_str()).collect();
        assert_eq!(names, vec!["AccessControlException"]);
    }
}
