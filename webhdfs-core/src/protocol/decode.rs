//! # Response Decoding
//!
//! A [`ResponseDecoder`] turns the raw answer of one namenode into either a typed value or an
//! [`EndpointError`]. The dispatcher copies the status and headers into the returned
//! [`crate::Response`] before calling it, so decoders only care about the body.
//!
//! Every decoder follows the same rules:
//!
//! * A `2xx` status is a success. Void operations ignore the body entirely.
//! * Any other status is decoded as a `RemoteException` envelope. A body that is not a valid
//!   envelope becomes a [`TransportError::MalformedEnvelope`] quoting a truncated preview.
//! * An empty body on a failing status carries no detail. Whether that is a failure or a success
//!   depends on the operation, see [`EmptyErrorBody`].
use crate::error::{EndpointError, RemoteException, TransportError, body_preview};
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// What to do with a failing status that comes with an empty body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyErrorBody {
    /// Report an [`EndpointError::Status`].
    #[default]
    Failure,
    /// Treat the response as a success.
    Success,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    #[serde(rename = "RemoteException")]
    remote_exception: RemoteException,
}

/// The response half of an operation.
pub trait ResponseDecoder: Send + Sync {
    type Output: Send;

    fn decode(
        &self,
        status: StatusCode,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<Self::Output, EndpointError>;
}

/// Decodes the error envelope of a failing response.
pub fn decode_failure(status: StatusCode, body: &[u8]) -> EndpointError {
    if body.is_empty() {
        return EndpointError::Status(status);
    }

    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) if envelope.remote_exception.exception.is_empty() => {
            EndpointError::Status(status)
        }
        Ok(envelope) => EndpointError::Remote(envelope.remote_exception),
        Err(source) => EndpointError::Transport(TransportError::MalformedEnvelope {
            preview: body_preview(body),
            source,
        }),
    }
}

/// Decoder of operations without a payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct Void {
    on_empty_error_body: EmptyErrorBody,
}

impl Void {
    pub const fn new(on_empty_error_body: EmptyErrorBody) -> Self {
        Self {
            on_empty_error_body,
        }
    }
}

impl ResponseDecoder for Void {
    type Output = ();

    fn decode(
        &self,
        status: StatusCode,
        _headers: &HeaderMap,
        body: Bytes,
    ) -> Result<(), EndpointError> {
        if status.is_success() {
            return Ok(());
        }
        if body.is_empty() && self.on_empty_error_body == EmptyErrorBody::Success {
            return Ok(());
        }
        Err(decode_failure(status, &body))
    }
}

/// Decoder of operations with a JSON payload.
///
/// `T` is the wire shape (WebHDFS wraps most payloads in a single-key object) and `map`
/// extracts the value handed back to the caller.
pub struct Json<T, O = T> {
    map: fn(T) -> O,
    _wire: PhantomData<fn() -> T>,
}

impl<T> Json<T, T> {
    pub fn plain() -> Self {
        Self::new(std::convert::identity)
    }
}

impl<T, O> Json<T, O> {
    pub fn new(map: fn(T) -> O) -> Self {
        Self {
            map,
            _wire: PhantomData,
        }
    }
}

impl<T, O> ResponseDecoder for Json<T, O>
where
    T: DeserializeOwned,
    O: Send,
{
    type Output = O;

    fn decode(
        &self,
        status: StatusCode,
        _headers: &HeaderMap,
        body: Bytes,
    ) -> Result<O, EndpointError> {
        if !status.is_success() {
            return Err(decode_failure(status, &body));
        }

        serde_json::from_slice::<T>(&body)
            .map(self.map)
            .map_err(|source| {
                EndpointError::Transport(TransportError::MalformedBody {
                    preview: body_preview(&body),
                    source,
                })
            })
    }
}

/// Decoder of operations that return raw file content.
#[derive(Debug, Clone, Copy, Default)]
pub struct Raw;

impl ResponseDecoder for Raw {
    type Output = Bytes;

    fn decode(
        &self,
        status: StatusCode,
        _headers: &HeaderMap,
        body: Bytes,
    ) -> Result<Bytes, EndpointError> {
        if status.is_success() {
            Ok(body)
        } else {
            Err(decode_failure(status, &body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MAX_BODY_PREVIEW;

    const STANDBY: &str = r#"{"RemoteException":{"exception":"StandbyException","message":"Operation category READ is not supported in state standby","javaClassName":"org.apache.hadoop.ipc.StandbyException"}}"#;

    fn decode<D: ResponseDecoder>(
        decoder: &D,
        status: StatusCode,
        body: &[u8],
    ) -> Result<D::Output, EndpointError> {
        decoder.decode(status, &HeaderMap::new(), Bytes::copy_from_slice(body))
    }

    #[test]
    fn test_void_success_ignores_body() {
        let decoder = Void::default();
        assert!(decode(&decoder, StatusCode::OK, b"").is_ok());
        assert!(decode(&decoder, StatusCode::OK, b"garbage").is_ok());
    }

    #[test]
    fn test_remote_exception_is_decoded() {
        let err = decode(
            &Void::default(),
            StatusCode::FORBIDDEN,
            STANDBY.as_bytes(),
        )
        .unwrap_err();

        let exception = err.remote_exception().unwrap();
        assert_eq!(exception.exception, "StandbyException");
        assert_eq!(
            exception.java_class_name,
            "org.apache.hadoop.ipc.StandbyException"
        );
    }

    #[test]
    fn test_empty_error_body_policies() {
        let strict = Void::new(EmptyErrorBody::Failure);
        let tolerant = Void::new(EmptyErrorBody::Success);

        match decode(&strict, StatusCode::INTERNAL_SERVER_ERROR, b"") {
            Err(EndpointError::Status(status)) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR)
            }
            other => panic!("Expected a status failure, got {other:?}"),
        }
        assert!(decode(&tolerant, StatusCode::INTERNAL_SERVER_ERROR, b"").is_ok());
    }

    #[test]
    fn test_tolerant_policy_still_reports_exceptions() {
        let tolerant = Void::new(EmptyErrorBody::Success);
        let err = decode(&tolerant, StatusCode::FORBIDDEN, STANDBY.as_bytes()).unwrap_err();
        assert!(err.remote_exception().is_some());
    }

    #[test]
    fn test_malformed_envelope_is_a_transport_error_with_bounded_preview() {
        let body = "<html>".repeat(1000);
        let err = decode(&Void::default(), StatusCode::BAD_GATEWAY, body.as_bytes()).unwrap_err();

        match &err {
            EndpointError::Transport(TransportError::MalformedEnvelope { preview, .. }) => {
                assert!(preview.starts_with("<html>"));
                assert!(preview.len() <= MAX_BODY_PREVIEW + 3);
            }
            other => panic!("Expected a malformed envelope, got {other:?}"),
        }
        assert!(err.is_transport());
        assert!(err.to_string().starts_with("Malformed error envelope <html>"));
    }

    #[test]
    fn test_envelope_with_other_shape_is_rejected() {
        let err = decode(
            &Void::default(),
            StatusCode::NOT_FOUND,
            br#"{"error":"not found"}"#,
        )
        .unwrap_err();
        assert!(err.is_transport());
    }

    #[derive(Deserialize)]
    struct Wrapped {
        #[serde(rename = "Path")]
        path: String,
    }

    #[test]
    fn test_json_maps_wire_shape() {
        let decoder = Json::new(|w: Wrapped| w.path);
        let path = decode(&decoder, StatusCode::OK, br#"{"Path":"/user/hdfs"}"#).unwrap();
        assert_eq!(path, "/user/hdfs");
    }

    #[test]
    fn test_json_with_invalid_payload_is_a_malformed_body() {
        let decoder = Json::new(|w: Wrapped| w.path);
        let err = decode(&decoder, StatusCode::OK, b"").unwrap_err();
        assert!(matches!(
            err,
            EndpointError::Transport(TransportError::MalformedBody { .. })
        ));
    }

    #[test]
    fn test_raw_returns_body() {
        let body = decode(&Raw, StatusCode::OK, b"hello").unwrap();
        assert_eq!(&body[..], b"hello");
    }
}
