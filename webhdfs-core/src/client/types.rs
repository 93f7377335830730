use http::{HeaderMap, StatusCode};

/// A successful answer, tagged with the namenode that produced it.
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The `host:port` of the namenode that answered.
    pub namenode: String,
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// The decoded payload, `()` for operations without one.
    pub value: T,
}

impl<T> Response<T> {
    pub fn into_value(self) -> T {
        self.value
    }

    /// Transforms the payload, keeping the transport metadata.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            namenode: self.namenode,
            status: self.status,
            headers: self.headers,
            value: f(self.value),
        }
    }
}
