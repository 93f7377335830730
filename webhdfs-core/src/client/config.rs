//! # Client Configuration
//!
//! [`ClientConfig`] is the serializable part of a [`super::WebHdfsClient`]: the namenode addresses,
//! the scheme, the per-attempt timeout and the request parameters applied to every call.
//!
//! ```json
//! {
//!   "addresses": ["nn1.example.com:9870", "nn2.example.com:9870"],
//!   "tls": false,
//!   "timeout_ms": 5000,
//!   "params": { "proxy": { "user_name": "hdfs" } }
//! }
//! ```
use crate::protocol::RequestParams;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': '{source}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: '{0}'")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Namenode `host:port` addresses, tried in this order.
    #[serde(default)]
    pub addresses: Vec<String>,
    /// Use `https` instead of `http`.
    #[serde(default)]
    pub tls: bool,
    /// Upper bound of a single attempt against one namenode.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Parameters applied to every request unless the request sets its own.
    #[serde(default)]
    pub params: RequestParams,
}

impl ClientConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub(crate) fn scheme(&self) -> &'static str {
        if self.tls { "https" } else { "http" }
    }
}
