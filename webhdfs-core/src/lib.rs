//! # WebHDFS Core
//!
//! `webhdfs-core` is the library powering the `webhdfs` CLI. It provides a client for the
//! WebHDFS REST protocol (`/webhdfs/v1`) that talks to a set of redundant namenodes and
//! fails over between them until one of them answers.
//!
//! ## Key Components
//!
//! * **[`WebHdfsClient`]:** The main entry point. It renders operations into HTTP requests and
//!   dispatches them to the configured namenodes, one at a time, in order.
//! * **[`protocol::RequestDescriptor`] & [`protocol::ResponseDecoder`]:** The two halves every
//!   operation supplies. The descriptor knows how to render itself as a path and a query string,
//!   the decoder knows how to turn a raw response into a typed value or a [`RemoteException`].
//! * **[`ops`]:** The catalogue of concrete operations (files, permissions, xattrs, storage and
//!   erasure coding policies), each one a descriptor/decoder pair.
//!
//! ## Failover
//!
//! Only one namenode of an HA pair holds the authoritative answer, the others reply with a
//! `StandbyException` or don't reply at all. The client tries every address once, in the
//! configured order, and stops at the first success. When all of them fail the caller gets an
//! [`AggregateError`] holding every individual failure in attempt order.
//!
//! ## Transport
//!
//! The dispatcher is generic over [`transport::HttpTransport`]. The default implementation wraps a
//! `reqwest::Client`; tests plug in an in-memory namenode.
//!
//! ## Re-exports
//!
//! This crate re-exports `tokio-util` so that consumers build cancellation tokens with the same
//! version the client selects on.
//!
//! ```rust,no_run
//! use webhdfs_core::{WebHdfsClient, ops::file::GetFileStatus};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = WebHdfsClient::builder()
//!     .address("nn1.example.com:9870")
//!     .address("nn2.example.com:9870")
//!     .build()?;
//!
//! let status = client.call(&GetFileStatus::new("/data/a.txt")).await?;
//! println!("{} answered: {} bytes", status.namenode, status.value.length);
//! # Ok(())
//! # }
//! ```
pub mod client;
pub mod error;
pub mod ops;
pub mod protocol;
pub mod transport;
pub mod types;

pub use client::{ClientConfig, Response, WebHdfsClient};
pub use error::{
    AggregateError, AttemptFailure, DispatchError, EndpointError, RemoteException, TransportError,
    ValidationError,
};

// Re-exports
pub use tokio_util;

/// Type alias for the standard boxed error used in generic bounds.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
