//! An in-memory cluster of scripted namenodes.
//!
//! Each `host:port` is given a [`Reply`]. Every request reaching the transport is recorded, so
//! tests can assert which namenodes were contacted and in which order.
#![allow(dead_code)]

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use webhdfs_core::TransportError;
use webhdfs_core::transport::{HttpRequest, HttpResponse, HttpTransport};

pub const STANDBY: &str = r#"{"RemoteException":{"exception":"StandbyException","message":"Operation category READ is not supported in state standby","javaClassName":"org.apache.hadoop.ipc.StandbyException"}}"#;

pub const FILE_STATUS: &str = r#"{"FileStatus":{"accessTime":1610614972965,"blockSize":134217728,"childrenNum":0,"fileId":17460,"group":"supergroup","length":83910,"modificationTime":1610614973143,"owner":"hdfs","pathSuffix":"","permission":"644","replication":3,"storagePolicy":0,"type":"FILE"}}"#;

#[derive(Debug, Clone)]
pub enum Reply {
    /// Answer with a status and a body.
    Respond(StatusCode, &'static str),
    /// Fail before any response, like a refused connection.
    Refuse,
    /// Never answer.
    Hang,
    /// Wait, then play the inner reply.
    Delay(Duration, Box<Reply>),
}

impl Reply {
    pub fn ok(body: &'static str) -> Self {
        Reply::Respond(StatusCode::OK, body)
    }

    pub fn status(status: u16, body: &'static str) -> Self {
        Reply::Respond(StatusCode::from_u16(status).unwrap(), body)
    }

    pub fn after(self, delay: Duration) -> Self {
        Reply::Delay(delay, Box::new(self))
    }

    async fn play(mut self) -> Result<HttpResponse, TransportError> {
        loop {
            match self {
                Reply::Respond(status, body) => {
                    return Ok(HttpResponse {
                        status,
                        headers: HeaderMap::new(),
                        body: Bytes::from_static(body.as_bytes()),
                    });
                }
                Reply::Refuse => return Err(TransportError::Send("connection refused".into())),
                Reply::Hang => return std::future::pending().await,
                Reply::Delay(delay, next) => {
                    tokio::time::sleep(delay).await;
                    self = *next;
                }
            }
        }
    }
}

/// [`HttpTransport`] answering from a script instead of the network.
#[derive(Debug, Clone, Default)]
pub struct ScriptedNamenodes {
    replies: Arc<Mutex<HashMap<String, Reply>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ScriptedNamenodes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the reply of `endpoint`. Unscripted endpoints refuse the connection.
    pub fn on(self, endpoint: &str, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), reply);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The `host:port` of every request, in the order they were sent.
    pub fn contacted(&self) -> Vec<String> {
        self.requests().iter().map(endpoint_of).collect()
    }
}

impl HttpTransport for ScriptedNamenodes {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(&endpoint_of(&request))
            .cloned()
            .unwrap_or(Reply::Refuse);

        self.requests.lock().unwrap().push(request);

        reply.play()
    }
}

fn endpoint_of(request: &HttpRequest) -> String {
    format!(
        "{}:{}",
        request.url.host_str().unwrap_or_default(),
        request.url.port_or_known_default().unwrap_or_default()
    )
}
