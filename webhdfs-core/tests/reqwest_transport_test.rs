use mockito::{Matcher, Server};
use webhdfs_core::error::{EndpointError, TransportError};
use webhdfs_core::ops::file::{Create, GetFileStatus, ListStatus, Open};
use webhdfs_core::ops::xattr::ListXAttrs;
use webhdfs_core::protocol::RequestParams;
use webhdfs_core::{DispatchError, WebHdfsClient};

const STANDBY: &str = r#"{"RemoteException":{"exception":"StandbyException","message":"Operation category READ is not supported in state standby","javaClassName":"org.apache.hadoop.ipc.StandbyException"}}"#;

const FILE_STATUS: &str = r#"{"FileStatus":{"accessTime":0,"blockSize":134217728,"group":"supergroup","length":5,"modificationTime":1610614973143,"owner":"hdfs","pathSuffix":"","permission":"644","replication":3,"type":"FILE"}}"#;

// Nothing listens on the discard port in the test environment.
const UNREACHABLE: &str = "127.0.0.1:9";

#[tokio::test]
async fn test_standby_then_active() {
    let mut standby = Server::new_async().await;
    let mut active = Server::new_async().await;

    let standby_mock = standby
        .mock("GET", "/webhdfs/v1/a.txt")
        .match_query(Matcher::UrlEncoded("op".into(), "GETFILESTATUS".into()))
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(STANDBY)
        .expect(1)
        .create_async()
        .await;

    let active_mock = active
        .mock("GET", "/webhdfs/v1/a.txt")
        .match_query(Matcher::UrlEncoded("op".into(), "GETFILESTATUS".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(FILE_STATUS)
        .expect(1)
        .create_async()
        .await;

    let client = WebHdfsClient::builder()
        .addresses([standby.host_with_port(), active.host_with_port()])
        .build()
        .unwrap();

    let res = client.call(&GetFileStatus::new("/a.txt")).await.unwrap();

    assert_eq!(res.namenode, active.host_with_port());
    assert_eq!(res.value.owner, "hdfs");
    assert_eq!(
        res.headers.get("content-type").unwrap(),
        "application/json"
    );

    standby_mock.assert_async().await;
    active_mock.assert_async().await;
}

#[tokio::test]
async fn test_connection_failure_fails_over() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/webhdfs/v1/data")
        .match_query(Matcher::UrlEncoded("op".into(), "LISTSTATUS".into()))
        .with_status(200)
        .with_body(r#"{"FileStatuses":{"FileStatus":[]}}"#)
        .create_async()
        .await;

    let client = WebHdfsClient::builder()
        .addresses([UNREACHABLE.to_string(), server.host_with_port()])
        .build()
        .unwrap();

    let res = client.call(&ListStatus::new("/data")).await.unwrap();

    assert_eq!(res.namenode, server.host_with_port());
    assert!(res.value.is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_shared_params_reach_the_wire() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/webhdfs/v1/a.txt")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("op".into(), "LISTXATTRS".into()),
            Matcher::UrlEncoded("user.name".into(), "hdfs".into()),
            Matcher::UrlEncoded("delegation".into(), "tok/en=".into()),
        ]))
        .match_header("x-xsrf-header", "true")
        .match_header("connection", "close")
        .with_status(200)
        .with_body(r#"{"XAttrNames":"[\"user.color\"]"}"#)
        .create_async()
        .await;

    let client = WebHdfsClient::builder()
        .address(server.host_with_port())
        .params(
            RequestParams::default()
                .with_user_name("hdfs")
                .with_delegation("tok/en=")
                .with_xsrf_header("true")
                .with_connection_close(true),
        )
        .build()
        .unwrap();

    let res = client.call(&ListXAttrs::new("/a.txt")).await.unwrap();

    assert_eq!(res.value, vec!["user.color"]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_create_sends_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", "/webhdfs/v1/tmp/hello.txt")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("op".into(), "CREATE".into()),
            Matcher::UrlEncoded("overwrite".into(), "true".into()),
        ]))
        .match_header("content-type", "application/octet-stream")
        .match_body("hello")
        .with_status(201)
        .create_async()
        .await;

    let client = WebHdfsClient::builder()
        .address(server.host_with_port())
        .build()
        .unwrap();

    let op = Create::new("/tmp/hello.txt", "hello").with_overwrite(true);
    let res = client.call(&op).await.unwrap();

    assert_eq!(res.status, 201);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_open_returns_raw_content() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/webhdfs/v1/a.txt")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("op".into(), "OPEN".into()),
            Matcher::UrlEncoded("offset".into(), "2".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/octet-stream")
        .with_body("llo")
        .create_async()
        .await;

    let client = WebHdfsClient::builder()
        .address(server.host_with_port())
        .build()
        .unwrap();

    let res = client
        .call(&Open::new("/a.txt").with_offset(2))
        .await
        .unwrap();

    assert_eq!(&res.value[..], b"llo");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_html_error_page_is_reported_with_preview() {
    let mut server = Server::new_async().await;
    let page = format!("<html>{}</html>", "x".repeat(4096));
    let mock = server
        .mock("GET", "/webhdfs/v1/a.txt")
        .match_query(Matcher::Any)
        .with_status(502)
        .with_body(&page)
        .create_async()
        .await;

    let client = WebHdfsClient::builder()
        .address(server.host_with_port())
        .build()
        .unwrap();

    let err = client
        .call(&GetFileStatus::new("/a.txt"))
        .await
        .unwrap_err();

    let aggregate = match err {
        DispatchError::AllFailed(aggregate) => aggregate,
        other => panic!("Expected an aggregate failure, got {other:?}"),
    };
    match &aggregate.failures()[0].error {
        EndpointError::Transport(TransportError::MalformedEnvelope { preview, .. }) => {
            assert!(preview.starts_with("<html>"));
            assert!(preview.ends_with("..."));
            assert!(preview.len() < page.len());
        }
        other => panic!("Expected a malformed envelope, got {other:?}"),
    }
    mock.assert_async().await;
}
