//! `GrafanaClient` against an in-process HTTP server.
//!
//! Each test binds its own ephemeral port; requests go through
//! `spawn_blocking` since the client is synchronous.

use std::net::SocketAddr;
use std::time::Duration;

use grafwatch_core::config::GrafanaConfig;
use grafwatch_sync::{ApiError, GrafanaApi, GrafanaClient};
use tokio::sync::mpsc;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::Filter;

#[derive(Debug)]
struct Captured {
    path: String,
    authorization: Option<String>,
    content_type: Option<String>,
    body: String,
}

fn spawn_grafana(status: StatusCode) -> (SocketAddr, mpsc::UnboundedReceiver<Captured>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let (tx, rx) = mpsc::unbounded_channel();

    let capture = warp::post()
        .and(warp::path::full())
        .and(warp::header::optional::<String>("authorization"))
        .and(warp::header::optional::<String>("content-type"))
        .and(warp::body::bytes())
        .map(
            move |path: warp::path::FullPath,
                  authorization: Option<String>,
                  content_type: Option<String>,
                  body: Bytes| {
                let _ = tx.send(Captured {
                    path: path.as_str().to_string(),
                    authorization,
                    content_type,
                    body: String::from_utf8_lossy(&body).into_owned(),
                });
                warp::reply::with_status("{}", status)
            },
        );
    let health = warp::get()
        .and(warp::path!("api" / "health"))
        .map(move || warp::reply::with_status("{}", status));

    let (addr, server) = warp::serve(capture.or(health)).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    (addr, rx)
}

fn client_for(addr: SocketAddr) -> GrafanaClient {
    let mut config = GrafanaConfig::new(format!("http://{addr}"), "admin", "secret");
    config.request_timeout = Duration::from_secs(5);
    GrafanaClient::new(&config)
}

#[tokio::test(flavor = "multi_thread")]
async fn dashboard_is_posted_in_overwrite_envelope_with_basic_auth() {
    let (addr, mut requests) = spawn_grafana(StatusCode::OK);
    let client = client_for(addr);

    tokio::task::spawn_blocking(move || client.push_dashboard(r#"{"title":"Nodes"}"#))
        .await
        .expect("join")
        .expect("push dashboard");

    let captured = requests.recv().await.expect("captured request");
    assert_eq!(captured.path, "/api/dashboards/db");
    assert_eq!(
        captured.body,
        r#"{"dashboard":{"title":"Nodes"},"overwrite":true}"#
    );
    // base64("admin:secret")
    assert_eq!(
        captured.authorization.as_deref(),
        Some("Basic YWRtaW46c2VjcmV0")
    );
    assert_eq!(captured.content_type.as_deref(), Some("application/json"));
}

#[tokio::test(flavor = "multi_thread")]
async fn datasource_is_posted_unchanged() {
    let (addr, mut requests) = spawn_grafana(StatusCode::OK);
    let client = client_for(addr);
    let payload = r#"{"name":"prom","type":"prometheus","url":"http://prom:9090"}"#;

    tokio::task::spawn_blocking(move || client.push_datasource(payload))
        .await
        .expect("join")
        .expect("push datasource");

    let captured = requests.recv().await.expect("captured request");
    assert_eq!(captured.path, "/api/datasources");
    assert_eq!(captured.body, payload);
}

#[tokio::test(flavor = "multi_thread")]
async fn error_status_is_reported() {
    let (addr, _requests) = spawn_grafana(StatusCode::PRECONDITION_FAILED);
    let client = client_for(addr);

    let err = tokio::task::spawn_blocking(move || client.push_dashboard("{}"))
        .await
        .expect("join")
        .expect_err("412 must fail");

    assert!(
        matches!(err, ApiError::Status { status: 412, .. }),
        "unexpected error: {err}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn health_follows_service_status() {
    let (up, _) = spawn_grafana(StatusCode::OK);
    let (down, _) = spawn_grafana(StatusCode::SERVICE_UNAVAILABLE);
    let up_client = client_for(up);
    let down_client = client_for(down);

    let (up_result, down_result) =
        tokio::task::spawn_blocking(move || (up_client.health(), down_client.health()))
            .await
            .expect("join");

    assert!(up_result.is_ok());
    assert!(matches!(down_result, Err(ApiError::Status { status: 503, .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_service_is_a_transport_error() {
    // Bind then drop a listener so the port is very likely closed.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .expect("bind")
        .local_addr()
        .expect("addr")
        .port();
    let client = client_for(SocketAddr::from(([127, 0, 0, 1], port)));

    let err = tokio::task::spawn_blocking(move || client.health())
        .await
        .expect("join")
        .expect_err("nothing listening");

    assert!(matches!(err, ApiError::Transport { .. }), "unexpected: {err}");
}
