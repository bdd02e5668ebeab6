use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use dyninv_client::*;
use url::Url;

const GZIPPED: &[u8] = include_bytes!("fixtures/inventory.json.gz");

async fn echo_headers(headers: HeaderMap) -> impl IntoResponse {
    let value_of = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    format!(
        "accept-encoding={}\nuser-agent={}",
        value_of(header::ACCEPT_ENCODING),
        value_of(header::USER_AGENT)
    )
}

async fn gzipped() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CONTENT_ENCODING, "gzip"),
        ],
        GZIPPED,
    )
}

async fn plain() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        r#"{"hosts": ["h1"]}"#,
    )
}

async fn missing() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "no such inventory")
}

async fn binary() -> impl IntoResponse {
    vec![0xff_u8, 0xfe, 0x00]
}

async fn slow() -> impl IntoResponse {
    tokio::time::sleep(Duration::from_secs(5)).await;
    "{}"
}

async fn serve() -> SocketAddr {
    let app = Router::new()
        .route("/echo", get(echo_headers))
        .route("/inventory.json", get(plain))
        .route("/inventory.json.gz", get(gzipped))
        .route("/missing", get(missing))
        .route("/binary", get(binary))
        .route("/slow", get(slow));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn url(addr: SocketAddr, path: &str) -> Url {
    Url::parse(&format!("http://{addr}{path}")).unwrap()
}

async fn fetch(fetcher: &HttpFetcher, url: &Url) -> Result<String, TransportError> {
    fetcher
        .fetch(url, &SecurityOptions::default(), &mut Diagnostics::new())
        .await
}

#[tokio::test]
async fn test_fetch_plain_document() {
    let addr = serve().await;
    let text = fetch(&HttpFetcher::new(), &url(addr, "/inventory.json"))
        .await
        .unwrap();
    assert_eq!(text, r#"{"hosts": ["h1"]}"#);
}

#[tokio::test]
async fn test_requests_gzip_and_sends_user_agent() {
    let addr = serve().await;
    let fetcher = HttpFetcher::new().with_user_agent("dyninv-test/1");
    let text = fetch(&fetcher, &url(addr, "/echo")).await.unwrap();

    assert!(text.contains("accept-encoding=") && text.contains("gzip"));
    assert!(text.contains("user-agent=dyninv-test/1"));
}

#[tokio::test]
async fn test_gzip_body_is_decompressed() {
    let addr = serve().await;
    let text = fetch(&HttpFetcher::new(), &url(addr, "/inventory.json.gz"))
        .await
        .unwrap();

    assert!(text.starts_with('{'));
    assert!(text.contains(r#""compressed": true"#));
}

#[tokio::test]
async fn test_error_status_is_transport_error() {
    let addr = serve().await;
    let err = fetch(&HttpFetcher::new(), &url(addr, "/missing"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, TransportErrorKind::Status(404));
    assert_eq!(err.status(), Some(404));
    assert!(err.message.contains("no such inventory"));
    assert!(err.url.ends_with("/missing"));
}

#[tokio::test]
async fn test_invalid_utf8_is_transport_error() {
    let addr = serve().await;
    let err = fetch(&HttpFetcher::new(), &url(addr, "/binary"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, TransportErrorKind::Decode);
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let addr = serve().await;
    let fetcher = HttpFetcher::new().with_timeout(Duration::from_millis(200));
    let err = fetch(&fetcher, &url(addr, "/slow")).await.unwrap_err();
    assert_eq!(err.kind, TransportErrorKind::Timeout);
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = fetch(&HttpFetcher::new(), &url(addr, "/inventory.json"))
        .await
        .unwrap_err();
    assert!(matches!(
        err.kind,
        TransportErrorKind::Connect | TransportErrorKind::Request
    ));
}

#[tokio::test]
async fn test_insecure_https_warns_before_connecting() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let target = Url::parse(&format!("https://{addr}/inventory.json")).unwrap();
    let security = SecurityOptions::new("/nonexistent/dyninv/ca.pem").with_insecure(true);
    let mut diagnostics = Diagnostics::new();

    let result = HttpFetcher::new()
        .fetch(&target, &security, &mut diagnostics)
        .await;

    assert!(result.is_err());
    assert!(diagnostics.contains("TLS validation disabled"));
}

#[tokio::test]
async fn test_secure_https_without_bundle_fails_without_io() {
    let target = Url::parse("https://inventory.invalid/inventory.json").unwrap();
    let security = SecurityOptions::new("/nonexistent/dyninv/ca.pem");
    let mut diagnostics = Diagnostics::new();

    let err = HttpFetcher::new()
        .fetch(&target, &security, &mut diagnostics)
        .await
        .unwrap_err();

    assert_eq!(err.kind, TransportErrorKind::Config);
    assert!(diagnostics.is_empty());
}
