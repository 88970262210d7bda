mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{FakeEngine, PLAIN_MESSAGE};
use eml2pdf::{
    EngineConfig, PDF_MAGIC, build_stylesheet, config::Config, server::build_router,
    state::AppState,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const BOUNDARY: &str = "eml2pdf-test-boundary";

struct TestResponse {
    status: StatusCode,
    content_type: Option<String>,
    disposition: Option<String>,
    body: Vec<u8>,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    fn error(&self) -> String {
        self.json()["error"].as_str().unwrap().to_string()
    }
}

fn app(engine: Arc<FakeEngine>, config: Config) -> Router {
    let stylesheet = build_stylesheet(&EngineConfig::default(), None);
    build_router(AppState::new(engine, stylesheet, config))
}

async fn send(router: Router, request: Request<Body>) -> TestResponse {
    let response = router.oneshot(request).await.unwrap();
    let (status, content_type, disposition) = {
        let header_value = |name: header::HeaderName| {
            response
                .headers()
                .get(name)
                .map(|v: &header::HeaderValue| v.to_str().unwrap().to_string())
        };

        let status = response.status();
        let content_type = header_value(header::CONTENT_TYPE);
        let disposition = header_value(header::CONTENT_DISPOSITION);
        (status, content_type, disposition)
    };
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();

    TestResponse {
        status,
        content_type,
        disposition,
        body,
    }
}

fn raw_request(body: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/convert")
        .header(header::CONTENT_TYPE, "message/rfc822")
        .body(Body::from(body.to_vec()))
        .unwrap()
}

fn upload_request(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/convert")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_raw_body_conversion() {
    let engine = Arc::new(FakeEngine::available());
    let response = send(app(engine.clone(), Config::default()), raw_request(PLAIN_MESSAGE)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type.as_deref(), Some("application/pdf"));
    assert!(response.body.starts_with(PDF_MAGIC));
    assert_eq!(engine.calls(), 1);

    let disposition = response.disposition.unwrap();
    assert!(disposition.starts_with("attachment; filename=\"Test_"));
    assert!(disposition.ends_with(".pdf\""));
}

#[tokio::test]
async fn test_upload_conversion() {
    let engine = Arc::new(FakeEngine::available());
    let request = upload_request("file", "message.eml", PLAIN_MESSAGE);
    let response = send(app(engine.clone(), Config::default()), request).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.starts_with(PDF_MAGIC));
    assert_eq!(engine.calls(), 1);
}

#[tokio::test]
async fn test_empty_upload_rejected_without_rendering() {
    let engine = Arc::new(FakeEngine::available());
    let request = upload_request("file", "message.eml", b"");
    let response = send(app(engine.clone(), Config::default()), request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.error().contains("empty"));
    assert_eq!(response.json()["kind"], "ValidationError");
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_wrong_extension_rejected() {
    let engine = Arc::new(FakeEngine::available());
    let request = upload_request("file", "message.txt", PLAIN_MESSAGE);
    let response = send(app(engine.clone(), Config::default()), request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.error().contains(".eml"));
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_empty_filename_rejected() {
    let engine = Arc::new(FakeEngine::available());
    let request = upload_request("file", "", PLAIN_MESSAGE);
    let response = send(app(engine.clone(), Config::default()), request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "No file selected");
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_missing_file_field_rejected() {
    let engine = Arc::new(FakeEngine::available());
    let request = upload_request("attachment", "message.eml", PLAIN_MESSAGE);
    let response = send(app(engine.clone(), Config::default()), request).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.error().contains("No file part"));
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_empty_raw_body_rejected() {
    let engine = Arc::new(FakeEngine::available());
    let response = send(app(engine.clone(), Config::default()), raw_request(b"")).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_unparseable_message_is_client_error() {
    let engine = Arc::new(FakeEngine::available());
    let response = send(
        app(engine.clone(), Config::default()),
        raw_request(b"\r\n\r\nno headers here"),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["kind"], "ParseError");
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_unavailable_engine_fails_fast() {
    let engine = Arc::new(FakeEngine::unavailable());
    let response = send(app(engine.clone(), Config::default()), raw_request(PLAIN_MESSAGE)).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json()["kind"], "EngineUnavailable");
    assert!(response.error().contains("wkhtmltopdf"));
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_health_reports_available_engine() {
    let engine = Arc::new(FakeEngine::available());

    for uri in ["/", "/health"] {
        let response = send(app(engine.clone(), Config::default()), get(uri)).await;
        let json = response.json();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["engine"]["available"], true);
        assert_eq!(json["engine"]["detail"], "fake 1.0");
    }
}

#[tokio::test]
async fn test_health_reports_degraded_engine() {
    let engine = Arc::new(FakeEngine::unavailable());
    let response = send(app(engine, Config::default()), get("/")).await;
    let json = response.json();

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["engine"]["available"], false);
}

#[tokio::test]
async fn test_upload_form() {
    let engine = Arc::new(FakeEngine::available());
    let response = send(app(engine, Config::default()), get("/upload")).await;
    let page = String::from_utf8(response.body).unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert!(page.contains("enctype=\"multipart/form-data\""));
    assert!(page.contains("name=\"file\""));
}

#[tokio::test]
async fn test_same_input_same_document() {
    let engine = Arc::new(FakeEngine::available());
    let first = send(app(engine.clone(), Config::default()), raw_request(PLAIN_MESSAGE)).await;
    let second = send(app(engine.clone(), Config::default()), raw_request(PLAIN_MESSAGE)).await;

    assert_eq!(first.body, second.body);
    assert_eq!(engine.calls(), 2);
}

#[tokio::test]
async fn test_slow_conversion_times_out() {
    let engine = Arc::new(FakeEngine::slow(Duration::from_millis(500)));
    let mut config = Config::default();
    config.server.request_timeout_secs = 0;

    let response = send(app(engine, config), raw_request(PLAIN_MESSAGE)).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json()["kind"], "Timeout");
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let engine = Arc::new(FakeEngine::available());
    let mut config = Config::default();
    config.server.max_request_size_mb = 0;

    let response = send(app(engine.clone(), config), raw_request(PLAIN_MESSAGE)).await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.json()["kind"], "PayloadTooLarge");
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_declared_oversized_body_rejected() {
    let engine = Arc::new(FakeEngine::available());
    let mut config = Config::default();
    config.server.max_request_size_mb = 1;

    let mut request = raw_request(PLAIN_MESSAGE);
    request
        .headers_mut()
        .insert(header::CONTENT_LENGTH, header::HeaderValue::from(2 * 1024 * 1024));
    let response = send(app(engine.clone(), config), request).await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_queued_request_times_out_while_workers_are_busy() {
    let engine = Arc::new(FakeEngine::slow(Duration::from_millis(2500)));
    let mut config = Config::default();
    config.server.max_concurrent_conversions = 1;
    config.server.request_timeout_secs = 1;
    let router = app(engine.clone(), config);

    let first = tokio::spawn(send(router.clone(), raw_request(PLAIN_MESSAGE)));
    tokio::time::sleep(Duration::from_millis(100)).await;

    let started = std::time::Instant::now();
    let second = send(router, raw_request(PLAIN_MESSAGE)).await;
    let waited = started.elapsed();

    assert_eq!(second.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(second.json()["kind"], "Timeout");
    assert!(waited < Duration::from_millis(1800), "waited {waited:?}");
    assert_eq!(engine.calls(), 1);

    let first = first.await.unwrap();
    assert_eq!(first.json()["kind"], "Timeout");
}
