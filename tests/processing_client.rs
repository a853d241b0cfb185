use imgcrypt_client::client::{MultipartRequest, ProcessingRequest};
use imgcrypt_client::common::config::{ServiceConfig, Transport};
use imgcrypt_client::common::messages::JsonProcessRequest;
use imgcrypt_client::{Operation, ProcessedImage, ProcessingClient, ProcessingFailure, ProcessingResult};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, body_string_contains, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Address of a port nothing listens on.
fn closed_port_uri() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

const KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef01234567";

fn json_client(server_uri: &str) -> ProcessingClient {
    ProcessingClient::new(ServiceConfig {
        endpoint: format!("{}/api/process_base64", server_uri),
        transport: Transport::Json,
        request_timeout_secs: None,
    })
    .unwrap()
}

fn json_request(operation: Operation) -> ProcessingRequest {
    ProcessingRequest::Json(JsonProcessRequest {
        image: "iVBORw0KGgo=".to_string(),
        key: KEY.to_string(),
        operation,
    })
}

// ── JSON transport ──────────────────────────────────────────────

#[tokio::test]
async fn json_success_returns_image_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process_base64"))
        .and(body_partial_json(json!({
            "image": "iVBORw0KGgo=",
            "key": KEY,
            "operation": "encrypt"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "image": "data:image/png;base64,AAA",
            "message": "ok",
            "operation": "encrypt"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = json_client(&server.uri())
        .submit(json_request(Operation::Encrypt))
        .await;

    assert_eq!(
        result,
        ProcessingResult::Success(ProcessedImage {
            image: "data:image/png;base64,AAA".to_string(),
            message: "ok".to_string(),
            operation: Operation::Encrypt,
        })
    );
}

#[tokio::test]
async fn application_failure_is_surfaced_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process_base64"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": false, "error": "bad key" })),
        )
        .mount(&server)
        .await;

    let result = json_client(&server.uri())
        .submit(json_request(Operation::Encrypt))
        .await;

    assert_eq!(
        result,
        ProcessingResult::Failure(ProcessingFailure::Application("bad key".to_string()))
    );
}

#[tokio::test]
async fn error_status_with_error_body_is_application_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "error": "Encryption key must be at least 8 characters long" })),
        )
        .mount(&server)
        .await;

    let result = json_client(&server.uri())
        .submit(json_request(Operation::Encrypt))
        .await;

    assert_eq!(
        result,
        ProcessingResult::Failure(ProcessingFailure::Application(
            "Encryption key must be at least 8 characters long".to_string()
        ))
    );
}

#[tokio::test]
async fn failure_without_error_text_is_unknown_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "success": false })))
        .mount(&server)
        .await;

    let result = json_client(&server.uri())
        .submit(json_request(Operation::Decrypt))
        .await;

    assert_eq!(result.message(), "Unknown error");
}

// ── Transport failures ──────────────────────────────────────────

#[tokio::test]
async fn connection_refused_gives_generic_hint() {
    let uri = closed_port_uri();
    let client = json_client(&uri);

    let result = client.submit(json_request(Operation::Encrypt)).await;

    match result {
        ProcessingResult::Failure(ProcessingFailure::Transport(message)) => {
            assert_eq!(message, client.connectivity_hint());
            assert!(message.starts_with("Failed to process image. Make sure the backend server is running on http://127.0.0.1:"));
            assert!(!message.to_lowercase().contains("connection refused"));
        }
        other => panic!("expected transport failure, got {:?}", other),
    }
}

#[tokio::test]
async fn non_json_body_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let client = json_client(&server.uri());
    let result = client.submit(json_request(Operation::Encrypt)).await;

    assert_eq!(
        result,
        ProcessingResult::Failure(ProcessingFailure::Transport(client.connectivity_hint()))
    );
}

#[tokio::test]
async fn success_without_image_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true, "message": "ok" })))
        .mount(&server)
        .await;

    let client = json_client(&server.uri());
    let result = client.submit(json_request(Operation::Encrypt)).await;

    assert!(matches!(
        result,
        ProcessingResult::Failure(ProcessingFailure::Transport(_))
    ));
}

#[tokio::test]
async fn transport_timeout_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "image": "AAA", "message": "ok" }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = ProcessingClient::new(ServiceConfig {
        endpoint: format!("{}/api/process_base64", server.uri()),
        transport: Transport::Json,
        request_timeout_secs: Some(1),
    })
    .unwrap();

    let result = client.submit(json_request(Operation::Encrypt)).await;
    assert!(matches!(
        result,
        ProcessingResult::Failure(ProcessingFailure::Transport(_))
    ));
}

#[tokio::test]
async fn mismatched_request_encoding_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = json_client(&server.uri())
        .submit(ProcessingRequest::Multipart(MultipartRequest {
            file_name: "scan.png".to_string(),
            mime: "image/png".to_string(),
            bytes: "fake-png".into(),
            key: KEY.to_string(),
            operation: Operation::Encrypt,
        }))
        .await;

    assert!(!result.is_success());
}

// ── Multipart transport ─────────────────────────────────────────

#[tokio::test]
async fn multipart_sends_file_key_and_operation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/process"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("name=\"image\"; filename=\"scan.png\""))
        .and(body_string_contains("fake-png-bytes"))
        .and(body_string_contains("name=\"operation\""))
        .and(body_string_contains("decrypt"))
        .and(body_string_contains(KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "image": "data:image/png;base64,AAA",
            "message": "Image decrypted successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ProcessingClient::new(ServiceConfig {
        endpoint: format!("{}/api/process", server.uri()),
        transport: Transport::Multipart,
        request_timeout_secs: None,
    })
    .unwrap();

    let result = client
        .submit(ProcessingRequest::Multipart(MultipartRequest {
            file_name: "scan.png".to_string(),
            mime: "image/png".to_string(),
            bytes: "fake-png-bytes".into(),
            key: KEY.to_string(),
            operation: Operation::Decrypt,
        }))
        .await;

    match result {
        ProcessingResult::Success(processed) => {
            assert_eq!(processed.operation, Operation::Decrypt);
            assert_eq!(processed.message, "Image decrypted successfully");
        }
        other => panic!("expected success, got {:?}", other),
    }
}

// ── Health probe ────────────────────────────────────────────────

#[tokio::test]
async fn health_probe_reads_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "message": "Image Encryption API is running"
        })))
        .mount(&server)
        .await;

    let health = json_client(&server.uri()).health().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.message, "Image Encryption API is running");
}

#[tokio::test]
async fn health_probe_fails_on_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert!(json_client(&server.uri()).health().await.is_err());
}
