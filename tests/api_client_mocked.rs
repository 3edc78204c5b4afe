/// HTTP client behavior against a mocked backend
/// Covers URL building, timeouts, error normalization and body parsing
use rust_fines_client::api_client::{ApiClient, RequestOptions};
use rust_fines_client::errors::{AppError, TIMEOUT_MESSAGE};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(server.uri(), Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_json_body_is_parsed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/documentType"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let body = client_for(&mock_server).get("/api/documentType").await.unwrap();
    assert_eq!(body, json!([{"id": 1}]));
}

#[tokio::test]
async fn test_empty_params_are_omitted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/UserInfraction"))
        .and(query_param("documentTypeId", "1"))
        .and(query_param_is_missing("documentNumber"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let options = RequestOptions::get()
        .param("documentTypeId", Some(1))
        .param("documentNumber", Some(""))
        .param::<String>("page", None);

    let body = client_for(&mock_server)
        .request("/api/UserInfraction", options)
        .await
        .unwrap();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_plain_text_and_empty_bodies() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/text"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    assert_eq!(client.get("/text").await.unwrap(), Value::String("pong".to_string()));
    assert_eq!(client.get("/empty").await.unwrap(), Value::Null);
}

#[tokio::test]
async fn test_http_error_carries_body_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/payment/7"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "Payment service down"})),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/payment/8"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": "Forbidden"})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let err = client.get("/api/payment/7").await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "Payment service down");
    assert_eq!(err.code(), "HTTP_ERROR");

    let err = client.get("/api/payment/8").await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(err.to_string(), "Forbidden");
}

#[tokio::test]
async fn test_http_error_without_body_uses_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).get("/missing").await.unwrap_err();
    match err {
        AppError::Http { status, message, body } => {
            assert_eq!(status, 404);
            assert_eq!(message, "HTTP 404");
            assert!(body.is_none());
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_timeout_is_its_own_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(800)),
        )
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri(), Duration::from_millis(100)).unwrap();
    let err = client.get("/slow").await.unwrap_err();
    assert!(matches!(err, AppError::Timeout));
    assert!(err.is_network());
    assert_eq!(err.user_message(), TIMEOUT_MESSAGE);
}

#[tokio::test]
async fn test_per_request_timeout_overrides_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let options = RequestOptions::get().timeout(Duration::from_millis(50));
    let err = client.request("/slow", options).await.unwrap_err();
    assert!(matches!(err, AppError::Timeout));
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    let client = ApiClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
    let err = client.get("/api/documentType").await.unwrap_err();
    assert!(matches!(err, AppError::Network { .. }));
    assert_eq!(err.code(), "NETWORK_ERROR");
}

#[tokio::test]
async fn test_post_sends_json_body_and_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let options = RequestOptions::post()
        .header("Content-Type", "application/json")
        .json(json!({"a": 1}));
    let body = client_for(&mock_server).request("/echo", options).await.unwrap();
    assert_eq!(body["ok"], json!(true));
}
