//! Transport behaviour against a live mock server

use algo_harvest::fetch::{HttpRequest, ReqwestTransport, Transport, TransportError};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_get_returns_status_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/chef"))
        .and(header("accept-language", "en-US"))
        .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
        .mount(&mock_server)
        .await;

    let transport = ReqwestTransport::with_user_agent("TestAgent/1.0").unwrap();
    let request = HttpRequest::get(
        format!("{}/users/chef", mock_server.uri()),
        Duration::from_secs(5),
    )
    .header("Accept-Language", "en-US");

    let response = transport.fetch(&request).await.unwrap();
    assert_eq!(response.status, 404);
    assert_eq!(response.body, "gone");
}

#[tokio::test]
async fn test_post_sends_json_body_and_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("content-type", "application/json"))
        .and(header("authorization", "Bearer secret"))
        .and(header("user-agent", "TestAgent/1.0"))
        .and(body_json(serde_json::json!({ "query": "{ viewer }" })))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data":{}}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = ReqwestTransport::with_user_agent("TestAgent/1.0").unwrap();
    let request = HttpRequest::post_json(
        format!("{}/graphql", mock_server.uri()),
        r#"{"query":"{ viewer }"}"#.to_string(),
        Duration::from_secs(5),
    )
    .header("Authorization", "Bearer secret");

    let response = transport.fetch(&request).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, r#"{"data":{}}"#);
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let transport = ReqwestTransport::with_user_agent("TestAgent/1.0").unwrap();
    let request = HttpRequest::get(mock_server.uri(), Duration::from_millis(200));

    let result = transport.fetch(&request).await;
    assert!(matches!(result, Err(TransportError::Timeout { .. })));
}
