//! Integration tests for the request client
//!
//! These tests use wiremock to check retries, pacing before each attempt,
//! the request timeout and the headers sent with every request.

use listing_harvester::config::FetchConfig;
use listing_harvester::{FetchError, RequestClient};
use std::time::{Duration, Instant};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fetch configuration with no pacing delay
fn create_test_config(max_attempts: u32) -> FetchConfig {
    FetchConfig {
        min_delay_ms: 0,
        max_delay_ms: 0,
        timeout_secs: 5,
        max_attempts,
        user_agent: "HarvesterTest/1.0".to_string(),
        ..FetchConfig::default()
    }
}

#[tokio::test]
async fn test_fetch_returns_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listing/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = RequestClient::new(&create_test_config(3)).unwrap();
    let body = client
        .fetch(&format!("{}/listing/1", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(body, "<html>ok</html>");
}

#[tokio::test]
async fn test_server_error_exhausts_attempts() {
    let mock_server = MockServer::start().await;

    // Every attempt is retried until the ceiling of 3
    Mock::given(method("GET"))
        .and(path("/listing/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = RequestClient::new(&create_test_config(3)).unwrap();
    let result = client
        .fetch(&format!("{}/listing/broken", mock_server.uri()))
        .await;

    match result {
        Err(FetchError::Status { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_not_found_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listing/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = RequestClient::new(&create_test_config(2)).unwrap();
    let result = client
        .fetch(&format!("{}/listing/gone", mock_server.uri()))
        .await;

    assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
}

#[tokio::test]
async fn test_success_after_transient_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listing/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/listing/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = RequestClient::new(&create_test_config(3)).unwrap();
    let body = client
        .fetch(&format!("{}/listing/flaky", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(body, "recovered");
}

#[tokio::test]
async fn test_browser_headers_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listing/headers"))
        .and(header("user-agent", "HarvesterTest/1.0"))
        .and(header_exists("accept-language"))
        .and(header_exists("accept"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = RequestClient::new(&create_test_config(1)).unwrap();
    let result = client
        .fetch(&format!("{}/listing/headers", mock_server.uri()))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_pacing_precedes_every_attempt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listing/paced"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = FetchConfig {
        min_delay_ms: 100,
        max_delay_ms: 100,
        ..create_test_config(3)
    };
    let client = RequestClient::new(&config).unwrap();

    let started = Instant::now();
    let result = client
        .fetch(&format!("{}/listing/paced", mock_server.uri()))
        .await;

    assert!(result.is_err());
    // One 100ms delay before each of the three attempts, retries included
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listing/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("too late")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let config = FetchConfig {
        timeout_secs: 1,
        ..create_test_config(1)
    };
    let client = RequestClient::new(&config).unwrap();

    let started = Instant::now();
    let result = client
        .fetch(&format!("{}/listing/slow", mock_server.uri()))
        .await;

    assert!(matches!(result, Err(FetchError::Network { .. })));
    assert!(started.elapsed() < Duration::from_secs(3));
}
