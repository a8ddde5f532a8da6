//! Integration tests for `MediaClient` against a local `wiremock` server.
//!
//! Covers the asset listing cursor loop, image fetch retry and timeout
//! behaviour, and the raw-document backup round trip. No real network traffic
//! is made.

use hemcat_core::MediaCredentials;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hemcat_media::client::MediaClientOptions;
use hemcat_media::{MediaClient, MediaError};

fn credentials() -> MediaCredentials {
    MediaCredentials {
        cloud_name: "demo".to_owned(),
        api_key: "key".to_owned(),
        api_secret: Some("secret".to_owned()),
    }
}

/// 5-second timeouts, no retries.
fn test_client(server: &MockServer) -> MediaClient {
    test_client_with_retries(server, 0)
}

fn test_client_with_retries(server: &MockServer, max_retries: u32) -> MediaClient {
    MediaClient::new(
        Some(credentials()),
        MediaClientOptions {
            api_base: server.uri(),
            request_timeout_secs: 5,
            image_timeout_secs: 5,
            user_agent: "hemcat-test/0.1".to_owned(),
            max_retries,
            backoff_base_ms: 0,
            page_size: 2,
        },
    )
    .expect("failed to build test MediaClient")
}

fn resource(public_id: &str) -> serde_json::Value {
    json!({
        "public_id": public_id,
        "secure_url": format!("https://res.example.com/demo/image/upload/v1/{public_id}.jpg"),
        "format": "jpg",
        "bytes": 1024
    })
}

// ---------------------------------------------------------------------------
// Asset listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_all_resources_follows_cursor_across_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/demo/resources/image/upload"))
        .and(wiremock::matchers::query_param_is_missing("next_cursor"))
        .and(query_param("max_results", "2"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resources": [resource("LineA/Incense/RoseAgarbatti"), resource("LineA/Incense/Jasmine")],
            "next_cursor": "page2"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/demo/resources/image/upload"))
        .and(query_param("next_cursor", "page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resources": [resource("Candles/Vanilla")]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let resources = client.list_all_resources().await.expect("listing failed");

    let ids: Vec<&str> = resources.iter().map(|r| r.public_id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["LineA/Incense/RoseAgarbatti", "LineA/Incense/Jasmine", "Candles/Vanilla"]
    );
    assert!(resources[0].secure_url.ends_with("RoseAgarbatti.jpg"));
}

#[tokio::test]
async fn list_all_resources_empty_store() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/demo/resources/image/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resources": []})))
        .mount(&server)
        .await;

    let resources = test_client(&server).list_all_resources().await.unwrap();
    assert!(resources.is_empty());
}

#[tokio::test]
async fn list_all_resources_requires_credentials() {
    let client = MediaClient::new(None, MediaClientOptions::default()).unwrap();
    let err = client.list_all_resources().await.unwrap_err();
    assert!(matches!(err, MediaError::MissingCredentials(_)), "got: {err:?}");
}

#[tokio::test]
async fn list_all_resources_propagates_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/demo/resources/image/upload"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client_with_retries(&server, 3)
        .list_all_resources()
        .await
        .unwrap_err();
    assert!(
        matches!(err, MediaError::UnexpectedStatus { status: 401, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn list_all_resources_rejects_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/demo/resources/image/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server).list_all_resources().await.unwrap_err();
    assert!(matches!(err, MediaError::Deserialize { .. }), "got: {err:?}");
}

// ---------------------------------------------------------------------------
// Image bytes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_bytes_returns_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/img/rose.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF]))
        .mount(&server)
        .await;

    let bytes = test_client(&server)
        .fetch_bytes(&format!("{}/img/rose.jpg", server.uri()))
        .await
        .unwrap();
    assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF]);
}

#[tokio::test]
async fn fetch_bytes_does_not_retry_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/img/missing.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client_with_retries(&server, 3)
        .fetch_bytes(&format!("{}/img/missing.jpg", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, MediaError::NotFound { .. }), "got: {err:?}");
}

#[tokio::test]
async fn fetch_bytes_retries_server_error_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/img/flaky.jpg"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/flaky.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1, 2, 3]))
        .mount(&server)
        .await;

    let bytes = test_client_with_retries(&server, 1)
        .fetch_bytes(&format!("{}/img/flaky.jpg", server.uri()))
        .await
        .unwrap();
    assert_eq!(bytes, vec![1, 2, 3]);
}

#[tokio::test]
async fn fetch_bytes_gives_up_after_bounded_timeouts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/img/slow.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![1, 2, 3])
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = MediaClient::new(
        Some(credentials()),
        MediaClientOptions {
            api_base: server.uri(),
            request_timeout_secs: 5,
            image_timeout_secs: 1,
            user_agent: "hemcat-test/0.1".to_owned(),
            max_retries: 1,
            backoff_base_ms: 0,
            page_size: 2,
        },
    )
    .expect("failed to build test MediaClient");

    let err = client
        .fetch_bytes(&format!("{}/img/slow.jpg", server.uri()))
        .await
        .unwrap_err();
    assert!(
        matches!(&err, MediaError::Http(e) if e.is_timeout()),
        "got: {err:?}"
    );
    assert_eq!(server.received_requests().await.map_or(0, |r| r.len()), 2);
}

#[tokio::test]
async fn fetch_bytes_rejects_non_http_url() {
    let server = MockServer::start().await;
    let err = test_client(&server)
        .fetch_bytes("file:///etc/passwd")
        .await
        .unwrap_err();
    assert!(matches!(err, MediaError::InvalidUrl { .. }), "got: {err:?}");

    let err = test_client(&server).fetch_bytes("not a url").await.unwrap_err();
    assert!(matches!(err, MediaError::InvalidUrl { .. }), "got: {err:?}");
}

// ---------------------------------------------------------------------------
// Raw-document backup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_raw_document_returns_none_on_first_run() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/demo/resources/raw/upload/app_data/products_db"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let document = test_client(&server)
        .fetch_raw_document("app_data/products_db")
        .await
        .unwrap();
    assert!(document.is_none());
}

#[tokio::test]
async fn fetch_raw_document_follows_secure_url() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/demo/resources/raw/upload/app_data/products_db"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "public_id": "app_data/products_db",
            "secure_url": format!("{}/files/products_db", server.uri())
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/products_db"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": 1,
            "deleted_products": ["PID_bfa1be1bbd8b"]
        })))
        .mount(&server)
        .await;

    let document = test_client(&server)
        .fetch_raw_document("app_data/products_db")
        .await
        .unwrap()
        .expect("expected a document");
    assert_eq!(document["deleted_products"][0], "PID_bfa1be1bbd8b");
}

#[tokio::test]
async fn store_raw_document_posts_signed_form() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/demo/raw/upload"))
        .and(body_string_contains("public_id=app_data%2Fproducts_db"))
        .and(body_string_contains("signature="))
        .and(body_string_contains("api_key=key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "public_id": "app_data/products_db",
            "secure_url": "https://res.example.com/demo/raw/upload/v2/app_data/products_db"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_client(&server)
        .store_raw_document("app_data/products_db", &json!({"version": 1}))
        .await
        .unwrap();
    assert_eq!(result.public_id, "app_data/products_db");
}

#[tokio::test]
async fn store_raw_document_requires_secret() {
    let server = MockServer::start().await;
    let client = MediaClient::new(
        Some(MediaCredentials {
            api_secret: None,
            ..credentials()
        }),
        MediaClientOptions {
            api_base: server.uri(),
            ..MediaClientOptions::default()
        },
    )
    .unwrap();

    let err = client
        .store_raw_document("app_data/products_db", &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, MediaError::MissingCredentials(_)), "got: {err:?}");
}
