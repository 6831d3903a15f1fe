//! Tests for the HTTP gateway module

use super::*;
use crate::auth::Session;
use crate::error::Error;
use crate::types::{BackoffType, HttpMethod};
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway() -> HttpGateway {
    HttpGateway::with_config(GatewayConfig::builder().unpaced().build())
}

#[test]
fn test_gateway_config_default() {
    let config = GatewayConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.max_retries, 0);
    assert_eq!(config.pace, Some(Pace::default()));
}

#[test]
fn test_gateway_config_builder() {
    let config = GatewayConfig::builder()
        .timeout(Duration::from_secs(60))
        .max_retries(2)
        .backoff(
            BackoffType::Linear,
            Duration::from_millis(200),
            Duration::from_secs(5),
        )
        .pace(Pace::new(1, 1).unwrap())
        .build();

    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.max_retries, 2);
    assert_eq!(config.backoff_type, BackoffType::Linear);
    assert_eq!(config.initial_backoff, Duration::from_millis(200));
    assert_eq!(config.max_backoff, Duration::from_secs(5));
    assert_eq!(config.pace.map(|p| p.per_second()), Some(1));
}

#[test]
fn test_form_params_replace_and_page() {
    let params = FormParams::new()
        .field("userType", "COMPANY")
        .field("queryStr", "")
        .field("userType", "PERSONAL");

    assert_eq!(params.len(), 2);
    assert_eq!(params.get("userType"), Some("PERSONAL"));

    let paged = params.with_page(3);
    assert_eq!(paged.get(PAGE_FIELD), Some("3"));
    assert_eq!(params.get(PAGE_FIELD), None);

    let repaged = paged.with_page(4);
    assert_eq!(repaged.get(PAGE_FIELD), Some("4"));
    assert_eq!(repaged.len(), 3);
}

#[test]
fn test_raw_page_empty() {
    let page = RawPage::new(200, Vec::new());
    assert!(page.is_empty());
    assert!(page.is_success());

    let page = RawPage::new(200, "<html></html>");
    assert!(!page.is_empty());
    assert_eq!(page.text, "<html></html>");
}

#[tokio::test]
async fn test_gateway_post_form() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pss/app/login/cardList/manage"))
        .and(body_string_contains("userType=COMPANY"))
        .and(body_string_contains("pageNo=2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>page</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = Session::anonymous(&mock_server.uri()).unwrap();
    let params = FormParams::new().field("userType", "COMPANY").with_page(2);
    let page = gateway()
        .request(
            &session,
            "/pss/app/login/cardList/manage",
            HttpMethod::Post,
            &params,
        )
        .await
        .unwrap();

    assert_eq!(page.status, 200);
    assert_eq!(page.text, "<html>page</html>");
}

#[tokio::test]
async fn test_gateway_get_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/listing"))
        .and(query_param("pageNo", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let session = Session::anonymous(&mock_server.uri()).unwrap();
    let page = gateway()
        .request(
            &session,
            "/listing",
            HttpMethod::Get,
            &FormParams::new().with_page(1),
        )
        .await
        .unwrap();
    assert_eq!(page.text, "ok");
}

#[tokio::test]
async fn test_gateway_empty_body_is_not_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/listing"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let session = Session::anonymous(&mock_server.uri()).unwrap();
    let page = gateway()
        .request(&session, "/listing", HttpMethod::Post, &FormParams::new())
        .await
        .unwrap();
    assert!(page.is_empty());
}

#[tokio::test]
async fn test_gateway_bodiless_error_status_returns_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/listing"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = Session::anonymous(&mock_server.uri()).unwrap();
    let page = gateway()
        .request(&session, "/listing", HttpMethod::Post, &FormParams::new())
        .await
        .unwrap();
    assert_eq!(page.status, 503);
    assert!(page.is_empty());
}

#[tokio::test]
async fn test_gateway_404_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .mount(&mock_server)
        .await;

    let session = Session::anonymous(&mock_server.uri()).unwrap();
    let err = gateway()
        .request(&session, "/missing", HttpMethod::Post, &FormParams::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 404, .. }));
}

#[tokio::test]
async fn test_gateway_does_not_retry_by_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service unavailable"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = Session::anonymous(&mock_server.uri()).unwrap();
    let err = gateway()
        .request(&session, "/flaky", HttpMethod::Post, &FormParams::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 503, .. }));
}

#[tokio::test]
async fn test_gateway_retries_when_configured() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .mount(&mock_server)
        .await;

    let gateway = HttpGateway::with_config(
        GatewayConfig::builder()
            .unpaced()
            .max_retries(2)
            .backoff(
                BackoffType::Constant,
                Duration::from_millis(10),
                Duration::from_millis(10),
            )
            .build(),
    );

    let session = Session::anonymous(&mock_server.uri()).unwrap();
    let page = gateway
        .request(&session, "/flaky", HttpMethod::Post, &FormParams::new())
        .await
        .unwrap();
    assert_eq!(page.text, "recovered");
}

#[tokio::test]
async fn test_gateway_download_passes_status_through() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bundle.zip"))
        .respond_with(ResponseTemplate::new(404).set_body_bytes(vec![0x50, 0x4b]))
        .mount(&mock_server)
        .await;

    let session = Session::anonymous(&mock_server.uri()).unwrap();
    let page = gateway()
        .download(&session, "/bundle.zip", HttpMethod::Post, &FormParams::new())
        .await
        .unwrap();
    assert_eq!(page.status, 404);
    assert_eq!(page.body.as_ref(), &[0x50, 0x4b]);
}

#[test]
fn test_calculate_backoff() {
    let config = |kind| {
        GatewayConfig::builder()
            .unpaced()
            .backoff(kind, Duration::from_millis(100), Duration::from_secs(1))
            .build()
    };

    let constant = HttpGateway::with_config(config(BackoffType::Constant));
    assert_eq!(constant.calculate_backoff(3), Duration::from_millis(100));

    let linear = HttpGateway::with_config(config(BackoffType::Linear));
    assert_eq!(linear.calculate_backoff(2), Duration::from_millis(300));

    let exponential = HttpGateway::with_config(config(BackoffType::Exponential));
    assert_eq!(exponential.calculate_backoff(2), Duration::from_millis(400));
    assert_eq!(exponential.calculate_backoff(10), Duration::from_secs(1));
}

#[test]
fn test_gateway_debug() {
    let gateway = HttpGateway::new();
    assert!(gateway.is_paced());
    assert!(format!("{gateway:?}").contains("HttpGateway"));
}
