//! Integration tests for the fetcher
//!
//! Redirect following, error classification and body handling against
//! wiremock servers.

use site_posture::config::{CrawlerConfig, UserAgentConfig};
use site_posture::crawler::{build_http_client, content_hash, fetch, FetchError};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(timeout_secs: u64) -> reqwest::Client {
    let agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    };
    let crawler = CrawlerConfig {
        pages_per_site: 10,
        request_timeout_secs: timeout_secs,
        politeness_delay_ms: 100,
        max_redirects: 10,
        discover_endpoints: true,
        endpoint_cap: 20,
        same_host_endpoints_only: true,
        max_concurrent_sites: 1,
    };
    build_http_client(&agent, &crawler).expect("Failed to build client")
}

fn url_on(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), route)).expect("Failed to parse URL")
}

async fn mount_redirect(server: &MockServer, from: &str, status: u16, to: &str) {
    Mock::given(method("GET"))
        .and(path(from))
        .respond_with(ResponseTemplate::new(status).insert_header("location", to))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_redirect_chain_is_recorded() {
    let server = MockServer::start().await;
    mount_redirect(&server, "/old", 301, "/interim").await;
    mount_redirect(&server, "/interim", 302, "/new").await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .insert_header("x-frame-options", "DENY")
                .set_body_string("<html><title>New</title></html>"),
        )
        .mount(&server)
        .await;

    let requested = url_on(&server, "/old");
    let record = fetch(&test_client(5), &requested, 10)
        .await
        .expect("Fetch should succeed");

    assert_eq!(record.url, requested.as_str());
    assert_eq!(record.final_url, url_on(&server, "/new").as_str());
    assert_eq!(record.http_status, 200);
    assert_eq!(record.redirect_chain.len(), 2);
    assert_eq!(record.redirect_chain[0].status, 301);
    assert_eq!(record.redirect_chain[0].url, requested.as_str());
    assert_eq!(record.redirect_chain[1].status, 302);
    assert_eq!(record.redirect_chain[1].url, url_on(&server, "/interim").as_str());
    assert_eq!(record.headers.get("X-Frame-Options"), Some("DENY"));
    assert!(record.body.contains("New"));
}

#[tokio::test]
async fn test_user_agent_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header(
            "user-agent",
            "TestBot/1.0.0 (+https://example.com/contact; test@example.com)",
        ))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let record = fetch(&test_client(5), &url_on(&server, "/"), 10)
        .await
        .expect("Fetch should succeed");
    assert_eq!(record.http_status, 200);
}

#[tokio::test]
async fn test_error_status_still_produces_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&server)
        .await;

    let record = fetch(&test_client(5), &url_on(&server, "/missing"), 10)
        .await
        .expect("A 404 is a response, not a fetch failure");

    assert_eq!(record.http_status, 404);
    assert!(record.redirect_chain.is_empty());
    assert_eq!(record.sha256, content_hash(b"not here"));
}

#[tokio::test]
async fn test_redirect_without_location_is_final() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/odd"))
        .respond_with(ResponseTemplate::new(302))
        .mount(&server)
        .await;

    let record = fetch(&test_client(5), &url_on(&server, "/odd"), 10)
        .await
        .expect("Fetch should succeed");
    assert_eq!(record.http_status, 302);
    assert!(record.redirect_chain.is_empty());
}

#[tokio::test]
async fn test_redirect_limit() {
    let server = MockServer::start().await;
    mount_redirect(&server, "/r0", 301, "/r1").await;
    mount_redirect(&server, "/r1", 301, "/r2").await;
    mount_redirect(&server, "/r2", 301, "/r3").await;
    Mock::given(method("GET"))
        .and(path("/r3"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = test_client(5);
    let err = fetch(&client, &url_on(&server, "/r0"), 2)
        .await
        .expect_err("Three hops exceed a limit of two");
    assert!(matches!(err, FetchError::RedirectLimit { .. }), "{:?}", err);

    let record = fetch(&client, &url_on(&server, "/r1"), 2)
        .await
        .expect("Two hops are within the limit");
    assert_eq!(record.redirect_chain.len(), 2);
}

#[tokio::test]
async fn test_redirect_loop() {
    let server = MockServer::start().await;
    mount_redirect(&server, "/a", 307, "/b").await;
    mount_redirect(&server, "/b", 308, "/a").await;

    let err = fetch(&test_client(5), &url_on(&server, "/a"), 10)
        .await
        .expect_err("Loop should be detected");
    assert!(matches!(err, FetchError::RedirectLoop { .. }), "{:?}", err);
}

#[tokio::test]
async fn test_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let err = fetch(&test_client(1), &url_on(&server, "/slow"), 10)
        .await
        .expect_err("Request should time out");
    assert!(matches!(err, FetchError::Timeout { .. }), "{:?}", err);
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind then drop a listener so the port is known to be closed
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local address").port();
    drop(listener);
    let dead = Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap();

    let err = fetch(&test_client(2), &dead, 10)
        .await
        .expect_err("Nothing is listening");
    assert!(
        matches!(err, FetchError::Transport { .. } | FetchError::Timeout { .. }),
        "{:?}",
        err
    );
}

#[tokio::test]
async fn test_invalid_utf8_is_decoded_lossily_and_hashed_raw() {
    let server = MockServer::start().await;
    let bytes: Vec<u8> = vec![b'<', b'p', b'>', 0xff, 0xfe, b'o', b'k', b'<', b'/', b'p', b'>'];
    Mock::given(method("GET"))
        .and(path("/latin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.clone()))
        .mount(&server)
        .await;

    let record = fetch(&test_client(5), &url_on(&server, "/latin"), 10)
        .await
        .expect("Fetch should succeed");

    assert!(record.body.contains('\u{FFFD}'));
    assert!(record.body.contains("ok"));
    assert_eq!(record.sha256, content_hash(&bytes));
}
