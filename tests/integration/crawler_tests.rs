//! Integration tests for the website crawler
//!
//! These tests use wiremock to serve a small business site and check the
//! fetch fallback and contact discovery end-to-end.

use hive_leads::crawler::{
    default_identities, fetch_with_fallback, ContactCrawler, HttpPageFetcher, PageFetcher,
    SocialPlatform, GOOGLEBOT_UA,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.to_string())
        .insert_header("content-type", "text/html")
}

#[tokio::test]
async fn test_fetch_falls_back_to_later_identity() {
    let mock_server = MockServer::start().await;

    // Only the crawler identity gets through; browsers are blocked
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", GOOGLEBOT_UA))
        .respond_with(html("<html>welcome</html>"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let fetcher = HttpPageFetcher::new().expect("Failed to build fetcher");
    let url = format!("{}/", mock_server.uri());
    let body = fetch_with_fallback(&fetcher, &url, &default_identities(), TIMEOUT).await;
    assert_eq!(body.as_deref(), Some("<html>welcome</html>"));

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_fetch_gives_up_after_all_identities() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let fetcher = HttpPageFetcher::new().unwrap();
    let url = format!("{}/missing", mock_server.uri());
    let identities = default_identities();
    let body = fetch_with_fallback(&fetcher, &url, &identities, TIMEOUT).await;
    assert!(body.is_none());

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), identities.len());
}

#[tokio::test]
async fn test_http_fetcher_reports_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let fetcher = HttpPageFetcher::new().unwrap();
    let identity = &default_identities()[0];
    let err = fetcher
        .get(&format!("{}/gone", mock_server.uri()), identity, TIMEOUT)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("404"));
}

/// Mounts a home page, a contact page and an about page
async fn mount_business_site(mock_server: &MockServer) {
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&format!(
            r#"<html><body>
            <a href="/about">About us</a>
            <a href="{}/Contact-Us">Contact</a>
            <a href="https://elsewhere.example/contact">Partner</a>
            <script>var support = "support@corner-bakery.com";</script>
            </body></html>"#,
            base_url
        )))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/Contact-Us"))
        .respond_with(html(
            r#"<html><body>
            <a href="mailto:orders@corner-bakery.com?subject=Order">Email us</a>
            <a href="https://www.instagram.com/cornerbakery">Instagram</a>
            </body></html>"#,
        ))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html(
            r#"<html><body>
            <img src="/img/hero@2x.png">
            <a href="https://facebook.com/cornerbakery">Facebook</a>
            </body></html>"#,
        ))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_contact_crawler_discovers_site_contacts() {
    let mock_server = MockServer::start().await;
    mount_business_site(&mock_server).await;

    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpPageFetcher::new().unwrap());
    let crawler = ContactCrawler::new(fetcher, TIMEOUT);
    let contacts = crawler.discover(&mock_server.uri(), 25).await;

    let emails: Vec<&str> = contacts.emails.iter().map(String::as_str).collect();
    assert_eq!(
        emails,
        vec!["orders@corner-bakery.com", "support@corner-bakery.com"]
    );
    assert!(contacts.social[&SocialPlatform::Instagram]
        .contains("https://www.instagram.com/cornerbakery"));
    assert!(contacts.social[&SocialPlatform::Facebook]
        .contains("https://facebook.com/cornerbakery"));
    assert!(contacts.social[&SocialPlatform::Linkedin].is_empty());

    // The home page is fetched once and reused
    let requests = mock_server.received_requests().await.unwrap();
    let home_requests = requests.iter().filter(|r| r.url.path() == "/").count();
    assert_eq!(home_requests, 1);
}

#[tokio::test]
async fn test_contact_crawler_prefers_contact_pages_when_limited() {
    let mock_server = MockServer::start().await;
    mount_business_site(&mock_server).await;

    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpPageFetcher::new().unwrap());
    let crawler = ContactCrawler::new(fetcher, TIMEOUT).with_max_concurrent_fetches(1);
    let contacts = crawler.discover(&mock_server.uri(), 2).await;

    assert!(contacts.emails.contains("orders@corner-bakery.com"));
    assert!(contacts.social[&SocialPlatform::Facebook].is_empty());

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() != "/about"));
}

#[tokio::test]
async fn test_contact_crawler_unreachable_site() {
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpPageFetcher::new().unwrap());
    let crawler = ContactCrawler::new(fetcher, Duration::from_secs(2));
    let contacts = crawler.discover("http://127.0.0.1:1/", 25).await;

    assert!(contacts.emails.is_empty());
    assert!(contacts.social.values().all(|links| links.is_empty()));
}
