//! Integration tests for the Google Places client
//!
//! These tests use wiremock to stand in for the Places web service.

use hive_leads::places::{GooglePlacesClient, NearbyQuery, PlaceSearchProvider, SearchStatus};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> GooglePlacesClient {
    GooglePlacesClient::new(&server.uri(), "test-key", Duration::from_secs(5))
        .expect("Failed to build client")
}

fn query<'a>(keyword: Option<&'a str>, page_token: Option<&'a str>) -> NearbyQuery<'a> {
    NearbyQuery {
        lat: 40.5,
        lng: -74.25,
        radius_m: 1407,
        keyword,
        place_type: None,
        page_token,
    }
}

#[tokio::test]
async fn test_nearby_search_parses_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .and(query_param("key", "test-key"))
        .and(query_param("location", "40.5,-74.25"))
        .and(query_param("radius", "1407"))
        .and(query_param("keyword", "bakery"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "results": [
                {"place_id": "ChIJ-one", "name": "One"},
                {"place_id": "ChIJ-two", "name": "Two"},
                {"name": "No id"}
            ],
            "next_page_token": "next-token"
        })))
        .mount(&server)
        .await;

    let page = client(&server)
        .nearby_search(&query(Some("bakery"), None))
        .await;

    assert_eq!(page.status, SearchStatus::Ok);
    assert_eq!(page.results.len(), 2);
    assert_eq!(page.results[0].external_id, "ChIJ-one");
    assert_eq!(page.results[1].raw["name"], "Two");
    assert_eq!(page.next_page_token.as_deref(), Some("next-token"));
}

#[tokio::test]
async fn test_blank_keyword_not_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ZERO_RESULTS",
            "results": []
        })))
        .mount(&server)
        .await;

    let page = client(&server)
        .nearby_search(&query(Some("  "), Some("tok-2")))
        .await;
    assert_eq!(page.status, SearchStatus::ZeroResults);
    assert!(page.results.is_empty());

    let requests = server.received_requests().await.expect("Recording enabled");
    assert_eq!(requests.len(), 1);
    let params: Vec<(String, String)> = requests[0]
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert!(params.iter().all(|(k, _)| k != "keyword" && k != "type"));
    assert!(params.contains(&("pagetoken".to_string(), "tok-2".to_string())));
}

#[tokio::test]
async fn test_over_query_limit_is_empty_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OVER_QUERY_LIMIT",
            "results": [{"place_id": "ignored"}]
        })))
        .mount(&server)
        .await;

    let page = client(&server).nearby_search(&query(None, None)).await;
    assert_eq!(page.status, SearchStatus::OverQueryLimit);
    assert!(page.results.is_empty());
    assert!(page.next_page_token.is_none());
}

#[tokio::test]
async fn test_missing_status_and_bad_json() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .and(query_param("keyword", "nostatus"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .and(query_param("keyword", "garbage"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let client = client(&server);
    let page = client.nearby_search(&query(Some("nostatus"), None)).await;
    assert_eq!(page.status, SearchStatus::Other("UNKNOWN_ERROR".to_string()));
    assert!(!page.status.is_expected());

    let page = client.nearby_search(&query(Some("garbage"), None)).await;
    assert_eq!(page.status, SearchStatus::RequestException);
}

#[tokio::test]
async fn test_details_returns_result_only_when_ok() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/details/json"))
        .and(query_param("place_id", "ChIJ-good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "result": {"place_id": "ChIJ-good", "website": "https://good.example"}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/details/json"))
        .and(query_param("place_id", "ChIJ-gone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "NOT_FOUND"
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let fields = hive_leads::places::detail_fields_param();

    let details = client
        .details("ChIJ-good", &fields)
        .await
        .expect("details for a known place");
    assert_eq!(details["website"], "https://good.example");

    assert!(client.details("ChIJ-gone", &fields).await.is_none());
}

#[tokio::test]
async fn test_unreachable_provider_degrades() {
    let client =
        GooglePlacesClient::new("http://127.0.0.1:1", "test-key", Duration::from_secs(2)).unwrap();

    let page = client.nearby_search(&query(None, None)).await;
    assert_eq!(page.status, SearchStatus::RequestException);
    assert!(client.details("ChIJ-any", "place_id").await.is_none());
}
