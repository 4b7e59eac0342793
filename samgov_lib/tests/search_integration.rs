mod common;

use std::time::Duration;

use chrono::Utc;
use common::*;
use samgov_lib::{ApiVersion, OpportunityClient, OpportunitySearchQuery, QuotaGuard, SearchError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(base: &str, cache_dir: &std::path::Path) -> OpportunityClient {
    OpportunityClient::with_api_key("test-key", config(base, cache_dir)).unwrap()
}

async fn received_queries(server: &MockServer) -> Vec<Vec<(String, String)>> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|req| req.url.query_pairs().into_owned().collect())
        .collect()
}

fn param<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

// ============================================================================
// Caching
// ============================================================================

#[tokio::test]
async fn identical_search_is_served_from_cache() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(0..3, 3)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server.uri(), dir.path());
    let query = OpportunitySearchQuery::new().with_keywords("cloud");
    let first = client.search(&query).await.unwrap();
    let second = client.search(&query).await.unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[tokio::test]
async fn cache_hit_is_truncated_to_limit() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(0..5, 5)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server.uri(), dir.path());
    let query = OpportunitySearchQuery::new().with_keywords("cloud");
    assert_eq!(client.search(&query).await.unwrap().len(), 5);

    let smaller = query.with_limit(2);
    let cached = client.search(&smaller).await.unwrap();
    assert_eq!(cached.len(), 2);
    assert_eq!(cached[0].opportunity_id, hex_id(0));
}

#[tokio::test]
async fn larger_limit_refetches_a_result_set_cut_by_a_smaller_one() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(0..5, 5)))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server.uri(), dir.path());
    let query = OpportunitySearchQuery::new().with_keywords("cloud");

    let small = client.search(&query.clone().with_limit(2)).await.unwrap();
    assert_eq!(small.len(), 2);

    let full = client.search(&query.clone().with_limit(100)).await.unwrap();
    assert_eq!(full.len(), 5);
    assert_eq!(full[4].opportunity_id, hex_id(4));

    // The complete set now answers any limit without another request.
    let again = client.search(&query.with_limit(3)).await.unwrap();
    assert_eq!(again.len(), 3);
}

#[tokio::test]
async fn control_characters_never_reach_the_upstream_or_the_cache_key() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .and(query_param("title", "cloud ops"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(0..2, 2)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server.uri(), dir.path());
    let noisy = OpportunitySearchQuery::new().with_keywords("cloud\u{7} ops\u{0}");
    assert_eq!(client.search(&noisy).await.unwrap().len(), 2);

    let clean = OpportunitySearchQuery::new().with_keywords("cloud ops");
    assert_eq!(client.search(&clean).await.unwrap().len(), 2);

    let queries = received_queries(&server).await;
    assert_eq!(queries.len(), 1);
    assert_eq!(param(&queries[0], "title"), Some("cloud ops"));
}

#[tokio::test]
async fn separate_clients_share_the_cache_directory() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(0..2, 2)))
        .expect(1)
        .mount(&server)
        .await;

    let query = OpportunitySearchQuery::new().with_naics_code("541512");
    client(&server.uri(), dir.path()).search(&query).await.unwrap();
    let cached = client(&server.uri(), dir.path())
        .search(&query)
        .await
        .unwrap();
    assert_eq!(cached.len(), 2);
}

#[tokio::test]
async fn expired_entry_triggers_new_request() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(0..1, 1)))
        .expect(2)
        .mount(&server)
        .await;

    let mut cfg = config(&server.uri(), dir.path());
    cfg.cache_ttl_secs = 1;
    let client = OpportunityClient::with_api_key("test-key", cfg).unwrap();
    let query = OpportunitySearchQuery::new().with_keywords("expiry");

    client.search(&query).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    client.search(&query).await.unwrap();
}

#[tokio::test]
async fn zero_ttl_disables_cache() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(0..1, 1)))
        .expect(2)
        .mount(&server)
        .await;

    let mut cfg = config(&server.uri(), dir.path());
    cfg.cache_ttl_secs = 0;
    let client = OpportunityClient::with_api_key("test-key", cfg).unwrap();
    let query = OpportunitySearchQuery::new().with_keywords("nocache");
    client.search(&query).await.unwrap();
    client.search(&query).await.unwrap();
}

// ============================================================================
// Request parameters
// ============================================================================

#[tokio::test]
async fn naics_only_search_sends_no_title() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![], 0)))
        .mount(&server)
        .await;

    let query = OpportunitySearchQuery::new().with_naics_codes(["541512", "541519"]);
    let results = client(&server.uri(), dir.path())
        .search(&query)
        .await
        .unwrap();
    assert!(results.is_empty());

    let queries = received_queries(&server).await;
    assert_eq!(queries.len(), 1);
    assert_eq!(param(&queries[0], "ncode"), Some("541512,541519"));
    assert_eq!(param(&queries[0], "title"), None);
    assert!(param(&queries[0], "postedFrom").is_some());
    assert!(param(&queries[0], "postedTo").is_some());
}

#[tokio::test]
async fn keyword_search_uses_default_naics_and_date_range() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![], 0)))
        .mount(&server)
        .await;

    let query = OpportunitySearchQuery::new()
        .with_keywords("data analytics")
        .with_days_back(9999);
    client(&server.uri(), dir.path())
        .search(&query)
        .await
        .unwrap();

    let queries = received_queries(&server).await;
    assert_eq!(param(&queries[0], "title"), Some("data analytics"));
    assert_eq!(param(&queries[0], "ncode"), Some("541511"));

    let today = Utc::now().date_naive();
    let expected_from = (today - chrono::Duration::days(365))
        .format("%m/%d/%Y")
        .to_string();
    assert_eq!(param(&queries[0], "postedFrom"), Some(expected_from.as_str()));
}

#[tokio::test]
async fn invalid_naics_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let query = OpportunitySearchQuery::new().with_naics_code("54-1511");
    let err = client(&server.uri(), dir.path())
        .search(&query)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::InvalidInput(_)));
    assert!(received_queries(&server).await.is_empty());
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn pagination_follows_offsets_until_total() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(0..100, 150)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .and(query_param("offset", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(100..150, 150)))
        .expect(1)
        .mount(&server)
        .await;

    let query = OpportunitySearchQuery::new()
        .with_keywords("paged")
        .with_limit(1000)
        .with_page_size(100);
    let results = client(&server.uri(), dir.path())
        .search(&query)
        .await
        .unwrap();

    assert_eq!(results.len(), 150);
    assert_eq!(results[0].opportunity_id, hex_id(0));
    assert_eq!(results[149].opportunity_id, hex_id(149));
}

#[tokio::test]
async fn pagination_stops_at_limit() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(0..10, 500)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .and(query_param("offset", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(10..20, 500)))
        .expect(1)
        .mount(&server)
        .await;

    let query = OpportunitySearchQuery::new()
        .with_keywords("limited")
        .with_limit(15)
        .with_page_size(10);
    let results = client(&server.uri(), dir.path())
        .search(&query)
        .await
        .unwrap();
    assert_eq!(results.len(), 15);
}

#[tokio::test]
async fn short_page_ends_pagination() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // No totalRecords: only the short page can stop the loop.
    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "opportunitiesData": [opportunity(1), opportunity(2)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = OpportunitySearchQuery::new()
        .with_keywords("short")
        .with_page_size(50);
    let results = client(&server.uri(), dir.path())
        .search(&query)
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
}

// ============================================================================
// Parsing
// ============================================================================

#[tokio::test]
async fn unaddressable_records_are_dropped() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("mixed_ids.json")))
        .mount(&server)
        .await;

    let query = OpportunitySearchQuery::new().with_keywords("mixed");
    let results = client(&server.uri(), dir.path())
        .search(&query)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].opportunity_id, "0a1b2c3d4e5f60718293a4b5c6d7e8f9");
    assert!(!results[0].id_degraded);
    assert_eq!(
        results[0].sam_link,
        "https://sam.gov/opp/0a1b2c3d4e5f60718293a4b5c6d7e8f9/view"
    );
    assert_eq!(
        results[0].organization.as_deref(),
        Some("DEPT OF DEFENSE.DEPT OF THE ARMY")
    );
    assert_eq!(results[0].attachments.len(), 1);

    assert_eq!(results[1].opportunity_id, "fedcba9876543210fedcba9876543210");
    assert!(results[1].id_degraded);
    assert_eq!(
        results[1].raw_payload.get("title").and_then(|v| v.as_str()),
        Some("Records Digitization")
    );
}

// ============================================================================
// Error handling
// ============================================================================

#[tokio::test]
async fn missing_credential_fails_without_request() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let client = OpportunityClient::with_api_key("", config(&server.uri(), dir.path())).unwrap();

    let err = client
        .search(&OpportunitySearchQuery::new().with_keywords("cloud"))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::MissingCredential));
    assert!(received_queries(&server).await.is_empty());
}

#[tokio::test]
async fn authentication_failure_is_not_retried() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":"API_KEY_INVALID"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server.uri(), dir.path())
        .search(&OpportunitySearchQuery::new().with_keywords("cloud"))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Authentication { status: 401 }));
    assert!(err.user_message().contains("SAM_API_KEY"));
}

#[tokio::test]
async fn server_errors_are_retried_then_succeed() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(0..1, 1)))
        .expect(1)
        .mount(&server)
        .await;

    let results = client(&server.uri(), dir.path())
        .search(&OpportunitySearchQuery::new().with_keywords("flaky"))
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn server_errors_exhaust_retry_budget() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let err = client(&server.uri(), dir.path())
        .search(&OpportunitySearchQuery::new().with_keywords("down"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SearchError::Server {
            status: 500,
            attempts: 3
        }
    ));
    assert!(err.is_retryable_by_caller());
}

#[tokio::test]
async fn unexpected_status_is_reported() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad postedFrom"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server.uri(), dir.path())
        .search(&OpportunitySearchQuery::new().with_keywords("bad"))
        .await
        .unwrap_err();
    match err {
        SearchError::UnexpectedStatus { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("postedFrom"));
        }
        other => panic!("expected UnexpectedStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client(&server.uri(), dir.path())
        .search(&OpportunitySearchQuery::new().with_keywords("html"))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Parse(_)));
}

// ============================================================================
// Quota
// ============================================================================

#[tokio::test]
async fn quota_exceeded_throttles_subsequent_calls_locally() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "5"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server.uri(), dir.path());
    let before = Utc::now();
    let err = client
        .search(&OpportunitySearchQuery::new().with_keywords("first"))
        .await
        .unwrap_err();

    let resume_at = match &err {
        SearchError::QuotaExceeded { resume_at, partial } => {
            assert!(partial.is_empty());
            resume_at.unwrap()
        }
        other => panic!("expected QuotaExceeded, got {:?}", other),
    };
    let wait = (resume_at - before).num_milliseconds();
    assert!((4_000..=6_000).contains(&wait), "wait was {}ms", wait);

    let state = client.quota_guard().snapshot().await;
    assert!(state.exceeded);
    assert_eq!(state.resume_at, Some(resume_at));

    let again = client
        .search(&OpportunitySearchQuery::new().with_keywords("second"))
        .await
        .unwrap_err();
    assert!(matches!(again, SearchError::QuotaExceeded { .. }));
    assert_eq!(received_queries(&server).await.len(), 1);
}

#[tokio::test]
async fn quota_from_body_timestamp_is_used() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let next = (Utc::now() + chrono::Duration::minutes(10))
        .format("%Y-%b-%d %H:%M:%S+0000 UTC")
        .to_string();
    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "code": "900804",
            "message": "Message throttled out",
            "nextAccessTime": next
        })))
        .mount(&server)
        .await;

    let client = client(&server.uri(), dir.path());
    let err = client
        .search(&OpportunitySearchQuery::new().with_keywords("quota"))
        .await
        .unwrap_err();
    let SearchError::QuotaExceeded {
        resume_at: Some(resume_at),
        ..
    } = err
    else {
        panic!("expected a resume time");
    };
    let wait = (resume_at - Utc::now()).num_seconds();
    assert!((500..=601).contains(&wait), "wait was {}s", wait);
}

#[tokio::test]
async fn quota_mid_pagination_returns_partial_results() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(0..10, 30)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .and(query_param("offset", "10"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .mount(&server)
        .await;

    let client = client(&server.uri(), dir.path());
    let query = OpportunitySearchQuery::new()
        .with_keywords("partial")
        .with_page_size(10);
    let err = client.search(&query).await.unwrap_err();
    assert_eq!(err.partial_results().len(), 10);
    assert_eq!(err.partial_results()[0].opportunity_id, hex_id(0));

    // Partial results are never cached.
    client.quota_guard().reset().await;
    let again = client.search(&query).await.unwrap_err();
    assert_eq!(again.partial_results().len(), 10);
    assert_eq!(received_queries(&server).await.len(), 4);
}

#[tokio::test]
async fn shared_guard_throttles_every_client() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "60"))
        .expect(1)
        .mount(&server)
        .await;

    let guard = QuotaGuard::new(Duration::ZERO, Duration::from_secs(60));
    let a = client(&server.uri(), dir.path()).with_quota_guard(guard.clone());
    let b = client(&server.uri(), dir.path()).with_quota_guard(guard);

    let query = OpportunitySearchQuery::new().with_keywords("shared");
    assert!(a.search(&query).await.is_err());
    let err = b.search(&query).await.unwrap_err();
    assert!(matches!(err, SearchError::QuotaExceeded { .. }));
    assert!(err.user_message().contains("Try again after"));
}

// ============================================================================
// Endpoint-family fallback
// ============================================================================

#[tokio::test]
async fn network_failure_switches_to_secondary() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(SECONDARY_SEARCH))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(0..2, 2)))
        .expect(1)
        .mount(&server)
        .await;

    let mut cfg = config(&server.uri(), dir.path());
    cfg.primary_base_url = CLOSED_PORT.to_string();
    let client = OpportunityClient::with_api_key("test-key", cfg).unwrap();

    let results = client
        .search(&OpportunitySearchQuery::new().with_keywords("fallback"))
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(client.active_version(), ApiVersion::Secondary);
}

#[tokio::test]
async fn network_failure_on_both_families_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(CLOSED_PORT, dir.path());
    cfg.secondary_base_url = CLOSED_PORT.to_string();
    let client = OpportunityClient::with_api_key("test-key", cfg).unwrap();

    let err = client
        .search(&OpportunitySearchQuery::new().with_keywords("offline"))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Network(_)));
    assert!(err.is_retryable_by_caller());
    assert_eq!(client.active_version(), ApiVersion::Secondary);
}

// ============================================================================
// Deadlines and direct IDs
// ============================================================================

#[tokio::test]
async fn deadline_expiry_is_a_timeout_and_caches_nothing() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_of(0..1, 1))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = client(&server.uri(), dir.path());
    let query = OpportunitySearchQuery::new()
        .with_keywords("slow")
        .with_deadline(Duration::from_millis(200));
    let err = client.search(&query).await.unwrap_err();
    assert!(matches!(err, SearchError::Timeout(d) if d == Duration::from_millis(200)));

    let entries = std::fs::read_dir(dir.path())
        .map(|rd| rd.count())
        .unwrap_or(0);
    assert_eq!(entries, 0);
}

#[tokio::test]
async fn notice_id_query_delegates_to_lookup() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path(PRIMARY_SEARCH))
        .and(query_param("noticeid", "N-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(7..8, 1)))
        .expect(1)
        .mount(&server)
        .await;

    let query = OpportunitySearchQuery::new()
        .with_keywords("ignored")
        .with_notice_id("N-7");
    let results = client(&server.uri(), dir.path())
        .search(&query)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].notice_id.as_deref(), Some("N-7"));

    let queries = received_queries(&server).await;
    assert_eq!(param(&queries[0], "title"), None);
}
