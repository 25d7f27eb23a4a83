//! Rate budget tests. These run on the real clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use futures::future::join_all;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use harvard_library_mcp::client::{CatalogClient, RateBudget, with_deadline};
use harvard_library_mcp::config::Config;
use harvard_library_mcp::error::ClientError;
use harvard_library_mcp::search::{self, Paging};

fn empty_page() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"pagination": {"numFound": 0}, "items": []}))
}

#[tokio::test]
async fn test_burst_is_immediate_then_throttled() {
    let budget = Arc::new(RateBudget::new(10, 5).unwrap());
    let started = Instant::now();

    join_all((0..5).map(|_| budget.acquire())).await;
    assert!(started.elapsed() < Duration::from_millis(50), "burst took {:?}", started.elapsed());

    // Five more at 10/s need about half a second.
    join_all((0..5).map(|_| budget.acquire())).await;
    assert!(started.elapsed() >= Duration::from_millis(400), "throttled phase took {:?}", started.elapsed());
}

#[tokio::test]
async fn test_concurrent_acquires_each_get_one_token() {
    let budget = Arc::new(RateBudget::new(1, 8).unwrap());
    let granted = Arc::new(AtomicU32::new(0));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let budget = Arc::clone(&budget);
            let granted = Arc::clone(&granted);
            tokio::spawn(async move {
                budget.acquire().await;
                granted.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(granted.load(Ordering::SeqCst), 8);
    // The bucket was exactly drained by the eight acquires.
    assert!(!budget.try_acquire());
}

#[tokio::test]
async fn test_abandoned_wait_consumes_nothing() {
    let budget = RateBudget::new(2, 1).unwrap();
    assert!(budget.try_acquire());

    let err = budget.acquire_within(Duration::from_millis(50)).await.unwrap_err();
    assert!(matches!(err, ClientError::Cancelled));

    // One token refills after 500ms; the abandoned wait did not take it.
    tokio::time::sleep(Duration::from_millis(550)).await;
    assert!(budget.try_acquire());
}

#[tokio::test]
async fn test_shared_budget_spans_clients() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).and(path("/search.json")).respond_with(empty_page()).expect(4).mount(&server).await;

    let budget = Arc::new(RateBudget::new(5, 1).unwrap());
    let a = CatalogClient::with_budget(Config::for_testing(&server.uri()), Arc::clone(&budget)).unwrap();
    let b = CatalogClient::with_budget(Config::for_testing(&server.uri()), Arc::clone(&budget)).unwrap();
    let query = search::search_catalog("x", Paging::default()).unwrap();

    let started = Instant::now();
    let results = join_all([a.search(&query), b.search(&query), a.search(&query), b.search(&query)]).await;
    assert!(results.iter().all(Result::is_ok));

    // One burst token, then three more at 5/s.
    assert!(started.elapsed() >= Duration::from_millis(500), "took {:?}", started.elapsed());
}

#[tokio::test]
async fn test_retries_pass_through_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET")).and(path("/search.json")).respond_with(empty_page()).mount(&server).await;

    let budget = Arc::new(RateBudget::new(5, 1).unwrap());
    let client = CatalogClient::with_budget(Config::for_testing(&server.uri()), budget).unwrap();
    let query = search::search_catalog("x", Paging::default()).unwrap();

    let started = Instant::now();
    client.search(&query).await.unwrap();

    // Three attempts: the two retries each wait about 200ms for a token.
    assert!(started.elapsed() >= Duration::from_millis(350), "took {:?}", started.elapsed());
}

#[tokio::test]
async fn test_deadline_while_waiting_for_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).and(path("/search.json")).respond_with(empty_page()).expect(0).mount(&server).await;

    let budget = Arc::new(RateBudget::new(1, 1).unwrap());
    assert!(budget.try_acquire());
    let client = CatalogClient::with_budget(Config::for_testing(&server.uri()), budget).unwrap();
    let query = search::search_catalog("x", Paging::default()).unwrap();

    let err = with_deadline(Duration::from_millis(100), client.search(&query)).await.unwrap_err();
    assert!(matches!(err, ClientError::Cancelled));
}

#[tokio::test]
async fn test_deadline_during_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(empty_page().set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = CatalogClient::new(Config::for_testing(&server.uri())).unwrap();
    let query = search::search_catalog("x", Paging::default()).unwrap();

    let started = Instant::now();
    let err = with_deadline(Duration::from_millis(100), client.search(&query)).await.unwrap_err();

    assert!(matches!(err, ClientError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(1));
}
