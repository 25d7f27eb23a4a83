//! Integration tests for the Harvard Library MCP server.
//!
//! These tests hit the real LibraryCloud API.
//! Run with: `cargo test --features integration -- --nocapture`

#![cfg(feature = "integration")]

use std::sync::Arc;

use harvard_library_mcp::client::CatalogClient;
use harvard_library_mcp::config::Config;
use harvard_library_mcp::models::RecordFormat;
use harvard_library_mcp::search::{self, Paging};

fn create_client() -> Arc<CatalogClient> {
    // Stay well under the public API's limits when the suite runs in parallel.
    let config = Config { requests_per_second: 2, burst_size: 2, ..Config::default() };
    Arc::new(CatalogClient::new(config).expect("Failed to create client"))
}

#[tokio::test]
async fn test_live_keyword_search() {
    let client = create_client();
    let query = search::search_catalog("Walden", Paging::new(5, 0)).unwrap();

    let result = client.search(&query).await.expect("search failed");
    println!("{} of {} records", result.len(), result.total_count);

    assert!(result.len() <= 5);
    assert!(result.total_count >= result.len() as u64);
    assert!(!result.is_empty(), "expected matches for 'Walden'");
}

#[tokio::test]
async fn test_live_author_search_then_record() {
    let client = create_client();
    let query = search::by_author("Thoreau, Henry David", Paging::new(3, 0)).unwrap();

    let result = client.search(&query).await.expect("search failed");
    let Some(first) = result.records.first() else {
        panic!("no records for Thoreau");
    };
    println!("first record: {} ({})", first.title, first.id);

    let record = client.get_record(&first.id).await.expect("record fetch failed");
    assert_eq!(record.id, first.id);
    assert!(!record.title.is_empty());

    let mods = client.get_record_as(&first.id, RecordFormat::Mods).await.expect("MODS fetch failed");
    assert!(mods.mods_xml.is_some());
}

#[tokio::test]
async fn test_live_date_range() {
    let client = create_client();
    let query = search::by_date_range("1850-01-01", "1855-12-31", Some("whaling"), Paging::new(5, 0)).unwrap();

    let result = client.search(&query).await.expect("search failed");
    println!("{} records in range", result.total_count);
    assert_eq!(result.filters_applied.len(), 3);
}

#[tokio::test]
async fn test_live_missing_record() {
    let client = create_client();
    let err = client.get_record("0000000000000000000").await.unwrap_err();
    println!("missing record error: {err}");
    assert!(!err.is_retryable());
}
