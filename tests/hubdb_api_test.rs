// ABOUTME: Live tests against the HubDB API
// ABOUTME: Tests require HUBDB_ACCESS_TOKEN, HUBDB_ACCOUNT_ID and TEST_HUBDB_TABLE_ID

//! Live tests for the HubDB client
//!
//! These tests require:
//! - HUBDB_ACCESS_TOKEN environment variable
//! - HUBDB_ACCOUNT_ID environment variable
//! - TEST_HUBDB_TABLE_ID environment variable (a table the tests may read)
//!
//! Run with: cargo test --test hubdb_api_test -- --ignored --nocapture

use hubdb_sync::config::Account;
use hubdb_sync::hubdb::{HubDbApi, HubDbClient, TableId};
use hubdb_sync::sync::{fetch_all_rows, to_document};

fn get_test_client() -> Option<HubDbClient> {
    let access_token = std::env::var("HUBDB_ACCESS_TOKEN").ok()?;
    let account_id = std::env::var("HUBDB_ACCOUNT_ID").ok()?.parse().ok()?;
    let account = Account {
        name: "test".to_string(),
        account_id,
        access_token,
        api_base_url: std::env::var("HUBDB_API_URL").ok(),
    };
    HubDbClient::new(&account).ok()
}

fn get_test_table_id() -> Option<TableId> {
    std::env::var("TEST_HUBDB_TABLE_ID").ok().map(TableId::from)
}

#[tokio::test]
#[ignore]
async fn test_fetch_table() {
    let client = get_test_client().expect("HUBDB_ACCESS_TOKEN and HUBDB_ACCOUNT_ID required");
    let table_id = get_test_table_id().expect("TEST_HUBDB_TABLE_ID required");

    let table = client.fetch_table(&table_id).await.unwrap();

    assert_eq!(table.id, table_id);
    println!("Table: {} ({} columns)", table.name, table.columns.len());
    for column in &table.columns {
        println!(
            "  - {} (id: {}, type: {}, live: {})",
            column.name,
            column.id,
            column.column_type,
            column.is_live()
        );
    }
}

#[tokio::test]
#[ignore]
async fn test_fetch_all_rows() {
    let client = get_test_client().expect("HUBDB_ACCESS_TOKEN and HUBDB_ACCOUNT_ID required");
    let table_id = get_test_table_id().expect("TEST_HUBDB_TABLE_ID required");

    let rows = fetch_all_rows(&client, &table_id).await.unwrap();

    println!("Fetched {} rows", rows.len());
    for row in rows.iter().take(5) {
        println!("  - {} {:?}", row.id, row.path);
    }
}

#[tokio::test]
#[ignore]
async fn test_export_document() {
    let client = get_test_client().expect("HUBDB_ACCESS_TOKEN and HUBDB_ACCOUNT_ID required");
    let table_id = get_test_table_id().expect("TEST_HUBDB_TABLE_ID required");

    let table = client.fetch_table(&table_id).await.unwrap();
    let rows = fetch_all_rows(&client, &table_id).await.unwrap();
    let document = to_document(&table, &rows);

    assert_eq!(document.rows.len(), rows.len());
    println!("{}", serde_json::to_string_pretty(&document).unwrap());
}

#[tokio::test]
#[ignore]
async fn test_unknown_table_is_not_found() {
    let client = get_test_client().expect("HUBDB_ACCESS_TOKEN and HUBDB_ACCOUNT_ID required");

    let result = client.fetch_table(&TableId::from("1")).await;

    assert!(matches!(result, Err(hubdb_sync::Error::NotFound(_))));
}
