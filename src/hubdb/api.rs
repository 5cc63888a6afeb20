// ABOUTME: Data-access seam between the sync engine and the remote tables service
// ABOUTME: Implemented over HTTP by HubDbClient and by in-memory fakes in tests

use async_trait::async_trait;

use super::models::{
    BatchResponse, PageRequest, PublishResponse, RowId, RowInput, RowPage, Table, TableHandle,
    TableId,
};
use crate::document::TableSchema;
use crate::error::Result;

/// Remote operations the engine depends on. The account is bound by the
/// implementation.
#[async_trait]
pub trait HubDbApi: Send + Sync {
    async fn create_table(&self, schema: &TableSchema) -> Result<TableHandle>;

    async fn update_table(&self, table_id: &TableId, schema: &TableSchema) -> Result<TableHandle>;

    async fn fetch_table(&self, table_id: &TableId) -> Result<Table>;

    async fn fetch_rows(&self, table_id: &TableId, page: &PageRequest) -> Result<RowPage>;

    async fn create_rows(&self, table_id: &TableId, rows: &[RowInput]) -> Result<BatchResponse>;

    async fn update_rows(&self, table_id: &TableId, rows: &[RowInput]) -> Result<BatchResponse>;

    async fn delete_rows(&self, table_id: &TableId, row_ids: &[RowId]) -> Result<BatchResponse>;

    async fn publish_table(&self, table_id: &TableId) -> Result<PublishResponse>;

    async fn delete_table(&self, table_id: &TableId) -> Result<()>;
}
