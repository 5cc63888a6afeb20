// ABOUTME: Creates a new table from a local document and publishes it
// ABOUTME: Schema first, then every document row as one create batch

use serde::Serialize;
use std::path::Path;

use crate::document;
use crate::error::Result;
use crate::hubdb::{HubDbApi, TableId};
use crate::sync::{
    ensure_clean, ensure_unique_paths, row_errors, sync_schema, ColumnResolver, MutationError,
    Operation,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTableResult {
    pub table_id: TableId,
    pub row_count: u64,
    pub errors: Vec<MutationError>,
}

impl CreateTableResult {
    /// Turn row errors of the create batch into `Error::PartialMutation`.
    pub fn ensure_clean(&self) -> Result<()> {
        ensure_clean(&self.errors)
    }
}

/// Create a table from the document at `src`, add its rows and publish.
///
/// # Arguments
///
/// * `api` - HubDB data access used for every request
/// * `src` - Path to the local `.json` table document
///
/// # Returns
///
/// The new table id, its published row count and any row errors reported
/// by the create batch. Row errors do not fail the call.
pub async fn create_table(api: &dyn HubDbApi, src: &Path) -> Result<CreateTableResult> {
    let table = document::load(src)?;
    // Checked before the table exists so a bad document leaves nothing behind
    ensure_unique_paths(&table.rows)?;

    let synced = sync_schema(api, None, &table.schema).await?;
    let resolver = ColumnResolver::new(&synced.columns);

    let mut created = 0;
    let mut errors = Vec::new();
    if !table.rows.is_empty() {
        let rows: Vec<_> = table
            .rows
            .iter()
            .map(|row| resolver.to_wire(row, None))
            .collect();
        let response = api.create_rows(&synced.id, &rows).await?;
        created = response.written_count();
        errors = row_errors(Operation::Create, &response);

        for error in &errors {
            tracing::warn!("Row creation error in table {}: {}", synced.id, error);
        }
    }

    let published = api.publish_table(&synced.id).await?;
    let row_count = published.row_count.unwrap_or(created as u64);

    tracing::info!("Created table {} with {} rows", synced.id, row_count);

    Ok(CreateTableResult {
        table_id: synced.id,
        row_count,
        errors,
    })
}
