// ABOUTME: Removes every row from a table

use serde::Serialize;

use crate::error::Result;
use crate::hubdb::{HubDbApi, TableId};
use crate::sync::{ensure_clean, fetch_all_rows, row_errors, MutationError, Operation};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResult {
    pub planned_deletions: usize,
    pub deleted_row_count: usize,
    pub errors: Vec<MutationError>,
}

impl ClearResult {
    /// Turn row errors of the purge batch into `Error::PartialMutation`.
    pub fn ensure_clean(&self) -> Result<()> {
        ensure_clean(&self.errors)
    }
}

/// Delete all rows of `table_id` in one batch. Nothing is sent for an
/// empty table.
pub async fn clear_table_rows(api: &dyn HubDbApi, table_id: &TableId) -> Result<ClearResult> {
    let rows = fetch_all_rows(api, table_id).await?;

    let mut result = ClearResult {
        planned_deletions: rows.len(),
        deleted_row_count: 0,
        errors: Vec::new(),
    };

    if !rows.is_empty() {
        let ids: Vec<_> = rows.iter().map(|row| row.id.clone()).collect();
        let response = api.delete_rows(table_id, &ids).await?;
        result.deleted_row_count = response.deleted_count();
        result.errors = row_errors(Operation::Delete, &response);

        for error in &result.errors {
            tracing::warn!("Row deletion error in table {}: {}", table_id, error);
        }
    }

    Ok(result)
}
