// ABOUTME: Uploads a local document over an existing table
// ABOUTME: Updates the schema, reconciles rows by path, then publishes

use std::path::Path;

use crate::document;
use crate::error::Result;
use crate::hubdb::{HubDbApi, TableId};
use crate::sync::{ensure_unique_paths, sync_schema, ReconciliationReport, Reconciler};

/// Make table `table_id` match the document at `src`.
///
/// Validation happens before any request. Batch errors do not fail the call;
/// they are returned in the report for the caller to judge.
pub async fn update_table(
    api: &dyn HubDbApi,
    table_id: &TableId,
    src: &Path,
    publish: bool,
) -> Result<ReconciliationReport> {
    let table = document::load(src)?;
    // Also checked by the planner, but only after the schema PATCH
    ensure_unique_paths(&table.rows)?;

    let synced = sync_schema(api, Some(table_id), &table.schema).await?;

    let mut report = Reconciler::new(api)
        .reconcile(&synced.id, &table.rows, &synced.columns)
        .await?;

    if publish {
        let published = api.publish_table(&synced.id).await?;
        report.published_row_count = published.row_count;
    }

    Ok(report)
}
