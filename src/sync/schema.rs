// ABOUTME: Creates or updates a table's schema ahead of row reconciliation
// ABOUTME: Returns the remote column catalog the row resolver needs

use crate::document::TableSchema;
use crate::error::{Error, Result};
use crate::hubdb::{Column, HubDbApi, TableId};

/// Table id and column catalog as known after a schema sync
#[derive(Debug, Clone, PartialEq)]
pub struct SyncedSchema {
    pub id: TableId,
    pub columns: Vec<Column>,
}

/// Create the table when `table_id` is `None`, otherwise update it.
///
/// The schema never carries rows. Any failure is wrapped in
/// `Error::SchemaSync`: rows cannot be resolved without the catalog.
///
/// # Arguments
///
/// * `api` - HubDB data access
/// * `table_id` - Existing table to update, or `None` to create one
/// * `schema` - Table settings and column definitions to submit
///
/// # Returns
///
/// The table id and the column catalog returned by the service
pub async fn sync_schema(
    api: &dyn HubDbApi,
    table_id: Option<&TableId>,
    schema: &TableSchema,
) -> Result<SyncedSchema> {
    let table = table_id
        .map(ToString::to_string)
        .unwrap_or_else(|| schema.name.clone());

    let wrap = |source: Error| Error::SchemaSync {
        table: table.clone(),
        source: Box::new(source),
    };

    match table_id {
        None => {
            tracing::info!("Creating table {}", schema.name);
            let handle = api.create_table(schema).await.map_err(wrap)?;
            let id = handle.id.ok_or_else(|| {
                wrap(Error::unexpected(
                    "create table",
                    "response did not include a table id",
                ))
            })?;
            tracing::debug!("Created table {} with {} columns", id, handle.columns.len());

            Ok(SyncedSchema {
                id,
                columns: handle.columns,
            })
        }
        Some(table_id) => {
            tracing::info!("Updating schema of table {}", table_id);
            let handle = api.update_table(table_id, schema).await.map_err(wrap)?;
            if let Some(returned) = handle.id.as_ref().filter(|id| *id != table_id) {
                tracing::warn!(
                    "Update of table {} answered with table id {}",
                    table_id,
                    returned
                );
            }

            Ok(SyncedSchema {
                id: table_id.clone(),
                columns: handle.columns,
            })
        }
    }
}
