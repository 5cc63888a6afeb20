// ABOUTME: Deletes a table

use crate::error::Result;
use crate::hubdb::{HubDbApi, TableId};

pub async fn delete_table(api: &dyn HubDbApi, table_id: &TableId) -> Result<()> {
    api.delete_table(table_id).await?;
    tracing::info!("Deleted table {}", table_id);
    Ok(())
}
