// ABOUTME: Publishes pending draft changes of a table

use serde::Serialize;

use crate::error::Result;
use crate::hubdb::{HubDbApi, TableId};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResult {
    pub table_id: TableId,
    pub row_count: Option<u64>,
}

pub async fn publish_table(api: &dyn HubDbApi, table_id: &TableId) -> Result<PublishResult> {
    let response = api.publish_table(table_id).await?;
    Ok(PublishResult {
        table_id: table_id.clone(),
        row_count: response.row_count,
    })
}
