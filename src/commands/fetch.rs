// ABOUTME: Downloads a table and all its rows into a local JSON document
// ABOUTME: Defaults the destination to <table name>.hubdb.json

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::document;
use crate::error::Result;
use crate::hubdb::{HubDbApi, TableId};
use crate::sync::{fetch_all_rows, to_document};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResult {
    pub file_path: PathBuf,
}

/// Default file name for a downloaded table
pub fn default_file_name(table_name: &str) -> String {
    format!("{}.hubdb.json", table_name)
}

/// Write table `table_id` to a local document.
///
/// An existing destination must be a regular `.json` file; a new one must
/// have the `.json` extension.
///
/// # Arguments
///
/// * `api` - HubDB data access
/// * `table_id` - Table to download
/// * `dest` - Destination path, relative paths resolve against `cwd`.
///   Defaults to `<table name>.hubdb.json`
/// * `cwd` - Working directory for relative and default destinations
///
/// # Returns
///
/// The path the document was written to
pub async fn download_table(
    api: &dyn HubDbApi,
    table_id: &TableId,
    dest: Option<&Path>,
    cwd: &Path,
) -> Result<DownloadResult> {
    let table = api.fetch_table(table_id).await?;

    let file_path = match dest {
        Some(dest) => cwd.join(dest),
        None => cwd.join(default_file_name(&table.name)),
    };

    if file_path.exists() {
        document::validate_json_file(&file_path)?;
    } else {
        document::validate_json_path(&file_path)?;
    }

    let rows = fetch_all_rows(api, table_id).await?;
    let table_document = to_document(&table, &rows);
    document::write(&file_path, &table_document)?;

    tracing::info!(
        "Wrote table {} ({} rows) to {}",
        table_id,
        rows.len(),
        file_path.display()
    );

    Ok(DownloadResult { file_path })
}
