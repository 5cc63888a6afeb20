// ABOUTME: Canonical local JSON document for a table and its rows
// ABOUTME: Validates document paths, loads them and writes them back pretty-printed

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::hubdb::{ColumnId, TableId};

/// Table-level settings plus column definitions. This is the body submitted
/// when creating or updating a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    pub name: String,
    #[serde(default)]
    pub use_for_pages: bool,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub allow_child_tables: bool,
    #[serde(default)]
    pub allow_public_api_access: bool,
    #[serde(default)]
    pub dynamic_meta_tags: BTreeMap<String, Value>,
    #[serde(default)]
    pub enable_child_table_pages: bool,
    #[serde(default)]
    pub columns: Vec<ColumnDocument>,
}

/// Column definition without any remote-assigned or remote-only fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub column_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_table_id: Option<TableId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_column_id: Option<ColumnId>,
}

/// Row with values keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowDocument {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_soft_editable: Option<bool>,
    #[serde(default)]
    pub values: BTreeMap<String, Value>,
}

/// The full local document: schema fields at the top level plus `rows`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDocument {
    #[serde(flatten)]
    pub schema: TableSchema,
    #[serde(default)]
    pub rows: Vec<RowDocument>,
}

/// Reject any path whose extension is not `.json`.
pub fn validate_json_path(path: &Path) -> Result<()> {
    if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
        return Err(Error::InvalidExtension {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Require an existing regular `.json` file.
pub fn validate_json_file(path: &Path) -> Result<()> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => {}
        _ => {
            return Err(Error::NotAFile {
                path: path.to_path_buf(),
            })
        }
    }

    validate_json_path(path)
}

/// Validate and parse a table document.
pub fn load(path: &Path) -> Result<TableDocument> {
    validate_json_file(path)?;

    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| Error::InvalidDocument {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a document as pretty-printed JSON, creating parent directories.
pub fn write(path: &Path, document: &TableDocument) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut content = serde_json::to_string_pretty(document)?;
    content.push('\n');
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_validate_json_path() {
        assert!(validate_json_path(Path::new("table.json")).is_ok());
        assert!(matches!(
            validate_json_path(Path::new("table.yaml")),
            Err(Error::InvalidExtension { .. })
        ));
        assert!(validate_json_path(Path::new("table")).is_err());
    }

    #[test]
    fn test_validate_json_file_requires_regular_file() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            validate_json_file(&missing),
            Err(Error::NotAFile { .. })
        ));

        let folder = dir.path().join("folder.json");
        fs::create_dir(&folder).unwrap();
        assert!(matches!(
            validate_json_file(&folder),
            Err(Error::NotAFile { .. })
        ));

        let wrong_ext = dir.path().join("table.txt");
        fs::write(&wrong_ext, "{}").unwrap();
        assert!(matches!(
            validate_json_file(&wrong_ext),
            Err(Error::InvalidExtension { .. })
        ));
    }

    #[test]
    fn test_document_splits_schema_and_rows() {
        let document: TableDocument = serde_json::from_value(json!({
            "name": "events",
            "label": "Events",
            "useForPages": true,
            "columns": [{"name": "title", "label": "Title", "type": "TEXT"}],
            "rows": [{"path": "/launch", "name": "Launch", "values": {"title": "Launch"}}]
        }))
        .unwrap();

        assert_eq!(document.schema.name, "events");
        assert!(document.schema.use_for_pages);
        assert_eq!(document.rows.len(), 1);

        let schema = serde_json::to_value(&document.schema).unwrap();
        assert!(schema.get("rows").is_none());
        assert_eq!(schema["columns"][0]["type"], "TEXT");
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("events.hubdb.json");
        let document = TableDocument {
            schema: TableSchema {
                name: "events".to_string(),
                use_for_pages: false,
                label: "Events".to_string(),
                allow_child_tables: false,
                allow_public_api_access: true,
                dynamic_meta_tags: BTreeMap::new(),
                enable_child_table_pages: false,
                columns: Vec::new(),
            },
            rows: vec![RowDocument {
                path: Some("/a".to_string()),
                ..RowDocument::default()
            }],
        };

        write(&path, &document).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.ends_with("}\n"));
        assert!(content.contains("\"allowPublicApiAccess\": true"));

        assert_eq!(load(&path).unwrap(), document);
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{\"rows\": [").unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidDocument { .. }));
        assert!(err.is_validation());
    }
}
