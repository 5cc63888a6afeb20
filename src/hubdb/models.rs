// ABOUTME: Wire data structures for the HubDB tables API
// ABOUTME: Tables, columns, rows, row pages and batch mutation responses

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Declares an opaque id that decodes from either a JSON string or integer.
macro_rules! remote_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value.to_string())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserializer.deserialize_any(IdVisitor).map(Self)
            }
        }
    };
}

struct IdVisitor;

impl<'de> Visitor<'de> for IdVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or integer id")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<String, E> {
        Ok(value)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
        Ok(value.to_string())
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
        Ok(value.to_string())
    }
}

remote_id!(
    /// Remote-assigned table identifier
    TableId
);
remote_id!(
    /// Remote-assigned column identifier, the key of wire row values
    ColumnId
);
remote_id!(
    /// Remote-assigned row identifier
    RowId
);

/// Column definition as returned by the remote service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
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
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_ids_by_name: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_ids_by_id: Option<Value>,
}

impl Column {
    /// A live column is neither deleted nor archived.
    pub fn is_live(&self) -> bool {
        !self.deleted && !self.archived
    }
}

/// Full table as returned by the remote service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: TableId,
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub allow_child_tables: bool,
    #[serde(default)]
    pub allow_public_api_access: bool,
    #[serde(default)]
    pub dynamic_meta_tags: BTreeMap<String, Value>,
    #[serde(default)]
    pub enable_child_table_pages: bool,
    #[serde(default)]
    pub use_for_pages: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
}

/// Response of table create/update: the id (absent on some updates) and
/// the column catalog with remote-assigned ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableHandle {
    #[serde(default)]
    pub id: Option<TableId>,
    #[serde(default)]
    pub columns: Vec<Column>,
}

/// Row as stored remotely, values keyed by column id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub id: RowId,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_table_id: Option<TableId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_soft_editable: Option<bool>,
    #[serde(default)]
    pub values: BTreeMap<ColumnId, Value>,
}

/// Row body sent to the create and update batch endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,
    pub path: Option<String>,
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_soft_editable: Option<bool>,
    pub values: BTreeMap<ColumnId, Value>,
}

/// Which page of rows to request next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    First,
    After(String),
    Offset(u64),
}

impl PageRequest {
    /// Query parameters for this page.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            PageRequest::First => Vec::new(),
            PageRequest::After(after) => vec![("after", after.clone())],
            PageRequest::Offset(offset) => vec![("offset", offset.to_string())],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub next: Option<NextPage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextPage {
    #[serde(default)]
    pub after: Option<String>,
}

/// One page of rows. The shape of the body picks the protocol.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RowPage {
    /// `{results, paging?.next?.after}`
    Cursor {
        results: Vec<Row>,
        #[serde(default)]
        paging: Option<Paging>,
    },
    /// `{objects, total}`
    Offset { objects: Vec<Row>, total: u64 },
}

impl RowPage {
    pub fn cursor(results: Vec<Row>, after: Option<&str>) -> Self {
        RowPage::Cursor {
            results,
            paging: after.map(|after| Paging {
                next: Some(NextPage {
                    after: Some(after.to_string()),
                }),
            }),
        }
    }

    pub fn rows(&self) -> &[Row] {
        match self {
            RowPage::Cursor { results, .. } => results,
            RowPage::Offset { objects, .. } => objects,
        }
    }
}

/// Summary object of a batch mutation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_ids: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Value>,
}

/// Batch mutation response.
///
/// The service answers either with a summary object, or with a list whose
/// first element is the summary and whose remaining elements are per-row
/// errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchResponse {
    Items(Vec<Value>),
    Summary(BatchSummary),
}

impl BatchResponse {
    /// The batch summary, if the response carries a recognizable one.
    pub fn summary(&self) -> Option<BatchSummary> {
        match self {
            BatchResponse::Summary(summary) => Some(summary.clone()),
            BatchResponse::Items(items) => items
                .first()
                .filter(|first| first.is_object())
                .and_then(|first| serde_json::from_value(first.clone()).ok()),
        }
    }

    /// Number of rows written by a create or update batch.
    pub fn written_count(&self) -> usize {
        self.summary()
            .and_then(|summary| summary.results.or(summary.rows))
            .map(|rows| rows.len())
            .unwrap_or(0)
    }

    /// Number of rows removed by a delete batch.
    pub fn deleted_count(&self) -> usize {
        self.summary()
            .and_then(|summary| summary.row_ids)
            .map(|ids| ids.len())
            .unwrap_or(0)
    }

    /// Row-level errors carried by the response.
    pub fn row_errors(&self) -> Vec<Value> {
        match self {
            BatchResponse::Items(items) => items.iter().skip(1).cloned().collect(),
            BatchResponse::Summary(summary) => summary.errors.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    #[serde(default)]
    pub row_count: Option<u64>,
}
