// ABOUTME: Translates row values between column names (local) and column ids (wire)
// ABOUTME: Only live columns (not deleted, not archived) take part in either direction

use serde_json::Value;
use std::collections::BTreeMap;

use crate::document::RowDocument;
use crate::hubdb::{Column, ColumnId, Row, RowId, RowInput};

/// Resolves values against a table's column catalog.
pub struct ColumnResolver<'a> {
    columns: &'a [Column],
}

impl<'a> ColumnResolver<'a> {
    pub fn new(columns: &'a [Column]) -> Self {
        Self { columns }
    }

    /// Columns that are neither deleted nor archived, in catalog order.
    pub fn live_columns(&self) -> impl Iterator<Item = &'a Column> {
        let columns: &'a [Column] = self.columns;
        columns.iter().filter(|column| column.is_live())
    }

    /// Build the wire body for a local row.
    ///
    /// Every live column gets an entry; a value missing from the row is sent
    /// as an explicit null so the remote cell is cleared.
    pub fn to_wire(&self, row: &RowDocument, id: Option<RowId>) -> RowInput {
        let mut values: BTreeMap<ColumnId, Value> = BTreeMap::new();

        for column in self.live_columns() {
            let value = row.values.get(&column.name).cloned().unwrap_or(Value::Null);
            values.insert(column.id.clone(), value);
        }

        let unknown: Vec<&str> = row
            .values
            .keys()
            .filter(|name| !self.live_columns().any(|column| &column.name == *name))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            tracing::warn!(
                "Row {} has values for unknown columns, ignoring: {}",
                row.path.as_deref().unwrap_or("<no path>"),
                unknown.join(", ")
            );
        }

        RowInput {
            id,
            path: row.path.clone(),
            name: row.name.clone(),
            is_soft_editable: row.is_soft_editable,
            values,
        }
    }

    /// Translate a remote row's values to column names, skipping nulls.
    ///
    /// Live columns sharing a name overwrite each other in catalog order.
    pub fn from_wire(&self, row: &Row) -> BTreeMap<String, Value> {
        let mut values = BTreeMap::new();

        for column in self.live_columns() {
            match row.values.get(&column.id) {
                Some(Value::Null) | None => {}
                Some(value) => {
                    values.insert(column.name.clone(), value.clone());
                }
            }
        }

        values
    }
}
